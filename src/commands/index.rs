//! Index command implementation

use crate::config::Config;
use crate::error::Result;
use crate::index::{save_index, Indexer};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// Outcome of indexing a directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub root: String,
    pub documents: usize,
    pub index_file: String,
    pub elapsed_ms: u128,
}

/// Index `path` and replace the stored index
pub fn cmd_index(config: &Config, path: &Path) -> Result<IndexStats> {
    let started = Instant::now();
    let root = path.canonicalize()?;

    let index = Indexer::new(&config.index).index_dir(&root)?;
    save_index(&index, &config.paths.index_file)?;

    Ok(IndexStats {
        root: root.display().to_string(),
        documents: index.documents.len(),
        index_file: config.paths.index_file.display().to_string(),
        elapsed_ms: started.elapsed().as_millis(),
    })
}

/// Print index stats to console
pub fn print_index_stats(stats: &IndexStats) {
    println!("\n✓ Indexed {}", stats.root);
    println!("  Documents: {}", stats.documents);
    println!("  Index: {}", stats.index_file);
    println!("  Took: {} ms", stats.elapsed_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cmd_init;
    use crate::index::load_index;
    use tempfile::TempDir;

    #[test]
    fn test_index_replaces_stored_index() {
        let tmp = TempDir::new().unwrap();
        let config = cmd_init(tmp.path().join("scout"), false).unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("a.md"), "alpha").unwrap();
        std::fs::write(docs.join("b.txt"), "beta").unwrap();

        let stats = cmd_index(&config, &docs).unwrap();
        assert_eq!(stats.documents, 2);

        std::fs::remove_file(docs.join("b.txt")).unwrap();
        cmd_index(&config, &docs).unwrap();

        let index = load_index(&config.paths.index_file, 400).unwrap();
        assert_eq!(index.documents.len(), 1);
        assert_eq!(index.documents[0].name(), "a.md");
    }
}
