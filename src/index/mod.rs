//! Local file indexing
//!
//! This module provides:
//! - A recursive directory walk with extension filtering
//! - Bounded reading of file contents into documents
//! - A JSON index file holding the documents between runs

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::models::Document;
use crate::progress::add_progress_bar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Documents indexed from one root directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIndex {
    pub root: PathBuf,
    pub indexed_at: DateTime<Utc>,
    pub documents: Vec<Document>,
}

impl DocumentIndex {
    /// Documents wrapped for sharing across a ranking call
    pub fn shared_documents(&self) -> Vec<Arc<Document>> {
        self.documents.iter().cloned().map(Arc::new).collect()
    }
}

/// Walks a directory tree and turns matching files into documents
pub struct Indexer {
    extensions: HashSet<String>,
    max_file_chars: usize,
    preview_chars: usize,
}

impl Indexer {
    pub fn new(config: &IndexConfig) -> Self {
        let extensions = config
            .extensions
            .iter()
            .map(|ext| {
                let ext = ext.trim().to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
        Self {
            extensions,
            max_file_chars: config.max_file_chars,
            preview_chars: config.preview_chars,
        }
    }

    /// Whether a path has one of the indexed extensions
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&format!(".{}", ext.to_lowercase())))
            .unwrap_or(false)
    }

    /// Index every accepted file below `root`; unreadable files are skipped
    pub fn index_dir(&self, root: &Path) -> Result<DocumentIndex> {
        if !root.is_dir() {
            return Err(Error::Index(format!(
                "Not a directory: {}",
                root.display()
            )));
        }

        let paths: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.accepts(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        let progress = add_progress_bar(paths.len() as u64, "index");
        let mut documents = Vec::with_capacity(paths.len());
        for path in &paths {
            match self.read_document(path) {
                Ok(doc) => documents.push(doc),
                Err(e) => debug!("Skipping {}: {}", path.display(), e),
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(
            "Indexed {} of {} matching files under {}",
            documents.len(),
            paths.len(),
            root.display()
        );

        Ok(DocumentIndex {
            root: root.to_path_buf(),
            indexed_at: Utc::now(),
            documents,
        })
    }

    fn read_document(&self, path: &Path) -> Result<Document> {
        let metadata = std::fs::metadata(path)?;
        let mut bytes = Vec::new();
        // Four bytes per char bounds the read for any UTF-8 text.
        let limit = (self.max_file_chars as u64).saturating_mul(4);
        File::open(path)?.take(limit).read_to_end(&mut bytes)?;

        let text = String::from_utf8_lossy(&bytes);
        let body: String = text.chars().take(self.max_file_chars).collect();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

        Ok(Document::new(
            path.to_string_lossy().into_owned(),
            name,
            body,
            self.preview_chars,
        )
        .with_file_meta(extension, metadata.len(), modified))
    }
}

/// Write an index as pretty JSON, creating parent directories
pub fn save_index(index: &DocumentIndex, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, index)?;
    info!("Saved {} documents to {:?}", index.documents.len(), path);
    Ok(())
}

/// Read an index written by `save_index`
///
/// Documents stored without a preview get one derived from their body.
pub fn load_index(path: &Path, preview_chars: usize) -> Result<DocumentIndex> {
    if !path.exists() {
        return Err(Error::Index(format!(
            "Index not found at {}; run 'scout index <dir>' first",
            path.display()
        )));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut index: DocumentIndex = serde_json::from_reader(reader)?;
    for doc in index.documents.iter_mut() {
        if doc.preview().is_empty() && !doc.body().is_empty() {
            doc.refresh_preview(preview_chars);
        }
    }
    debug!("Loaded {} documents from {:?}", index.documents.len(), path);
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn indexer(max_file_chars: usize) -> Indexer {
        Indexer::new(&IndexConfig {
            max_file_chars,
            ..IndexConfig::default()
        })
    }

    #[test]
    fn test_accepts_known_extensions() {
        let indexer = indexer(1000);
        assert!(indexer.accepts(Path::new("/a/notes.md")));
        assert!(indexer.accepts(Path::new("/a/NOTES.TXT")));
        assert!(!indexer.accepts(Path::new("/a/photo.png")));
        assert!(!indexer.accepts(Path::new("/a/Makefile")));
    }

    #[test]
    fn test_extensions_without_dot_are_normalized() {
        let indexer = Indexer::new(&IndexConfig {
            extensions: vec!["rs".to_string(), ".Toml".to_string()],
            ..IndexConfig::default()
        });
        assert!(indexer.accepts(Path::new("src/main.rs")));
        assert!(indexer.accepts(Path::new("Cargo.toml")));
        assert!(!indexer.accepts(Path::new("README.md")));
    }

    #[test]
    fn test_index_dir_walks_recursively() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "top.md", "# Top\nhello");
        write(tmp.path(), "nested/deep/notes.txt", "deep notes");
        write(tmp.path(), "nested/image.png", "not text");

        let index = indexer(1000).index_dir(tmp.path()).unwrap();
        let mut names: Vec<&str> = index.documents.iter().map(|d| d.name()).collect();
        names.sort();

        assert_eq!(names, vec!["notes.txt", "top.md"]);
        let top = index.documents.iter().find(|d| d.name() == "top.md").unwrap();
        assert_eq!(top.preview(), "# Top hello");
        assert!(top.id().ends_with("top.md"));
        assert_eq!(top.extension(), ".md");
        assert_eq!(top.size_bytes(), 11);
        assert!(top.modified_time().is_some());
    }

    #[test]
    fn test_body_is_truncated() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "big.log", &"abcdefghij".repeat(10));

        let index = indexer(25).index_dir(tmp.path()).unwrap();
        assert_eq!(index.documents[0].body().chars().count(), 25);
    }

    #[test]
    fn test_missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = indexer(1000)
            .index_dir(&tmp.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, Error::Index(_)));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "docs/a.md", "alpha");
        let index = indexer(1000).index_dir(&tmp.path().join("docs")).unwrap();

        let index_path = tmp.path().join("state/index.json");
        save_index(&index, &index_path).unwrap();
        let loaded = load_index(&index_path, 400).unwrap();

        assert_eq!(loaded.documents, index.documents);
        assert_eq!(loaded.root, index.root);
        assert_eq!(loaded.shared_documents().len(), 1);
    }

    #[test]
    fn test_load_fills_missing_preview() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.json");
        let json = serde_json::json!({
            "root": "/notes",
            "indexed_at": "2024-01-01T00:00:00Z",
            "documents": [{ "id": "/notes/a.md", "name": "a.md", "body": "line one\nline two" }]
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let loaded = load_index(&path, 400).unwrap();
        assert_eq!(loaded.documents[0].preview(), "line one line two");
    }

    #[test]
    fn test_load_missing_index_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_index(&tmp.path().join("index.json"), 400).unwrap_err();
        assert!(matches!(err, Error::Index(_)));
    }
}
