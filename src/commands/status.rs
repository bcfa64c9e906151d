//! Status command implementation

use crate::config::Config;
use crate::error::Result;
use crate::index::load_index;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub index_path: String,
    pub endpoint_url: String,
    pub default_mode: String,
    pub batch_size: usize,
    pub max_workers: usize,
    pub indexed_root: Option<String>,
    pub indexed_at: Option<String>,
    pub document_count: usize,
    pub total_bytes: u64,
}

/// Get system status
pub fn cmd_status(config: &Config) -> Result<StatusInfo> {
    let (indexed_root, indexed_at, document_count, total_bytes) =
        match load_index(&config.paths.index_file, config.index.preview_chars) {
            Ok(index) => (
                Some(index.root.display().to_string()),
                Some(index.indexed_at.to_rfc3339()),
                index.documents.len(),
                index.documents.iter().map(|d| d.size_bytes()).sum::<u64>(),
            ),
            Err(e) => {
                debug!("No usable index: {}", e);
                (None, None, 0, 0)
            }
        };

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        index_path: config.paths.index_file.display().to_string(),
        endpoint_url: config.ranker.endpoint_url.clone(),
        default_mode: config.search.default_mode.clone(),
        batch_size: config.batch.batch_size,
        max_workers: config.batch.max_workers,
        indexed_root,
        indexed_at,
        document_count,
        total_bytes,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 scout Status\n");
    println!("Configuration: {}", status.config_path);
    println!("Index: {}", status.index_path);
    println!("\nRanker:");
    println!("  Endpoint: {}", status.endpoint_url);
    println!("  Default mode: {}", status.default_mode);
    println!(
        "  Batches: {} files, {} workers",
        status.batch_size, status.max_workers
    );

    println!("\nIndex:");
    match (&status.indexed_root, &status.indexed_at) {
        (Some(root), Some(at)) => {
            println!("  Root: {}", root);
            println!("  Indexed at: {}", at);
            println!("  Documents: {}", status.document_count);
            println!("  Size: {} bytes", status.total_bytes);
        }
        _ => println!("  Not built yet. Run 'scout index <dir>' to create it."),
    }
}
