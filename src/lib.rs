//! scout - rank local files against a query with a remote LLM re-ranker
//!
//! This crate provides:
//! - A directory indexer that stores file contents in a JSON index
//! - A TF-IDF prefilter for narrowing large corpora before ranking
//! - Batched, concurrent ranking against an OpenAI-compatible streaming endpoint
//! - CLI commands tying these together

pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod prefilter;
pub mod progress;
pub mod rank;
pub mod rerank;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{RankingPipeline, SearchMode};
