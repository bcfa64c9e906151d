//! Remote LLM re-ranking
//!
//! This module provides:
//! - A trait for chat-completion clients the ranker talks to
//! - A streaming HTTP backend
//! - Prompt encoding and answer decoding for ranking requests

mod decode;
mod http_backend;
mod prompt;

pub use decode::*;
pub use http_backend::*;
pub use prompt::*;

use crate::config::RankingConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One chat message in a ranking request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sends a conversation to the remote ranker and returns its full answer text
#[async_trait]
pub trait RankerClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Create the HTTP ranker client described by the configuration
pub fn create_ranker_client(config: &RankingConfig) -> Result<Box<dyn RankerClient>> {
    let client = HttpRankerClient::new(config)?;
    Ok(Box::new(client))
}
