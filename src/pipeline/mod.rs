//! Ranking pipeline
//!
//! Wires the prefilter, prompt encoder, ranker client and batch orchestrator
//! into the two search modes offered to callers.

use crate::config::RankingConfig;
use crate::error::{Error, Result};
use crate::models::{Candidate, Document, RankOutcome};
use crate::prefilter::Prefilter;
use crate::rank::{BatchRanker, BatchSettings, NOTHING_TO_SEARCH};
use crate::rerank::{create_ranker_client, PromptEncoder, RankerClient};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Rationale when hybrid mode finds nothing worth sending to the ranker
pub const NO_KEYWORD_MATCHES: &str = "No keyword matches found to re-rank.";

/// How candidates are chosen before remote ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Every document goes to the ranker
    Full,
    /// Only the prefilter's top matches go to the ranker
    Hybrid,
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(Error::InvalidMode(value.to_string())),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Full => write!(f, "full"),
            SearchMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Composition root for ranking documents against a query
pub struct RankingPipeline {
    prefilter: Prefilter,
    ranker: BatchRanker,
    top_k: usize,
}

impl RankingPipeline {
    /// Build a pipeline around an existing ranker client
    pub fn new(config: &RankingConfig, client: Arc<dyn RankerClient>) -> Self {
        let encoder = PromptEncoder::new(config.system_prompt.clone(), config.preview_chars);
        Self {
            prefilter: Prefilter::new(config.prefilter_body_chars),
            ranker: BatchRanker::new(client, encoder, BatchSettings::from(config)),
            top_k: config.top_k,
        }
    }

    /// Build a pipeline talking to the configured HTTP endpoint
    pub fn from_config(config: &RankingConfig) -> Result<Self> {
        let client: Arc<dyn RankerClient> = create_ranker_client(config)?.into();
        Ok(Self::new(config, client))
    }

    /// Rank `documents` for `query` using a mode given by name.
    ///
    /// An unknown mode is the only error; remote failures degrade to an empty
    /// or partial outcome with an explanatory rationale.
    pub async fn search(
        &self,
        query: &str,
        documents: &[Arc<Document>],
        mode: &str,
        max_results: usize,
    ) -> Result<RankOutcome> {
        let mode: SearchMode = mode.parse()?;
        Ok(self.run(query, documents, mode, max_results).await)
    }

    /// Rank `documents` for `query` in the given mode
    pub async fn run(
        &self,
        query: &str,
        documents: &[Arc<Document>],
        mode: SearchMode,
        max_results: usize,
    ) -> RankOutcome {
        if documents.is_empty() {
            return RankOutcome::empty(NOTHING_TO_SEARCH);
        }

        let candidates: Vec<Candidate> = match mode {
            SearchMode::Full => documents.iter().cloned().map(Candidate::new).collect(),
            SearchMode::Hybrid => {
                let selected = self.prefilter.select(query, documents, self.top_k);
                if selected.is_empty() {
                    info!("Prefilter found no matches for '{}'", query);
                    return RankOutcome::empty(NO_KEYWORD_MATCHES);
                }
                selected
            }
        };

        info!(
            "Searching {} of {} documents in {} mode",
            candidates.len(),
            documents.len(),
            mode
        );
        self.ranker
            .rank_all(query, candidates, mode, max_results)
            .await
    }
}
