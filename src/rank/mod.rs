//! Batched remote re-ranking
//!
//! This module handles:
//! - Splitting candidates into bounded batches
//! - Running batches on a bounded pool of workers
//! - Retrying failed batches with exponential backoff
//! - Merging partial results into one ordered outcome

mod retry;

pub use retry::*;

use crate::config::RankingConfig;
use crate::error::Result;
use crate::models::{Candidate, RankOutcome, RankedResult, SCORE_CEILING, SCORE_STEP};
use crate::pipeline::SearchMode;
use crate::progress::add_progress_bar;
use crate::rerank::{decode_answer, ChatMessage, PromptEncoder, RankerClient};
use futures::future::join_all;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// Rationale for a call with no documents at all
pub const NOTHING_TO_SEARCH: &str = "No files indexed.";

/// Batching limits for one ranking call
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub max_workers: usize,
    pub retry: RetryPolicy,
}

impl From<&RankingConfig> for BatchSettings {
    fn from(config: &RankingConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            max_workers: config.max_workers,
            retry: RetryPolicy::new(config.max_retries, config.retry_base_delay),
        }
    }
}

/// What one batch produced; `outcome` is `None` once retries are exhausted
#[derive(Debug)]
struct BatchReport {
    index: usize,
    outcome: Option<RankOutcome>,
}

/// Split candidates into contiguous batches of at most `batch_size`
pub fn partition(candidates: Vec<Candidate>, batch_size: usize) -> Vec<Vec<Candidate>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(candidates.len().div_ceil(batch_size));
    let mut rest = candidates.into_iter().peekable();
    while rest.peek().is_some() {
        batches.push(rest.by_ref().take(batch_size).collect());
    }
    batches
}

/// Ranks candidates through the remote ranker, batch by batch
#[derive(Clone)]
pub struct BatchRanker {
    client: Arc<dyn RankerClient>,
    encoder: PromptEncoder,
    settings: BatchSettings,
}

impl BatchRanker {
    pub fn new(
        client: Arc<dyn RankerClient>,
        encoder: PromptEncoder,
        settings: BatchSettings,
    ) -> Self {
        Self {
            client,
            encoder,
            settings,
        }
    }

    /// Rank every candidate and return at most `max_results` of them.
    ///
    /// Failed batches are retried and, once exhausted, contribute nothing.
    /// The result never depends on the order in which batches finish.
    pub async fn rank_all(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        mode: SearchMode,
        max_results: usize,
    ) -> RankOutcome {
        if candidates.is_empty() {
            return RankOutcome::empty(NOTHING_TO_SEARCH);
        }

        let total = candidates.len();
        let batches = partition(candidates, self.settings.batch_size);
        let batch_count = batches.len();
        let workers = self.settings.max_workers.clamp(1, batch_count);

        info!(
            "Ranking {} candidates in {} batches with {} workers ({} mode)",
            total, batch_count, workers, mode
        );

        let queue = Arc::new(Mutex::new(
            batches.into_iter().enumerate().collect::<VecDeque<_>>(),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel::<BatchReport>();
        let query: Arc<str> = Arc::from(query);

        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let ranker = self.clone();
                let queue = Arc::clone(&queue);
                let tx = tx.clone();
                let query = Arc::clone(&query);
                tokio::spawn(async move {
                    loop {
                        let next = queue.lock().await.pop_front();
                        let Some((index, batch)) = next else {
                            break;
                        };
                        let outcome = ranker.rank_batch(&query, index, &batch, mode).await;
                        if tx.send(BatchReport { index, outcome }).is_err() {
                            break;
                        }
                    }
                    debug!("Ranking worker {} finished", worker);
                })
            })
            .collect();
        drop(tx);

        // Slots are indexed by batch, so arrival order is irrelevant.
        let progress = add_progress_bar(batch_count as u64, "rank");
        let mut slots: Vec<Option<RankOutcome>> = vec![None; batch_count];
        while let Some(report) = rx.recv().await {
            slots[report.index] = report.outcome;
            progress.inc(1);
        }
        progress.finish_and_clear();
        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!("Ranking worker stopped unexpectedly: {}", e);
            }
        }

        merge(slots, total, max_results)
    }

    async fn rank_batch(
        &self,
        query: &str,
        index: usize,
        batch: &[Candidate],
        mode: SearchMode,
    ) -> Option<RankOutcome> {
        let messages = self.encoder.messages(query, batch, mode);
        let label = format!("Ranking batch {}", index + 1);

        match self
            .settings
            .retry
            .run(&label, || self.attempt(&messages, batch))
            .await
        {
            Ok(outcome) => {
                debug!(
                    "Batch {} ranked {} of {} candidates",
                    index + 1,
                    outcome.results.len(),
                    batch.len()
                );
                Some(outcome)
            }
            Err(e) => {
                warn!("Batch {} contributes no results: {}", index + 1, e);
                None
            }
        }
    }

    async fn attempt(
        &self,
        messages: &[ChatMessage],
        batch: &[Candidate],
    ) -> Result<RankOutcome> {
        let answer = self.client.complete(messages).await?;
        decode_answer(&answer, batch)
    }
}

fn merge(slots: Vec<Option<RankOutcome>>, total: usize, max_results: usize) -> RankOutcome {
    let batch_count = slots.len();
    let failed = slots.iter().filter(|slot| slot.is_none()).count();

    // A lone successful batch keeps the ranker's own explanation.
    if batch_count == 1 {
        if let Some(Some(mut outcome)) = slots.into_iter().next() {
            outcome.results.truncate(max_results);
            return outcome;
        }
        return RankOutcome::empty(format!(
            "Ranking failed for all {} files; the ranker could not be reached or gave no usable answer.",
            total
        ));
    }

    let mut merged: Vec<RankedResult> = slots
        .into_iter()
        .flatten()
        .flat_map(|outcome| outcome.results)
        .collect();
    // Stable sort: equal scores keep batch order.
    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    let found = merged.len();
    merged.truncate(max_results);
    // Per-batch scores all start at the ceiling; rescore by merged position.
    let mut score = SCORE_CEILING;
    for result in merged.iter_mut() {
        result.score = score;
        score -= SCORE_STEP;
    }

    let mut rationale = format!(
        "Searched {} files in {} batches and found {} relevant results.",
        total, batch_count, found
    );
    if failed > 0 {
        rationale.push_str(&format!(
            " {} of {} batches failed after retries and were skipped.",
            failed, batch_count
        ));
    }

    RankOutcome {
        results: merged,
        rationale,
    }
}
