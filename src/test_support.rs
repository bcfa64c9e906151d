//! Scripted ranker client for orchestrator and pipeline tests

use crate::error::Result;
use crate::models::Document;
use crate::rerank::{ChatMessage, RankerClient};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type Script = dyn Fn(&[String]) -> Result<String> + Send + Sync;

/// Answers each request by running a script over the candidate IDs in the prompt
pub struct ScriptedRanker {
    script: Box<Script>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedRanker {
    pub fn new(script: impl Fn(&[String]) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Ranks every candidate in prompt order
    pub fn echo() -> Self {
        Self::new(|ids| Ok(answer(ids, "echo")))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RankerClient for ScriptedRanker {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let ids = prompt_ids(messages);
        let result = (self.script)(&ids);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Candidate IDs listed in the user prompt, in order
pub fn prompt_ids(messages: &[ChatMessage]) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.role == "user")
        .flat_map(|m| m.content.lines())
        .filter_map(|line| line.strip_prefix("ID: "))
        .map(str::to_string)
        .collect()
}

/// A fenced JSON answer ranking `ids` in the given order
pub fn answer<S: AsRef<str>>(ids: &[S], reasoning: &str) -> String {
    let ranked: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
    format!(
        "```json\n{}\n```",
        serde_json::json!({ "ranked": ranked, "reasoning": reasoning })
    )
}

/// `count` documents named doc-000, doc-001, ...
pub fn corpus(count: usize) -> Vec<Arc<Document>> {
    (0..count)
        .map(|i| {
            let id = format!("/corpus/doc-{:03}.txt", i);
            let name = format!("doc-{:03}.txt", i);
            Arc::new(Document::new(id, name, format!("document number {}", i), 400))
        })
        .collect()
}
