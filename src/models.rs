//! Core data types shared by the indexer and the ranking pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Starting synthetic score for the first ranked result.
pub const SCORE_CEILING: f32 = 100.0;

/// Amount the synthetic score drops per position.
pub const SCORE_STEP: f32 = 1.0;

/// An indexed file. Fields are private so a document cannot change once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    name: String,
    #[serde(default)]
    preview: String,
    #[serde(default)]
    body: String,
    /// Lowercase extension with leading dot, empty when unknown
    #[serde(default)]
    extension: String,
    #[serde(default)]
    size_bytes: u64,
    #[serde(default)]
    modified_time: Option<DateTime<Utc>>,
}

impl Document {
    /// Build a document, deriving the preview from the body.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        body: impl Into<String>,
        preview_chars: usize,
    ) -> Self {
        let body = body.into();
        Self {
            id: id.into(),
            name: name.into(),
            preview: derive_preview(&body, preview_chars),
            body,
            extension: String::new(),
            size_bytes: 0,
            modified_time: None,
        }
    }

    /// Attach what the filesystem reported about the source file.
    pub fn with_file_meta(
        mut self,
        extension: impl Into<String>,
        size_bytes: u64,
        modified_time: Option<DateTime<Utc>>,
    ) -> Self {
        self.extension = extension.into();
        self.size_bytes = size_bytes;
        self.modified_time = modified_time;
        self
    }

    /// Rebuild the preview from the body, keeping everything else.
    pub fn refresh_preview(&mut self, preview_chars: usize) {
        self.preview = derive_preview(&self.body, preview_chars);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn modified_time(&self) -> Option<DateTime<Utc>> {
        self.modified_time
    }
}

fn derive_preview(body: &str, preview_chars: usize) -> String {
    let mut preview = single_line(body, preview_chars);
    if body.chars().count() > preview_chars {
        preview.push_str("...");
    }
    preview
}

/// Collapse whitespace to single spaces and keep at most `max_chars` characters.
pub fn single_line(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    head.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A document offered to the remote ranker, with its advisory prefilter score.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub document: Arc<Document>,
    pub prefilter_score: Option<f32>,
}

impl Candidate {
    pub fn new(document: Arc<Document>) -> Self {
        Self {
            document,
            prefilter_score: None,
        }
    }

    pub fn scored(document: Arc<Document>, score: f32) -> Self {
        Self {
            document,
            prefilter_score: Some(score),
        }
    }

    pub fn id(&self) -> &str {
        self.document.id()
    }
}

/// A ranked document with its position-derived score
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub document: Arc<Document>,
    pub score: f32,
}

/// Ordered results plus an explanation meant for humans only
#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    pub results: Vec<RankedResult>,
    pub rationale: String,
}

impl RankOutcome {
    pub fn empty(rationale: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            rationale: rationale.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.document.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_is_single_line_and_bounded() {
        let body = "first line\nsecond   line\n\nthird line with more words";
        let doc = Document::new("/tmp/a.txt", "a.txt", body, 20);

        assert_eq!(doc.preview(), "first line second...");
        assert!(!doc.preview().contains('\n'));
        assert_eq!(doc.body(), body);
    }

    #[test]
    fn test_short_body_has_no_ellipsis() {
        let doc = Document::new("/tmp/b.md", "b.md", "  short note \n", 400);
        assert_eq!(doc.preview(), "short note");
    }

    #[test]
    fn test_refresh_preview_keeps_file_meta() {
        let mut doc = Document::new("/tmp/c.txt", "c.txt", "one\ntwo", 400)
            .with_file_meta(".txt", 7, None);
        doc.refresh_preview(3);

        assert_eq!(doc.preview(), "one...");
        assert_eq!(doc.extension(), ".txt");
        assert_eq!(doc.size_bytes(), 7);
    }

    #[test]
    fn test_single_line_counts_chars_not_bytes() {
        assert_eq!(single_line("héllo wörld", 5), "héllo");
    }

    #[test]
    fn test_outcome_ids() {
        let doc = Arc::new(Document::new("/x", "x", "body", 10));
        let outcome = RankOutcome {
            results: vec![RankedResult {
                document: doc,
                score: SCORE_CEILING,
            }],
            rationale: "because".to_string(),
        };
        assert_eq!(outcome.ids(), vec!["/x"]);
        assert!(!outcome.is_empty());
        assert!(RankOutcome::empty("none").is_empty());
    }
}
