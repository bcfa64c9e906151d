//! Local relevance prefilter
//!
//! Scores documents against a query with TF-IDF weighted bag-of-words
//! vectors and cosine similarity. Only the identifier and the head of
//! each body are considered, which keeps the pass cheap on large corpora.

use crate::models::{Candidate, Document};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// Vector-space relevance scorer
#[derive(Debug, Clone)]
pub struct Prefilter {
    body_chars: usize,
}

impl Prefilter {
    /// Create a prefilter that reads the first `body_chars` characters of each body
    pub fn new(body_chars: usize) -> Self {
        Self { body_chars }
    }

    /// Return up to `limit` documents with positive similarity, best first.
    ///
    /// Ties keep corpus order. A degenerate vocabulary (no documents, no query
    /// terms, nothing shared) yields an empty list.
    pub fn select(
        &self,
        query: &str,
        documents: &[Arc<Document>],
        limit: usize,
    ) -> Vec<Candidate> {
        let query_terms = term_counts(query);
        if query_terms.is_empty() || documents.is_empty() || limit == 0 {
            return Vec::new();
        }

        let doc_terms: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|doc| term_counts(&self.scored_text(doc)))
            .collect();

        // The query is part of the fitted collection.
        let total_texts = documents.len() + 1;
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for counts in doc_terms.iter().chain(std::iter::once(&query_terms)) {
            for term in counts.keys() {
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        let idf = |term: &str| -> f32 {
            let df = doc_freq.get(term).copied().unwrap_or(0);
            ((1 + total_texts) as f32 / (1 + df) as f32).ln() + 1.0
        };

        let query_weights: HashMap<&str, f32> = query_terms
            .iter()
            .map(|(term, tf)| (term.as_str(), *tf as f32 * idf(term.as_str())))
            .collect();
        let query_norm = norm(query_weights.values().copied());
        if query_norm == 0.0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = doc_terms
            .iter()
            .enumerate()
            .filter_map(|(index, counts)| {
                let doc_norm =
                    norm(counts.iter().map(|(term, tf)| *tf as f32 * idf(term.as_str())));
                if doc_norm == 0.0 {
                    return None;
                }
                let dot: f32 = query_weights
                    .iter()
                    .filter_map(|(term, q)| {
                        counts.get(*term).map(|tf| q * *tf as f32 * idf(*term))
                    })
                    .sum();
                let similarity = dot / (query_norm * doc_norm);
                (similarity > 0.0).then_some((index, similarity))
            })
            .collect();

        // sort_by is stable, so equal scores stay in corpus order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        debug!(
            "Prefilter kept {} of {} documents for query '{}'",
            scored.len(),
            documents.len(),
            query
        );

        scored
            .into_iter()
            .map(|(index, score)| Candidate::scored(Arc::clone(&documents[index]), score))
            .collect()
    }

    fn scored_text(&self, doc: &Document) -> String {
        let head: String = doc.body().chars().take(self.body_chars).collect();
        format!("{} {}", doc.id(), head)
    }
}

fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for word in text.unicode_words() {
        *counts.entry(word.to_lowercase()).or_insert(0) += 1;
    }
    counts
}

// Squares are summed in sorted order so equal vectors get bit-identical norms.
fn norm(weights: impl Iterator<Item = f32>) -> f32 {
    let mut squares: Vec<f32> = weights.map(|w| w * w).collect();
    squares.sort_by(f32::total_cmp);
    squares.iter().sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, body: &str) -> Arc<Document> {
        Arc::new(Document::new(id, id, body, 400))
    }

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id()).collect()
    }

    #[test]
    fn test_orders_by_similarity() {
        let corpus = vec![
            doc("/notes/cooking.md", "pasta sauce recipe with tomatoes"),
            doc("/notes/rust.md", "rust async runtime tokio rust ownership"),
            doc("/notes/mixed.md", "rust recipe for a garden"),
        ];
        let prefilter = Prefilter::new(1000);

        let selected = prefilter.select("rust tokio", &corpus, 10);
        assert_eq!(ids(&selected), vec!["/notes/rust.md", "/notes/mixed.md"]);
        assert!(selected[0].prefilter_score > selected[1].prefilter_score);
    }

    #[test]
    fn test_drops_zero_similarity_and_respects_limit() {
        let corpus = vec![
            doc("/a.txt", "invoice total amount"),
            doc("/b.txt", "invoice paid"),
            doc("/c.txt", "holiday photos"),
        ];
        let prefilter = Prefilter::new(1000);

        let all = prefilter.select("invoice", &corpus, 10);
        assert_eq!(all.len(), 2);
        assert!(!ids(&all).contains(&"/c.txt"));

        let one = prefilter.select("invoice", &corpus, 1);
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let corpus = vec![
            doc("/z/first.txt", "budget report"),
            doc("/a/second.txt", "budget report"),
        ];
        let prefilter = Prefilter::new(1000);

        let selected = prefilter.select("budget", &corpus, 10);
        assert_eq!(ids(&selected), vec!["/z/first.txt", "/a/second.txt"]);
    }

    #[test]
    fn test_degenerate_inputs_are_empty() {
        let prefilter = Prefilter::new(1000);
        let corpus = vec![doc("/a.txt", "alpha beta")];

        assert!(prefilter.select("alpha", &[], 10).is_empty());
        assert!(prefilter.select("", &corpus, 10).is_empty());
        assert!(prefilter.select("  ?! ", &corpus, 10).is_empty());
        assert!(prefilter.select("gamma", &corpus, 10).is_empty());
    }

    #[test]
    fn test_identifier_is_searchable() {
        let corpus = vec![
            doc("/projects/taxes/summary.csv", "1,2,3"),
            doc("/projects/other.csv", "4,5,6"),
        ];
        let prefilter = Prefilter::new(1000);

        let selected = prefilter.select("taxes", &corpus, 10);
        assert_eq!(ids(&selected), vec!["/projects/taxes/summary.csv"]);
    }

    #[test]
    fn test_only_body_head_is_scored() {
        let mut body = "x ".repeat(600);
        body.push_str("needle");
        let corpus = vec![doc("/long.txt", &body)];

        assert!(Prefilter::new(1000).select("needle", &corpus, 10).is_empty());
        assert_eq!(Prefilter::new(2000).select("needle", &corpus, 10).len(), 1);
    }
}
