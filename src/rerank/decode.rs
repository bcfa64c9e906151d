use crate::error::{Error, Result};
use crate::models::{Candidate, RankOutcome, RankedResult, SCORE_CEILING, SCORE_STEP};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Rationale used when the ranker gives none
pub const DEFAULT_REASONING: &str = "No reasoning provided.";

#[derive(Debug, Deserialize)]
struct RankAnswer {
    #[serde(default)]
    ranked: Vec<Value>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Identifier carried by one `ranked` entry.
///
/// Models sometimes echo whole candidate objects instead of bare IDs; any
/// other shape carries no usable identifier.
fn entry_id(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(id) => Some(id.as_str()),
        Value::Object(map) => map.get("id").and_then(Value::as_str),
        _ => None,
    }
}

/// Remove an optional markdown code fence around the answer
pub fn strip_code_fence(answer: &str) -> &str {
    let mut text = answer.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Turn the ranker's answer into ordered results over `known` candidates.
///
/// Identifiers outside `known` are dropped without error. Repeated identifiers
/// keep their first position.
pub fn decode_answer(answer: &str, known: &[Candidate]) -> Result<RankOutcome> {
    let body = strip_code_fence(answer);
    if body.is_empty() {
        return Err(Error::Decode("ranker returned an empty answer".to_string()));
    }

    let parsed: RankAnswer = serde_json::from_str(body)
        .map_err(|e| Error::Decode(format!("invalid ranking JSON: {}", e)))?;

    let by_id: HashMap<&str, &Candidate> = known.iter().map(|c| (c.id(), c)).collect();
    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(parsed.ranked.len());
    let mut score = SCORE_CEILING;

    for entry in &parsed.ranked {
        let Some(id) = entry_id(entry) else {
            debug!("Dropping unusable entry from ranker answer: {}", entry);
            continue;
        };
        let Some(candidate) = by_id.get(id) else {
            debug!("Dropping unknown identifier from ranker answer: {}", id);
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        results.push(RankedResult {
            document: Arc::clone(&candidate.document),
            score,
        });
        score -= SCORE_STEP;
    }

    Ok(RankOutcome {
        results,
        rationale: parsed
            .reasoning
            .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
    })
}
