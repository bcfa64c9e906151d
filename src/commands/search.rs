//! Search command implementation

use crate::config::Config;
use crate::error::Result;
use crate::index::load_index;
use crate::models::RankOutcome;
use crate::pipeline::RankingPipeline;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Search options
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Mode name; falls back to `search.default_mode`
    pub mode: Option<String>,
    /// Falls back to `search.max_results`
    pub limit: Option<usize>,
}

/// A single ranked file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub preview: String,
    pub score: f32,
}

/// Search report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub query: String,
    pub mode: String,
    pub searched: usize,
    pub rationale: String,
    pub results: Vec<SearchHit>,
}

/// Rank the indexed files against `query`
pub async fn cmd_search(
    config: &Config,
    query: &str,
    options: SearchOptions,
) -> Result<SearchReport> {
    let mode = options
        .mode
        .unwrap_or_else(|| config.search.default_mode.clone());
    let limit = options.limit.unwrap_or(config.search.max_results);

    let index = load_index(&config.paths.index_file, config.index.preview_chars)?;
    let documents = index.shared_documents();
    info!("Searching {} indexed files for '{}'", documents.len(), query);

    let pipeline = RankingPipeline::from_config(&config.ranking())?;
    let outcome = pipeline.search(query, &documents, &mode, limit).await?;

    Ok(report(query, &mode, documents.len(), outcome))
}

fn report(query: &str, mode: &str, searched: usize, outcome: RankOutcome) -> SearchReport {
    let results = outcome
        .results
        .iter()
        .map(|r| SearchHit {
            id: r.document.id().to_string(),
            name: r.document.name().to_string(),
            preview: r.document.preview().to_string(),
            score: r.score,
        })
        .collect();

    SearchReport {
        query: query.to_string(),
        mode: mode.trim().to_lowercase(),
        searched,
        rationale: outcome.rationale,
        results,
    }
}

/// Print search results to console
pub fn print_search_results(report: &SearchReport) {
    println!("\n🔍 Query: {} ({} mode)\n", report.query, report.mode);
    println!(
        "Found {} results in {} files:\n",
        report.results.len(),
        report.searched
    );

    for (i, hit) in report.results.iter().enumerate() {
        println!("{}. [score: {:.0}] {}", i + 1, hit.score, hit.name);
        println!("   {}", hit.id);
        let preview: String = hit.preview.chars().take(200).collect();
        if !preview.is_empty() {
            println!("   {}\n", preview);
        }
    }

    println!("Reasoning: {}", report.rationale);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{cmd_index, cmd_init};
    use crate::error::Error;
    use crate::index::load_index;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn streamed(content: &str) -> String {
        let event = serde_json::json!({ "choices": [{ "delta": { "content": content } }] });
        format!("data: {}\n\ndata: [DONE]\n\n", event)
    }

    async fn indexed_config(server: &MockServer, tmp: &TempDir) -> Config {
        let mut config = cmd_init(tmp.path().join("scout"), false).unwrap();
        config.ranker.endpoint_url = format!("{}/v1/chat/completions", server.uri());
        config.batch.retry_base_delay_ms = 1;

        let docs = tmp.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("garden.md"), "tomato plants and compost").unwrap();
        std::fs::write(docs.join("taxes.md"), "tax return deadline april").unwrap();
        std::fs::write(docs.join("recipes.md"), "tomato soup recipe").unwrap();
        cmd_index(&config, &docs).unwrap();
        config
    }

    fn id_of(config: &Config, name: &str) -> String {
        load_index(&config.paths.index_file, 400)
            .unwrap()
            .documents
            .iter()
            .find(|d| d.name() == name)
            .map(|d| d.id().to_string())
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_ranks_indexed_files() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();
        let config = indexed_config(&server, &tmp).await;

        let recipes = id_of(&config, "recipes.md");
        let garden = id_of(&config, "garden.md");
        let answer = serde_json::json!({
            "ranked": [recipes.clone(), garden.clone()],
            "reasoning": "both mention tomato"
        })
        .to_string();
        let body = streamed(&format!("```json\n{}\n```", answer));

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let report = cmd_search(&config, "tomato", SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(report.mode, "hybrid");
        assert_eq!(report.searched, 3);
        assert_eq!(report.rationale, "both mention tomato");
        let ids: Vec<&str> = report.results.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec![recipes.as_str(), garden.as_str()]);
        assert_eq!(report.results[0].score, 100.0);
        assert_eq!(report.results[0].preview, "tomato soup recipe");
    }

    #[tokio::test]
    async fn test_search_survives_unavailable_ranker() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();
        let config = indexed_config(&server, &tmp).await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let options = SearchOptions {
            mode: Some("full".to_string()),
            limit: Some(5),
        };
        let report = cmd_search(&config, "april", options).await.unwrap();

        assert!(report.results.is_empty());
        assert!(report.rationale.starts_with("Ranking failed"));
    }

    #[tokio::test]
    async fn test_search_rejects_unknown_mode() {
        let server = MockServer::start().await;
        let tmp = TempDir::new().unwrap();
        let config = indexed_config(&server, &tmp).await;

        let options = SearchOptions {
            mode: Some("semantic".to_string()),
            limit: None,
        };
        let err = cmd_search(&config, "tomato", options).await.unwrap_err();
        assert!(matches!(err, Error::InvalidMode(_)));
    }
}
