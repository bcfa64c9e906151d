use super::{ChatMessage, RankerClient};
use crate::config::RankingConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    stream: bool,
}

/// One `data:` event of the streamed answer
#[derive(Debug, Clone, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    message: Option<Delta>,
}

#[derive(Debug, Clone, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

impl StreamChunk {
    fn text(&self) -> Option<&str> {
        let choice = self.choices.first()?;
        choice
            .delta
            .as_ref()
            .or(choice.message.as_ref())
            .and_then(|d| d.content.as_deref())
    }
}

/// Pull a readable message out of a remote `error` object
fn remote_error_message(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(message) => message.clone(),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

/// Accumulates streamed text from `data:` lines
#[derive(Debug, Default)]
struct StreamAccumulator {
    /// Raw bytes of an unfinished line; may end inside a UTF-8 sequence
    pending: Vec<u8>,
    answer: String,
    events: usize,
    skipped: usize,
    done: bool,
}

impl StreamAccumulator {
    /// Feed raw bytes; complete lines are processed, a partial tail is kept.
    fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(bytes);
        while let Some(idx) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=idx).collect();
            self.line(&String::from_utf8_lossy(&raw))?;
            if self.done {
                break;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let rest = std::mem::take(&mut self.pending);
        let rest = String::from_utf8_lossy(&rest);
        if !self.done && !rest.trim().is_empty() {
            self.line(&rest)?;
        }
        Ok(())
    }

    fn line(&mut self, raw: &str) -> Result<()> {
        let line = raw.trim();
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(());
        };
        let data = data.trim();
        self.events += 1;

        if data == DONE_SENTINEL {
            self.done = true;
            return Ok(());
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => {
                if let Some(error) = &chunk.error {
                    return Err(Error::Remote {
                        message: remote_error_message(error),
                    });
                }
                if let Some(text) = chunk.text() {
                    self.answer.push_str(text);
                }
            }
            Err(e) => {
                self.skipped += 1;
                warn!("Skipping malformed stream fragment: {} | data: {}", e, data);
            }
        }
        Ok(())
    }
}

/// Chat-completions client that streams the ranker's answer
pub struct HttpRankerClient {
    client: Client,
    endpoint: Url,
    max_tokens: u32,
}

impl HttpRankerClient {
    pub fn new(config: &RankingConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint_url)
            .map_err(|e| Error::Config(format!("Invalid ranker endpoint URL: {}", e)))?;
        // The client timeout covers the whole exchange, body streaming included.
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint,
            max_tokens: config.max_tokens,
        })
    }

    /// Some servers ignore `stream: true` and send one completion object
    fn parse_unstreamed(body: &str) -> Result<String> {
        let chunk: StreamChunk = serde_json::from_str(body.trim())
            .map_err(|e| Error::Decode(format!("Unrecognised ranker response: {}", e)))?;
        if let Some(error) = &chunk.error {
            return Err(Error::Remote {
                message: remote_error_message(error),
            });
        }
        Ok(chunk.text().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl RankerClient for HttpRankerClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = CompletionRequest {
            messages,
            max_tokens: self.max_tokens,
            stream: true,
        };

        let mut response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "ranker returned HTTP {}: {}",
                status,
                body.trim()
            )));
        }

        let mut stream = StreamAccumulator::default();
        let mut raw = Vec::new();
        while let Some(bytes) = response.chunk().await? {
            raw.extend_from_slice(&bytes);
            stream.push(&bytes)?;
            if stream.done {
                break;
            }
        }
        stream.finish()?;

        if stream.events == 0 {
            debug!("Ranker response was not streamed, parsing as a single body");
            return Self::parse_unstreamed(&String::from_utf8_lossy(&raw));
        }

        debug!(
            "Collected {} chars from {} stream events ({} skipped)",
            stream.answer.len(),
            stream.events,
            stream.skipped
        );
        Ok(stream.answer)
    }
}
