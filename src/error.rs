//! Custom error types for scout

use thiserror::Error;

/// Main error type for scout operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection refused, timeout, DNS failure or a non-2xx status
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered but reported an error object in its stream
    #[error("Remote ranker error: {message}")]
    Remote { message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid search mode '{0}': expected 'full' or 'hybrid'")]
    InvalidMode(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether a failed batch may be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Remote { .. } | Error::Decode(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Transport(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Error::Transport(format!("connection failed: {}", err))
        } else {
            Error::Transport(err.to_string())
        }
    }
}

/// Result type alias for scout
pub type Result<T> = std::result::Result<T, Error>;
