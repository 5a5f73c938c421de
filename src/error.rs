use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("http {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("body could not be decoded as any of: {tried}")]
    Decode { tried: String },

    #[error("content start marker not found ({0})")]
    MarkerNotFound(&'static str),

    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no quotes in {0:?}")]
    NoQuotes(PathBuf),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl QuoteError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
