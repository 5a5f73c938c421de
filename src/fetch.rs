use std::time::Instant;

use reqwest::header;
use tracing::{info, warn};

use crate::error::{QuoteError, Result};
use crate::settings::Settings;
use crate::source::{SourceConfig, TextEncoding};

/// One HTTP client per source run: fixed timeout and browser-like user agent.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(settings: &Settings, source: &SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout_for(source))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| QuoteError::Transport {
                url: source.url.to_string(),
                source: e,
            })?;
        Ok(Fetcher { client })
    }

    /// GET `url` once and decode the body through `encodings`. No retries.
    pub async fn fetch(&self, url: &str, encodings: &[TextEncoding]) -> Result<String> {
        info!("Fetching content from: {}", url);
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Non-success response from {}", url);
            return Err(QuoteError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes().await.map_err(|e| transport(url, e))?;
        let (text, encoding) = decode_body(&bytes, encodings)?;
        info!(
            bytes = bytes.len(),
            encoding = encoding.label(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Content fetched successfully"
        );
        Ok(text)
    }
}

fn transport(url: &str, source: reqwest::Error) -> QuoteError {
    warn!("Error fetching URL {}: {}", url, source);
    QuoteError::Transport {
        url: url.to_string(),
        source,
    }
}

/// Decode with the first encoding in the chain that accepts the bytes.
pub fn decode_body(bytes: &[u8], encodings: &[TextEncoding]) -> Result<(String, TextEncoding)> {
    for (i, encoding) in encodings.iter().enumerate() {
        if let Some(text) = encoding.decode(bytes) {
            return Ok((text.into_owned(), *encoding));
        }
        if let Some(next) = encodings.get(i + 1) {
            warn!("{} decode failed, trying {}", encoding.label(), next.label());
        }
    }
    Err(QuoteError::Decode {
        tried: encodings
            .iter()
            .map(|e| e.label())
            .collect::<Vec<_>>()
            .join(", "),
    })
}
