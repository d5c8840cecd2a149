//! Thin HTTP GET wrapper for the three deck sites.
//!
//! Every request is a single GET with no retries and no caching.
//! A response is accepted only when it is `200 OK` and its `Content-Type`
//! matches the kind of document the caller asked for. Bodies are capped
//! while they are read, with or without a `Content-Length` header.

mod endpoints;

use std::time::Duration;

use kfdeck_shared::{KfDeckError, Result, SourcesConfig};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

pub use endpoints::Endpoints;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Maximum response size we consider valid (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

// ---------------------------------------------------------------------------
// ContentKind
// ---------------------------------------------------------------------------

/// What kind of document a request expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Json,
}

impl ContentKind {
    fn needle(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
        }
    }

    /// `true` if the `Content-Type` header value fits this kind.
    pub fn accepts(self, content_type: &str) -> bool {
        content_type.to_ascii_lowercase().contains(self.needle())
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Shared HTTP client for one batch run.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_body_bytes: u64,
}

impl Fetcher {
    /// Build a client from the `[sources]` config.
    pub fn new(sources: &SourcesConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(sources.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(sources.timeout_secs))
            .build()
            .map_err(|e| KfDeckError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_body_bytes: MAX_RESPONSE_SIZE,
        })
    }

    /// Override the response size cap.
    pub fn with_body_limit(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// GET an HTML page.
    pub async fn get_html(&self, url: &str) -> Result<String> {
        self.get(url, ContentKind::Html).await
    }

    /// GET a JSON document and return it as a generic value.
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let body = self.get(url, ContentKind::Json).await?;
        serde_json::from_str(&body)
            .map_err(|e| KfDeckError::parse(format!("{url}: invalid JSON: {e}")))
    }

    /// GET `url`, enforcing status and content type.
    #[instrument(skip(self))]
    pub async fn get(&self, url: &str, kind: ContentKind) -> Result<String> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| KfDeckError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(KfDeckError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !kind.accepts(&content_type) {
            return Err(KfDeckError::ContentType {
                url: url.to_string(),
                expected: kind.needle(),
                found: content_type,
            });
        }

        let limit = self.max_body_bytes;
        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| KfDeckError::Network(format!("{url}: failed to read body: {e}")))?
        {
            let len = (bytes.len() + chunk.len()) as u64;
            if len > limit {
                return Err(too_large(url, len, limit));
            }
            bytes.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();

        debug!(bytes = body.len(), %content_type, "fetched");
        Ok(body)
    }
}

fn too_large(url: &str, len: u64, limit: u64) -> KfDeckError {
    KfDeckError::validation(format!(
        "{url}: response too large (at least {len} bytes, max {limit})"
    ))
}
