//! HTTP fetching for crawled pages and discovery probes.
//!
//! One configured client serves the whole crawl: page fetches that must
//! succeed return typed errors (404 as [`Error::NotFound`], slow servers
//! as [`Error::Timeout`], oversized bodies as [`Error::ResourceLimited`]),
//! while probe targets that are merely absent come back as `None` rather
//! than an error.

use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Bodies above this size are rejected rather than parsed.
const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// HTTP client for fetching pages during a site crawl
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    max_body_bytes: usize,
}

/// One successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the fetch was asked for.
    pub requested_url: String,
    /// URL the response actually came from, after redirects.
    pub final_url: String,
    /// HTTP status code of the final response.
    pub status: u16,
    /// Response body as text.
    pub content: String,
    /// `SHA256` hash of the body, used for duplicate detection.
    pub sha256: String,
}

impl Fetcher {
    /// Creates a new fetcher with the default timeout and body limit
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a new fetcher with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::with_limits(timeout, DEFAULT_MAX_BODY_BYTES)
    }

    /// Creates a new fetcher with a custom timeout and body-size ceiling
    pub fn with_limits(timeout: Duration, max_body_bytes: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sitelens/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self {
            client,
            max_body_bytes,
        })
    }

    /// Fetches a page that the crawl depends on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a 404 answer, [`Error::Timeout`]
    /// when the server is slower than the configured timeout,
    /// [`Error::ResourceLimited`] when the body exceeds the size ceiling,
    /// [`Error::Network`] for other 4xx/5xx answers and transport
    /// failures, and [`Error::Other`] for the remaining unsuccessful
    /// statuses, such as an unconditional 304.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        let response = self.client.get(url).send().await.map_err(map_send_error)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("no page at '{url}'")));
        }
        if !status.is_success() {
            return match response.error_for_status() {
                // A 304 or an unfollowed redirect is unsuccessful without
                // being a 4xx/5xx error status
                Ok(_) => Err(Error::Other(format!("unexpected status {status} for '{url}'"))),
                Err(err) => Err(Error::Network(err)),
            };
        }

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(Error::ResourceLimited(format!(
                    "page at '{url}' reports {length} bytes, above the {} byte limit",
                    self.max_body_bytes
                )));
            }
        }

        let final_url = response.url().to_string();
        let content = response.text().await.map_err(map_send_error)?;
        if content.len() > self.max_body_bytes {
            return Err(Error::ResourceLimited(format!(
                "page at '{url}' is {} bytes, above the {} byte limit",
                content.len(),
                self.max_body_bytes
            )));
        }

        let sha256 = calculate_sha256(&content);
        info!("fetched {} bytes from {url}", content.len());

        Ok(FetchedPage {
            requested_url: url.to_string(),
            final_url,
            status: status.as_u16(),
            content,
            sha256,
        })
    }

    /// Fetches an optional probe target such as robots.txt or a sitemap.
    ///
    /// A missing, erroring, or oversized target is an absent signal, never
    /// an error: the result is `None` and the reason lands in the debug
    /// log.
    pub async fn fetch_optional(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(error) => {
                debug!(url, %error, "probe request failed");
                return None;
            },
        };
        if !response.status().is_success() {
            debug!(url, status = %response.status(), "probe target absent");
            return None;
        }
        match response.text().await {
            Ok(content) if content.len() <= self.max_body_bytes => Some(content),
            Ok(content) => {
                debug!(url, bytes = content.len(), "probe target too large");
                None
            },
            Err(error) => {
                debug!(url, %error, "probe body unreadable");
                None
            },
        }
    }
}

fn map_send_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout(format!("request timed out: {error}"))
    } else {
        Error::Network(error)
    }
}

fn calculate_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    STANDARD.encode(result)
}
