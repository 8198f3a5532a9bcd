//! Error types and handling for sitelens-core operations.
//!
//! This module provides a single error type covering all failures in the
//! visibility-analysis pipeline. Errors are categorized for easier handling
//! and include context about recoverability for retry logic.
//!
//! Note that most malformed *content* (bad JSON-LD blocks, unreadable robots
//! rules, missing metadata) is not an error at all: extraction degrades to an
//! absent fact instead of failing the analysis. The variants here cover the
//! cases that genuinely cannot proceed, such as an unparsable root URL or a
//! network failure on the initial fetch.
//!
//! ## Recovery Hints
//!
//! Errors report whether they might be recoverable through retries:
//!
//! ```rust
//! use sitelens_core::{Error, Result};
//!
//! fn handle_operation(result: Result<()>) {
//!     match result {
//!         Err(e) if e.is_recoverable() => println!("temporary failure, retry later"),
//!         Err(e) => println!("permanent failure in {}: {}", e.category(), e),
//!         Ok(()) => println!("ok"),
//!     }
//! }
//! ```

use thiserror::Error;

/// The main error type for sitelens-core operations.
///
/// All public fallible functions in sitelens-core return `Result<T, Error>`.
/// The type includes automatic conversion from common library errors and
/// keeps the full source chain available through `source()`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers file system operations such as reading a scoring-config file
    /// from disk. The underlying `std::io::Error` is preserved.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Covers HTTP requests made while crawling pages and probing for
    /// robots.txt, sitemaps, and the manifest file. The underlying
    /// `reqwest::Error` is preserved for detailed connection information.
    ///
    /// ## Recoverability
    ///
    /// Connection errors are typically recoverable; TLS and malformed-URL
    /// errors are permanent.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Parsing operation failed.
    ///
    /// Occurs when fetched content cannot be interpreted at all, such as a
    /// sitemap document that is not well-formed XML. Per-block failures
    /// inside a page (one bad JSON-LD script among several) are handled
    /// locally as absent data and never surface here.
    #[error("Parse error: {0}")]
    Parse(String),

    /// URL is malformed or invalid.
    ///
    /// Raised when a caller-supplied URL cannot be parsed. Classification
    /// and crawling both require a structurally valid URL; this is a caller
    /// error and is propagated rather than swallowed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration is invalid.
    ///
    /// Occurs when a scoring or crawl configuration file is malformed or
    /// contains values outside their valid ranges (a zero page budget, a
    /// category weight above its maximum).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    ///
    /// Used when the root page of a crawl answers with HTTP 404. Optional
    /// probe targets (manifest file, sitemap) that are missing are reported
    /// as absent signals, not as this error.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource limit was exceeded.
    ///
    /// Used when a fetched document exceeds the configured size ceiling or
    /// a crawl would exceed the page budget in a way that cannot be
    /// truncated gracefully.
    #[error("Resource limited: {0}")]
    ResourceLimited(String),

    /// Operation timed out.
    ///
    /// Network request timeouts are mapped here so callers can distinguish
    /// them from other connection failures. Typically recoverable.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization or deserialization failed.
    ///
    /// Occurs when converting between data formats (JSON, TOML) fails.
    /// Automatic conversions from `serde_json` and `toml` errors land here.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Returns `true` for errors that are typically temporary and might
    /// succeed on retry after a delay: network timeouts, connection
    /// failures, and interrupted I/O. Parse failures, invalid URLs, and
    /// configuration errors are permanent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sitelens_core::Error;
    ///
    /// assert!(Error::Timeout("request timed out".to_string()).is_recoverable());
    /// assert!(!Error::InvalidUrl("not a url".to_string()).is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout(_) => true,
            Self::Io(e) => {
                matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
                )
            },
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Returns a static string categorizing the error for logging and
    /// error-handling logic:
    ///
    /// - `"io"` - file system operations
    /// - `"network"` - HTTP requests
    /// - `"parse"` - content parsing
    /// - `"invalid_url"` - URL format and validation
    /// - `"config"` - configuration and settings
    /// - `"not_found"` - missing resources
    /// - `"resource_limited"` - size and budget constraints
    /// - `"timeout"` - operation timeouts
    /// - `"serialization"` - data format conversion
    /// - `"other"` - uncategorized
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::ResourceLimited(_) => "resource_limited",
            Self::Timeout(_) => "timeout",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
///
/// Used throughout sitelens-core for consistent error handling.
pub type Result<T> = std::result::Result<T, Error>;
