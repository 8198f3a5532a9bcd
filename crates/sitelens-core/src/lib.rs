//! # sitelens-core
//!
//! Core functionality for sitelens - an LLM visibility analyzer for commerce sites.
//!
//! This crate turns crawled HTML into two 0-100 scores: how reliably an AI
//! assistant could extract product facts from each page, and how easily an
//! AI crawler could discover and navigate the site as a whole. The findings
//! fold into factor rows, prioritized recommendations, and publishable
//! artifacts (an llms.txt manifest and JSON-LD snippets).
//!
//! ## Architecture
//!
//! The crate is organized as a pipeline over crawled pages:
//!
//! - **Signals**: per-page HTML parsing into neutral, scoring-free facts
//! - **Classification**: page typing from URL structure and schema hints
//! - **Extraction**: product facts, structured data taking precedence over visible text
//! - **Scoring**: per-page extractability and site-level discoverability breakdowns
//! - **Aggregation**: whole-crawl factor rows, recommendations, and artifacts
//!
//! ## Quick Start
//!
//! ```rust
//! use sitelens_core::{ScoringConfig, SiteSignals, aggregate, extract_signals};
//!
//! let html = r#"<html><head><title>Steel Tumbler | Acme</title></head>
//! <body><h1>Steel Tumbler</h1><p>$24.99 - In stock.</p></body></html>"#;
//!
//! let page = extract_signals("https://shop.example/products/steel-tumbler", html);
//! let analysis = aggregate(&[page], &SiteSignals::default(), &ScoringConfig::default())?;
//!
//! println!("overall score: {}/100", analysis.overall_score);
//! println!("{} recommendations", analysis.recommendations.len());
//! # Ok::<(), sitelens_core::Error>(())
//! ```
//!
//! ## Scoring Model
//!
//! - **Page extractability**: 0-100 across seven weighted categories plus a schema bonus
//! - **Site discoverability**: 0-100 across manifest, crawler access, sitemap, and entity clarity
//! - **Determinism**: identical input always produces identical scores; scoring never touches the network
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`] with structured error information:
//!
//! ```rust
//! use sitelens_core::{Error, SchemaHints, classify};
//!
//! match classify("not a url", &SchemaHints::default()) {
//!     Ok(page_type) => println!("classified as {page_type:?}"),
//!     Err(Error::InvalidUrl(msg)) => eprintln!("unusable URL: {msg}"),
//!     Err(e) if e.is_recoverable() => eprintln!("recoverable error: {e}"),
//!     Err(e) => eprintln!("fatal error: {e}"),
//! }
//! ```

/// Whole-crawl aggregation into factor rows, recommendations, and artifacts
pub mod aggregate;
/// Page-type classification from URL structure and schema hints
pub mod classify;
/// Scoring weights and crawl limits
pub mod config;
/// Same-host breadth-first site crawler
pub mod crawler;
/// Root-level probes for crawler manifests, robots.txt, and sitemaps
pub mod discovery;
/// Error types and result aliases
pub mod error;
/// Product-fact extraction from structured data and visible text
pub mod extract;
/// HTTP fetching with timeout and body-size limits
pub mod fetcher;
/// llms.txt manifest and JSON-LD snippet generation
pub mod generate;
/// JSON-LD structured-data decoding
pub mod schema;
/// Page and site scoring
pub mod score;
/// Single-page HTML signal extraction
pub mod signals;
/// Core data types and structures
pub mod types;

// Re-export commonly used types
pub use aggregate::{PageAnalysis, SiteAnalysis, aggregate, analyze_page};
pub use classify::{SchemaHints, classify};
pub use config::{CrawlConfig, ScoringConfig};
pub use crawler::{CrawlReport, Crawler};
pub use error::{Error, Result};
pub use fetcher::{FetchedPage, Fetcher};
pub use generate::{
    Confidence, ManifestArtifact, SchemaSuggestions, generate_manifest, generate_schema_for_page,
};
pub use schema::DecodedSchemas;
pub use score::{PageScore, ScoreLabel, SiteScore, SiteSignals, score_page, score_site};
pub use signals::extract_signals;
pub use types::*;
