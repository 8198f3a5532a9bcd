//! CLI structure and argument parsing.
//!
//! Single-command interface: `sitelens <url>` crawls the site, scores it,
//! and prints a report. Flags select the output format and the optional
//! artifacts (manifest text, schema snippets for one page).
//!
//! ```bash
//! # Text report (default)
//! sitelens shop.example
//!
//! # Machine-readable analysis
//! sitelens shop.example --format json | jq '.overallScore'
//!
//! # Crawl wider with a longer timeout, print the generated llms.txt
//! sitelens shop.example --max-pages 100 --timeout 30 --manifest
//!
//! # Schema suggestions for one analyzed page
//! sitelens shop.example --schema https://shop.example/products/blue-mug
//! ```

use clap::Parser;

use crate::output::OutputFormat;

/// Command-line arguments for the `sitelens` binary.
#[derive(Parser, Clone, Debug)]
#[command(name = "sitelens")]
#[command(version)]
#[command(about = "sitelens - LLM visibility scoring for commerce sites", long_about = None)]
pub struct Cli {
    /// Site root to crawl and analyze; the scheme may be omitted
    #[arg(value_name = "URL")]
    pub url: String,

    /// Output format for the analysis report
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print the generated llms.txt manifest after the report
    #[arg(long)]
    pub manifest: bool,

    /// Print JSON-LD snippet suggestions for one analyzed page
    #[arg(long, value_name = "PAGE_URL")]
    pub schema: Option<String>,

    /// Maximum number of pages fetched, root included (1-1000)
    #[arg(long, value_name = "N")]
    pub max_pages: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
