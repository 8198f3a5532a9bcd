//! sitelens CLI - LLM visibility scoring for commerce sites.
//!
//! Crawls a site, scores how reliably AI assistants can extract product
//! facts and discover the site's structure, and prints the analysis as a
//! text report or JSON. Flags add the generated llms.txt manifest and
//! per-page schema suggestions to the output.

use anyhow::Result;
use clap::Parser;
use sitelens_core::{CrawlConfig, Crawler, ScoringConfig, aggregate, generate_schema_for_page};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod output;

use cli::Cli;
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;
    run(cli).await
}

/// Set up the tracing subscriber and color handling from CLI flags.
///
/// JSON output keeps stdout machine-parseable, so everything below error
/// level is suppressed unless verbose logging was requested explicitly.
fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if matches!(cli.format, OutputFormat::Json) {
        Level::ERROR
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if std::env::var("NO_COLOR").is_ok() || matches!(cli.format, OutputFormat::Json) {
        colored::control::set_override(false);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut crawl = CrawlConfig::default();
    if let Some(max_pages) = cli.max_pages {
        crawl.max_pages = max_pages;
    }
    if let Some(timeout) = cli.timeout {
        crawl.timeout_secs = timeout;
    }

    let crawler = Crawler::with_config(crawl)?;
    let report = crawler.crawl(&cli.url).await?;
    let analysis = aggregate(&report.pages, &report.site, &ScoringConfig::default())?;

    match cli.format {
        OutputFormat::Text => output::print_report(&analysis),
        OutputFormat::Json => output::print_json(&analysis)?,
    }

    if cli.manifest {
        output::print_manifest(&analysis.manifest);
    }

    if let Some(page_url) = cli.schema.as_deref() {
        let Some(page) = analysis.pages.iter().find(|page| page.url == page_url) else {
            anyhow::bail!(
                "page '{page_url}' was not part of the crawl; pass one of the analyzed URLs"
            );
        };
        output::print_schema(&generate_schema_for_page(page))?;
    }

    Ok(())
}
