//! Report rendering for text and JSON output.
//!
//! The text renderer prints a compact terminal report: headline scores,
//! the site breakdown table, factor rows with status glyphs, and the
//! recommendation list sorted by priority. JSON output is the complete
//! serialized analysis, suitable for piping into other tools.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use sitelens_core::aggregate::{FactorStatus, Priority, Recommendation, SiteAnalysis};
use sitelens_core::generate::{Confidence, FieldPresence, ManifestArtifact, SchemaSuggestions};
use sitelens_core::score::{CategoryBreakdown, ScoreLabel};

/// Output format options supported by the CLI.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report with colors (default)
    Text,
    /// Pretty-printed JSON analysis
    Json,
}

/// Print the full analysis as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if the analysis cannot be serialized.
pub fn print_json(analysis: &SiteAnalysis) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(analysis)?);
    Ok(())
}

/// Print the human-readable report on stdout.
pub fn print_report(analysis: &SiteAnalysis) {
    print!("{}", format_report(analysis));
}

fn format_report(analysis: &SiteAnalysis) -> String {
    let mut lines = Vec::new();

    lines.push(format!("{}", "LLM Visibility Report".bold()));
    lines.push(format!(
        "  analyzed {} {} at {}",
        analysis.page_count,
        if analysis.page_count == 1 {
            "page"
        } else {
            "pages"
        },
        analysis.analyzed_at.format("%Y-%m-%d %H:%M UTC"),
    ));
    lines.push(String::new());

    let site = &analysis.site_discoverability;
    let product = &analysis.product_extractability;
    lines.push(format!(
        "  {:<24} {:>3}/100",
        "Overall", analysis.overall_score
    ));
    lines.push(format!(
        "  {:<24} {:>3}/100  {}",
        "Site discoverability",
        site.score,
        paint_label(site.label)
    ));
    let product_note = if product.fallback {
        "(no product pages; first page scored as one)".to_string()
    } else {
        format!(
            "({} product {})",
            product.product_pages,
            if product.product_pages == 1 {
                "page"
            } else {
                "pages"
            }
        )
    };
    lines.push(format!(
        "  {:<24} {:>3}/100  {}  {}",
        "Product extractability",
        product.score,
        paint_label(product.label),
        product_note.dimmed()
    ));
    lines.push(String::new());

    lines.push(format!("{}", "Site breakdown".bold()));
    let b = &site.breakdown;
    for (name, category) in [
        ("llms.txt manifest", &b.manifest),
        ("Crawler access", &b.crawler_access),
        ("Sitemap", &b.sitemap),
        ("Organization", &b.organization),
        ("Categories", &b.categories),
        ("Brand", &b.brand),
        ("HTTPS", &b.transport),
    ] {
        lines.push(breakdown_row(name, category));
    }
    for info in &b.informational {
        lines.push(format!(
            "  {}",
            format!("· {}: {}", info.name, info.note).dimmed()
        ));
    }
    lines.push(String::new());

    if !analysis.factors.is_empty() {
        lines.push(format!("{}", "Factors".bold()));
        for factor in &analysis.factors {
            lines.push(format!(
                "  {} {:<24} {:>3}%",
                status_glyph(factor.status),
                factor.name,
                factor.value
            ));
        }
        lines.push(String::new());
    }

    lines.push(format!("{}", "Recommendations".bold()));
    if analysis.recommendations.is_empty() {
        lines.push(format!("  {}", "none".dimmed()));
    } else {
        for (index, rec) in sorted_recommendations(&analysis.recommendations)
            .iter()
            .enumerate()
        {
            lines.push(format!(
                "  {}. [{}] {}",
                index + 1,
                priority_tag(rec.priority),
                rec.message
            ));
        }
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Print the generated llms.txt verbatim, ready to copy into a file.
pub fn print_manifest(artifact: &ManifestArtifact) {
    println!();
    println!(
        "{} {}",
        "Generated llms.txt".bold(),
        format!("({} confidence)", confidence_text(artifact.confidence)).dimmed()
    );
    println!();
    print!("{}", artifact.content);
    if !artifact.content.ends_with('\n') {
        println!();
    }
    for warning in &artifact.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}

/// Print ready-to-paste JSON-LD snippets with their field ledgers.
///
/// # Errors
///
/// Returns an error if a snippet cannot be serialized.
pub fn print_schema(suggestions: &SchemaSuggestions) -> Result<()> {
    println!();
    println!("{} {}", "Schema suggestions for".bold(), suggestions.url);
    println!(
        "  {}",
        format!("confidence: {}", confidence_text(suggestions.confidence)).dimmed()
    );
    for snippet in &suggestions.snippets {
        println!();
        println!("{}", format!("// {}", snippet.schema_type).dimmed());
        println!("<script type=\"application/ld+json\">");
        println!("{}", serde_json::to_string_pretty(&snippet.json)?);
        println!("</script>");
        for field in &snippet.fields {
            match field.status {
                FieldPresence::Extracted => {
                    println!("  {} {}", "✓".green(), field.field);
                },
                FieldPresence::Missing => match field.suggestion.as_deref() {
                    Some(hint) => println!("  {} {}: {}", "✗".red(), field.field, hint),
                    None => println!("  {} {} (fill in)", "✗".red(), field.field),
                },
            }
        }
    }
    Ok(())
}

fn breakdown_row(name: &str, category: &CategoryBreakdown) -> String {
    format!(
        "  {:<20} {:>3}/{}",
        name, category.total_points, category.max
    )
}

fn paint_label(label: ScoreLabel) -> ColoredString {
    let text = label.to_string();
    match label {
        ScoreLabel::Excellent | ScoreLabel::Good => text.green(),
        ScoreLabel::Fair => text.yellow(),
        ScoreLabel::Poor => text.red(),
        ScoreLabel::NotApplicable => text.dimmed(),
    }
}

fn status_glyph(status: FactorStatus) -> ColoredString {
    match status {
        FactorStatus::Good => "✓".green(),
        FactorStatus::Warning => "⚠".yellow(),
        FactorStatus::Poor => "✗".red(),
    }
}

// Tags are pre-padded so the colored escape codes never skew alignment.
fn priority_tag(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => "high  ".red().bold(),
        Priority::Medium => "medium".yellow(),
        Priority::Low => "low   ".cyan(),
    }
}

const fn confidence_text(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "high",
        Confidence::Medium => "medium",
        Confidence::Low => "low",
    }
}

/// Order recommendations high to low priority, keeping the original
/// order inside each band.
fn sorted_recommendations(recs: &[Recommendation]) -> Vec<&Recommendation> {
    let mut sorted: Vec<&Recommendation> = recs.iter().collect();
    sorted.sort_by_key(|rec| match rec.priority {
        Priority::High => 0u8,
        Priority::Medium => 1,
        Priority::Low => 2,
    });
    sorted
}
