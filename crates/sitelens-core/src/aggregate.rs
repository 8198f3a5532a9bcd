//! Whole-site aggregation.
//!
//! Runs the per-page pipeline (classify, extract, score) over every crawled
//! page, scores the site's discoverability once, and folds everything into
//! a single [`SiteAnalysis`]: the two headline scores, a blended legacy
//! score, factor rows, recommendations, and the generated manifest.
//!
//! Zero pages is not an error: the aggregate degrades to zeroed headline
//! scores so callers always get a well-formed analysis back.

use crate::classify::{self, SchemaHints};
use crate::config::ScoringConfig;
use crate::error::Result;
use crate::extract::{self, identifiers::extract_identifiers};
use crate::generate::{self, ManifestArtifact};
use crate::schema::{self, DecodedSchemas};
use crate::score::{
    score_page, score_site, CategoryBreakdown, PageScore, ScoreLabel, SiteBreakdown, SiteScore,
    SiteSignals,
};
use crate::types::{ExtractedFacts, Identifiers, PageSignals, PageType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything known about one analyzed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    pub url: String,
    pub page_type: PageType,
    #[serde(flatten)]
    pub score: PageScore,
    pub content_extraction: ExtractedFacts,
    pub identifiers: Identifiers,
    #[serde(flatten)]
    pub digest: PageDigest,
}

/// Compact per-page markup summary kept alongside the score.
///
/// Carries just enough of the raw signals for downstream artifact
/// generation without hauling body text around.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDigest {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub first_h1: Option<String>,
    pub has_structured_data: bool,
    pub has_product_schema: bool,
}

impl PageDigest {
    #[must_use]
    pub fn from_signals(signals: &PageSignals) -> Self {
        Self {
            title: signals.title.clone(),
            meta_description: signals.meta_description.clone(),
            first_h1: signals.h1_texts.first().cloned(),
            has_structured_data: !signals.schema_objects.is_empty(),
            has_product_schema: schema::has_type(&signals.schema_objects, "Product"),
        }
    }
}

/// Headline product-extractability metric.
///
/// The mean page score over product pages; when the crawl found no product
/// pages the first page is scored as if it were one, so the metric is
/// always defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductExtractability {
    pub score: u32,
    pub label: ScoreLabel,
    pub product_pages: usize,
    pub fallback: bool,
}

/// One site-wide factor row with its threshold-band status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factor {
    pub name: String,
    /// Percentage in `0..=100`.
    pub value: u32,
    pub status: FactorStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorStatus {
    Good,
    Warning,
    Poor,
}

impl FactorStatus {
    const fn for_percent(value: u32) -> Self {
        if value >= 80 {
            Self::Good
        } else if value >= 50 {
            Self::Warning
        } else {
            Self::Poor
        }
    }
}

/// One actionable recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Aggregate root returned for a whole crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAnalysis {
    pub analyzed_at: DateTime<Utc>,
    pub page_count: usize,
    pub site_discoverability: SiteScore,
    pub product_extractability: ProductExtractability,
    /// Blended legacy score: `round((site + product) / 2)`.
    pub overall_score: u32,
    pub factors: Vec<Factor>,
    pub recommendations: Vec<Recommendation>,
    pub manifest: ManifestArtifact,
    pub pages: Vec<PageAnalysis>,
}

/// Cross-page tallies used for factor rows and recommendations.
#[derive(Debug, Default)]
struct PageTally {
    total: usize,
    with_schema: usize,
    product_pages: usize,
    product_pages_with_product_schema: usize,
    product_pages_with_review_schema: usize,
    adequate_meta: usize,
    single_h1: usize,
    with_faq: usize,
    complete_og: usize,
    images_total: u32,
    images_with_alt: u32,
}

impl PageTally {
    fn observe(&mut self, signals: &PageSignals, page_type: PageType, config: &ScoringConfig) {
        let decoded = DecodedSchemas::from_objects(&signals.schema_objects);
        self.total += 1;
        if !signals.schema_objects.is_empty() {
            self.with_schema += 1;
        }
        if page_type == PageType::Product {
            self.product_pages += 1;
            if !decoded.products.is_empty() {
                self.product_pages_with_product_schema += 1;
            }
            if decoded.best_rating().is_some() || !decoded.reviews.is_empty() {
                self.product_pages_with_review_schema += 1;
            }
        }
        let meta_len = signals
            .meta_description
            .as_ref()
            .map_or(0, |m| m.chars().count());
        if meta_len >= config.page.description_short_min {
            self.adequate_meta += 1;
        }
        if signals.headings.h1 == 1 {
            self.single_h1 += 1;
        }
        if decoded.has_faq() {
            self.with_faq += 1;
        }
        if signals.open_graph.contains_key("og:title")
            && signals.open_graph.contains_key("og:description")
        {
            self.complete_og += 1;
        }
        self.images_total += signals.images.total;
        self.images_with_alt += signals.images.with_alt;
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn percent(num: usize, den: usize) -> u32 {
    if den == 0 {
        return 0;
    }
    ((num as f64 / den as f64) * 100.0).round() as u32
}

fn factor(name: &str, value: u32) -> Factor {
    Factor {
        name: name.to_string(),
        value,
        status: FactorStatus::for_percent(value),
    }
}

fn build_factors(tally: &PageTally) -> Vec<Factor> {
    vec![
        factor("schemaCoverage", percent(tally.with_schema, tally.total)),
        factor(
            "productSchemaCoverage",
            percent(tally.product_pages_with_product_schema, tally.product_pages),
        ),
        factor(
            "reviewSchemaCoverage",
            percent(tally.product_pages_with_review_schema, tally.product_pages),
        ),
        factor(
            "metaDescriptionAdequacy",
            percent(tally.adequate_meta, tally.total),
        ),
        factor("headingStructure", percent(tally.single_h1, tally.total)),
        factor("openGraphCoverage", percent(tally.complete_og, tally.total)),
        factor(
            "altTextCoverage",
            percent(tally.images_with_alt as usize, tally.images_total as usize),
        ),
    ]
}

/// Evaluate the fixed recommendation conditions, in order.
///
/// Every condition is checked independently; several may fire and none
/// suppresses another.
fn build_recommendations(tally: &PageTally, site: &SiteSignals) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    let mut push = |priority: Priority, message: String| {
        recs.push(Recommendation { priority, message });
    };

    if site.manifest.is_none() {
        push(
            Priority::High,
            "Publish an llms.txt manifest so AI crawlers can discover the site's structure"
                .to_string(),
        );
    }
    if tally.with_schema < tally.total {
        push(
            Priority::High,
            format!(
                "Add structured data to the {} of {} pages that have none",
                tally.total - tally.with_schema,
                tally.total
            ),
        );
    }
    if tally.product_pages_with_product_schema == 0 {
        push(
            Priority::High,
            "Add Product structured data with offers to product pages".to_string(),
        );
    }
    if site.organization.is_none() {
        push(
            Priority::Medium,
            "Add Organization structured data with name, logo and profile links".to_string(),
        );
    }
    if tally.adequate_meta < tally.total {
        push(
            Priority::High,
            format!(
                "Write meta descriptions of at least 50 characters for {} pages",
                tally.total - tally.adequate_meta
            ),
        );
    }
    if tally.single_h1 < tally.total {
        push(
            Priority::Medium,
            format!(
                "Use exactly one H1 heading on each page ({} pages deviate)",
                tally.total - tally.single_h1
            ),
        );
    }
    if tally.with_faq == 0 {
        push(
            Priority::Medium,
            "Add FAQPage structured data to answer common buyer questions".to_string(),
        );
    }
    if tally.complete_og < tally.total {
        push(
            Priority::Low,
            format!(
                "Complete Open Graph tags (og:title, og:description) on {} pages",
                tally.total - tally.complete_og
            ),
        );
    }
    recs
}

/// Run the full per-page pipeline on one page.
///
/// # Errors
///
/// Returns an error if the page URL cannot be parsed.
pub fn analyze_page(signals: &PageSignals, config: &ScoringConfig) -> Result<PageAnalysis> {
    let hints = SchemaHints::from_objects(&signals.schema_objects);
    let page_type = classify::classify(&signals.url, &hints)?;
    let facts = extract::extract(signals);
    let identifiers = extract_identifiers(&signals.schema_objects, Some(&signals.body_text));
    let score = score_page(signals, page_type, &facts, &identifiers, config);
    Ok(PageAnalysis {
        url: signals.url.clone(),
        page_type,
        score,
        content_extraction: facts,
        identifiers,
        digest: PageDigest::from_signals(signals),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn mean_score(scores: &[u32]) -> u32 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u32 = scores.iter().sum();
    ((f64::from(sum)) / (scores.len() as f64)).round() as u32
}

/// Zeroed analysis returned when there are no pages to work with.
///
/// Empty breakdowns and empty factor and recommendation lists, so callers
/// always receive a well-formed value without any inference from nothing.
fn degraded_default(config: &ScoringConfig) -> SiteAnalysis {
    let w = &config.site;
    let breakdown = SiteBreakdown {
        manifest: CategoryBreakdown::empty(w.manifest_complete),
        crawler_access: CategoryBreakdown::empty(w.crawler_access_max()),
        sitemap: CategoryBreakdown::empty(w.sitemap_large),
        organization: CategoryBreakdown::empty(w.organization_max()),
        categories: CategoryBreakdown::empty(w.category_max),
        brand: CategoryBreakdown::empty(w.brand_single),
        transport: CategoryBreakdown::empty(w.https),
        informational: Vec::new(),
    };
    SiteAnalysis {
        analyzed_at: Utc::now(),
        page_count: 0,
        site_discoverability: SiteScore {
            score: 0,
            label: ScoreLabel::NotApplicable,
            breakdown,
        },
        product_extractability: ProductExtractability {
            score: 0,
            label: ScoreLabel::NotApplicable,
            product_pages: 0,
            fallback: false,
        },
        overall_score: 0,
        factors: Vec::new(),
        recommendations: Vec::new(),
        manifest: ManifestArtifact::default(),
        pages: Vec::new(),
    }
}

/// Aggregate per-page analyses and crawl-level signals into one result.
///
/// An empty page list is not an error: the result degrades to zeroed
/// scores with empty breakdowns, factors and recommendations.
///
/// # Errors
///
/// Returns an error only if a page URL cannot be parsed, which indicates a
/// caller bug rather than a crawl problem.
pub fn aggregate(
    pages: &[PageSignals],
    site: &SiteSignals,
    config: &ScoringConfig,
) -> Result<SiteAnalysis> {
    if pages.is_empty() {
        return Ok(degraded_default(config));
    }

    let mut analyses = Vec::with_capacity(pages.len());
    let mut tally = PageTally::default();
    for signals in pages {
        let analysis = analyze_page(signals, config)?;
        debug!(url = %analysis.url, page_type = %analysis.page_type, score = analysis.score.score, "scored page");
        tally.observe(signals, analysis.page_type, config);
        analyses.push(analysis);
    }

    let product_scores: Vec<u32> = analyses
        .iter()
        .filter(|a| a.page_type == PageType::Product)
        .map(|a| a.score.score)
        .collect();
    let product_extractability = if product_scores.is_empty() {
        // No product pages: score the first page as if it were one so the
        // headline metric is still defined
        let first = &pages[0];
        let facts = extract::extract(first);
        let ids = extract_identifiers(&first.schema_objects, Some(&first.body_text));
        let score = score_page(first, PageType::Product, &facts, &ids, config).score;
        ProductExtractability {
            score,
            label: ScoreLabel::for_score(score, &config.labels),
            product_pages: 0,
            fallback: true,
        }
    } else {
        let score = mean_score(&product_scores);
        ProductExtractability {
            score,
            label: ScoreLabel::for_score(score, &config.labels),
            product_pages: product_scores.len(),
            fallback: false,
        }
    };

    let site_discoverability = score_site(site, config);
    let overall_score = (site_discoverability.score + product_extractability.score).div_ceil(2);

    let mut analysis = SiteAnalysis {
        analyzed_at: Utc::now(),
        page_count: analyses.len(),
        site_discoverability,
        product_extractability,
        overall_score,
        factors: build_factors(&tally),
        recommendations: build_recommendations(&tally, site),
        manifest: ManifestArtifact::default(),
        pages: analyses,
    };
    analysis.manifest = generate::generate_manifest(&analysis);
    Ok(analysis)
}
