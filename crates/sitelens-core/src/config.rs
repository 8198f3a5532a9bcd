//! Configuration for the scoring and crawling pipeline.
//!
//! All point weights used by the page scorer and the site discoverability
//! scorer live in one versioned [`ScoringConfig`] passed into the scorers by
//! reference. There are no module-level weight tables anywhere else, so the
//! two scoring layers can never drift apart. Crawl behavior (page budget,
//! timeouts, size ceilings) is configured separately through [`CrawlConfig`].
//!
//! Configuration is stored in TOML format.
//!
//! ## Examples
//!
//! ```rust
//! use sitelens_core::ScoringConfig;
//!
//! let config = ScoringConfig::default();
//! assert_eq!(config.version, "2");
//! assert_eq!(config.page.identity_max(), 20);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Versioned weight table for both scoring layers.
///
/// The default table is the authoritative model. Earlier revisions of the
/// scorer carried a second, slightly different table for the flat blended
/// score; that score is now derived from the two headline scores instead, so
/// exactly one table exists.
///
/// ## Example Configuration File
///
/// ```toml
/// version = "2"
///
/// [page]
/// name_schema = 10
/// name_h1 = 8
/// price_schema = 12
/// # ... remaining page weights
///
/// [site]
/// manifest_complete = 20
/// https = 10
/// ai_crawlers = ["GPTBot", "ClaudeBot", "PerplexityBot"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Scoring model revision recorded in every emitted breakdown.
    pub version: String,
    /// Weights for the per-page extractability score.
    pub page: PageWeights,
    /// Weights for the site discoverability score.
    pub site: SiteWeights,
    /// Score label boundaries.
    pub labels: LabelThresholds,
}

/// Point weights for the per-page score, grouped by breakdown category.
///
/// Category maxima are not stored; they are derived from the weights (see
/// [`PageWeights::identity_max`] and friends) so a leaf can never exceed its
/// category ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWeights {
    /// Product name sourced from structured data.
    pub name_schema: u32,
    /// Product name sourced from the first H1.
    pub name_h1: u32,
    /// Product name sourced from any other text signal.
    pub name_text: u32,
    /// Meta description of at least [`PageWeights::description_long_min`] characters.
    pub description_long: u32,
    /// Meta description of at least [`PageWeights::description_short_min`] characters.
    pub description_short: u32,
    /// Minimum length for the full description award.
    pub description_long_min: usize,
    /// Minimum length for the partial description award.
    pub description_short_min: usize,
    /// Category recovered from a structured breadcrumb trail.
    pub category_schema: u32,
    /// Category recovered from text or the URL path.
    pub category_text: u32,
    /// Price sourced from an offer object in structured data.
    pub price_schema: u32,
    /// Price recovered from visible text.
    pub price_text: u32,
    /// Currency sourced from structured data.
    pub currency_schema: u32,
    /// Currency inferred from a text price match.
    pub currency_text: u32,
    /// Availability sourced from an offer object.
    pub availability_schema: u32,
    /// Availability recovered from text patterns.
    pub availability_text: u32,
    /// Purchase call-to-action detected with no explicit availability.
    pub availability_cta: u32,
    /// Rating value sourced from structured data.
    pub rating_schema: u32,
    /// Rating value recovered from text patterns.
    pub rating_text: u32,
    /// Review-count tiers, highest minimum first.
    pub review_count_tiers: Vec<CountTier>,
    /// GTIN present (highest identifier tier).
    pub gtin: u32,
    /// MPN present.
    pub mpn: u32,
    /// SKU present (lowest identifier tier).
    pub sku: u32,
    /// Three or more images with high alt-text coverage.
    pub images_rich: u32,
    /// Two or more images with moderate alt-text coverage.
    pub images_good: u32,
    /// At least one image with moderate alt-text coverage.
    pub images_basic: u32,
    /// At least one image regardless of alt text.
    pub images_minimal: u32,
    /// Five or more detected specification rows.
    pub specs_many: u32,
    /// Three or more detected specification rows.
    pub specs_some: u32,
    /// Any detected specification rows.
    pub specs_any: u32,
    /// Product, offer, and rating schema all present.
    pub schema_full: u32,
    /// Product and offer schema present.
    pub schema_offer: u32,
    /// Product schema only.
    pub schema_product: u32,
}

/// One review-count tier: `points` awarded when the count is at least `min_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountTier {
    /// Inclusive lower bound for this tier.
    pub min_count: u32,
    /// Points awarded.
    pub points: u32,
}

/// Point weights for the site discoverability score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteWeights {
    /// Manifest file with at least four recognized sections.
    pub manifest_complete: u32,
    /// Manifest file with at least two recognized sections.
    pub manifest_partial: u32,
    /// Manifest file present but nearly empty.
    pub manifest_minimal: u32,
    /// Points per AI crawler allowed to fetch the site root.
    pub crawler_allowed: u32,
    /// Crawler identities checked against robots rules, in output order.
    pub ai_crawlers: Vec<String>,
    /// Sitemap with more than [`SiteWeights::sitemap_large_min`] URLs.
    pub sitemap_large: u32,
    /// Sitemap with more than [`SiteWeights::sitemap_medium_min`] URLs.
    pub sitemap_medium: u32,
    /// Any discovered sitemap.
    pub sitemap_small: u32,
    /// URL count above which a sitemap earns the full award.
    pub sitemap_large_min: usize,
    /// URL count above which a sitemap earns the middle award.
    pub sitemap_medium_min: usize,
    /// Organization record carries a name.
    pub org_name: u32,
    /// Organization record carries a logo.
    pub org_logo: u32,
    /// Organization record links external profiles.
    pub org_profiles: u32,
    /// Organization record carries a description.
    pub org_description: u32,
    /// Points per distinct category discovered on the site.
    pub category_each: u32,
    /// Ceiling for the category presence award.
    pub category_max: u32,
    /// Exactly one brand spelling across the site.
    pub brand_single: u32,
    /// No more than three brand spellings.
    pub brand_few: u32,
    /// Site served over HTTPS.
    pub https: u32,
}

/// Boundaries for the human-readable score labels.
///
/// A score at or above `excellent` is labelled Excellent, and so on down;
/// anything below `fair` is Poor. The N/A label is reserved for pages the
/// scorer does not apply to and never derives from these thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelThresholds {
    /// Minimum score for the Excellent label.
    pub excellent: u32,
    /// Minimum score for the Good label.
    pub good: u32,
    /// Minimum score for the Fair label.
    pub fair: u32,
}

impl PageWeights {
    /// Maximum points the identity category can award.
    #[must_use]
    pub fn identity_max(&self) -> u32 {
        self.name_schema + self.description_long + self.category_schema
    }

    /// Maximum points the pricing category can award.
    #[must_use]
    pub fn pricing_max(&self) -> u32 {
        self.price_schema + self.currency_schema
    }

    /// Maximum points the availability category can award.
    #[must_use]
    pub const fn availability_max(&self) -> u32 {
        self.availability_schema
    }

    /// Maximum points the reviews category can award.
    #[must_use]
    pub fn reviews_max(&self) -> u32 {
        let count_max = self
            .review_count_tiers
            .iter()
            .map(|t| t.points)
            .max()
            .unwrap_or(0);
        self.rating_schema + count_max
    }

    /// Maximum points the identifiers category can award.
    #[must_use]
    pub const fn identifiers_max(&self) -> u32 {
        self.gtin
    }

    /// Maximum points the images category can award.
    #[must_use]
    pub const fn images_max(&self) -> u32 {
        self.images_rich
    }

    /// Maximum points the specifications category can award.
    #[must_use]
    pub const fn specifications_max(&self) -> u32 {
        self.specs_many
    }

    /// Maximum points the schema bonus can award.
    #[must_use]
    pub const fn schema_bonus_max(&self) -> u32 {
        self.schema_full
    }
}

impl SiteWeights {
    /// Maximum points the crawler-access category can award.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn crawler_access_max(&self) -> u32 {
        self.crawler_allowed * self.ai_crawlers.len() as u32
    }

    /// Maximum points the organization category can award.
    #[must_use]
    pub const fn organization_max(&self) -> u32 {
        self.org_name + self.org_logo + self.org_profiles + self.org_description
    }
}

impl ScoringConfig {
    /// Load a scoring configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or fails [`ScoringConfig::validate`].
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sitelens_core::ScoringConfig;
    /// use std::path::Path;
    ///
    /// let config = ScoringConfig::load(Path::new("scoring.toml"))?;
    /// # Ok::<(), sitelens_core::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read scoring config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse scoring config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize scoring config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write scoring config: {e}")))?;
        Ok(())
    }

    /// Check internal consistency of a loaded table.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if label thresholds are not strictly
    /// descending, no AI crawler identities are configured, or the
    /// review-count tiers are not ordered highest minimum first.
    pub fn validate(&self) -> Result<()> {
        if self.labels.excellent <= self.labels.good || self.labels.good <= self.labels.fair {
            return Err(Error::Config(
                "label thresholds must be strictly descending".into(),
            ));
        }
        if self.site.ai_crawlers.is_empty() {
            return Err(Error::Config(
                "at least one AI crawler identity is required".into(),
            ));
        }
        let tiers = &self.page.review_count_tiers;
        if tiers.is_empty() {
            return Err(Error::Config("review count tiers must not be empty".into()));
        }
        if tiers.windows(2).any(|w| w[0].min_count <= w[1].min_count) {
            return Err(Error::Config(
                "review count tiers must be ordered highest minimum first".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            version: "2".to_string(),
            page: PageWeights {
                name_schema: 10,
                name_h1: 8,
                name_text: 5,
                description_long: 5,
                description_short: 3,
                description_long_min: 120,
                description_short_min: 50,
                category_schema: 5,
                category_text: 3,
                price_schema: 12,
                price_text: 10,
                currency_schema: 3,
                currency_text: 2,
                availability_schema: 10,
                availability_text: 8,
                availability_cta: 5,
                rating_schema: 10,
                rating_text: 8,
                review_count_tiers: vec![
                    CountTier {
                        min_count: 100,
                        points: 10,
                    },
                    CountTier {
                        min_count: 50,
                        points: 8,
                    },
                    CountTier {
                        min_count: 10,
                        points: 6,
                    },
                    CountTier {
                        min_count: 5,
                        points: 4,
                    },
                    CountTier {
                        min_count: 1,
                        points: 2,
                    },
                ],
                gtin: 10,
                mpn: 7,
                sku: 5,
                images_rich: 5,
                images_good: 4,
                images_basic: 3,
                images_minimal: 2,
                specs_many: 10,
                specs_some: 7,
                specs_any: 5,
                schema_full: 10,
                schema_offer: 8,
                schema_product: 5,
            },
            site: SiteWeights {
                manifest_complete: 20,
                manifest_partial: 12,
                manifest_minimal: 5,
                crawler_allowed: 5,
                ai_crawlers: vec![
                    "GPTBot".to_string(),
                    "ClaudeBot".to_string(),
                    "PerplexityBot".to_string(),
                ],
                sitemap_large: 15,
                sitemap_medium: 10,
                sitemap_small: 5,
                sitemap_large_min: 100,
                sitemap_medium_min: 20,
                org_name: 5,
                org_logo: 4,
                org_profiles: 4,
                org_description: 2,
                category_each: 2,
                category_max: 10,
                brand_single: 10,
                brand_few: 5,
                https: 10,
            },
            labels: LabelThresholds {
                excellent: 80,
                good: 60,
                fair: 40,
            },
        }
    }
}

/// Crawl behavior limits.
///
/// The crawler fetches sequentially and stops at `max_pages` regardless of
/// how many links remain, keeping a full analysis bounded well under the
/// thousand-page ceiling a single request is allowed to cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of pages fetched per crawl.
    pub max_pages: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum accepted page body size in bytes. Larger responses are
    /// rejected, which skips the page during a crawl.
    pub max_page_bytes: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            timeout_secs: 15,
            max_page_bytes: 2 * 1024 * 1024,
        }
    }
}

impl CrawlConfig {
    /// Check crawl limits for values the crawler cannot operate with.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any limit is zero or the page budget
    /// exceeds the thousand-page ceiling.
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(Error::Config("max_pages must be at least 1".into()));
        }
        if self.max_pages > 1000 {
            return Err(Error::Config("max_pages must not exceed 1000".into()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".into()));
        }
        if self.max_page_bytes == 0 {
            return Err(Error::Config("max_page_bytes must be at least 1".into()));
        }
        Ok(())
    }
}
