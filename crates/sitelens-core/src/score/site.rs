//! Site-wide discoverability scoring.
//!
//! Works over crawl-level facts rather than any single page: the crawler
//! manifest, robots rules, sitemap size, organization metadata gathered
//! from structured data, and cross-page category/brand consistency. Two
//! informational rows (external mentions, domain authority) are always
//! emitted with `measurable: false` so consumers can see what this score
//! deliberately cannot observe.

use super::{CategoryBreakdown, ScoreEntry, ScoreLabel};
use crate::config::{ScoringConfig, SiteWeights};
use crate::schema::OrganizationSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use texting_robots::Robot;

/// Crawl-level facts the discoverability score is computed from.
#[derive(Debug, Clone, Default)]
pub struct SiteSignals {
    /// Whether the site was reached over HTTPS.
    pub https: bool,
    /// Crawler-manifest file content, if one was discovered.
    pub manifest: Option<String>,
    /// Raw robots.txt content, if one was discovered.
    pub robots_txt: Option<String>,
    /// Whether any sitemap was discovered.
    pub sitemap_found: bool,
    /// URLs counted across discovered sitemaps.
    pub sitemap_url_count: usize,
    /// First organization record seen in structured data.
    pub organization: Option<OrganizationSchema>,
    /// Distinct category names seen across pages.
    pub categories: BTreeSet<String>,
    /// Distinct brand spellings seen across pages.
    pub brands: BTreeSet<String>,
}

/// Result of scoring a site's discoverability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteScore {
    pub score: u32,
    pub label: ScoreLabel,
    pub breakdown: SiteBreakdown,
}

/// Fixed category tree behind a site score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteBreakdown {
    pub manifest: CategoryBreakdown,
    pub crawler_access: CategoryBreakdown,
    pub sitemap: CategoryBreakdown,
    pub organization: CategoryBreakdown,
    pub categories: CategoryBreakdown,
    pub brand: CategoryBreakdown,
    pub transport: CategoryBreakdown,
    pub informational: Vec<InfoEntry>,
}

/// A known blind spot, reported but never scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoEntry {
    pub name: String,
    pub measurable: bool,
    pub note: String,
}

/// Manifest quality tier, judged by how many recognized sections appear.
fn manifest_quality(content: &str) -> (&'static str, usize) {
    let lowered = content.to_lowercase();
    let mut sections = 0;
    if content.lines().any(|l| l.trim_start().starts_with("> ")) {
        sections += 1;
    }
    for header in ["## products", "## categories", "## about", "## key pages"] {
        if lowered.contains(header) {
            sections += 1;
        }
    }
    let quality = if sections >= 4 {
        "complete"
    } else if sections >= 2 {
        "partial"
    } else {
        "minimal"
    };
    (quality, sections)
}

fn manifest_category(signals: &SiteSignals, w: &SiteWeights) -> CategoryBreakdown {
    let entry = match signals.manifest.as_deref() {
        Some(content) => {
            let (quality, _) = manifest_quality(content);
            let points = match quality {
                "complete" => w.manifest_complete,
                "partial" => w.manifest_partial,
                _ => w.manifest_minimal,
            };
            ScoreEntry::new("llmsTxt", points, w.manifest_complete, true).with_note(quality)
        }
        None => ScoreEntry::new("llmsTxt", 0, w.manifest_complete, false).with_note("missing"),
    };
    CategoryBreakdown::new(w.manifest_complete, vec![entry])
}

fn crawler_category(signals: &SiteSignals, w: &SiteWeights) -> CategoryBreakdown {
    let entries = w
        .ai_crawlers
        .iter()
        .map(|bot| {
            // Absent or unparsable robots.txt defaults to allow
            let allowed = signals.robots_txt.as_deref().is_none_or(|txt| {
                Robot::new(bot, txt.as_bytes())
                    .map(|r| r.allowed("/"))
                    .unwrap_or(true)
            });
            let points = if allowed { w.crawler_allowed } else { 0 };
            ScoreEntry::new(bot, points, w.crawler_allowed, allowed)
        })
        .collect();
    CategoryBreakdown::new(w.crawler_access_max(), entries)
}

fn sitemap_category(signals: &SiteSignals, w: &SiteWeights) -> CategoryBreakdown {
    let entry = if signals.sitemap_found {
        let points = if signals.sitemap_url_count > w.sitemap_large_min {
            w.sitemap_large
        } else if signals.sitemap_url_count > w.sitemap_medium_min {
            w.sitemap_medium
        } else {
            w.sitemap_small
        };
        ScoreEntry::new("sitemap", points, w.sitemap_large, true)
            .with_note(format!("{} URLs", signals.sitemap_url_count))
    } else {
        ScoreEntry::new("sitemap", 0, w.sitemap_large, false)
    };
    CategoryBreakdown::new(w.sitemap_large, vec![entry])
}

fn organization_category(signals: &SiteSignals, w: &SiteWeights) -> CategoryBreakdown {
    let org = signals.organization.as_ref();
    let has = |probe: fn(&OrganizationSchema) -> bool| org.is_some_and(probe);

    let name = has(|o| o.name.as_deref().is_some_and(|n| !n.is_empty()));
    let logo = has(|o| o.logo.is_some());
    let profiles = has(|o| !o.same_as.is_empty());
    let description = has(|o| o.description.is_some());

    let entries = vec![
        ScoreEntry::new("name", if name { w.org_name } else { 0 }, w.org_name, name),
        ScoreEntry::new("logo", if logo { w.org_logo } else { 0 }, w.org_logo, logo),
        ScoreEntry::new(
            "externalProfiles",
            if profiles { w.org_profiles } else { 0 },
            w.org_profiles,
            profiles,
        ),
        ScoreEntry::new(
            "description",
            if description { w.org_description } else { 0 },
            w.org_description,
            description,
        ),
    ];
    CategoryBreakdown::new(w.organization_max(), entries)
}

fn categories_category(signals: &SiteSignals, w: &SiteWeights) -> CategoryBreakdown {
    #[allow(clippy::cast_possible_truncation)]
    let distinct = signals.categories.len() as u32;
    let points = (distinct * w.category_each).min(w.category_max);
    let entry = ScoreEntry::new("presence", points, w.category_max, distinct > 0)
        .with_note(format!("{distinct} distinct categories"));
    CategoryBreakdown::new(w.category_max, vec![entry])
}

fn brand_category(signals: &SiteSignals, w: &SiteWeights) -> CategoryBreakdown {
    let variants = signals.brands.len();
    let points = match variants {
        1 => w.brand_single,
        2 | 3 => w.brand_few,
        _ => 0,
    };
    let names: Vec<&str> = signals.brands.iter().map(String::as_str).collect();
    let entry = ScoreEntry::new("consistency", points, w.brand_single, variants > 0)
        .with_note(format!("{} variant(s): {}", variants, names.join(", ")));
    CategoryBreakdown::new(w.brand_single, vec![entry])
}

fn transport_category(signals: &SiteSignals, w: &SiteWeights) -> CategoryBreakdown {
    let points = if signals.https { w.https } else { 0 };
    let entry = ScoreEntry::new("https", points, w.https, signals.https);
    CategoryBreakdown::new(w.https, vec![entry])
}

fn informational_rows() -> Vec<InfoEntry> {
    vec![
        InfoEntry {
            name: "externalMentions".to_string(),
            measurable: false,
            note: "mentions on third-party sites cannot be observed from a crawl".to_string(),
        },
        InfoEntry {
            name: "domainAuthority".to_string(),
            measurable: false,
            note: "authority metrics require external data sources".to_string(),
        },
    ]
}

/// Score site-wide discoverability from crawl-level facts.
#[must_use]
pub fn score_site(signals: &SiteSignals, config: &ScoringConfig) -> SiteScore {
    let w = &config.site;
    let breakdown = SiteBreakdown {
        manifest: manifest_category(signals, w),
        crawler_access: crawler_category(signals, w),
        sitemap: sitemap_category(signals, w),
        organization: organization_category(signals, w),
        categories: categories_category(signals, w),
        brand: brand_category(signals, w),
        transport: transport_category(signals, w),
        informational: informational_rows(),
    };

    let total = breakdown.manifest.total_points
        + breakdown.crawler_access.total_points
        + breakdown.sitemap.total_points
        + breakdown.organization.total_points
        + breakdown.categories.total_points
        + breakdown.brand.total_points
        + breakdown.transport.total_points;
    let score = total.min(100);

    SiteScore {
        score,
        label: ScoreLabel::for_score(score, &config.labels),
        breakdown,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn bare_site_defaults_to_crawler_allow() {
        let signals = SiteSignals::default();
        let result = score_site(&signals, &config());
        assert_eq!(result.breakdown.crawler_access.total_points, 15);
        assert_eq!(result.breakdown.manifest.total_points, 0);
        assert_eq!(
            result.breakdown.manifest.entries[0].note.as_deref(),
            Some("missing")
        );
        assert_eq!(result.score, 15);
    }

    #[test]
    fn named_bot_disallow_blocks_only_that_bot() {
        let signals = SiteSignals {
            robots_txt: Some("User-agent: GPTBot\nDisallow: /\n".to_string()),
            ..SiteSignals::default()
        };
        let result = score_site(&signals, &config());
        let entries = &result.breakdown.crawler_access.entries;
        assert_eq!(entries[0].name, "GPTBot");
        assert!(!entries[0].found);
        assert!(entries[1].found);
        assert!(entries[2].found);
        assert_eq!(result.breakdown.crawler_access.total_points, 10);
    }

    #[test]
    fn wildcard_disallow_blocks_all_bots() {
        let signals = SiteSignals {
            robots_txt: Some("User-agent: *\nDisallow: /\n".to_string()),
            ..SiteSignals::default()
        };
        let result = score_site(&signals, &config());
        assert_eq!(result.breakdown.crawler_access.total_points, 0);
    }

    #[test]
    fn named_bot_exemption_survives_wildcard_disallow() {
        let robots = "User-agent: *\nDisallow: /\n\nUser-agent: ClaudeBot\nDisallow:\n";
        let signals = SiteSignals {
            robots_txt: Some(robots.to_string()),
            ..SiteSignals::default()
        };
        let result = score_site(&signals, &config());
        let entries = &result.breakdown.crawler_access.entries;
        assert!(!entries[0].found, "GPTBot should be blocked");
        assert!(entries[1].found, "ClaudeBot has its own allow-all block");
        assert_eq!(result.breakdown.crawler_access.total_points, 5);
    }

    #[test]
    fn manifest_quality_tiers() {
        let complete = "# Shop\n\n> The best mugs.\n\n## Products\n\n## Categories\n\n## About\n\n## Key Pages\n";
        let partial = "# Shop\n\n> The best mugs.\n\n## Products\n";
        let minimal = "hello crawler\n";

        let score_for = |content: &str| {
            let signals = SiteSignals {
                manifest: Some(content.to_string()),
                ..SiteSignals::default()
            };
            let result = score_site(&signals, &config());
            let entry = result.breakdown.manifest.entries[0].clone();
            (entry.points, entry.note.unwrap())
        };

        assert_eq!(score_for(complete), (20, "complete".to_string()));
        assert_eq!(score_for(partial), (12, "partial".to_string()));
        assert_eq!(score_for(minimal), (5, "minimal".to_string()));
    }

    #[test]
    fn sitemap_tiers_by_url_count() {
        let score_for = |found: bool, count: usize| {
            let signals = SiteSignals {
                sitemap_found: found,
                sitemap_url_count: count,
                ..SiteSignals::default()
            };
            score_site(&signals, &config()).breakdown.sitemap.total_points
        };
        assert_eq!(score_for(true, 150), 15);
        assert_eq!(score_for(true, 101), 15);
        assert_eq!(score_for(true, 100), 10);
        assert_eq!(score_for(true, 21), 10);
        assert_eq!(score_for(true, 20), 5);
        assert_eq!(score_for(true, 0), 5);
        assert_eq!(score_for(false, 500), 0);
    }

    #[test]
    fn organization_awards_are_per_field() {
        let signals = SiteSignals {
            organization: Some(OrganizationSchema {
                name: Some("Acme".to_string()),
                logo: Some("https://acme.example/logo.png".to_string()),
                description: None,
                same_as: Vec::new(),
            }),
            ..SiteSignals::default()
        };
        let result = score_site(&signals, &config());
        assert_eq!(result.breakdown.organization.total_points, 9);
    }

    #[test]
    fn missing_organization_scores_zero() {
        let result = score_site(&SiteSignals::default(), &config());
        assert_eq!(result.breakdown.organization.total_points, 0);
        assert!(result.breakdown.organization.entries.iter().all(|e| !e.found));
    }

    #[test]
    fn categories_are_capped() {
        let categories: BTreeSet<String> =
            (0..7).map(|i| format!("category-{i}")).collect();
        let signals = SiteSignals {
            categories,
            ..SiteSignals::default()
        };
        let result = score_site(&signals, &config());
        assert_eq!(result.breakdown.categories.total_points, 10);
    }

    #[test]
    fn brand_consistency_tiers() {
        let score_for = |names: &[&str]| {
            let signals = SiteSignals {
                brands: names.iter().map(|s| (*s).to_string()).collect(),
                ..SiteSignals::default()
            };
            score_site(&signals, &config()).breakdown.brand.total_points
        };
        assert_eq!(score_for(&["Acme"]), 10);
        assert_eq!(score_for(&["Acme", "ACME Inc"]), 5);
        assert_eq!(score_for(&["Acme", "ACME", "acme.", "Acme Co"]), 0);
        assert_eq!(score_for(&[]), 0);
    }

    #[test]
    fn https_earns_transport_points() {
        let signals = SiteSignals {
            https: true,
            ..SiteSignals::default()
        };
        assert_eq!(
            score_site(&signals, &config()).breakdown.transport.total_points,
            10
        );
        assert_eq!(
            score_site(&SiteSignals::default(), &config())
                .breakdown
                .transport
                .total_points,
            0
        );
    }

    #[test]
    fn informational_rows_never_add_points() {
        let mut signals = SiteSignals {
            https: true,
            manifest: Some("# S\n\n> t\n\n## Products\n\n## Categories\n\n## About\n\n## Key Pages\n".to_string()),
            sitemap_found: true,
            sitemap_url_count: 500,
            organization: Some(OrganizationSchema {
                name: Some("Acme".to_string()),
                logo: Some("logo.png".to_string()),
                description: Some("We make things.".to_string()),
                same_as: vec!["https://social.example/acme".to_string()],
            }),
            ..SiteSignals::default()
        };
        signals.brands.insert("Acme".to_string());
        for i in 0..5 {
            signals.categories.insert(format!("c{i}"));
        }
        let result = score_site(&signals, &config());
        assert_eq!(result.breakdown.informational.len(), 2);
        assert!(result.breakdown.informational.iter().all(|e| !e.measurable));
        // 20 + 15 + 15 + 15 + 10 + 10 + 10
        assert_eq!(result.score, 95);
        assert_eq!(result.label, ScoreLabel::Excellent);
    }

    proptest! {
        #[test]
        fn site_score_stays_in_bounds(
            https in proptest::bool::ANY,
            manifest in proptest::option::of("[#> a-z\n]{0,80}"),
            robots in proptest::option::of("[A-Za-z:/ *\n-]{0,80}"),
            sitemap_found in proptest::bool::ANY,
            url_count in 0usize..500,
            categories in 0usize..12,
            brands in 0usize..6,
        ) {
            let mut signals = SiteSignals {
                https,
                manifest,
                robots_txt: robots,
                sitemap_found,
                sitemap_url_count: url_count,
                ..SiteSignals::default()
            };
            for i in 0..categories {
                signals.categories.insert(format!("c{i}"));
            }
            for i in 0..brands {
                signals.brands.insert(format!("b{i}"));
            }

            let result = score_site(&signals, &config());

            prop_assert!(result.score <= 100);
            let b = &result.breakdown;
            for category in [
                &b.manifest,
                &b.crawler_access,
                &b.sitemap,
                &b.organization,
                &b.categories,
                &b.brand,
                &b.transport,
            ] {
                prop_assert!(category.total_points <= category.max);
            }
        }
    }
}
