//! llms.txt manifest generation.
//!
//! Produces the plain-text crawler manifest from an existing analysis:
//! `#` title, `>` tagline, and `##` sections for products, categories,
//! about pages, and key pages. Every gap the generator has to paper over
//! (generic tagline, empty section) is recorded as a warning, and the
//! artifact's confidence tier is a pure function of the warning count.

use super::Confidence;
use crate::aggregate::{PageAnalysis, SiteAnalysis};
use crate::types::PageType;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Regex for payment-provider names stripped out of page titles.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static PAYMENT_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:visa|mastercard|american\s+express|amex|paypal|apple\s+pay|google\s+pay|shop\s+pay|klarna|afterpay)\b",
    )
    .unwrap()
});

/// Regex for URL path segments that read as identifiers rather than names.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static IDENTIFIER_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$|[0-9]{4,}|^[0-9a-f]{12,}$").unwrap());

/// Path words that mark utility rather than content pages.
const UTILITY_SEGMENTS: &[&str] = &[
    "cart", "checkout", "basket", "login", "signin", "signup", "register", "account", "search",
    "api", "cdn", "assets", "static", "tag", "tags", "page", "pages",
];

/// Path-shape markers that precede a category or product slug.
const PATH_MARKERS: &[&str] = &[
    "products", "product", "collections", "collection", "categories", "category", "c", "p", "dp",
    "item", "shop", "catalog", "department", "blog", "blogs", "news", "articles", "article",
    "posts", "post",
];

/// Path words that identify company-information pages.
const ABOUT_SEGMENTS: &[&str] = &[
    "about", "about-us", "contact", "contact-us", "faq", "faqs", "shipping", "returns", "story",
    "our-story",
];

const GENERIC_TAGLINE: &str = "An online store.";
const MAX_CATEGORIES: usize = 10;
const MAX_KEY_PAGES: usize = 10;

/// Generated llms.txt document plus everything needed to judge it.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestArtifact {
    pub content: String,
    pub sections: Vec<String>,
    pub warnings: Vec<String>,
    pub confidence: Confidence,
}

/// Strip payment noise and checkmark glyphs from a page title.
///
/// Also drops a `" | Site Name"` style suffix, which storefront themes
/// append to every page.
fn clean_title(raw: &str) -> String {
    let head = raw.split(" | ").next().unwrap_or(raw);
    let stripped = PAYMENT_NOISE_RE.replace_all(head, "");
    let without_glyphs: String = stripped
        .chars()
        .filter(|c| !matches!(c, '✓' | '✔' | '✅'))
        .collect();
    let collapsed = without_glyphs.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = collapsed.trim_matches(|c: char| c == '|' || c == '-' || c == ':' || c.is_whitespace());
    if cleaned.is_empty() {
        raw.trim().to_string()
    } else {
        cleaned.to_string()
    }
}

fn humanize(segment: &str) -> String {
    let spaced = segment.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

fn path_segments(url: &str) -> Vec<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed.path_segments().map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_ascii_lowercase)
                    .collect()
            })
        })
        .unwrap_or_default()
}

fn is_category_candidate(segment: &str) -> bool {
    segment.len() >= 3
        && segment.len() <= 24
        && !segment.contains('.')
        && !UTILITY_SEGMENTS.contains(&segment)
        && !PATH_MARKERS.contains(&segment)
        && !ABOUT_SEGMENTS.contains(&segment)
        && !IDENTIFIER_SEGMENT_RE.is_match(segment)
}

/// Category names derived from URL path segments across the crawl.
fn category_names(pages: &[PageAnalysis]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for page in pages {
        for segment in path_segments(&page.url) {
            if !is_category_candidate(&segment) {
                continue;
            }
            let name = humanize(&segment);
            if !names.contains(&name) {
                names.push(name);
            }
            if names.len() == MAX_CATEGORIES {
                return names;
            }
        }
    }
    names
}

fn is_about_page(page: &PageAnalysis) -> bool {
    path_segments(&page.url)
        .iter()
        .any(|s| ABOUT_SEGMENTS.contains(&s.as_str()))
}

fn is_utility_page(page: &PageAnalysis) -> bool {
    matches!(page.page_type, PageType::Cart | PageType::Search)
        || path_segments(&page.url)
            .iter()
            .any(|s| UTILITY_SEGMENTS.contains(&s.as_str()))
}

fn link_line(page: &PageAnalysis) -> Option<String> {
    let title = page.digest.title.as_deref()?;
    Some(format!("- [{}]({})", clean_title(title), page.url))
}

/// Build the llms.txt manifest from an existing analysis.
///
/// Purely templated construction: all content comes from facts the
/// pipeline already extracted, and nothing new is inferred here.
#[must_use]
pub fn generate_manifest(analysis: &SiteAnalysis) -> ManifestArtifact {
    let mut warnings: Vec<String> = Vec::new();
    let mut sections: Vec<String> = Vec::new();
    let mut content = String::new();

    let title = analysis
        .pages
        .first()
        .and_then(|page| Url::parse(&page.url).ok())
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| {
            warnings.push("site name could not be determined; using a generic title".to_string());
            "Online Store".to_string()
        });
    content.push_str(&format!("# {title}\n\n"));

    let home = analysis
        .pages
        .iter()
        .find(|p| p.page_type == PageType::Homepage)
        .or_else(|| analysis.pages.first());
    let tagline = home
        .and_then(|p| {
            p.digest
                .meta_description
                .clone()
                .or_else(|| p.digest.first_h1.clone())
        })
        .unwrap_or_else(|| {
            warnings
                .push("no meta description or H1 available; using a generic tagline".to_string());
            GENERIC_TAGLINE.to_string()
        });
    content.push_str(&format!("> {tagline}\n"));
    sections.push("tagline".to_string());

    let mut product_lines: Vec<String> = Vec::new();
    for page in &analysis.pages {
        if page.digest.has_product_schema {
            if let Some(line) = link_line(page) {
                if !product_lines.contains(&line) {
                    product_lines.push(line);
                }
            }
        }
    }
    if product_lines.is_empty() {
        warnings.push("no pages with product structured data; products section omitted".to_string());
    } else {
        content.push_str("\n## Products\n\n");
        content.push_str(&product_lines.join("\n"));
        content.push('\n');
        sections.push("products".to_string());
    }

    let categories = category_names(&analysis.pages);
    if categories.is_empty() {
        warnings.push("no category paths recognized; categories section omitted".to_string());
    } else {
        content.push_str("\n## Categories\n\n");
        for name in &categories {
            content.push_str(&format!("- {name}\n"));
        }
        sections.push("categories".to_string());
    }

    let about_lines: Vec<String> = analysis
        .pages
        .iter()
        .filter(|p| is_about_page(p))
        .filter_map(link_line)
        .collect();
    if about_lines.is_empty() {
        warnings.push("no about or contact pages found; about section omitted".to_string());
    } else {
        content.push_str("\n## About\n\n");
        content.push_str(&about_lines.join("\n"));
        content.push('\n');
        sections.push("about".to_string());
    }

    let key_lines: Vec<String> = analysis
        .pages
        .iter()
        .filter(|p| !is_utility_page(p) && p.digest.has_structured_data)
        .filter_map(link_line)
        .take(MAX_KEY_PAGES)
        .collect();
    if key_lines.is_empty() {
        warnings.push("no marked-up pages available for the key pages section".to_string());
    } else {
        content.push_str("\n## Key Pages\n\n");
        content.push_str(&key_lines.join("\n"));
        content.push('\n');
        sections.push("key-pages".to_string());
    }

    let confidence = Confidence::from_issue_count(warnings.len());
    ManifestArtifact {
        content,
        sections,
        warnings,
        confidence,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::config::ScoringConfig;
    use crate::score::{score_site, SiteSignals};
    use crate::types::PageSignals;
    use serde_json::json;

    fn product_page(url: &str, title: &str) -> PageSignals {
        let mut signals = PageSignals::new(url);
        signals.title = Some(title.to_string());
        signals.h1_texts = vec![title.to_string()];
        signals.headings.h1 = 1;
        signals.schema_objects = vec![json!({
            "@type": "Product",
            "name": title,
            "offers": {"price": 24.0, "priceCurrency": "USD"}
        })];
        signals
    }

    fn rich_crawl() -> Vec<PageSignals> {
        let mut home = PageSignals::new("https://shop.example/");
        home.title = Some("Example Shop".to_string());
        home.meta_description =
            Some("Handmade ceramics and kitchen tools, shipped worldwide.".to_string());
        home.schema_objects = vec![json!({"@type": "Organization", "name": "Example Shop"})];

        let mut about = PageSignals::new("https://shop.example/about-us");
        about.title = Some("About Us | Example Shop".to_string());
        about.schema_objects = vec![json!({"@type": "Organization", "name": "Example Shop"})];

        vec![
            home,
            product_page("https://shop.example/products/ceramic-mug", "Ceramic Mug"),
            product_page("https://shop.example/products/serving-bowl", "Serving Bowl"),
            about,
        ]
    }

    fn manifest_for(pages: &[PageSignals]) -> ManifestArtifact {
        let config = ScoringConfig::default();
        aggregate(pages, &SiteSignals::default(), &config)
            .unwrap()
            .manifest
    }

    #[test]
    fn complete_crawl_produces_all_sections() {
        let artifact = manifest_for(&rich_crawl());
        assert_eq!(
            artifact.sections,
            vec!["tagline", "products", "categories", "about", "key-pages"]
        );
        assert!(artifact.warnings.is_empty());
        assert_eq!(artifact.confidence, Confidence::High);
        assert!(artifact.content.starts_with("# shop.example\n"));
        assert!(artifact
            .content
            .contains("> Handmade ceramics and kitchen tools, shipped worldwide."));
        assert!(artifact
            .content
            .contains("- [Ceramic Mug](https://shop.example/products/ceramic-mug)"));
    }

    #[test]
    fn generated_manifest_reads_back_as_complete() {
        let artifact = manifest_for(&rich_crawl());
        let config = ScoringConfig::default();
        let signals = SiteSignals {
            manifest: Some(artifact.content),
            ..SiteSignals::default()
        };
        let result = score_site(&signals, &config);
        assert_eq!(
            result.breakdown.manifest.entries[0].note.as_deref(),
            Some("complete")
        );
    }

    #[test]
    fn bare_crawl_falls_back_with_warnings() {
        let lone = PageSignals::new("https://shop.example/");
        let artifact = manifest_for(&[lone]);
        assert_eq!(artifact.sections, vec!["tagline"]);
        assert!(artifact.content.contains("> An online store."));
        assert!(artifact.warnings.len() > 2);
        assert_eq!(artifact.confidence, Confidence::Low);
    }

    #[test]
    fn payment_noise_is_stripped_from_titles() {
        assert_eq!(
            clean_title("Ceramic Mug ✓ Visa Mastercard PayPal"),
            "Ceramic Mug"
        );
        assert_eq!(clean_title("Ceramic Mug | Example Shop"), "Ceramic Mug");
        // A title that is nothing but noise keeps its raw form
        assert_eq!(clean_title("Apple Pay ✅"), "Apple Pay ✅");
    }

    #[test]
    fn category_names_skip_markers_ids_and_utility_words() {
        let pages = [
            "https://shop.example/collections/kitchen-tools",
            "https://shop.example/products/mug-10021",
            "https://shop.example/cart",
            "https://shop.example/gifts/under-50",
        ];
        let config = ScoringConfig::default();
        let signals: Vec<PageSignals> = pages
            .iter()
            .map(|u| {
                let mut s = PageSignals::new(*u);
                s.title = Some("T".to_string());
                s
            })
            .collect();
        let analysis = aggregate(&signals, &SiteSignals::default(), &config).unwrap();
        let names = category_names(&analysis.pages);
        assert!(names.contains(&"Kitchen tools".to_string()));
        assert!(names.contains(&"Gifts".to_string()));
        assert!(!names.iter().any(|n| n.contains("10021")));
        assert!(!names.contains(&"Cart".to_string()));
    }

    #[test]
    fn key_pages_require_structured_data_and_cap_at_ten() {
        let mut pages = rich_crawl();
        for i in 0..15 {
            pages.push(product_page(
                &format!("https://shop.example/products/item-{i}"),
                &format!("Item {i}"),
            ));
        }
        let artifact = manifest_for(&pages);
        let key_section = artifact
            .content
            .split("## Key Pages")
            .nth(1)
            .unwrap_or_default();
        assert_eq!(key_section.matches("- [").count(), 10);
    }

    #[test]
    fn tagline_falls_back_to_first_h1() {
        let mut home = PageSignals::new("https://shop.example/");
        home.title = Some("Shop".to_string());
        home.h1_texts = vec!["The Mug People".to_string()];
        home.headings.h1 = 1;
        let artifact = manifest_for(&[home]);
        assert!(artifact.content.contains("> The Mug People"));
    }
}
