//! HTML to [`PageSignals`] extraction.
//!
//! Pulls everything the pipeline needs out of one fetched document: head
//! metadata, embedded JSON-LD blocks, heading and image tallies, semantic
//! container counts, a bounded run of visible body text, and the page's
//! link graph split into internal and external edges. Extraction never
//! fails; anything unreadable is simply absent from the result.

use crate::types::{HeadingCounts, ImageStats, PageSignals, SemanticCounts};
use chrono::{DateTime, NaiveDate, Utc};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Visible body text is capped at this many bytes.
const BODY_TEXT_CAP: usize = 50_000;

struct Selectors {
    title: Selector,
    meta_description: Selector,
    meta_og: Selector,
    meta_twitter: Selector,
    json_ld: Selector,
    headings: Selector,
    images: Selector,
    tables: Selector,
    table_rows: Selector,
    lists: Selector,
    list_items: Selector,
    articles: Selector,
    links: Selector,
    breadcrumb_items: Selector,
    published: Selector,
    modified: Selector,
    body: Selector,
}

/// Parsed selectors shared by every extraction.
///
/// SAFETY: Every pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    title: Selector::parse("title").unwrap(),
    meta_description: Selector::parse(r#"meta[name="description"]"#).unwrap(),
    meta_og: Selector::parse(r#"meta[property^="og:"]"#).unwrap(),
    meta_twitter: Selector::parse(r#"meta[name^="twitter:"]"#).unwrap(),
    json_ld: Selector::parse(r#"script[type="application/ld+json"]"#).unwrap(),
    headings: Selector::parse("h1, h2, h3, h4, h5, h6").unwrap(),
    images: Selector::parse("img").unwrap(),
    tables: Selector::parse("table").unwrap(),
    table_rows: Selector::parse("tr").unwrap(),
    lists: Selector::parse("ul, ol").unwrap(),
    list_items: Selector::parse("li").unwrap(),
    articles: Selector::parse("article").unwrap(),
    links: Selector::parse("a[href]").unwrap(),
    breadcrumb_items: Selector::parse(
        r#".breadcrumb li, .breadcrumbs li, nav[aria-label="breadcrumb"] li"#,
    )
    .unwrap(),
    published: Selector::parse(r#"meta[property="article:published_time"]"#).unwrap(),
    modified: Selector::parse(r#"meta[property="article:modified_time"]"#).unwrap(),
    body: Selector::parse("body").unwrap(),
});

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Visible text under an element, skipping script-like containers,
/// whitespace-collapsed and capped.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.parent().and_then(ElementRef::wrap).is_some_and(|el| {
            matches!(el.value().name(), "script" | "style" | "noscript" | "template")
        });
        if hidden {
            continue;
        }
        let collapsed = collapse_whitespace(text);
        if collapsed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&collapsed);
        if out.len() >= BODY_TEXT_CAP {
            break;
        }
    }
    if out.len() > BODY_TEXT_CAP {
        let mut cut = BODY_TEXT_CAP;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
    }
    out
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

fn meta_content<'a>(doc: &'a Html, selector: &Selector) -> Option<&'a str> {
    doc.select(selector)
        .find_map(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|c| !c.is_empty())
}

fn is_breadcrumb_separator(text: &str) -> bool {
    matches!(text, ">" | "/" | "|" | "›" | "»")
}

/// Extract every signal the pipeline consumes from one HTML document.
///
/// Never fails: malformed JSON-LD blocks are skipped with a debug log,
/// unresolvable links are dropped, and a page with no recognizable
/// structure yields an empty but valid signal set.
#[must_use]
pub fn extract_signals(url: &str, html: &str) -> PageSignals {
    let doc = Html::parse_document(html);
    let s = &*SELECTORS;
    let mut signals = PageSignals::new(url);
    let base = Url::parse(url).ok();

    signals.title = doc
        .select(&s.title)
        .next()
        .map(element_text)
        .and_then(non_empty);
    signals.meta_description = meta_content(&doc, &s.meta_description).map(str::to_string);

    for el in doc.select(&s.meta_og) {
        if let (Some(property), Some(content)) =
            (el.value().attr("property"), el.value().attr("content"))
        {
            let content = content.trim();
            if !content.is_empty() {
                signals
                    .open_graph
                    .entry(property.to_string())
                    .or_insert_with(|| content.to_string());
            }
        }
    }
    for el in doc.select(&s.meta_twitter) {
        if let (Some(name), Some(content)) = (el.value().attr("name"), el.value().attr("content"))
        {
            let content = content.trim();
            if !content.is_empty() {
                signals
                    .open_graph
                    .entry(name.to_string())
                    .or_insert_with(|| content.to_string());
            }
        }
    }

    for el in doc.select(&s.json_ld) {
        let raw: String = el.text().collect();
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => signals.schema_objects.push(value),
            Err(error) => debug!(url, %error, "skipping malformed JSON-LD block"),
        }
    }

    let mut headings = HeadingCounts::default();
    for el in doc.select(&s.headings) {
        match el.value().name() {
            "h1" => {
                headings.h1 += 1;
                if let Some(text) = non_empty(element_text(el)) {
                    signals.h1_texts.push(text);
                }
            },
            "h2" => headings.h2 += 1,
            "h3" => headings.h3 += 1,
            "h4" => headings.h4 += 1,
            "h5" => headings.h5 += 1,
            _ => headings.h6 += 1,
        }
    }
    signals.headings = headings;

    let mut images = ImageStats::default();
    for el in doc.select(&s.images) {
        images.total += 1;
        if el
            .value()
            .attr("alt")
            .is_some_and(|alt| !alt.trim().is_empty())
        {
            images.with_alt += 1;
        }
    }
    signals.images = images;

    #[allow(clippy::cast_possible_truncation)]
    let count = |selector: &Selector| doc.select(selector).count() as u32;
    signals.semantics = SemanticCounts {
        tables: count(&s.tables),
        table_rows: count(&s.table_rows),
        lists: count(&s.lists),
        list_items: count(&s.list_items),
        articles: count(&s.articles),
    };

    for el in doc.select(&s.breadcrumb_items) {
        if let Some(text) = non_empty(element_text(el)) {
            if !is_breadcrumb_separator(&text) && !signals.breadcrumbs.contains(&text) {
                signals.breadcrumbs.push(text);
            }
        }
    }

    if let Some(base) = &base {
        for el in doc.select(&s.links) {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            let href = href.trim();
            if href.is_empty()
                || href.starts_with('#')
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
                || href.starts_with("javascript:")
            {
                continue;
            }
            let Ok(mut resolved) = base.join(href) else {
                continue;
            };
            if !matches!(resolved.scheme(), "http" | "https") {
                continue;
            }
            resolved.set_fragment(None);
            let same_host = resolved.host_str() == base.host_str();
            let target = resolved.to_string();
            let bucket = if same_host {
                &mut signals.internal_links
            } else {
                &mut signals.external_links
            };
            if !bucket.contains(&target) {
                bucket.push(target);
            }
        }
    }

    signals.published_at = meta_content(&doc, &s.published).and_then(parse_timestamp);
    signals.modified_at = meta_content(&doc, &s.modified).and_then(parse_timestamp);

    if let Some(body) = doc.select(&s.body).next() {
        signals.body_text = visible_text(body);
    }

    signals
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PRODUCT_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>  Ceramic Mug |
    Example Shop  </title>
  <meta name="description" content="A handmade ceramic mug, glazed in midnight blue.">
  <meta property="og:title" content="Ceramic Mug">
  <meta property="og:image" content="https://cdn.example/mug.jpg">
  <meta name="twitter:card" content="summary_large_image">
  <script type="application/ld+json">
    {"@context": "https://schema.org", "@type": "Product", "name": "Ceramic Mug",
     "offers": {"price": 24.0, "priceCurrency": "USD"}}
  </script>
  <script type="application/ld+json">{broken json</script>
  <style>.price { color: red; }</style>
</head>
<body>
  <nav aria-label="breadcrumb"><ol>
    <li><a href="/">Home</a></li>
    <li>&gt;</li>
    <li><a href="/collections/mugs">Mugs</a></li>
    <li>Ceramic Mug</li>
  </ol></nav>
  <h1>Ceramic Mug</h1>
  <h2>Details</h2>
  <h2>Reviews</h2>
  <img src="mug1.jpg" alt="Mug from the front">
  <img src="mug2.jpg" alt="">
  <img src="mug3.jpg" alt="Mug with coffee">
  <table><tr><td>Capacity</td><td>350 ml</td></tr><tr><td>Weight</td><td>280 g</td></tr></table>
  <p>In stock and ready to ship. $24.00.</p>
  <script>var trackingPrice = "$999.99";</script>
  <a href="/collections/mugs">All mugs</a>
  <a href="/products/ceramic-bowl">Bowl</a>
  <a href="https://instagram.com/exampleshop">Instagram</a>
  <a href="mailto:hello@shop.example">Email us</a>
  <a href="#reviews">Jump to reviews</a>
</body>
</html>"##;

    fn product_signals() -> PageSignals {
        extract_signals("https://shop.example/products/ceramic-mug", PRODUCT_PAGE)
    }

    #[test]
    fn head_metadata_is_collected() {
        let signals = product_signals();
        assert_eq!(signals.title.as_deref(), Some("Ceramic Mug | Example Shop"));
        assert_eq!(
            signals.meta_description.as_deref(),
            Some("A handmade ceramic mug, glazed in midnight blue.")
        );
        assert_eq!(
            signals.open_graph.get("og:title").map(String::as_str),
            Some("Ceramic Mug")
        );
        assert_eq!(
            signals.open_graph.get("twitter:card").map(String::as_str),
            Some("summary_large_image")
        );
    }

    #[test]
    fn valid_json_ld_kept_and_malformed_skipped() {
        let signals = product_signals();
        assert_eq!(signals.schema_objects.len(), 1);
        assert_eq!(signals.schema_objects[0]["@type"], "Product");
    }

    #[test]
    fn headings_counted_per_level_with_h1_texts() {
        let signals = product_signals();
        assert_eq!(signals.headings.h1, 1);
        assert_eq!(signals.headings.h2, 2);
        assert_eq!(signals.h1_texts, vec!["Ceramic Mug"]);
    }

    #[test]
    fn images_counted_with_alt_coverage() {
        let signals = product_signals();
        assert_eq!(signals.images.total, 3);
        assert_eq!(signals.images.with_alt, 2);
    }

    #[test]
    fn semantic_containers_are_tallied() {
        let signals = product_signals();
        assert_eq!(signals.semantics.tables, 1);
        assert_eq!(signals.semantics.table_rows, 2);
        assert_eq!(signals.semantics.lists, 1);
        assert_eq!(signals.semantics.list_items, 4);
    }

    #[test]
    fn breadcrumb_trail_drops_separators() {
        let signals = product_signals();
        assert_eq!(signals.breadcrumbs, vec!["Home", "Mugs", "Ceramic Mug"]);
    }

    #[test]
    fn links_resolve_and_partition_by_host() {
        let signals = product_signals();
        assert!(signals
            .internal_links
            .contains(&"https://shop.example/collections/mugs".to_string()));
        assert!(signals
            .internal_links
            .contains(&"https://shop.example/products/ceramic-bowl".to_string()));
        assert_eq!(
            signals.external_links,
            vec!["https://instagram.com/exampleshop".to_string()]
        );
        // Breadcrumb anchors count; mailto and fragment-only links never do
        assert_eq!(signals.internal_links.len(), 3);
        assert!(signals
            .internal_links
            .contains(&"https://shop.example/".to_string()));
    }

    #[test]
    fn script_and_style_text_stays_out_of_body_text() {
        let signals = product_signals();
        assert!(signals.body_text.contains("In stock and ready to ship."));
        assert!(!signals.body_text.contains("999.99"));
        assert!(!signals.body_text.contains("color: red"));
    }

    #[test]
    fn body_text_is_capped() {
        let huge = format!(
            "<html><body><p>{}</p></body></html>",
            "lorem ipsum ".repeat(10_000)
        );
        let signals = extract_signals("https://shop.example/", &huge);
        assert!(signals.body_text.len() <= BODY_TEXT_CAP);
        assert!(signals.body_text.starts_with("lorem ipsum"));
    }

    #[test]
    fn article_timestamps_are_parsed() {
        let html = r#"<html><head>
            <meta property="article:published_time" content="2024-03-05T09:30:00Z">
            <meta property="article:modified_time" content="2024-04-01">
        </head><body></body></html>"#;
        let signals = extract_signals("https://shop.example/blog/post", html);
        let published = signals.published_at.unwrap();
        assert_eq!(published.to_rfc3339(), "2024-03-05T09:30:00+00:00");
        assert!(signals.modified_at.is_some());
    }

    #[test]
    fn empty_document_yields_empty_signals() {
        let signals = extract_signals("https://shop.example/", "");
        assert!(signals.title.is_none());
        assert!(signals.schema_objects.is_empty());
        assert_eq!(signals.images.total, 0);
        assert!(signals.body_text.is_empty());
        assert!(signals.internal_links.is_empty());
    }

    #[test]
    fn duplicate_links_are_recorded_once() {
        let html = r#"<html><body>
            <a href="/products/mug">One</a>
            <a href="/products/mug#top">Two</a>
            <a href="/products/mug">Three</a>
        </body></html>"#;
        let signals = extract_signals("https://shop.example/", html);
        assert_eq!(
            signals.internal_links,
            vec!["https://shop.example/products/mug".to_string()]
        );
    }
}
