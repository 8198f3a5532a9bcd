//! Sitemap parsing and the sitemap probe behind the discoverability score.
//!
//! Supports both standard sitemaps (`<urlset>` with `<url>` entries) and
//! sitemap index files (`<sitemapindex>` pointing at child sitemaps, walked
//! with bounded depth and child count). The probe merges every discovered
//! sitemap into one deduplicated URL count; an unreadable or absent sitemap
//! is logged and skipped, never an analysis failure.
//!
//! ## Quick Start
//!
//! ```
//! use sitelens_core::discovery::sitemap::parse_sitemap;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://shop.example/products/mug</loc>
//!     <lastmod>2024-01-15</lastmod>
//!   </url>
//! </urlset>"#;
//!
//! let entries = parse_sitemap(xml).unwrap();
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].url, "https://shop.example/products/mug");
//! ```

use super::probe::sitemap_directives;
use crate::fetcher::Fetcher;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};
use url::Url;

/// Maximum recursion depth when walking sitemap index files.
const MAX_INDEX_DEPTH: u8 = 2;

/// Maximum number of child sitemaps walked per index.
const MAX_CHILD_SITEMAPS: usize = 50;

/// A single entry from a sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    /// The URL of the page.
    pub url: String,
    /// Last modification date, when the sitemap declares one.
    pub lastmod: Option<DateTime<Utc>>,
}

/// What the sitemap probe learned about a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SitemapProbe {
    /// Whether any sitemap was fetched and parsed.
    pub found: bool,
    /// Distinct URLs counted across every discovered sitemap.
    pub url_count: usize,
}

/// Result of parsing one sitemap document.
enum SitemapContent {
    /// Standard sitemap with URL entries.
    Entries(Vec<SitemapEntry>),
    /// Sitemap index with the locations of child sitemaps.
    Index(Vec<String>),
}

/// Fields tracked while walking `<url>` elements.
#[derive(Clone, Copy)]
enum UrlField {
    Loc,
    Lastmod,
}

/// Parse a standard sitemap XML string into entries.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the XML is malformed or is a sitemap index;
/// indices are walked by [`probe_sitemaps`], which fetches their children.
pub fn parse_sitemap(xml: &str) -> Result<Vec<SitemapEntry>> {
    match parse_sitemap_content(xml)? {
        SitemapContent::Entries(entries) => Ok(entries),
        SitemapContent::Index(_) => Err(Error::Parse(
            "XML is a sitemap index, not a standard sitemap".to_string(),
        )),
    }
}

/// Check whether XML content is a sitemap index rather than a urlset.
#[must_use]
pub fn is_sitemap_index(xml: &str) -> bool {
    xml.contains("<sitemapindex") || xml.contains("sitemapindex>")
}

/// Probe a site for sitemaps and count the URLs they declare.
///
/// Candidates are the `Sitemap:` directives from robots.txt plus the
/// conventional `/sitemap.xml`, deduplicated. Each candidate is fetched
/// and parsed, walking into index files; URLs listed by more than one
/// sitemap are counted once.
pub async fn probe_sitemaps(
    fetcher: &Fetcher,
    root: &Url,
    robots_txt: Option<&str>,
) -> SitemapProbe {
    let mut candidates: Vec<String> = robots_txt.map(sitemap_directives).unwrap_or_default();
    if let Ok(default) = root.join("/sitemap.xml") {
        candidates.push(default.to_string());
    }

    let mut probed = HashSet::new();
    let mut urls = HashSet::new();
    let mut found = false;
    for candidate in candidates {
        if !probed.insert(candidate.clone()) {
            continue;
        }
        if let Some(entries) = fetch_sitemap_tree(fetcher, candidate, 0).await {
            found = true;
            urls.extend(entries.into_iter().map(|entry| entry.url));
        }
    }

    SitemapProbe {
        found,
        url_count: urls.len(),
    }
}

/// Fetch one sitemap and, for an index, its children.
///
/// `Box::pin` keeps the recursive future sized; fetches stay sequential.
/// `None` means this sitemap was absent or unreadable; a failed child
/// inside an index is skipped without discarding its siblings.
fn fetch_sitemap_tree<'a>(
    fetcher: &'a Fetcher,
    url: String,
    depth: u8,
) -> Pin<Box<dyn Future<Output = Option<Vec<SitemapEntry>>> + Send + 'a>> {
    Box::pin(async move {
        if depth > MAX_INDEX_DEPTH {
            warn!(url, "sitemap index nested too deep, skipping");
            return None;
        }

        debug!(url, depth, "fetching sitemap");
        let xml = fetcher.fetch_optional(&url).await?;

        match parse_sitemap_content(&xml) {
            Ok(SitemapContent::Entries(entries)) => Some(entries),
            Ok(SitemapContent::Index(children)) => {
                debug!(url, children = children.len(), "walking sitemap index");
                let mut merged = Vec::new();
                for child in children.into_iter().take(MAX_CHILD_SITEMAPS) {
                    if let Some(entries) = fetch_sitemap_tree(fetcher, child, depth + 1).await {
                        merged.extend(entries);
                    }
                }
                Some(merged)
            },
            Err(error) => {
                warn!(url, %error, "skipping unreadable sitemap");
                None
            },
        }
    })
}

/// Parse sitemap XML, detecting whether it is a urlset or an index.
fn parse_sitemap_content(xml: &str) -> Result<SitemapContent> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    if is_sitemap_index(xml) {
        parse_index(&mut reader)
    } else {
        parse_urlset(&mut reader)
    }
}

/// Parse a standard sitemap with a `<urlset>` root.
///
/// A 200 answer that is not a sitemap at all (a catch-all HTML page, plain
/// text) must not count as one, so a document that never opens `<urlset>`
/// is rejected rather than read as zero entries.
fn parse_urlset(reader: &mut Reader<&[u8]>) -> Result<SitemapContent> {
    let mut entries = Vec::new();
    let mut buf = Vec::new();

    let mut saw_urlset = false;
    let mut in_url = false;
    let mut field: Option<UrlField> = None;
    let mut loc: Option<String> = None;
    let mut lastmod: Option<DateTime<Utc>> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"urlset" => saw_urlset = true,
                b"url" => {
                    in_url = true;
                    loc = None;
                    lastmod = None;
                },
                b"loc" if in_url => field = Some(UrlField::Loc),
                b"lastmod" if in_url => field = Some(UrlField::Lastmod),
                _ => {},
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"url" && in_url {
                    // An entry without <loc> carries no URL and is dropped
                    if let Some(url) = loc.take() {
                        entries.push(SitemapEntry {
                            url,
                            lastmod: lastmod.take(),
                        });
                    }
                    in_url = false;
                }
                field = None;
            },
            Ok(Event::Text(e)) => {
                if let Some(active) = field {
                    let text = e.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                    let text = text.trim();
                    match active {
                        UrlField::Loc => loc = Some(text.to_string()),
                        UrlField::Lastmod => lastmod = parse_lastmod(text),
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(format!("XML parse error: {e}"))),
            _ => {},
        }
        buf.clear();
    }

    if !saw_urlset {
        return Err(Error::Parse("document has no <urlset> root".to_string()));
    }
    Ok(SitemapContent::Entries(entries))
}

/// Parse a sitemap index with a `<sitemapindex>` root into child locations.
fn parse_index(reader: &mut Reader<&[u8]>) -> Result<SitemapContent> {
    let mut children = Vec::new();
    let mut buf = Vec::new();

    let mut saw_index = false;
    let mut in_sitemap = false;
    let mut in_loc = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sitemapindex" => saw_index = true,
                b"sitemap" => in_sitemap = true,
                b"loc" if in_sitemap => in_loc = true,
                _ => {},
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"sitemap" => in_sitemap = false,
                b"loc" => in_loc = false,
                _ => {},
            },
            Ok(Event::Text(e)) => {
                if in_loc {
                    let text = e.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                    let text = text.trim();
                    if !text.is_empty() {
                        children.push(text.to_string());
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(format!("XML parse error: {e}"))),
            _ => {},
        }
        buf.clear();
    }

    if !saw_index {
        return Err(Error::Parse(
            "document has no <sitemapindex> root".to_string(),
        ));
    }
    Ok(SitemapContent::Index(children))
}

/// Parse a lastmod value in any of the W3C datetime shapes sitemaps use:
/// full RFC 3339, date-only, or a naive datetime taken as UTC.
fn parse_lastmod(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    debug!(date_str = %s, "could not parse lastmod date");
    None
}
