//! Page-type classification from URL structure and schema hints.
//!
//! Classification runs before full fact extraction, so it only needs the
//! page URL plus cheap boolean flags about which structured-data types are
//! present. The rules are ordered; the first match wins and later rules are
//! never consulted.

use crate::schema;
use crate::types::PageType;
use crate::Result;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Regex for cart, checkout, and basket path segments.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static CART_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|/)(cart|checkout|basket)(/|$)").unwrap());

/// Regex for search path segments.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static SEARCH_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|/)search(/|$)").unwrap());

/// Regex for editorial path segments.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static BLOG_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|/)(blogs?|news|articles?|posts?)(/|$)").unwrap());

/// Regex for product-detail path shapes.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static PRODUCT_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(products?|p|dp|item)/|(^|/)product-").unwrap());

/// Regex for two-segment paths whose tail reads like a SKU slug.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static SKU_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/[a-z0-9][a-z0-9_-]{3,}/[a-z0-9]+(?:-[a-z0-9]+)*-\d+/?$").unwrap()
});

/// Regex for collection and category path shapes.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static COLLECTION_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(collections?|categor(?:y|ies)|c|shop|catalog|department)/").unwrap()
});

/// Cheap structured-data presence flags available before extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaHints {
    /// A product entity is embedded somewhere on the page.
    pub has_product: bool,
    /// An article entity is embedded somewhere on the page.
    pub has_article: bool,
}

impl SchemaHints {
    /// Probe raw structured-data trees for the flags classification needs.
    #[must_use]
    pub fn from_objects(objects: &[serde_json::Value]) -> Self {
        Self {
            has_product: schema::has_type(objects, "Product"),
            has_article: schema::has_type(objects, "Article")
                || schema::has_type(objects, "NewsArticle")
                || schema::has_type(objects, "BlogPosting"),
        }
    }
}

/// Assign a page type from its URL and schema hints.
///
/// First match wins, in this order: homepage, cart, search, blog, product,
/// collection. Anything left is `other`.
///
/// # Errors
///
/// Returns `Error::InvalidUrl` when the URL cannot be parsed. An unusable
/// URL is a caller mistake and is never silently classified.
///
/// # Examples
///
/// ```rust
/// use sitelens_core::{classify, PageType, SchemaHints};
///
/// let page_type = classify("https://shop.example/products/blue-mug", &SchemaHints::default())?;
/// assert_eq!(page_type, PageType::Product);
/// # Ok::<(), sitelens_core::Error>(())
/// ```
pub fn classify(url: &str, hints: &SchemaHints) -> Result<PageType> {
    let parsed = Url::parse(url)?;
    let path = parsed.path().to_ascii_lowercase();

    if path == "/" || path.is_empty() {
        return Ok(PageType::Homepage);
    }
    if CART_SEGMENT_RE.is_match(&path) {
        return Ok(PageType::Cart);
    }
    if SEARCH_SEGMENT_RE.is_match(&path) {
        return Ok(PageType::Search);
    }
    if BLOG_SEGMENT_RE.is_match(&path) || hints.has_article {
        return Ok(PageType::Blog);
    }
    if is_product_url(&parsed, &path) || hints.has_product {
        return Ok(PageType::Product);
    }
    if COLLECTION_PATH_RE.is_match(&path) {
        return Ok(PageType::Collection);
    }
    Ok(PageType::Other)
}

fn is_product_url(parsed: &Url, path: &str) -> bool {
    if PRODUCT_PATH_RE.is_match(path) || SKU_TAIL_RE.is_match(path) {
        return true;
    }
    parsed
        .query_pairs()
        .any(|(key, _)| key.eq_ignore_ascii_case("product"))
}
