//! Brand, category and purchase-affordance recovery.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Regex for label-prefixed brand mentions.
///
/// The label may be "brand:", "manufacturer:", "sold by:" or a bare "by";
/// the captured value must be a capitalized word sequence.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static BRAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\b(?i:brand|manufacturer|sold\s+by)\b\s*:?|\b(?i:by)\b)\s+([A-Z][A-Za-z0-9&'.-]*(?:\s+[A-Z][A-Za-z0-9&'.-]*){0,4})",
    )
    .unwrap()
});

const CTA_VOCABULARY: &[&str] = &[
    "add to cart",
    "add to bag",
    "add to basket",
    "buy now",
    "buy it now",
    "shop now",
    "order now",
    "purchase now",
    "checkout",
];

/// Scan text for a brand name following a known label.
///
/// The first match of plausible length (3 to 30 characters) wins.
#[must_use]
pub fn find_brand(text: &str) -> Option<(String, String)> {
    for caps in BRAND_RE.captures_iter(text) {
        let value = caps[1].trim().to_string();
        if (3..=30).contains(&value.len()) {
            return Some((value, caps[0].trim().to_string()));
        }
    }
    None
}

/// Derive a category from the URL path.
///
/// Uses the second-to-last segment (the segment above the leaf), or the only
/// segment when the path has just one, with hyphens turned into spaces.
#[must_use]
pub fn category_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    let segment = match segments.len() {
        0 => return None,
        1 => segments[0],
        n => segments[n - 2],
    };
    if segment.is_empty() {
        return None;
    }
    Some(segment.replace('-', " "))
}

/// Collect purchase call-to-action phrases present in the text.
///
/// Returns matches in vocabulary order, each phrase at most once.
#[must_use]
pub fn find_purchase_ctas(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    CTA_VOCABULARY
        .iter()
        .filter(|phrase| lowered.contains(*phrase))
        .map(|phrase| (*phrase).to_string())
        .collect()
}
