//! Product identifier recovery (GTIN, MPN, SKU).
//!
//! Structured-data objects are scanned first, in the order the page listed
//! them; the first non-empty value wins per field. Body text is only
//! consulted for fields the structured pass left empty.

use crate::schema::{first_str_of, flatten};
use crate::types::Identifiers;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for labelled GTIN mentions.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static GTIN_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:gtin|ean|upc)\s*[:#]?\s*([0-9]{8,14})\b").unwrap()
});

/// Regex for labelled MPN mentions.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static MPN_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:mpn|manufacturer\s+part(?:\s+number)?)\s*[:#]?\s*([A-Za-z0-9-]{2,32})\b")
        .unwrap()
});

/// Regex for labelled SKU mentions.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static SKU_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:sku|item\s*(?:no\.?|number|#))\s*[:#]?\s*([A-Za-z0-9-]{2,32})\b")
        .unwrap()
});

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn text_match(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].to_string())
}

/// Pull identifiers out of structured data, then fill gaps from body text.
#[must_use]
pub fn extract_identifiers(objects: &[Value], body_text: Option<&str>) -> Identifiers {
    let mut ids = Identifiers::default();
    for object in flatten(objects) {
        if ids.gtin.is_none() {
            ids.gtin = non_empty(first_str_of(
                object,
                &["gtin", "gtin8", "gtin13", "gtin14"],
            ));
        }
        if ids.mpn.is_none() {
            ids.mpn = non_empty(first_str_of(object, &["mpn"]));
        }
        if ids.sku.is_none() {
            ids.sku = non_empty(first_str_of(object, &["sku", "productID"]));
        }
    }
    if let Some(text) = body_text {
        if ids.gtin.is_none() {
            ids.gtin = text_match(&GTIN_TEXT_RE, text);
        }
        if ids.mpn.is_none() {
            ids.mpn = text_match(&MPN_TEXT_RE, text);
        }
        if ids.sku.is_none() {
            ids.sku = text_match(&SKU_TEXT_RE, text);
        }
    }
    ids
}
