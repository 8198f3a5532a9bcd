//! Stock-status recovery from visible text.
//!
//! Phrase families are checked in a fixed order: out-of-stock, preorder,
//! then in-stock. The negative family runs first because pages routinely
//! pair "currently unavailable" with "similar items in stock".

use crate::types::Availability;

const OUT_OF_STOCK_PHRASES: &[&str] = &[
    "out of stock",
    "out-of-stock",
    "sold out",
    "currently unavailable",
    "no longer available",
    "discontinued",
];

const PREORDER_PHRASES: &[&str] = &[
    "pre-order",
    "preorder",
    "pre order",
    "back-order",
    "backorder",
    "coming soon",
];

const IN_STOCK_PHRASES: &[&str] = &[
    "in stock",
    "in-stock",
    "available now",
    "ready to ship",
    "ships today",
];

/// Scan text for a stock-status phrase.
///
/// Returns the status and the phrase that triggered it, or `None` when no
/// family matched.
#[must_use]
pub fn find_availability(text: &str) -> Option<(Availability, String)> {
    let lowered = text.to_lowercase();
    let families = [
        (OUT_OF_STOCK_PHRASES, Availability::OutOfStock),
        (PREORDER_PHRASES, Availability::Preorder),
        (IN_STOCK_PHRASES, Availability::InStock),
    ];
    for (phrases, status) in families {
        if let Some(phrase) = phrases.iter().find(|p| lowered.contains(*p)) {
            return Some((status, (*phrase).to_string()));
        }
    }
    None
}
