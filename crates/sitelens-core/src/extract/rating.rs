//! Rating and review-count recovery from visible text.
//!
//! Star glyphs are counted first: a run of filled stars is trusted only
//! when the page shows at most five glyphs in total, otherwise the row is
//! assumed to be decoration. Textual phrasings ("4.5 out of 5", "4.5/5",
//! "4.5 stars", "rated 4.5") are tried next. Values outside (0, 5] are
//! rejected wherever they come from.

use regex::Regex;
use std::sync::LazyLock;

/// A rating recovered from text, with the matched fragment kept for audit.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatch {
    pub value: f64,
    pub raw: String,
}

/// Regex for "X out of 5" and "X/5" phrasings.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static OUT_OF_FIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-5](?:\.[0-9]{1,2})?)\s*(?:out\s+of|/)\s*5\b").unwrap()
});

/// Regex for "X stars" phrasings.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static STARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([0-5](?:\.[0-9]{1,2})?)\s*stars?\b").unwrap());

/// Regex for "rated X" phrasings.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static RATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\brated\s+([0-5](?:\.[0-9]{1,2})?)\b").unwrap());

/// Regex for review and rating counts.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static REVIEW_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([0-9][0-9,]*)\s*(?:customer\s+|verified\s+)?(?:reviews?|ratings?)\b")
        .unwrap()
});

const FILLED_STARS: [char; 2] = ['★', '⭐'];
const EMPTY_STAR: char = '☆';

fn in_range(value: f64) -> bool {
    value > 0.0 && value <= 5.0
}

/// Count star glyphs; trusted only when the total is a plausible row of five.
fn glyph_rating(text: &str) -> Option<RatingMatch> {
    let filled = text.chars().filter(|c| FILLED_STARS.contains(c)).count();
    let empty = text.chars().filter(|&c| c == EMPTY_STAR).count();
    let total = filled + empty;
    if filled == 0 || total > 5 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    Some(RatingMatch {
        value: filled as f64,
        raw: format!("{filled} of {total} star glyphs"),
    })
}

/// Scan text for a rating, trying glyphs first and then each phrasing.
#[must_use]
pub fn find_rating(text: &str) -> Option<RatingMatch> {
    if let Some(rating) = glyph_rating(text) {
        return Some(rating);
    }
    for re in [&*OUT_OF_FIVE_RE, &*STARS_RE, &*RATED_RE] {
        for caps in re.captures_iter(text) {
            let Some(value) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
                continue;
            };
            if in_range(value) {
                return Some(RatingMatch {
                    value,
                    raw: caps[0].trim().to_string(),
                });
            }
        }
    }
    None
}

/// Scan text for a review or rating count.
#[must_use]
pub fn find_review_count(text: &str) -> Option<(u32, String)> {
    for caps in REVIEW_COUNT_RE.captures_iter(text) {
        let Some(count) = caps
            .get(1)
            .and_then(|m| m.as_str().replace(',', "").parse::<u32>().ok())
        else {
            continue;
        };
        if count > 0 {
            return Some((count, caps[0].trim().to_string()));
        }
    }
    None
}
