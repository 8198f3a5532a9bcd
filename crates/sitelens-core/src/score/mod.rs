//! Page and site scoring.
//!
//! Both scorers produce the same shape: a tree of named entries, each
//! carrying `points`, `max` and a `found` flag, grouped into fixed
//! categories whose totals sum (capped at 100) to the headline score.
//! Every leaf holds `0 <= points <= max`; callers can re-derive a category
//! total by summing its entries.

pub mod page;
pub mod site;

pub use page::{PageBreakdown, PageScore, score_page};
pub use site::{SiteBreakdown, SiteScore, SiteSignals, score_site};

use crate::config::LabelThresholds;
use crate::types::FactSource;
use serde::{Deserialize, Serialize};

/// One scored leaf in a breakdown tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub name: String,
    pub points: u32,
    pub max: u32,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<FactSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ScoreEntry {
    #[must_use]
    pub fn new(name: &str, points: u32, max: u32, found: bool) -> Self {
        Self {
            name: name.to_string(),
            points,
            max,
            found,
            source: None,
            note: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Option<FactSource>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// One category of a breakdown: its entries plus the derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub total_points: u32,
    pub max: u32,
    pub entries: Vec<ScoreEntry>,
}

impl CategoryBreakdown {
    /// Build a category from its entries, deriving the point total.
    #[must_use]
    pub fn new(max: u32, entries: Vec<ScoreEntry>) -> Self {
        let total_points = entries.iter().map(|e| e.points).sum();
        Self {
            total_points,
            max,
            entries,
        }
    }

    #[must_use]
    pub fn empty(max: u32) -> Self {
        Self {
            total_points: 0,
            max,
            entries: Vec::new(),
        }
    }
}

/// Human-readable grade attached to every score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreLabel {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl ScoreLabel {
    /// Grade a score against the configured thresholds.
    #[must_use]
    pub const fn for_score(score: u32, thresholds: &LabelThresholds) -> Self {
        if score >= thresholds.excellent {
            Self::Excellent
        } else if score >= thresholds.good {
            Self::Good
        } else if score >= thresholds.fair {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::NotApplicable => "N/A",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;

    #[test]
    fn category_total_is_sum_of_entries() {
        let category = CategoryBreakdown::new(
            20,
            vec![
                ScoreEntry::new("name", 10, 10, true),
                ScoreEntry::new("description", 3, 5, true),
                ScoreEntry::new("category", 0, 5, false),
            ],
        );
        assert_eq!(category.total_points, 13);
        assert_eq!(category.max, 20);
    }

    #[test]
    fn labels_follow_default_thresholds() {
        let labels = ScoringConfig::default().labels;
        assert_eq!(ScoreLabel::for_score(92, &labels), ScoreLabel::Excellent);
        assert_eq!(ScoreLabel::for_score(80, &labels), ScoreLabel::Excellent);
        assert_eq!(ScoreLabel::for_score(79, &labels), ScoreLabel::Good);
        assert_eq!(ScoreLabel::for_score(60, &labels), ScoreLabel::Good);
        assert_eq!(ScoreLabel::for_score(45, &labels), ScoreLabel::Fair);
        assert_eq!(ScoreLabel::for_score(12, &labels), ScoreLabel::Poor);
    }

    #[test]
    fn not_applicable_serializes_as_na() {
        let json = serde_json::to_string(&ScoreLabel::NotApplicable).unwrap();
        assert_eq!(json, "\"N/A\"");
    }
}
