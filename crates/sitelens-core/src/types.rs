//! Shared value types for page signals and extracted facts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Page category assigned once by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Product,
    Collection,
    Blog,
    Homepage,
    Search,
    Cart,
    Other,
}

impl PageType {
    /// Whether the extractability scorer applies to this page type.
    #[must_use]
    pub const fn is_scorable(self) -> bool {
        matches!(self, Self::Product | Self::Collection)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Collection => "collection",
            Self::Blog => "blog",
            Self::Homepage => "homepage",
            Self::Search => "search",
            Self::Cart => "cart",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a fact value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactSource {
    #[serde(rename = "structured-data")]
    StructuredData,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "none")]
    None,
}

/// One extracted fact with its provenance.
///
/// A structured-data-sourced fact is never replaced by a text-derived one;
/// use [`Fact::or_text`] to apply the fallback without breaking that rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact<T> {
    pub value: Option<T>,
    pub source: FactSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl<T> Fact<T> {
    #[must_use]
    pub const fn structured(value: T) -> Self {
        Self {
            value: Some(value),
            source: FactSource::StructuredData,
            raw_text: None,
        }
    }

    #[must_use]
    pub const fn text(value: T, raw_text: Option<String>) -> Self {
        Self {
            value: Some(value),
            source: FactSource::Text,
            raw_text,
        }
    }

    #[must_use]
    pub const fn absent() -> Self {
        Self {
            value: None,
            source: FactSource::None,
            raw_text: None,
        }
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.value.is_some()
    }

    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self.source, FactSource::StructuredData) && self.value.is_some()
    }

    /// Fill this fact from a text fallback only if nothing is present yet.
    #[must_use]
    pub fn or_text(self, fallback: Option<(T, Option<String>)>) -> Self {
        if self.is_present() {
            return self;
        }
        match fallback {
            Some((value, raw_text)) => Self::text(value, raw_text),
            None => self,
        }
    }
}

impl<T> Default for Fact<T> {
    fn default() -> Self {
        Self::absent()
    }
}

/// Stock status normalized from offer schema or text patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    InStock,
    OutOfStock,
    Preorder,
    Unknown,
}

/// Image tally carried through from page markup or product schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    pub total: u32,
    pub with_alt: u32,
}

impl ImageStats {
    /// Fraction of images carrying alt text, zero when there are none.
    #[must_use]
    pub fn alt_coverage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.with_alt) / f64::from(self.total)
        }
    }
}

/// Normalized per-page facts, each tagged with provenance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFacts {
    pub name: Fact<String>,
    pub description: Fact<String>,
    pub category: Fact<String>,
    pub price: Fact<f64>,
    pub currency: Fact<String>,
    pub availability: Fact<Availability>,
    pub rating: Fact<f64>,
    pub review_count: Fact<u32>,
    pub brand: Fact<String>,
    pub specifications: Fact<u32>,
    pub images: Fact<ImageStats>,
    pub purchase_ctas: Fact<Vec<String>>,
}

/// Product identifiers, structured-data first with text fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifiers {
    pub gtin: Option<String>,
    pub mpn: Option<String>,
    pub sku: Option<String>,
}

impl Identifiers {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.gtin.is_none() && self.mpn.is_none() && self.sku.is_none()
    }
}

/// Per-heading-level tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: u32,
    pub h2: u32,
    pub h3: u32,
    pub h4: u32,
    pub h5: u32,
    pub h6: u32,
}

/// Semantic container tallies used for specification detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticCounts {
    pub tables: u32,
    pub table_rows: u32,
    pub lists: u32,
    pub list_items: u32,
    pub articles: u32,
}

/// Everything the pipeline knows about one fetched page.
///
/// Built once per page by the signal extractor (or directly by tests) and
/// never mutated afterwards. All downstream stages are pure functions of
/// this value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSignals {
    pub url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    /// Raw embedded structured-data trees in document order.
    pub schema_objects: Vec<serde_json::Value>,
    /// Open-graph and twitter-card properties keyed by property name.
    pub open_graph: BTreeMap<String, String>,
    pub headings: HeadingCounts,
    pub h1_texts: Vec<String>,
    pub images: ImageStats,
    pub semantics: SemanticCounts,
    pub body_text: String,
    pub internal_links: Vec<String>,
    pub external_links: Vec<String>,
    pub breadcrumbs: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl PageSignals {
    /// Empty signal set for a URL, useful as a construction base.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            meta_description: None,
            schema_objects: Vec::new(),
            open_graph: BTreeMap::new(),
            headings: HeadingCounts::default(),
            h1_texts: Vec::new(),
            images: ImageStats::default(),
            semantics: SemanticCounts::default(),
            body_text: String::new(),
            internal_links: Vec::new(),
            external_links: Vec::new(),
            breadcrumbs: Vec::new(),
            published_at: None,
            modified_at: None,
        }
    }

    /// Title, meta description, and H1 text joined for pattern scanning.
    #[must_use]
    pub fn headline_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(title) = &self.title {
            parts.push(title);
        }
        if let Some(meta) = &self.meta_description {
            parts.push(meta);
        }
        for h1 in &self.h1_texts {
            parts.push(h1);
        }
        parts.join(" ")
    }
}
