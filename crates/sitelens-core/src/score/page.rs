//! Per-page extractability scoring.
//!
//! Only product and collection pages are scored; everything else gets an
//! explicit not-applicable result with zero points. Category point totals
//! are independently capped and the overall score is clamped to 100.

use super::{CategoryBreakdown, ScoreEntry, ScoreLabel};
use crate::config::{PageWeights, ScoringConfig};
use crate::schema::DecodedSchemas;
use crate::types::{
    Availability, ExtractedFacts, Fact, FactSource, Identifiers, PageSignals, PageType,
};
use serde::{Deserialize, Serialize};

/// Result of scoring one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageScore {
    pub score: u32,
    pub label: ScoreLabel,
    pub breakdown: PageBreakdown,
}

/// Fixed category tree behind a page score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBreakdown {
    pub is_applicable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub identity: CategoryBreakdown,
    pub pricing: CategoryBreakdown,
    pub availability: CategoryBreakdown,
    pub reviews: CategoryBreakdown,
    pub identifiers: CategoryBreakdown,
    pub images: CategoryBreakdown,
    pub specifications: CategoryBreakdown,
    pub schema_bonus: CategoryBreakdown,
}

fn source_of<T>(fact: &Fact<T>) -> Option<FactSource> {
    fact.is_present().then_some(fact.source)
}

/// Provenance-tiered award: full points for a structured-data fact, a
/// reduced award for a text-derived one, nothing when the fact is absent.
fn pick_best<T>(fact: &Fact<T>, structured_points: u32, text_points: u32) -> u32 {
    if fact.is_structured() {
        structured_points
    } else if fact.is_present() {
        text_points
    } else {
        0
    }
}

fn identity_category(
    signals: &PageSignals,
    facts: &ExtractedFacts,
    w: &PageWeights,
) -> CategoryBreakdown {
    let name_from_h1 = signals.h1_texts.first().map(|h| h.trim()) == facts.name.value.as_deref();
    let name_points = if facts.name.is_structured() {
        w.name_schema
    } else if facts.name.is_present() {
        if name_from_h1 { w.name_h1 } else { w.name_text }
    } else {
        0
    };
    let name = ScoreEntry::new("name", name_points, w.name_schema, facts.name.is_present())
        .with_source(source_of(&facts.name));

    let description_len = facts
        .description
        .value
        .as_ref()
        .map_or(0, |d| d.chars().count());
    let description_points = if description_len >= w.description_long_min {
        w.description_long
    } else if description_len >= w.description_short_min {
        w.description_short
    } else {
        0
    };
    let description = ScoreEntry::new(
        "description",
        description_points,
        w.description_long,
        facts.description.is_present(),
    )
    .with_source(source_of(&facts.description));

    let category_points = pick_best(&facts.category, w.category_schema, w.category_text);
    let category = ScoreEntry::new(
        "category",
        category_points,
        w.category_schema,
        facts.category.is_present(),
    )
    .with_source(source_of(&facts.category));

    CategoryBreakdown::new(w.identity_max(), vec![name, description, category])
}

fn pricing_category(facts: &ExtractedFacts, w: &PageWeights) -> CategoryBreakdown {
    let price_points = pick_best(&facts.price, w.price_schema, w.price_text);
    let price = ScoreEntry::new("price", price_points, w.price_schema, facts.price.is_present())
        .with_source(source_of(&facts.price));

    let currency_points = pick_best(&facts.currency, w.currency_schema, w.currency_text);
    let currency = ScoreEntry::new(
        "currency",
        currency_points,
        w.currency_schema,
        facts.currency.is_present(),
    )
    .with_source(source_of(&facts.currency));

    CategoryBreakdown::new(w.pricing_max(), vec![price, currency])
}

fn availability_category(facts: &ExtractedFacts, w: &PageWeights) -> CategoryBreakdown {
    let status_known = facts.availability.value.is_some_and(|a| a != Availability::Unknown);
    let mut entry = if facts.availability.is_structured() && status_known {
        ScoreEntry::new("status", w.availability_schema, w.availability_schema, true)
            .with_source(Some(FactSource::StructuredData))
    } else if facts.availability.source == FactSource::Text && status_known {
        ScoreEntry::new("status", w.availability_text, w.availability_schema, true)
            .with_source(Some(FactSource::Text))
    } else if facts.purchase_ctas.is_present() {
        ScoreEntry::new("status", w.availability_cta, w.availability_schema, true)
            .with_source(Some(FactSource::Text))
            .with_note("purchase call-to-action only")
    } else {
        ScoreEntry::new("status", 0, w.availability_schema, false)
    };
    if entry.note.is_none() {
        if let Some(raw) = &facts.availability.raw_text {
            entry = entry.with_note(raw.clone());
        }
    }
    CategoryBreakdown::new(w.availability_max(), vec![entry])
}

fn reviews_category(facts: &ExtractedFacts, w: &PageWeights) -> CategoryBreakdown {
    let rating_points = pick_best(&facts.rating, w.rating_schema, w.rating_text);
    let rating = ScoreEntry::new("rating", rating_points, w.rating_schema, facts.rating.is_present())
        .with_source(source_of(&facts.rating));

    let count_max = w
        .review_count_tiers
        .iter()
        .map(|t| t.points)
        .max()
        .unwrap_or(0);
    let count = facts.review_count.value.unwrap_or(0);
    let count_points = w
        .review_count_tiers
        .iter()
        .find(|t| count >= t.min_count)
        .map_or(0, |t| t.points);
    let review_count = ScoreEntry::new("reviewCount", count_points, count_max, count > 0)
        .with_source(source_of(&facts.review_count));

    CategoryBreakdown::new(w.reviews_max(), vec![rating, review_count])
}

fn identifiers_category(ids: &Identifiers, w: &PageWeights) -> CategoryBreakdown {
    // Highest-value identifier wins; tiers are not additive
    let (points, kind) = if ids.gtin.is_some() {
        (w.gtin, Some("gtin"))
    } else if ids.mpn.is_some() {
        (w.mpn, Some("mpn"))
    } else if ids.sku.is_some() {
        (w.sku, Some("sku"))
    } else {
        (0, None)
    };
    let mut entry = ScoreEntry::new("identifier", points, w.gtin, kind.is_some());
    if let Some(kind) = kind {
        entry = entry.with_note(kind);
    }
    CategoryBreakdown::new(w.identifiers_max(), vec![entry])
}

fn images_category(facts: &ExtractedFacts, w: &PageWeights) -> CategoryBreakdown {
    let points = facts.images.value.map_or(0, |stats| {
        let coverage = stats.alt_coverage();
        if stats.total >= 3 && coverage >= 0.8 {
            w.images_rich
        } else if stats.total >= 2 && coverage >= 0.5 {
            w.images_good
        } else if stats.total >= 1 && coverage >= 0.5 {
            w.images_basic
        } else if stats.total >= 1 {
            w.images_minimal
        } else {
            0
        }
    });
    let entry = ScoreEntry::new("altText", points, w.images_rich, facts.images.is_present());
    CategoryBreakdown::new(w.images_max(), vec![entry])
}

fn specifications_category(facts: &ExtractedFacts, w: &PageWeights) -> CategoryBreakdown {
    let count = facts.specifications.value.unwrap_or(0);
    let points = if count >= 5 {
        w.specs_many
    } else if count >= 3 {
        w.specs_some
    } else if count >= 1 {
        w.specs_any
    } else {
        0
    };
    let entry = ScoreEntry::new("detected", points, w.specs_many, count > 0)
        .with_source(source_of(&facts.specifications));
    CategoryBreakdown::new(w.specifications_max(), vec![entry])
}

fn schema_bonus_category(decoded: &DecodedSchemas, w: &PageWeights) -> CategoryBreakdown {
    let entry = match decoded.first_product() {
        Some(product) => {
            let has_offer = product.offer.is_some();
            let has_rating = decoded.best_rating().is_some();
            if has_offer && has_rating {
                ScoreEntry::new("coverage", w.schema_full, w.schema_full, true)
                    .with_note("product, offer and rating")
            } else if has_offer {
                ScoreEntry::new("coverage", w.schema_offer, w.schema_full, true)
                    .with_note("product and offer")
            } else {
                ScoreEntry::new("coverage", w.schema_product, w.schema_full, true)
                    .with_note("product only")
            }
        }
        None => ScoreEntry::new("coverage", 0, w.schema_full, false),
    };
    CategoryBreakdown::new(w.schema_bonus_max(), vec![entry])
}

fn not_applicable(page_type: PageType, w: &PageWeights) -> PageBreakdown {
    PageBreakdown {
        is_applicable: false,
        reason: Some(format!(
            "page type '{page_type}' is not scored for product extractability"
        )),
        identity: CategoryBreakdown::empty(w.identity_max()),
        pricing: CategoryBreakdown::empty(w.pricing_max()),
        availability: CategoryBreakdown::empty(w.availability_max()),
        reviews: CategoryBreakdown::empty(w.reviews_max()),
        identifiers: CategoryBreakdown::empty(w.identifiers_max()),
        images: CategoryBreakdown::empty(w.images_max()),
        specifications: CategoryBreakdown::empty(w.specifications_max()),
        schema_bonus: CategoryBreakdown::empty(w.schema_bonus_max()),
    }
}

/// Score one page from its signals, classification, and extracted facts.
///
/// Pure: re-running on identical inputs yields an identical result.
#[must_use]
pub fn score_page(
    signals: &PageSignals,
    page_type: PageType,
    facts: &ExtractedFacts,
    identifiers: &Identifiers,
    config: &ScoringConfig,
) -> PageScore {
    let w = &config.page;
    if !page_type.is_scorable() {
        return PageScore {
            score: 0,
            label: ScoreLabel::NotApplicable,
            breakdown: not_applicable(page_type, w),
        };
    }

    let decoded = DecodedSchemas::from_objects(&signals.schema_objects);
    let breakdown = PageBreakdown {
        is_applicable: true,
        reason: None,
        identity: identity_category(signals, facts, w),
        pricing: pricing_category(facts, w),
        availability: availability_category(facts, w),
        reviews: reviews_category(facts, w),
        identifiers: identifiers_category(identifiers, w),
        images: images_category(facts, w),
        specifications: specifications_category(facts, w),
        schema_bonus: schema_bonus_category(&decoded, w),
    };

    let total = breakdown.identity.total_points
        + breakdown.pricing.total_points
        + breakdown.availability.total_points
        + breakdown.reviews.total_points
        + breakdown.identifiers.total_points
        + breakdown.images.total_points
        + breakdown.specifications.total_points
        + breakdown.schema_bonus.total_points;
    let score = total.min(100);

    PageScore {
        score,
        label: ScoreLabel::for_score(score, &config.labels),
        breakdown,
    }
}
