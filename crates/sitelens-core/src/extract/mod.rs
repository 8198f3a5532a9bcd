//! Fact extraction from already-parsed page signals.
//!
//! Every fact follows the same precedence rule: a structured-data value is
//! taken when present, and visible-text patterns are only consulted for the
//! gaps. [`Fact::or_text`] enforces that rule once so no text family can
//! overwrite a structured value. The per-fact pattern modules are pure
//! functions over strings and can be exercised on their own.

pub mod availability;
pub mod identifiers;
pub mod price;
pub mod rating;
pub mod text;

use crate::schema::DecodedSchemas;
use crate::types::{ExtractedFacts, Fact, PageSignals};

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Product name from text signals, in fixed precedence order.
fn text_name(signals: &PageSignals) -> Option<String> {
    non_empty(signals.h1_texts.first())
        .or_else(|| non_empty(signals.open_graph.get("og:title")))
        .or_else(|| non_empty(signals.title.as_ref()))
}

/// Assemble the full fact set for one page.
///
/// Pure and deterministic: identical signals always produce identical facts.
#[must_use]
pub fn extract(signals: &PageSignals) -> ExtractedFacts {
    let decoded = DecodedSchemas::from_objects(&signals.schema_objects);
    let headline = signals.headline_text();
    let product = decoded.first_product();
    let offer = product.and_then(|p| p.offer.as_ref());

    let name = product
        .and_then(|p| non_empty(p.name.as_ref()))
        .map_or_else(Fact::absent, Fact::structured)
        .or_text(text_name(signals).map(|n| (n, None)));

    let description = product
        .and_then(|p| non_empty(p.description.as_ref()))
        .map_or_else(Fact::absent, Fact::structured)
        .or_text(
            non_empty(signals.meta_description.as_ref())
                .or_else(|| non_empty(signals.open_graph.get("og:description")))
                .map(|d| (d, None)),
        );

    let category = product
        .and_then(|p| non_empty(p.category.as_ref()))
        .or_else(|| {
            decoded
                .first_breadcrumb()
                .and_then(|b| non_empty(b.items.last()))
        })
        .map_or_else(Fact::absent, Fact::structured)
        .or_text(
            non_empty(signals.breadcrumbs.last())
                .or_else(|| text::category_from_url(&signals.url))
                .map(|c| (c, None)),
        );

    let text_price = price::find_price(&headline);
    let price = offer
        .and_then(|o| o.price)
        .map_or_else(Fact::absent, Fact::structured)
        .or_text(
            text_price
                .as_ref()
                .map(|p| (p.amount, Some(p.raw.clone()))),
        );
    // A currency implied by a bare symbol stays attached to the price match;
    // only an ISO code written on the page stands as a fact of its own.
    let currency = offer
        .and_then(|o| non_empty(o.currency.as_ref()))
        .map_or_else(Fact::absent, Fact::structured)
        .or_text(
            text_price
                .as_ref()
                .filter(|p| p.currency_explicit)
                .and_then(|p| p.currency.clone().map(|code| (code, Some(p.raw.clone())))),
        );

    let availability = offer
        .and_then(|o| o.availability)
        .map_or_else(Fact::absent, Fact::structured)
        .or_text(
            availability::find_availability(&signals.body_text)
                .map(|(status, phrase)| (status, Some(phrase))),
        );

    let schema_rating = decoded.best_rating();
    let rating = schema_rating
        .and_then(|r| r.value)
        .map_or_else(Fact::absent, Fact::structured)
        .or_text(
            rating::find_rating(&signals.body_text).map(|m| (m.value, Some(m.raw))),
        );
    let review_count = schema_rating
        .and_then(|r| r.count)
        .filter(|c| *c > 0)
        .map_or_else(Fact::absent, Fact::structured)
        .or_text(
            rating::find_review_count(&signals.body_text).map(|(count, raw)| (count, Some(raw))),
        );

    let brand = product
        .and_then(|p| non_empty(p.brand.as_ref()))
        .map_or_else(Fact::absent, Fact::structured)
        .or_text(
            text::find_brand(&headline)
                .or_else(|| text::find_brand(&signals.body_text))
                .map(|(value, raw)| (value, Some(raw))),
        );

    let semantic_specs = signals.semantics.table_rows + signals.semantics.list_items;
    let specifications = if semantic_specs > 0 {
        Fact::text(semantic_specs, None)
    } else if product.is_some() {
        // A product record is itself one machine-readable specification
        Fact::structured(1)
    } else {
        Fact::absent()
    };

    let images = if signals.images.total > 0 {
        Fact::text(signals.images, None)
    } else {
        Fact::absent()
    };

    let ctas = text::find_purchase_ctas(&signals.body_text);
    let purchase_ctas = if ctas.is_empty() {
        Fact::absent()
    } else {
        Fact::text(ctas, None)
    };

    ExtractedFacts {
        name,
        description,
        category,
        price,
        currency,
        availability,
        rating,
        review_count,
        brand,
        specifications,
        images,
        purchase_ctas,
    }
}
