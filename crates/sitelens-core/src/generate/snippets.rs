//! Ready-to-paste structured-data snippets.
//!
//! Emits Product, BreadcrumbList and FAQPage JSON-LD objects built
//! directly from one page's extracted facts. Each snippet carries a
//! per-field ledger saying which values were extracted and which are
//! missing along with a concrete suggestion; the overall confidence is a
//! pure function of how many product fields are missing.

use super::Confidence;
use crate::aggregate::PageAnalysis;
use crate::types::Availability;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Snippets generated for one page plus the overall confidence tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSuggestions {
    pub url: String,
    pub snippets: Vec<SchemaSnippet>,
    pub confidence: Confidence,
}

/// One emitted JSON-LD object with its field ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSnippet {
    pub schema_type: String,
    pub json: Value,
    pub fields: Vec<FieldStatus>,
}

/// Ledger entry for one schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStatus {
    pub field: String,
    pub status: FieldPresence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPresence {
    Extracted,
    Missing,
}

fn extracted(field: &str) -> FieldStatus {
    FieldStatus {
        field: field.to_string(),
        status: FieldPresence::Extracted,
        suggestion: None,
    }
}

fn absent(field: &str, suggestion: &str) -> FieldStatus {
    FieldStatus {
        field: field.to_string(),
        status: FieldPresence::Missing,
        suggestion: Some(suggestion.to_string()),
    }
}

const fn availability_url(availability: Availability) -> Option<&'static str> {
    match availability {
        Availability::InStock => Some("https://schema.org/InStock"),
        Availability::OutOfStock => Some("https://schema.org/OutOfStock"),
        Availability::Preorder => Some("https://schema.org/PreOrder"),
        Availability::Unknown => None,
    }
}

fn product_snippet(page: &PageAnalysis) -> SchemaSnippet {
    let facts = &page.content_extraction;
    let ids = &page.identifiers;
    let mut object = Map::new();
    object.insert("@context".to_string(), json!("https://schema.org"));
    object.insert("@type".to_string(), json!("Product"));
    let mut fields = Vec::new();

    if let Some(name) = &facts.name.value {
        object.insert("name".to_string(), json!(name));
        fields.push(extracted("name"));
    } else {
        fields.push(absent("name", "add the product name"));
    }

    if let Some(description) = &facts.description.value {
        object.insert("description".to_string(), json!(description));
        fields.push(extracted("description"));
    } else {
        fields.push(absent(
            "description",
            "write a product description of at least 120 characters",
        ));
    }

    if let Some(brand) = &facts.brand.value {
        object.insert(
            "brand".to_string(),
            json!({"@type": "Brand", "name": brand}),
        );
        fields.push(extracted("brand"));
    } else {
        fields.push(absent("brand", "name the brand or manufacturer"));
    }

    if let Some(price) = facts.price.value {
        fields.push(extracted("price"));
        let mut offer = Map::new();
        offer.insert("@type".to_string(), json!("Offer"));
        offer.insert("price".to_string(), json!(price));
        if let Some(currency) = &facts.currency.value {
            offer.insert("priceCurrency".to_string(), json!(currency));
            fields.push(extracted("currency"));
        } else {
            fields.push(absent(
                "currency",
                "declare priceCurrency as an ISO 4217 code",
            ));
        }
        if let Some(url) = facts.availability.value.and_then(availability_url) {
            offer.insert("availability".to_string(), json!(url));
            fields.push(extracted("availability"));
        } else {
            fields.push(absent(
                "availability",
                "state the stock status in the offer",
            ));
        }
        object.insert("offers".to_string(), Value::Object(offer));
    } else {
        fields.push(absent("price", "add an Offer with a numeric price"));
        fields.push(absent(
            "currency",
            "declare priceCurrency as an ISO 4217 code",
        ));
        fields.push(absent(
            "availability",
            "state the stock status in the offer",
        ));
    }

    if let Some(rating) = facts.rating.value {
        let mut aggregate = Map::new();
        aggregate.insert("@type".to_string(), json!("AggregateRating"));
        aggregate.insert("ratingValue".to_string(), json!(rating));
        fields.push(extracted("rating"));
        if let Some(count) = facts.review_count.value {
            aggregate.insert("reviewCount".to_string(), json!(count));
            fields.push(extracted("reviewCount"));
        } else {
            fields.push(absent(
                "reviewCount",
                "show the number of reviews next to the rating",
            ));
        }
        object.insert("aggregateRating".to_string(), Value::Object(aggregate));
    } else {
        fields.push(absent("rating", "publish an aggregate customer rating"));
        fields.push(absent(
            "reviewCount",
            "show the number of reviews next to the rating",
        ));
    }

    if let Some(gtin) = &ids.gtin {
        object.insert("gtin".to_string(), json!(gtin));
        fields.push(extracted("gtin"));
    } else {
        fields.push(absent("gtin", "add the GTIN, EAN or UPC barcode number"));
    }
    if let Some(sku) = &ids.sku {
        object.insert("sku".to_string(), json!(sku));
        fields.push(extracted("sku"));
    } else {
        fields.push(absent("sku", "add the internal SKU"));
    }

    SchemaSnippet {
        schema_type: "Product".to_string(),
        json: Value::Object(object),
        fields,
    }
}

fn breadcrumb_snippet(page: &PageAnalysis) -> SchemaSnippet {
    let facts = &page.content_extraction;
    let mut names: Vec<String> = vec!["Home".to_string()];
    if let Some(category) = &facts.category.value {
        names.push(category.clone());
    }
    if let Some(name) = &facts.name.value {
        names.push(name.clone());
    }

    let last = names.len() - 1;
    let elements: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let mut element = Map::new();
            element.insert("@type".to_string(), json!("ListItem"));
            element.insert("position".to_string(), json!(index + 1));
            element.insert("name".to_string(), json!(name));
            if index == last {
                element.insert("item".to_string(), json!(page.url));
            }
            Value::Object(element)
        })
        .collect();

    let fields = if names.len() >= 2 {
        vec![extracted("itemListElement")]
    } else {
        vec![absent(
            "itemListElement",
            "add the category trail from home to this page",
        )]
    };

    SchemaSnippet {
        schema_type: "BreadcrumbList".to_string(),
        json: json!({
            "@context": "https://schema.org",
            "@type": "BreadcrumbList",
            "itemListElement": elements
        }),
        fields,
    }
}

fn faq_snippet(page: &PageAnalysis) -> SchemaSnippet {
    let subject = page
        .content_extraction
        .name
        .value
        .clone()
        .unwrap_or_else(|| "this product".to_string());
    SchemaSnippet {
        schema_type: "FAQPage".to_string(),
        json: json!({
            "@context": "https://schema.org",
            "@type": "FAQPage",
            "mainEntity": [{
                "@type": "Question",
                "name": format!("What is the shipping time for {subject}?"),
                "acceptedAnswer": {"@type": "Answer", "text": "Add your answer here."}
            }]
        }),
        fields: vec![absent(
            "mainEntity",
            "replace the placeholder question and answer with real customer questions",
        )],
    }
}

/// Generate structured-data snippets for one analyzed page.
///
/// Confidence is judged on the product snippet alone: the breadcrumb and
/// FAQ snippets are partly templates and would otherwise drag every page
/// down.
#[must_use]
pub fn generate_schema_for_page(page: &PageAnalysis) -> SchemaSuggestions {
    let product = product_snippet(page);
    let missing = product
        .fields
        .iter()
        .filter(|f| f.status == FieldPresence::Missing)
        .count();
    let snippets = vec![product, breadcrumb_snippet(page), faq_snippet(page)];
    SchemaSuggestions {
        url: page.url.clone(),
        snippets,
        confidence: Confidence::from_issue_count(missing),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::aggregate::analyze_page;
    use crate::config::ScoringConfig;
    use crate::extract;
    use crate::types::PageSignals;

    fn analyzed(signals: &PageSignals) -> PageAnalysis {
        analyze_page(signals, &ScoringConfig::default()).unwrap()
    }

    fn full_product_signals() -> PageSignals {
        let mut signals = PageSignals::new("https://shop.example/products/trail-backpack");
        signals.title = Some("Trail Backpack".to_string());
        signals.h1_texts = vec!["Trail Backpack".to_string()];
        signals.headings.h1 = 1;
        signals.schema_objects = vec![serde_json::json!({
            "@type": "Product",
            "name": "Trail Backpack",
            "description": "A 28 litre backpack with a reinforced frame, rain cover and a lifetime warranty, built for multi-day alpine routes.",
            "brand": {"@type": "Brand", "name": "Summit"},
            "category": "Hiking",
            "offers": {
                "price": 89.99,
                "priceCurrency": "USD",
                "availability": "https://schema.org/InStock"
            },
            "aggregateRating": {"ratingValue": 4.6, "reviewCount": 213},
            "gtin13": "0012345678905",
            "sku": "BP-200"
        })];
        signals
    }

    #[test]
    fn full_product_page_yields_high_confidence() {
        let page = analyzed(&full_product_signals());
        let suggestions = generate_schema_for_page(&page);
        assert_eq!(suggestions.confidence, Confidence::High);

        let product = &suggestions.snippets[0];
        assert_eq!(product.schema_type, "Product");
        assert!(product
            .fields
            .iter()
            .all(|f| f.status == FieldPresence::Extracted));
        assert_eq!(product.json["name"], "Trail Backpack");
        assert_eq!(product.json["offers"]["price"], 89.99);
        assert_eq!(product.json["offers"]["priceCurrency"], "USD");
        assert_eq!(product.json["aggregateRating"]["reviewCount"], 213);
        assert_eq!(product.json["gtin"], "0012345678905");
    }

    #[test]
    fn generated_product_json_round_trips_through_extraction() {
        let page = analyzed(&full_product_signals());
        let suggestions = generate_schema_for_page(&page);
        let generated = suggestions.snippets[0].json.clone();

        let mut echo = PageSignals::new("https://shop.example/products/echo");
        echo.schema_objects = vec![generated];
        let facts = extract::extract(&echo);

        assert_eq!(facts.name.value.as_deref(), Some("Trail Backpack"));
        assert!(facts.name.is_structured());
        assert_eq!(facts.price.value, Some(89.99));
        assert!(facts.price.is_structured());
    }

    #[test]
    fn bare_page_collects_suggestions_and_low_confidence() {
        let mut signals = PageSignals::new("https://shop.example/products/mystery");
        signals.title = Some("Mystery Item".to_string());
        let page = analyzed(&signals);
        let suggestions = generate_schema_for_page(&page);

        assert_eq!(suggestions.confidence, Confidence::Low);
        let product = &suggestions.snippets[0];
        let missing: Vec<&str> = product
            .fields
            .iter()
            .filter(|f| f.status == FieldPresence::Missing)
            .map(|f| f.field.as_str())
            .collect();
        assert!(missing.contains(&"price"));
        assert!(missing.contains(&"rating"));
        assert!(product
            .fields
            .iter()
            .filter(|f| f.status == FieldPresence::Missing)
            .all(|f| f.suggestion.is_some()));
        // The name was still pulled from the title
        assert_eq!(product.json["name"], "Mystery Item");
    }

    #[test]
    fn two_missing_fields_mean_medium_confidence() {
        let mut signals = full_product_signals();
        if let serde_json::Value::Object(product) = &mut signals.schema_objects[0] {
            product.remove("aggregateRating");
        }
        let page = analyzed(&signals);
        let suggestions = generate_schema_for_page(&page);
        // rating and reviewCount are the only gaps
        assert_eq!(suggestions.confidence, Confidence::Medium);
    }

    #[test]
    fn breadcrumb_walks_home_category_name() {
        let page = analyzed(&full_product_signals());
        let suggestions = generate_schema_for_page(&page);
        let breadcrumb = &suggestions.snippets[1];
        assert_eq!(breadcrumb.schema_type, "BreadcrumbList");

        let elements = breadcrumb.json["itemListElement"].as_array().unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0]["name"], "Home");
        assert_eq!(elements[1]["name"], "Hiking");
        assert_eq!(elements[2]["name"], "Trail Backpack");
        assert_eq!(
            elements[2]["item"],
            "https://shop.example/products/trail-backpack"
        );
    }

    #[test]
    fn faq_snippet_is_a_template_to_fill_in() {
        let page = analyzed(&full_product_signals());
        let suggestions = generate_schema_for_page(&page);
        let faq = &suggestions.snippets[2];
        assert_eq!(faq.schema_type, "FAQPage");
        assert_eq!(faq.fields[0].status, FieldPresence::Missing);
        assert!(faq.json["mainEntity"][0]["name"]
            .as_str()
            .unwrap()
            .contains("Trail Backpack"));
    }

    #[test]
    fn unknown_availability_is_left_out_of_the_offer() {
        let mut signals = full_product_signals();
        if let serde_json::Value::Object(product) = &mut signals.schema_objects[0] {
            if let Some(serde_json::Value::Object(offer)) = product.get_mut("offers") {
                offer.insert(
                    "availability".to_string(),
                    serde_json::json!("https://schema.org/SomethingElse"),
                );
            }
        }
        let page = analyzed(&signals);
        let suggestions = generate_schema_for_page(&page);
        let offers = &suggestions.snippets[0].json["offers"];
        assert!(offers.get("availability").is_none());
    }

    #[test]
    fn ledger_serializes_with_camel_case_keys() {
        let status = absent("reviewCount", "show the number of reviews");
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["field"], "reviewCount");
        assert_eq!(json["status"], "missing");
        assert!(json["suggestion"].is_string());
    }
}
