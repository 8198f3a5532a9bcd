//! Lenient decoding of embedded structured-data trees.
//!
//! Pages embed schema.org vocabulary as arbitrary JSON trees: single
//! objects, arrays of objects, or `@graph` containers, with values that may
//! be strings where numbers are expected and objects where strings are
//! expected. This module flattens those trees and decodes the shapes the
//! pipeline understands into typed variants, ignoring everything else.
//! A block that fails to decode is simply skipped; malformed structured
//! data is absent data, never an error.

use crate::types::Availability;
use serde_json::Value;

/// One decoded structured-data entity.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaObject {
    Product(ProductSchema),
    Organization(OrganizationSchema),
    Review(ReviewSchema),
    AggregateRating(AggregateRatingSchema),
    Person(PersonSchema),
    Article(ArticleSchema),
    BreadcrumbList(BreadcrumbSchema),
    FaqPage(FaqSchema),
}

/// Product entity with the fields scoring and extraction consume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductSchema {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub image_count: u32,
    pub offer: Option<OfferSchema>,
    pub rating: Option<AggregateRatingSchema>,
    pub gtin: Option<String>,
    pub mpn: Option<String>,
    pub sku: Option<String>,
}

/// First offer attached to a product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferSchema {
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub availability: Option<Availability>,
}

/// Aggregate rating, standalone or nested in a product.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateRatingSchema {
    pub value: Option<f64>,
    pub count: Option<u32>,
}

/// Organization entity used by the site discoverability scorer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationSchema {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub same_as: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonSchema {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleSchema {
    pub headline: Option<String>,
    pub author: Option<String>,
}

/// Single review; only the nested rating value matters downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewSchema {
    pub rating: Option<f64>,
    pub author: Option<String>,
}

/// Ordered breadcrumb names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreadcrumbSchema {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaqSchema {
    pub question_count: u32,
}

/// Decoded entities from one page, split by shape for convenient lookup.
#[derive(Debug, Clone, Default)]
pub struct DecodedSchemas {
    pub products: Vec<ProductSchema>,
    pub organizations: Vec<OrganizationSchema>,
    pub reviews: Vec<ReviewSchema>,
    pub ratings: Vec<AggregateRatingSchema>,
    pub persons: Vec<PersonSchema>,
    pub articles: Vec<ArticleSchema>,
    pub breadcrumbs: Vec<BreadcrumbSchema>,
    pub faqs: Vec<FaqSchema>,
}

impl DecodedSchemas {
    /// Decode every recognizable entity from raw structured-data trees.
    #[must_use]
    pub fn from_objects(objects: &[Value]) -> Self {
        let mut decoded = Self::default();
        for object in flatten(objects) {
            match decode_object(object) {
                Some(SchemaObject::Product(p)) => decoded.products.push(p),
                Some(SchemaObject::Organization(o)) => decoded.organizations.push(o),
                Some(SchemaObject::Review(r)) => decoded.reviews.push(r),
                Some(SchemaObject::AggregateRating(r)) => decoded.ratings.push(r),
                Some(SchemaObject::Person(p)) => decoded.persons.push(p),
                Some(SchemaObject::Article(a)) => decoded.articles.push(a),
                Some(SchemaObject::BreadcrumbList(b)) => decoded.breadcrumbs.push(b),
                Some(SchemaObject::FaqPage(f)) => decoded.faqs.push(f),
                None => {},
            }
        }
        decoded
    }

    #[must_use]
    pub fn first_product(&self) -> Option<&ProductSchema> {
        self.products.first()
    }

    #[must_use]
    pub fn first_organization(&self) -> Option<&OrganizationSchema> {
        self.organizations.first()
    }

    #[must_use]
    pub fn first_breadcrumb(&self) -> Option<&BreadcrumbSchema> {
        self.breadcrumbs.first()
    }

    /// Best aggregate rating: a product-nested one wins over standalone.
    #[must_use]
    pub fn best_rating(&self) -> Option<AggregateRatingSchema> {
        self.products
            .iter()
            .find_map(|p| p.rating)
            .or_else(|| self.ratings.first().copied())
    }

    #[must_use]
    pub fn has_faq(&self) -> bool {
        !self.faqs.is_empty()
    }
}

/// Quick probe for a type name without decoding, usable before extraction.
#[must_use]
pub fn has_type(objects: &[Value], type_name: &str) -> bool {
    flatten(objects)
        .iter()
        .any(|obj| object_type(obj).is_some_and(|t| t.eq_ignore_ascii_case(type_name)))
}

/// Flatten arrays and `@graph` containers into a list of candidate objects.
pub(crate) fn flatten(objects: &[Value]) -> Vec<&Value> {
    let mut flat = Vec::new();
    for object in objects {
        flatten_value(object, &mut flat);
    }
    flat
}

fn flatten_value<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_value(item, out);
            }
        },
        Value::Object(obj) => {
            if let Some(Value::Array(graph)) = obj.get("@graph") {
                for item in graph {
                    flatten_value(item, out);
                }
            } else {
                out.push(value);
            }
        },
        _ => {},
    }
}

/// Read `@type`, taking the first entry when it is an array.
fn object_type(value: &Value) -> Option<&str> {
    match value.get("@type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(arr) => arr.first().and_then(Value::as_str),
        _ => None,
    }
}

fn decode_object(value: &Value) -> Option<SchemaObject> {
    let type_name = object_type(value)?;
    let decoded = if type_name.eq_ignore_ascii_case("Product") {
        SchemaObject::Product(decode_product(value))
    } else if type_name.eq_ignore_ascii_case("Organization") {
        SchemaObject::Organization(decode_organization(value))
    } else if type_name.eq_ignore_ascii_case("Review") {
        SchemaObject::Review(decode_review(value))
    } else if type_name.eq_ignore_ascii_case("AggregateRating") {
        SchemaObject::AggregateRating(decode_rating(value))
    } else if type_name.eq_ignore_ascii_case("Person") {
        SchemaObject::Person(PersonSchema {
            name: str_field(value, "name"),
        })
    } else if type_name.eq_ignore_ascii_case("Article")
        || type_name.eq_ignore_ascii_case("NewsArticle")
        || type_name.eq_ignore_ascii_case("BlogPosting")
    {
        SchemaObject::Article(decode_article(value))
    } else if type_name.eq_ignore_ascii_case("BreadcrumbList") {
        SchemaObject::BreadcrumbList(decode_breadcrumbs(value))
    } else if type_name.eq_ignore_ascii_case("FAQPage") {
        SchemaObject::FaqPage(decode_faq(value))
    } else {
        return None;
    };
    Some(decoded)
}

fn decode_product(value: &Value) -> ProductSchema {
    ProductSchema {
        name: str_field(value, "name"),
        description: str_field(value, "description"),
        brand: name_or_string(value.get("brand")),
        category: str_field(value, "category"),
        image_count: count_entries(value.get("image")),
        offer: first_entry(value.get("offers")).map(decode_offer),
        rating: value.get("aggregateRating").map(decode_rating),
        gtin: first_str_of(value, &["gtin", "gtin8", "gtin13", "gtin14"]),
        mpn: str_field(value, "mpn"),
        sku: first_str_of(value, &["sku", "productID"]),
    }
}

fn decode_offer(value: &Value) -> OfferSchema {
    // AggregateOffer nests price under lowPrice
    let price = num_field(value, "price").or_else(|| num_field(value, "lowPrice"));
    OfferSchema {
        price,
        currency: str_field(value, "priceCurrency"),
        availability: str_field(value, "availability")
            .as_deref()
            .map(parse_availability),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn decode_rating(value: &Value) -> AggregateRatingSchema {
    AggregateRatingSchema {
        value: num_field(value, "ratingValue"),
        count: num_field(value, "reviewCount")
            .or_else(|| num_field(value, "ratingCount"))
            .map(|n| n.max(0.0) as u32),
    }
}

fn decode_organization(value: &Value) -> OrganizationSchema {
    let same_as = match value.get("sameAs") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    OrganizationSchema {
        name: str_field(value, "name"),
        description: str_field(value, "description"),
        logo: name_or_url(value.get("logo")),
        same_as,
    }
}

fn decode_article(value: &Value) -> ArticleSchema {
    ArticleSchema {
        headline: str_field(value, "headline").or_else(|| str_field(value, "name")),
        author: name_or_string(value.get("author")),
    }
}

fn decode_review(value: &Value) -> ReviewSchema {
    ReviewSchema {
        rating: value
            .get("reviewRating")
            .and_then(|r| num_field(r, "ratingValue")),
        author: name_or_string(value.get("author")),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn decode_breadcrumbs(value: &Value) -> BreadcrumbSchema {
    let Some(Value::Array(elements)) = value.get("itemListElement") else {
        return BreadcrumbSchema::default();
    };
    let mut entries: Vec<(u64, String)> = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        let name = str_field(element, "name")
            .or_else(|| element.get("item").and_then(|i| str_field(i, "name")));
        if let Some(name) = name {
            let position = num_field(element, "position")
                .map_or(index as u64, |p| p.max(0.0) as u64);
            entries.push((position, name));
        }
    }
    entries.sort_by_key(|(position, _)| *position);
    BreadcrumbSchema {
        items: entries.into_iter().map(|(_, name)| name).collect(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn decode_faq(value: &Value) -> FaqSchema {
    let count = match value.get("mainEntity") {
        Some(Value::Array(items)) => items.len() as u32,
        Some(Value::Object(_)) => 1,
        _ => 0,
    };
    FaqSchema {
        question_count: count,
    }
}

/// Map a schema.org availability token or URL onto the normalized enum.
#[must_use]
pub fn parse_availability(raw: &str) -> Availability {
    let token = raw.rsplit('/').next().unwrap_or(raw).trim();
    if token.eq_ignore_ascii_case("InStock")
        || token.eq_ignore_ascii_case("InStoreOnly")
        || token.eq_ignore_ascii_case("OnlineOnly")
        || token.eq_ignore_ascii_case("LimitedAvailability")
    {
        Availability::InStock
    } else if token.eq_ignore_ascii_case("OutOfStock")
        || token.eq_ignore_ascii_case("SoldOut")
        || token.eq_ignore_ascii_case("Discontinued")
    {
        Availability::OutOfStock
    } else if token.eq_ignore_ascii_case("PreOrder")
        || token.eq_ignore_ascii_case("PreSale")
        || token.eq_ignore_ascii_case("BackOrder")
    {
        Availability::Preorder
    } else {
        Availability::Unknown
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        },
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric field that tolerates numbers serialized as strings.
fn num_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

pub(crate) fn first_str_of(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| str_field(value, key))
}

/// Accept `"Acme"` or `{"name": "Acme"}`.
fn name_or_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        obj @ Value::Object(_) => str_field(obj, "name"),
        Value::Array(items) => items.first().and_then(|v| name_or_string(Some(v))),
        _ => None,
    }
}

/// Accept `"https://..."` or `{"url": "https://..."}`.
fn name_or_url(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        obj @ Value::Object(_) => str_field(obj, "url"),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn count_entries(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::String(_) | Value::Object(_)) => 1,
        Some(Value::Array(items)) => items.len() as u32,
        _ => 0,
    }
}

/// First object from a value that may be an object or an array of objects.
fn first_entry(value: Option<&Value>) -> Option<&Value> {
    match value? {
        obj @ Value::Object(_) => Some(obj),
        Value::Array(items) => items.iter().find(|v| v.is_object()),
        _ => None,
    }
}
