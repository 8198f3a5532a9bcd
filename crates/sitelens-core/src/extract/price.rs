//! Price recovery from visible text.
//!
//! Four pattern families are tried in a fixed order: currency-symbol
//! prefixes, ISO currency codes next to an amount, labelled price phrases,
//! and rupee shorthand. Within a family the first non-zero amount wins;
//! a zero amount ("$0 down") is skipped and scanning continues. Callers
//! check structured-data offers before ever reaching this module.

use regex::Regex;
use std::sync::LazyLock;

/// A price recovered from text, with the matched fragment kept for audit.
///
/// `currency_explicit` distinguishes an ISO code written out on the page
/// from a currency merely implied by a symbol; only the former is strong
/// enough evidence to stand as a currency fact on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatch {
    pub amount: f64,
    pub currency: Option<String>,
    pub currency_explicit: bool,
    pub raw: String,
}

/// Regex for single-glyph and short-prefix currency symbols.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static SYMBOL_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:([$₹€£¥₽₩])|\b(Rs|RM|kr|zł|R\$|C\$|A\$)\.?)\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)")
        .unwrap()
});

/// Regex for an ISO code before the amount.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static CODE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]{3})\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)\b").unwrap()
});

/// Regex for an ISO code after the amount.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static CODE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9][0-9,]*(?:\.[0-9]{1,2})?)\s*([A-Z]{3})\b").unwrap()
});

/// Regex for labelled price phrases.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static LABELLED_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:price|mrp)\s*[:\-]?\s*([$₹€£¥₽₩])?\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)")
        .unwrap()
});

/// Regex for rupee shorthand.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static RUPEE_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:rs\.?|inr)\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)").unwrap()
});

const KNOWN_CODES: &[&str] = &[
    "USD", "EUR", "GBP", "INR", "JPY", "CNY", "RUB", "KRW", "AUD", "CAD", "CHF", "SEK", "NOK",
    "DKK", "SGD", "HKD", "NZD", "AED", "BRL", "MYR", "PLN",
];

fn symbol_currency(symbol: &str) -> Option<&'static str> {
    match symbol {
        "$" => Some("USD"),
        "₹" | "Rs" => Some("INR"),
        "€" => Some("EUR"),
        "£" => Some("GBP"),
        "¥" => Some("JPY"),
        "₽" => Some("RUB"),
        "₩" => Some("KRW"),
        "RM" => Some("MYR"),
        "kr" => Some("SEK"),
        "zł" => Some("PLN"),
        "R$" => Some("BRL"),
        "C$" => Some("CAD"),
        "A$" => Some("AUD"),
        _ => None,
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

/// Scan text for a price, trying each family in order.
///
/// Returns the first non-zero amount found, together with the currency the
/// match implies. An explicit ISO code always beats a symbol-derived one.
#[must_use]
pub fn find_price(text: &str) -> Option<PriceMatch> {
    for caps in SYMBOL_PRICE_RE.captures_iter(text) {
        let Some(amount) = caps.get(3).and_then(|m| parse_amount(m.as_str())) else {
            continue;
        };
        if amount > 0.0 {
            let symbol = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            return Some(PriceMatch {
                amount,
                currency: symbol_currency(symbol).map(str::to_string),
                currency_explicit: false,
                raw: caps[0].trim().to_string(),
            });
        }
    }

    let coded = CODE_PREFIX_RE
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string(), caps[0].to_string()))
        .chain(
            CODE_SUFFIX_RE
                .captures_iter(text)
                .map(|caps| (caps[2].to_string(), caps[1].to_string(), caps[0].to_string())),
        );
    for (code, amount_raw, raw) in coded {
        if !KNOWN_CODES.contains(&code.as_str()) {
            continue;
        }
        let Some(amount) = parse_amount(&amount_raw) else {
            continue;
        };
        if amount > 0.0 {
            return Some(PriceMatch {
                amount,
                currency: Some(code),
                currency_explicit: true,
                raw: raw.trim().to_string(),
            });
        }
    }

    for caps in LABELLED_PRICE_RE.captures_iter(text) {
        let Some(amount) = caps.get(2).and_then(|m| parse_amount(m.as_str())) else {
            continue;
        };
        if amount > 0.0 {
            let currency = caps
                .get(1)
                .and_then(|m| symbol_currency(m.as_str()))
                .map(str::to_string);
            return Some(PriceMatch {
                amount,
                currency,
                currency_explicit: false,
                raw: caps[0].trim().to_string(),
            });
        }
    }

    for caps in RUPEE_PRICE_RE.captures_iter(text) {
        let Some(amount) = caps.get(1).and_then(|m| parse_amount(m.as_str())) else {
            continue;
        };
        if amount > 0.0 {
            return Some(PriceMatch {
                amount,
                currency: Some("INR".to_string()),
                currency_explicit: false,
                raw: caps[0].trim().to_string(),
            });
        }
    }

    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn dollar_symbol_with_cents() {
        let price = find_price("Wireless Mouse - only $29.99 today").unwrap();
        assert!((price.amount - 29.99).abs() < f64::EPSILON);
        assert_eq!(price.currency.as_deref(), Some("USD"));
        assert!(!price.currency_explicit);
        assert_eq!(price.raw, "$29.99");
    }

    #[test]
    fn symbol_table_covers_major_currencies() {
        let cases = [
            ("now €49", "EUR", 49.0),
            ("£12.50 delivered", "GBP", 12.5),
            ("¥1,200", "JPY", 1200.0),
            ("₹1,299 only", "INR", 1299.0),
            ("₩99,000", "KRW", 99_000.0),
            ("₽750", "RUB", 750.0),
        ];
        for (text, code, amount) in cases {
            let price = find_price(text).unwrap();
            assert_eq!(price.currency.as_deref(), Some(code), "{text}");
            assert!((price.amount - amount).abs() < f64::EPSILON, "{text}");
        }
    }

    #[test]
    fn short_prefix_symbols() {
        let price = find_price("RM 89 nationwide shipping").unwrap();
        assert_eq!(price.currency.as_deref(), Some("MYR"));
        assert!((price.amount - 89.0).abs() < f64::EPSILON);
    }

    #[test]
    fn explicit_iso_code_wins_over_nothing() {
        let price = find_price("Subtotal 49.99 USD at checkout").unwrap();
        assert_eq!(price.currency.as_deref(), Some("USD"));
        assert!(price.currency_explicit);
        assert!((price.amount - 49.99).abs() < f64::EPSILON);
    }

    #[test]
    fn iso_code_prefix_form() {
        let price = find_price("From EUR 120 per set").unwrap();
        assert_eq!(price.currency.as_deref(), Some("EUR"));
        assert!((price.amount - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_three_letter_words_are_not_codes() {
        assert!(find_price("THE 300 club").is_none());
    }

    #[test]
    fn labelled_price_without_symbol() {
        let price = find_price("Price: 19.99").unwrap();
        assert!((price.amount - 19.99).abs() < f64::EPSILON);
        assert_eq!(price.currency, None);
    }

    #[test]
    fn mrp_label() {
        let price = find_price("MRP 999 incl. taxes").unwrap();
        assert!((price.amount - 999.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rupee_shorthand() {
        let price = find_price("Special offer Rs. 2,499").unwrap();
        assert_eq!(price.currency.as_deref(), Some("INR"));
        assert!((price.amount - 2499.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_amounts_are_skipped() {
        let price = find_price("$0 down payment, then $49.99 per month").unwrap();
        assert!((price.amount - 49.99).abs() < f64::EPSILON);
    }

    #[test]
    fn first_family_wins_over_later_families() {
        // Symbol family is consulted before the labelled family
        let price = find_price("Price: 10.00 but marked $12.50 on the tag").unwrap();
        assert!((price.amount - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn no_price_returns_none() {
        assert!(find_price("Free shipping on all orders").is_none());
        assert!(find_price("").is_none());
    }

    #[test]
    fn thousands_separators_are_normalized() {
        let price = find_price("$1,299,000").unwrap();
        assert!((price.amount - 1_299_000.0).abs() < f64::EPSILON);
    }
}
