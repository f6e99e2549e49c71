//! Invoice Coercion
//!
//! Maps the model's loosely typed JSON onto the strict `Invoice` record.
//! Money may arrive as numbers or strings like `"$1,299.00"`; missing
//! amounts and summary fields are derived from what is present.

use dreamhaven_models::{
    round_cents, Invoice, InvoiceSummary, LineItem, DEFAULT_SHIPPING, DEFAULT_TAX_RATE,
    DEFAULT_TERMS,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::config::InvoiceConfig;
use crate::error::{InvoiceError, InvoiceResult};
use crate::validation::validate_model;

/// Values used when the model leaves a field out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoercionDefaults {
    pub tax_rate: f64,
    pub shipping: f64,
}

impl Default for CoercionDefaults {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            shipping: DEFAULT_SHIPPING,
        }
    }
}

impl From<&InvoiceConfig> for CoercionDefaults {
    fn from(config: &InvoiceConfig) -> Self {
        Self {
            tax_rate: config.tax_rate,
            shipping: config.shipping,
        }
    }
}

/// Build a validated invoice from the parsed model output.
pub fn coerce_invoice(value: &Value, defaults: CoercionDefaults) -> InvoiceResult<Invoice> {
    let object = value
        .as_object()
        .ok_or_else(|| InvoiceError::validation("invoice", "Expected a JSON object"))?;

    let bill_to = object
        .get("bill_to")
        .map(text_of)
        .unwrap_or_default();

    let items = match object.get("items") {
        Some(Value::Array(raw_items)) => raw_items
            .iter()
            .enumerate()
            .map(|(idx, raw)| coerce_item(idx, raw))
            .collect::<InvoiceResult<Vec<_>>>()?,
        Some(_) => return Err(InvoiceError::validation("items", "Expected a list of items")),
        None => Vec::new(),
    };

    let summary = coerce_summary(object.get("summary"), &items, defaults);

    let terms = object
        .get("terms")
        .map(text_of)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TERMS.to_string());

    let invoice = Invoice {
        bill_to,
        items,
        summary,
        terms,
        delivery_summary: String::new(),
    };

    validate_model(&invoice)?;
    Ok(invoice)
}

fn coerce_item(idx: usize, raw: &Value) -> InvoiceResult<LineItem> {
    let field = |name: &str| format!("items[{}].{}", idx, name);

    let item = match raw {
        Value::Object(item) => item,
        // A bare string is a description with no price; reject with context.
        _ => return Err(InvoiceError::validation(field("description"), "Expected an item object")),
    };

    let description = item
        .get("description")
        .map(text_of)
        .unwrap_or_default()
        .trim()
        .to_string();

    let quantity = lookup(item, &["quantity", "qty"])
        .and_then(number_of)
        .filter(|q| *q >= 1.0)
        .map(|q| q.round() as u32)
        .unwrap_or(1);

    let unit_price = lookup(item, &["unit_price", "price"]).and_then(number_of);
    let amount = lookup(item, &["amount", "total"]).and_then(number_of);

    let (unit_price, amount) = match (unit_price, amount) {
        (Some(price), Some(amount)) => (price, amount),
        (Some(price), None) => (price, round_cents(price * quantity as f64)),
        (None, Some(amount)) => (round_cents(amount / quantity as f64), amount),
        (None, None) => {
            return Err(InvoiceError::validation(
                field("unit_price"),
                "Item has neither a unit price nor an amount",
            ))
        }
    };

    Ok(LineItem {
        description,
        unit_price,
        quantity,
        amount,
    })
}

fn coerce_summary(raw: Option<&Value>, items: &[LineItem], defaults: CoercionDefaults) -> InvoiceSummary {
    let derived = InvoiceSummary::from_items(items, defaults.tax_rate, defaults.shipping);

    let raw = match raw.and_then(Value::as_object) {
        Some(raw) => raw,
        None => return derived,
    };

    let find = |prefix: &str| {
        raw.iter()
            .find(|(key, _)| key.trim().to_lowercase().starts_with(prefix))
            .and_then(|(_, v)| number_of(v))
    };

    let subtotal = find("subtotal").unwrap_or(derived.subtotal);
    let tax = find("tax").unwrap_or_else(|| round_cents(subtotal * defaults.tax_rate));
    let shipping = find("shipping").unwrap_or(defaults.shipping);
    let total = find("total").unwrap_or_else(|| round_cents(subtotal + tax + shipping));

    InvoiceSummary {
        subtotal,
        tax,
        shipping,
        total,
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key)).filter(|v| !v.is_null())
}

/// Read a number from a JSON number or a money-like string.
pub fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_money(s),
        _ => None,
    }
}

fn money_token() -> &'static Regex {
    static MONEY_TOKEN: OnceLock<Regex> = OnceLock::new();
    MONEY_TOKEN.get_or_init(|| {
        Regex::new(r"(\$\s*)?(-?\d[\d,]*(?:\.\d+)?)").expect("money token regex is valid")
    })
}

/// Parse `"$1,299.00"`, `"69"`, `"12.5 USD"` and similar.
///
/// With several numbers in the text, the first `$`-prefixed one wins, then the
/// first one overall: `"2 x $50"` is 50, `"499 (was 599)"` is 499.
pub fn parse_money(text: &str) -> Option<f64> {
    let tokens: Vec<_> = money_token().captures_iter(text).collect();
    let token = tokens
        .iter()
        .find(|caps| caps.get(1).is_some())
        .or_else(|| tokens.first())?
        .get(2)?;

    // "1.2.3" is not a price
    let rest = &text[token.end()..];
    if rest.starts_with('.') && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    token
        .as_str()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Flatten a string, list or object of strings into one line of text.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(parts) => join_parts(parts.iter()),
        Value::Object(parts) => join_parts(parts.values()),
        _ => String::new(),
    }
}

fn join_parts<'a>(parts: impl Iterator<Item = &'a Value>) -> String {
    parts
        .map(text_of)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn well_formed() -> Value {
        json!({
            "bill_to": "1200 Elm St, Dallas TX 75201 469-555-0134",
            "items": [
                {"description": "Queen mattress, white", "unit_price": 499.0, "amount": 499.0},
                {"description": "Bed frame, grey velvet", "unit_price": 350.0, "amount": 350.0}
            ],
            "summary": {"Subtotal": 849.0, "Tax (8.25%)": 70.04, "Shipping": 69.0, "Total": 988.04},
            "terms": "All sales are final.",
            "delivery_summary": ""
        })
    }

    #[test]
    fn test_well_formed_invoice() {
        let invoice = coerce_invoice(&well_formed(), CoercionDefaults::default()).unwrap();

        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.items[0].quantity, 1);
        assert_eq!(invoice.summary.total, 988.04);
        assert_eq!(invoice.terms, "All sales are final.");
    }

    #[test]
    fn test_money_strings_are_coerced() {
        let value = json!({
            "bill_to": "12 Oak St 469-555-0100",
            "items": [{"description": "Sectional sofa", "unit_price": "$1,299.00", "qty": "2"}],
            "summary": {"subtotal": "$2,598.00", "tax": "214.34", "shipping": "69", "total": "2881.34 USD"}
        });
        let invoice = coerce_invoice(&value, CoercionDefaults::default()).unwrap();

        assert_eq!(invoice.items[0].unit_price, 1299.0);
        assert_eq!(invoice.items[0].quantity, 2);
        assert_eq!(invoice.items[0].amount, 2598.0);
        assert_eq!(invoice.summary.subtotal, 2598.0);
        assert_eq!(invoice.summary.tax, 214.34);
        assert_eq!(invoice.summary.total, 2881.34);
    }

    #[test]
    fn test_missing_summary_is_derived() {
        let value = json!({
            "bill_to": "12 Oak St 469-555-0100",
            "items": [{"description": "Dresser", "amount": 200}]
        });
        let invoice = coerce_invoice(&value, CoercionDefaults::default()).unwrap();

        assert_eq!(invoice.items[0].unit_price, 200.0);
        assert_eq!(invoice.summary.subtotal, 200.0);
        assert_eq!(invoice.summary.tax, 16.5);
        assert_eq!(invoice.summary.shipping, 69.0);
        assert_eq!(invoice.summary.total, 285.5);
        assert_eq!(invoice.terms, DEFAULT_TERMS);
    }

    #[test]
    fn test_partial_summary_fills_gaps() {
        let value = json!({
            "bill_to": "12 Oak St 469-555-0100",
            "items": [{"description": "Nightstand", "unit_price": 100}],
            "summary": {"Shipping": 0}
        });
        let invoice = coerce_invoice(&value, CoercionDefaults::default()).unwrap();

        assert_eq!(invoice.summary.shipping, 0.0);
        assert_eq!(invoice.summary.tax, 8.25);
        assert_eq!(invoice.summary.total, 108.25);
    }

    #[test]
    fn test_structured_bill_to_is_joined() {
        let mut value = well_formed();
        value["bill_to"] = json!({"address": "1200 Elm St, Dallas TX", "phone": "469-555-0134"});
        let invoice = coerce_invoice(&value, CoercionDefaults::default()).unwrap();

        assert_eq!(invoice.bill_to, "1200 Elm St, Dallas TX, 469-555-0134");
        assert_eq!(invoice.contact(), "469-555-0134");
    }

    #[test]
    fn test_item_without_price_is_rejected() {
        let mut value = well_formed();
        value["items"] = json!([{"description": "Mystery item"}]);
        let err = coerce_invoice(&value, CoercionDefaults::default()).unwrap_err();

        assert!(err.to_string().contains("items[0].unit_price"));
    }

    #[test]
    fn test_empty_items_fail_validation() {
        let mut value = well_formed();
        value["items"] = json!([]);
        assert!(coerce_invoice(&value, CoercionDefaults::default()).is_err());
    }

    #[test]
    fn test_missing_bill_to_fails_validation() {
        let mut value = well_formed();
        value.as_object_mut().unwrap().remove("bill_to");
        let err = coerce_invoice(&value, CoercionDefaults::default()).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("$1,299.00"), Some(1299.0));
        assert_eq!(parse_money("69"), Some(69.0));
        assert_eq!(parse_money("12.5 USD"), Some(12.5));
        assert_eq!(parse_money("free"), None);
        assert_eq!(parse_money("1.2.3"), None);
    }

    #[test]
    fn test_parse_money_picks_one_number() {
        assert_eq!(parse_money("2 x $50"), Some(50.0));
        assert_eq!(parse_money("499 (was 599)"), Some(499.0));
        assert_eq!(parse_money("$1,050.00 after $200 off"), Some(1050.0));
    }

    #[test]
    fn test_price_with_quantity_text_is_not_concatenated() {
        let value = json!({
            "bill_to": "12 Oak St 469-555-0100",
            "items": [{"description": "Chair", "unit_price": "2 x $50"}]
        });
        let invoice = coerce_invoice(&value, CoercionDefaults::default()).unwrap();

        assert_eq!(invoice.items[0].unit_price, 50.0);
        assert_eq!(invoice.items[0].amount, 50.0);
    }

    #[test]
    fn test_non_positive_quantity_becomes_one() {
        for quantity in [json!(0), json!(-2), json!("0")] {
            let value = json!({
                "bill_to": "12 Oak St 469-555-0100",
                "items": [{"description": "Lamp", "unit_price": 40, "quantity": quantity}]
            });
            let invoice = coerce_invoice(&value, CoercionDefaults::default()).unwrap();

            assert_eq!(invoice.items[0].quantity, 1);
            assert_eq!(invoice.items[0].amount, 40.0);
        }
    }

    #[test]
    fn test_unit_price_derived_from_amount_and_quantity() {
        let value = json!({
            "bill_to": "12 Oak St 469-555-0100",
            "items": [{"description": "Dining chair", "amount": "$300.00", "quantity": 3}]
        });
        let invoice = coerce_invoice(&value, CoercionDefaults::default()).unwrap();

        assert_eq!(invoice.items[0].quantity, 3);
        assert_eq!(invoice.items[0].unit_price, 100.0);
        assert_eq!(invoice.items[0].amount, 300.0);
        assert_eq!(invoice.summary.subtotal, 300.0);
    }

    #[test]
    fn test_array_bill_to_is_joined() {
        let mut value = well_formed();
        value["bill_to"] = json!(["12 Oak St", "Dallas TX 75201", "469-555-0100"]);
        let invoice = coerce_invoice(&value, CoercionDefaults::default()).unwrap();

        assert_eq!(invoice.bill_to, "12 Oak St, Dallas TX 75201, 469-555-0100");
        assert_eq!(invoice.contact(), "469-555-0100");
    }
}
