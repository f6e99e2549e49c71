//! Invoice domain models for the DreamHaven invoicing tool.
//!
//! An [`Invoice`] is built once per pasted order from the language model's
//! output, rendered into a single PDF and then dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// Sales tax applied by the store (8.25%).
pub const DEFAULT_TAX_RATE: f64 = 0.0825;

/// Flat delivery charge added to every order.
pub const DEFAULT_SHIPPING: f64 = 69.00;

/// Legal terms printed at the bottom of every invoice.
pub const DEFAULT_TERMS: &str = "All sales are final; no refunds. Special orders are not subject to cancellation. \
A 30% restocking fee applies for seller-approved exchanges, cancellations, or returns. \
Buyer assumes responsibility for transportation of merchandise picked up. \
Seller is not liable for items that do not fit due to size constraints. \
Delivery schedule changes require a 24-hour notice to avoid extra fees. \
Report damages within three days for replacement of the damaged part.";

pub const SUBTOTAL_LABEL: &str = "Subtotal";
pub const SHIPPING_LABEL: &str = "Shipping";
pub const TOTAL_LABEL: &str = "Total";

/// Sequential invoice number, the only identity an invoice carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(pub u32);

impl InvoiceNumber {
    pub fn value(&self) -> u32 {
        self.0
    }

    /// File name of the rendered PDF, e.g. `Invoice_2501.pdf`.
    pub fn pdf_file_name(&self) -> String {
        format!("Invoice_{}.pdf", self.0)
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single row of the invoice table.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct LineItem {
    #[validate(length(min = 1, max = 1000, message = "Item description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Unit price must not be negative"))]
    pub unit_price: f64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    #[validate(range(min = 0.0, message = "Amount must not be negative"))]
    pub amount: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, unit_price: f64, quantity: u32) -> Self {
        let quantity = quantity.max(1);
        Self {
            description: description.into(),
            unit_price,
            quantity,
            amount: round_cents(unit_price * quantity as f64),
        }
    }
}

/// The four fixed money fields printed under the item table.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct InvoiceSummary {
    #[serde(rename = "Subtotal")]
    #[validate(range(min = 0.0, message = "Subtotal must not be negative"))]
    pub subtotal: f64,
    /// Serialized under the default-rate key; model replies are matched on the `tax` prefix.
    #[serde(rename = "Tax (8.25%)")]
    #[validate(range(min = 0.0, message = "Tax must not be negative"))]
    pub tax: f64,
    #[serde(rename = "Shipping")]
    #[validate(range(min = 0.0, message = "Shipping must not be negative"))]
    pub shipping: f64,
    #[serde(rename = "Total")]
    #[validate(range(min = 0.0, message = "Total must not be negative"))]
    pub total: f64,
}

impl InvoiceSummary {
    /// Derive the summary from line items with the given tax rate and shipping.
    pub fn from_items(items: &[LineItem], tax_rate: f64, shipping: f64) -> Self {
        let subtotal = round_cents(items.iter().map(|i| i.amount).sum());
        let tax = round_cents(subtotal * tax_rate);
        Self {
            subtotal,
            tax,
            shipping,
            total: round_cents(subtotal + tax + shipping),
        }
    }

    /// Label/value pairs in print order, with the tax row labelled for `tax_rate`.
    pub fn rows(&self, tax_rate: f64) -> [(String, f64); 4] {
        [
            (SUBTOTAL_LABEL.to_string(), self.subtotal),
            (tax_label(tax_rate), self.tax),
            (SHIPPING_LABEL.to_string(), self.shipping),
            (TOTAL_LABEL.to_string(), self.total),
        ]
    }
}

/// Structured invoice extracted from a free-text order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Invoice {
    #[validate(length(min = 1, max = 2000, message = "Billing address is required"))]
    pub bill_to: String,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    #[validate]
    pub items: Vec<LineItem>,
    #[validate]
    pub summary: InvoiceSummary,
    #[validate(custom = "validate_terms")]
    pub terms: String,
    #[serde(default)]
    pub delivery_summary: String,
}

impl Invoice {
    pub fn new(bill_to: impl Into<String>, items: Vec<LineItem>, summary: InvoiceSummary) -> Self {
        Self {
            bill_to: bill_to.into(),
            items,
            summary,
            terms: DEFAULT_TERMS.to_string(),
            delivery_summary: String::new(),
        }
    }

    /// Item descriptions joined for the delivery summary.
    pub fn item_descriptions(&self) -> String {
        self.items
            .iter()
            .map(|i| i.description.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Last whitespace-separated token of the billing block.
    ///
    /// The prompt asks for "address and contact number", so the phone number
    /// ends up last.
    pub fn contact(&self) -> &str {
        self.bill_to.split_whitespace().last().unwrap_or("")
    }

    /// Text the operator pastes into the delivery driver's chat.
    pub fn build_delivery_summary(&self, number: InvoiceNumber) -> String {
        format!(
            "Delivery 🚚 {}\n\n{}\n\nAddress: {}\n\nContact: {}\n\nTotal: {}",
            number,
            self.item_descriptions(),
            self.bill_to,
            self.contact(),
            format_currency(self.summary.total),
        )
    }

    pub fn with_delivery_summary(mut self, number: InvoiceNumber) -> Self {
        self.delivery_summary = self.build_delivery_summary(number);
        self
    }
}

fn validate_terms(terms: &str) -> Result<(), ValidationError> {
    if terms.trim().is_empty() {
        return Err(ValidationError::new("terms_required"));
    }
    Ok(())
}

/// Format a money value as `$1234.50`.
pub fn format_currency(value: f64) -> String {
    format!("${:.2}", value)
}

/// Tax row label for a rate, e.g. `Tax (8.25%)` for `0.0825`.
pub fn tax_label(rate: f64) -> String {
    let percent = format!("{:.2}", rate * 100.0);
    format!("Tax ({}%)", percent.trim_end_matches('0').trim_end_matches('.'))
}

/// Round to whole cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
