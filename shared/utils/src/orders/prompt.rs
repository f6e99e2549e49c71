//! Invoice extraction prompt.

use dreamhaven_models::{tax_label, DEFAULT_TERMS};

use super::coerce::CoercionDefaults;

pub const SYSTEM_PROMPT: &str =
    "You convert furniture store orders into invoice JSON. Reply with a single JSON object and nothing else.";

/// Build the user prompt for one order, quoting the store's tax rate and shipping.
pub fn build_invoice_prompt(order_details: &str, pricing: CoercionDefaults) -> String {
    format!(
        r#"Given order details:
{order}

Return ONLY VALID JSON matching exactly this structure:

{{
    "bill_to": "Customer address and contact number ONLY (no names)",
    "items": [
        {{
            "description": "Actual item details clearly stated, including color",
            "unit_price": price,
            "quantity": 1,
            "amount": price
        }},
        {{
            "description": "Additional actual item details, clearly stated including color",
            "unit_price": 0.0,
            "quantity": 1,
            "amount": 0.0
        }}
    ],
    "summary": {{
        "Subtotal": amount,
        "{tax_key}": amount,
        "Shipping": {shipping:.2},
        "Total": amount
    }},
    "terms": "{terms}",
    "delivery_summary": ""
}}

Use plain numbers without currency symbols. Put the contact number last in bill_to.
Do not wrap the JSON in markdown."#,
        order = order_details.trim(),
        tax_key = tax_label(pricing.tax_rate),
        shipping = pricing.shipping,
        terms = DEFAULT_TERMS,
    )
}
