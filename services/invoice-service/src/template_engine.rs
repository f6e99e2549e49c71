//! Page Template Engine
//!
//! Handlebars rendering for the order form and results page.

use dreamhaven_models::{BatchOutcome, OrderResult, ProcessingFailure};
use dreamhaven_utils::{InvoiceError, InvoiceResult};
use handlebars::Handlebars;
use serde::Serialize;

const INDEX_TEMPLATE: &str = "index";

/// Data bound into the index page
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageContext {
    pub company_name: String,
    pub order_details: String,
    pub results: Vec<OrderResult>,
    pub failures: Vec<ProcessingFailure>,
    pub error: Option<String>,
}

impl PageContext {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..Default::default()
        }
    }

    pub fn with_outcome(mut self, outcome: BatchOutcome) -> Self {
        self.results = outcome.results;
        self.failures = outcome.failures;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Keep the pasted text in the form after a submission.
    pub fn with_order_details(mut self, order_details: impl Into<String>) -> Self {
        self.order_details = order_details.into();
        self
    }
}

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> InvoiceResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars
            .register_template_string(INDEX_TEMPLATE, include_str!("../templates/index.hbs"))
            .map_err(|e| InvoiceError::configuration(format!("Invalid page template: {}", e)))?;

        Ok(Self { handlebars })
    }

    pub fn render_index(&self, context: &PageContext) -> InvoiceResult<String> {
        self.handlebars
            .render(INDEX_TEMPLATE, context)
            .map_err(|e| InvoiceError::internal(format!("Template rendering failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamhaven_models::InvoiceNumber;

    #[test]
    fn test_empty_form() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine.render_index(&PageContext::new("DREAMHAVEN BEDDING & FURNITURE")).unwrap();

        assert!(html.contains("name=\"order_details\""));
        assert!(html.contains("DREAMHAVEN BEDDING &amp; FURNITURE"));
        assert!(!html.contains("class=\"invoice\""));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_results_and_failures_are_listed() {
        let engine = TemplateEngine::new().unwrap();
        let outcome = BatchOutcome {
            results: vec![OrderResult {
                invoice_number: InvoiceNumber(2501),
                pdf_url: "/invoices/Invoice_2501.pdf".to_string(),
                delivery_summary: "Delivery 🚚 2501\n\nSofa".to_string(),
            }],
            failures: vec![ProcessingFailure {
                order_index: 2,
                invoice_number: Some(InvoiceNumber(2502)),
                code: "MODEL_OUTPUT_ERROR".to_string(),
                message: "No JSON object found in model output".to_string(),
            }],
        };
        let context = PageContext::new("Store").with_outcome(outcome);
        let html = engine.render_index(&context).unwrap();

        assert!(html.contains("Invoice #2501"));
        assert!(html.contains("href=\"/invoices/Invoice_2501.pdf\""));
        assert!(html.contains("Delivery 🚚 2501"));
        assert!(html.contains("Order 2 failed (invoice #2502)"));
        assert!(html.contains("MODEL_OUTPUT_ERROR"));
    }

    #[test]
    fn test_pasted_text_is_escaped() {
        let engine = TemplateEngine::new().unwrap();
        let context = PageContext::new("Store")
            .with_order_details("<script>alert(1)</script>")
            .with_error("Order details are required");
        let html = engine.render_index(&context).unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Order details are required"));
    }
}
