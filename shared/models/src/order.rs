use serde::{Deserialize, Serialize};

use crate::InvoiceNumber;

/// One successfully invoiced order, as shown on the results page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderResult {
    pub invoice_number: InvoiceNumber,
    pub pdf_url: String,
    pub delivery_summary: String,
}

/// An order that could not be invoiced. The rest of the batch still runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingFailure {
    /// Position of the order in the pasted text, starting at 1.
    pub order_index: usize,
    pub invoice_number: Option<InvoiceNumber>,
    pub code: String,
    pub message: String,
}

/// Everything produced for one form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchOutcome {
    pub results: Vec<OrderResult>,
    pub failures: Vec<ProcessingFailure>,
}

impl BatchOutcome {
    pub fn order_count(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order_count() == 0
    }
}
