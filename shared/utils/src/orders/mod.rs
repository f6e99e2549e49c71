//! Order Processing Module
//!
//! Turns a pasted multi-order blob into validated invoice records.
//! Splitting, prompt construction, response cleanup, JSON extraction with a
//! regex fallback, and coercion of the model's loose JSON into `Invoice`.

pub mod splitter;
pub mod prompt;
pub mod sanitize;
pub mod extractor;
pub mod coerce;

pub use splitter::OrderSplitter;
pub use prompt::{build_invoice_prompt, SYSTEM_PROMPT};
pub use sanitize::sanitize_response;
pub use extractor::{parse_model_output, ExtractionMethod, ExtractionOutcome};
pub use coerce::{coerce_invoice, CoercionDefaults};
