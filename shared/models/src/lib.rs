//! # DreamHaven Core Domain Models
//!
//! Record types shared by the invoicing pipeline and the web service.
//!
//! ## Key Models
//!
//! - **Invoice**: billing block, ordered line items, the four-field summary,
//!   legal terms and the derived delivery summary
//! - **LineItem**: description, unit price, quantity and amount
//! - **InvoiceNumber**: the sequential identity printed on each PDF
//! - **BatchOutcome**: per-order results and failures for one submission
//!
//! ## Validation
//!
//! `Invoice` derives `validator::Validate`: a billing block and at least one
//! item are required, money fields must not be negative and quantities start
//! at one.

pub mod invoice;
pub mod order;


pub use invoice::*;
pub use order::*;
