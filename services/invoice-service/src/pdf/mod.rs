//! Invoice PDF generation

pub mod layout;
pub mod renderer;

pub use layout::{Align, FontStyle, InvoiceLayout, LayoutOp, RowColumn};
pub use renderer::{PdfRenderer, RenderedPdf};

use dreamhaven_models::InvoiceNumber;
use dreamhaven_utils::InvoiceResult;
use std::path::{Path, PathBuf};

/// URL prefix the output directory is served under.
pub const INVOICE_URL_PREFIX: &str = "/invoices";

/// Write the rendered invoice as `Invoice_{n}.pdf` under `dir`.
pub async fn write_invoice_pdf(dir: &Path, number: InvoiceNumber, bytes: &[u8]) -> InvoiceResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(number.pdf_file_name());
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

pub fn invoice_url(number: InvoiceNumber) -> String {
    format!("{}/{}", INVOICE_URL_PREFIX, number.pdf_file_name())
}
