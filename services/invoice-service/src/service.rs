//! Invoice Service
//!
//! Runs pasted order text through split → extract → parse → coerce →
//! render → write, one order at a time.

use chrono::{Local, NaiveDate};
use dreamhaven_models::{BatchOutcome, Invoice, InvoiceNumber, OrderResult, ProcessingFailure};
use dreamhaven_utils::{
    coerce_invoice, log_error, ExtractionMethod, parse_model_output, validate_order_length, validate_order_text,
    AppConfig, CoercionDefaults, CompanyConfig, InvoiceError, InvoiceResult, OrderSplitter,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::llm_client::InvoiceExtractor;
use crate::numbering::InvoiceCounter;
use crate::pdf::{invoice_url, write_invoice_pdf, InvoiceLayout, PdfRenderer};

#[derive(Clone)]
pub struct InvoiceService {
    splitter: OrderSplitter,
    extractor: Arc<dyn InvoiceExtractor>,
    counter: Arc<InvoiceCounter>,
    renderer: PdfRenderer,
    company: CompanyConfig,
    output_dir: PathBuf,
    defaults: CoercionDefaults,
}

impl InvoiceService {
    pub fn new(config: &AppConfig, extractor: Arc<dyn InvoiceExtractor>) -> InvoiceResult<Self> {
        Ok(Self {
            splitter: OrderSplitter::new(&config.invoice.order_delimiter)?,
            extractor,
            counter: Arc::new(InvoiceCounter::new(
                &config.invoice.counter_file,
                config.invoice.starting_number,
            )),
            renderer: PdfRenderer::default(),
            company: config.company.clone(),
            output_dir: PathBuf::from(&config.invoice.output_dir),
            defaults: CoercionDefaults::from(&config.invoice),
        })
    }

    pub fn counter(&self) -> &InvoiceCounter {
        &self.counter
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    /// Invoice every order in `text`. Blank input is rejected up front; after
    /// that a failing order is recorded and the remaining orders still run.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn process_orders(&self, text: &str) -> InvoiceResult<BatchOutcome> {
        validate_order_text(text)?;

        let orders = self.splitter.split(text);
        if orders.is_empty() {
            return Err(InvoiceError::validation("order_details", "No orders found in the pasted text"));
        }
        info!(order_count = orders.len(), "Processing orders");

        let mut outcome = BatchOutcome::default();
        for (idx, order) in orders.iter().enumerate() {
            let order_index = idx + 1;
            let mut reserved = None;

            match self.process_order(order, &mut reserved).await {
                Ok(result) => outcome.results.push(result),
                Err(err) => {
                    log_error!(err, "Failed to invoice order", order_index = order_index, code = err.error_code());
                    outcome.failures.push(ProcessingFailure {
                        order_index,
                        invoice_number: reserved,
                        code: err.error_code().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            invoiced = outcome.results.len(),
            failed = outcome.failures.len(),
            "Finished processing orders"
        );
        Ok(outcome)
    }

    /// The number is reserved before the model is called, so an order that
    /// fails after that point still consumes it. Oversized orders are
    /// rejected first and take no number.
    async fn process_order(
        &self,
        order: &str,
        reserved: &mut Option<InvoiceNumber>,
    ) -> InvoiceResult<OrderResult> {
        validate_order_length(order)?;

        let number = self.counter.next().await?;
        *reserved = Some(number);

        let raw = self.extractor.extract(order).await?;
        let extracted = parse_model_output(&raw)?;
        if extracted.method != ExtractionMethod::Direct {
            warn!(invoice_number = %number, method = extracted.method.as_str(), "Model output needed cleanup");
        }

        let invoice = coerce_invoice(&extracted.value, self.defaults)?.with_delivery_summary(number);
        self.render_and_store(&invoice, number, Local::now().date_naive()).await?;

        info!(invoice_number = %number, items = invoice.items.len(), total = invoice.summary.total, "Invoice created");

        Ok(OrderResult {
            invoice_number: number,
            pdf_url: invoice_url(number),
            delivery_summary: invoice.delivery_summary,
        })
    }

    async fn render_and_store(&self, invoice: &Invoice, number: InvoiceNumber, date: NaiveDate) -> InvoiceResult<PathBuf> {
        let ops = InvoiceLayout::build(invoice, number, date, &self.company, self.defaults.tax_rate);
        let renderer = self.renderer.clone();
        let title = format!("Invoice {}", number);

        let rendered = tokio::task::spawn_blocking(move || renderer.render(&title, &ops))
            .await
            .map_err(|e| InvoiceError::internal(format!("PDF task failed: {}", e)))??;

        let path = write_invoice_pdf(&self.output_dir, number, &rendered.bytes).await?;
        info!(invoice_number = %number, pages = rendered.page_count, path = %path.display(), "Invoice PDF written");
        Ok(path)
    }
}
