//! Invoice page layout expressed as a flat list of drawing instructions.
//!
//! Measurements are millimetres from the top-left corner of the page. The
//! renderer owns the cursor, page breaks and text wrapping.

use chrono::NaiveDate;
use dreamhaven_models::{format_currency, Invoice, InvoiceNumber};
use dreamhaven_utils::CompanyConfig;

/// Full printable width between the side margins of an A4 page.
pub const CONTENT_WIDTH: f32 = 190.0;

const DESCRIPTION_WIDTH: f32 = 105.0;
const QTY_WIDTH: f32 = 15.0;
const PRICE_WIDTH: f32 = 35.0;
const AMOUNT_WIDTH: f32 = 35.0;
const SUMMARY_OFFSET: f32 = CONTENT_WIDTH - PRICE_WIDTH - AMOUNT_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowColumn {
    pub width: f32,
    pub text: String,
    pub align: Align,
}

impl RowColumn {
    pub fn new(width: f32, text: impl Into<String>, align: Align) -> Self {
        Self {
            width,
            text: text.into(),
            align,
        }
    }
}

/// A single drawing instruction. A `width` of 0 extends to the right margin.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutOp {
    SetFont {
        style: FontStyle,
        size: f32,
    },
    /// One line of text. The cursor moves right, or to the next line when
    /// `line_break` is set.
    Cell {
        width: f32,
        height: f32,
        text: String,
        border: bool,
        align: Align,
        line_break: bool,
    },
    /// Wrapped text, one `height` per line. Leaves the cursor at the left
    /// margin below the block.
    MultiCell {
        width: f32,
        height: f32,
        text: String,
        border: bool,
        align: Align,
    },
    /// Table row whose columns wrap independently; every column is drawn at
    /// the height of the tallest one.
    Row {
        columns: Vec<RowColumn>,
        line_height: f32,
        border: bool,
    },
    Ln(f32),
}

impl LayoutOp {
    pub fn font(style: FontStyle, size: f32) -> Self {
        Self::SetFont { style, size }
    }

    pub fn cell(width: f32, height: f32, text: impl Into<String>) -> Self {
        Self::Cell {
            width,
            height,
            text: text.into(),
            border: false,
            align: Align::Left,
            line_break: false,
        }
    }

    pub fn multi_cell(width: f32, height: f32, text: impl Into<String>) -> Self {
        Self::MultiCell {
            width,
            height,
            text: text.into(),
            border: false,
            align: Align::Left,
        }
    }

    pub fn bordered(mut self) -> Self {
        match &mut self {
            Self::Cell { border, .. } | Self::MultiCell { border, .. } | Self::Row { border, .. } => {
                *border = true
            }
            _ => {}
        }
        self
    }

    pub fn aligned(mut self, to: Align) -> Self {
        match &mut self {
            Self::Cell { align, .. } | Self::MultiCell { align, .. } => *align = to,
            _ => {}
        }
        self
    }

    pub fn newline(mut self) -> Self {
        if let Self::Cell { line_break, .. } = &mut self {
            *line_break = true;
        }
        self
    }
}

pub struct InvoiceLayout;

impl InvoiceLayout {
    /// Lay out one invoice: letterhead, numbering block, billing address,
    /// item table, summary rows and terms. `tax_rate` labels the tax row.
    pub fn build(
        invoice: &Invoice,
        number: InvoiceNumber,
        date: NaiveDate,
        company: &CompanyConfig,
        tax_rate: f64,
    ) -> Vec<LayoutOp> {
        let date_str = date.format("%b %d, %Y").to_string();
        let half = CONTENT_WIDTH / 2.0;
        let mut ops = Vec::with_capacity(32 + invoice.items.len());

        ops.push(LayoutOp::font(FontStyle::Bold, 12.0));
        ops.push(
            LayoutOp::cell(CONTENT_WIDTH, 8.0, &company.name)
                .aligned(Align::Center)
                .newline(),
        );
        ops.push(LayoutOp::font(FontStyle::Regular, 9.0));
        ops.push(
            LayoutOp::cell(CONTENT_WIDTH, 6.0, &company.website)
                .aligned(Align::Center)
                .newline(),
        );
        if !company.contacts.is_empty() {
            ops.push(
                LayoutOp::cell(
                    CONTENT_WIDTH,
                    6.0,
                    format!("Contacts: {}", company.contacts.join(" | ")),
                )
                .aligned(Align::Center)
                .newline(),
            );
        }
        ops.push(LayoutOp::Ln(10.0));

        ops.push(LayoutOp::font(FontStyle::Bold, 10.0));
        ops.push(LayoutOp::cell(half, 6.0, format!("Invoice #: {}", number)));
        ops.push(
            LayoutOp::cell(half, 6.0, format!("Date: {}", date_str))
                .aligned(Align::Right)
                .newline(),
        );
        ops.push(LayoutOp::cell(half, 6.0, ""));
        ops.push(
            LayoutOp::cell(half, 6.0, format!("Due Date: {}", date_str))
                .aligned(Align::Right)
                .newline(),
        );
        ops.push(LayoutOp::Ln(8.0));

        ops.push(LayoutOp::font(FontStyle::Bold, 9.0));
        ops.push(LayoutOp::cell(CONTENT_WIDTH, 6.0, "Bill To:").newline());
        ops.push(LayoutOp::font(FontStyle::Regular, 9.0));
        ops.push(LayoutOp::multi_cell(CONTENT_WIDTH, 6.0, &invoice.bill_to));
        ops.push(LayoutOp::Ln(5.0));

        ops.push(LayoutOp::font(FontStyle::Bold, 9.0));
        ops.push(
            LayoutOp::Row {
                columns: vec![
                    RowColumn::new(DESCRIPTION_WIDTH, "Item Description", Align::Left),
                    RowColumn::new(QTY_WIDTH, "Qty", Align::Right),
                    RowColumn::new(PRICE_WIDTH, "Unit Price", Align::Right),
                    RowColumn::new(AMOUNT_WIDTH, "Amount", Align::Right),
                ],
                line_height: 6.0,
                border: true,
            },
        );
        ops.push(LayoutOp::font(FontStyle::Regular, 9.0));
        for item in &invoice.items {
            ops.push(LayoutOp::Row {
                columns: vec![
                    RowColumn::new(DESCRIPTION_WIDTH, &item.description, Align::Left),
                    RowColumn::new(QTY_WIDTH, item.quantity.to_string(), Align::Right),
                    RowColumn::new(PRICE_WIDTH, format_currency(item.unit_price), Align::Right),
                    RowColumn::new(AMOUNT_WIDTH, format_currency(item.amount), Align::Right),
                ],
                line_height: 6.0,
                border: true,
            });
        }
        ops.push(LayoutOp::Ln(5.0));

        for (label, value) in invoice.summary.rows(tax_rate) {
            ops.push(LayoutOp::cell(SUMMARY_OFFSET, 6.0, ""));
            ops.push(
                LayoutOp::cell(PRICE_WIDTH, 6.0, label)
                    .bordered()
                    .aligned(Align::Right),
            );
            ops.push(
                LayoutOp::cell(AMOUNT_WIDTH, 6.0, format_currency(value))
                    .bordered()
                    .aligned(Align::Right)
                    .newline(),
            );
        }
        ops.push(LayoutOp::Ln(8.0));

        ops.push(LayoutOp::font(FontStyle::Bold, 9.0));
        ops.push(LayoutOp::cell(0.0, 6.0, "Terms and Conditions:").newline());
        ops.push(LayoutOp::font(FontStyle::Regular, 8.0));
        ops.push(LayoutOp::multi_cell(0.0, 5.0, &invoice.terms));

        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamhaven_models::{InvoiceSummary, LineItem, DEFAULT_TAX_RATE};
    use dreamhaven_utils::AppConfig;

    fn sample_invoice() -> Invoice {
        let items = vec![
            LineItem::new("Queen mattress, white", 499.0, 1),
            LineItem::new("Nightstand", 120.0, 2),
        ];
        let summary = InvoiceSummary::from_items(&items, 0.0825, 69.0);
        Invoice::new("1200 Elm St, Dallas TX 469-555-0134", items, summary)
    }

    fn texts(ops: &[LayoutOp]) -> Vec<String> {
        ops.iter()
            .flat_map(|op| match op {
                LayoutOp::Cell { text, .. } | LayoutOp::MultiCell { text, .. } => vec![text.clone()],
                LayoutOp::Row { columns, .. } => columns.iter().map(|c| c.text.clone()).collect(),
                _ => vec![],
            })
            .collect()
    }

    #[test]
    fn test_header_and_dates() {
        let company = AppConfig::default().company;
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let ops = InvoiceLayout::build(&sample_invoice(), InvoiceNumber(2501), date, &company, DEFAULT_TAX_RATE);
        let texts = texts(&ops);

        assert_eq!(texts[0], "DREAMHAVEN BEDDING & FURNITURE");
        assert!(texts.contains(&"Contacts: 682-424-2071 | 940-224-1232 | 469-825-2323".to_string()));
        assert!(texts.contains(&"Invoice #: 2501".to_string()));
        assert!(texts.contains(&"Date: Mar 07, 2024".to_string()));
        assert!(texts.contains(&"Due Date: Mar 07, 2024".to_string()));
    }

    #[test]
    fn test_one_row_per_item_plus_header() {
        let company = AppConfig::default().company;
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let ops = InvoiceLayout::build(&sample_invoice(), InvoiceNumber(2501), date, &company, DEFAULT_TAX_RATE);

        let rows: Vec<_> = ops
            .iter()
            .filter_map(|op| match op {
                LayoutOp::Row { columns, .. } => Some(columns),
                _ => None,
            })
            .collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0].text, "Nightstand");
        assert_eq!(rows[2][1].text, "2");
        assert_eq!(rows[2][3].text, "$240.00");
        assert!(rows
            .iter()
            .all(|cols| cols.iter().map(|c| c.width).sum::<f32>() == CONTENT_WIDTH));
    }

    #[test]
    fn test_summary_rows_and_terms_close_the_page() {
        let company = AppConfig::default().company;
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let invoice = sample_invoice();
        let ops = InvoiceLayout::build(&invoice, InvoiceNumber(2501), date, &company, DEFAULT_TAX_RATE);
        let texts = texts(&ops);

        for label in ["Subtotal", "Tax (8.25%)", "Shipping", "Total"] {
            assert!(texts.contains(&label.to_string()), "missing {}", label);
        }
        assert!(texts.contains(&format_currency(invoice.summary.total)));
        assert_eq!(texts.last(), Some(&invoice.terms));
    }

    #[test]
    fn test_tax_row_follows_configured_rate() {
        let company = AppConfig::default().company;
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let ops = InvoiceLayout::build(&sample_invoice(), InvoiceNumber(2501), date, &company, 0.07);
        let texts = texts(&ops);

        assert!(texts.contains(&"Tax (7%)".to_string()));
        assert!(!texts.contains(&"Tax (8.25%)".to_string()));
    }
}
