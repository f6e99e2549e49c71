//! Executes a layout against printpdf with A4 pages and automatic page breaks.

use dreamhaven_utils::{InvoiceError, InvoiceResult};
use printpdf::*;
use std::io::BufWriter;

use super::layout::{Align, FontStyle, LayoutOp, RowColumn};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const PT_TO_MM: f32 = 0.3528;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Page geometry. All values in millimetres.
#[derive(Debug, Clone, Copy)]
pub struct PageSetup {
    pub left_margin: f32,
    pub right_margin: f32,
    pub top_margin: f32,
    pub bottom_margin: f32,
    pub cell_padding: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            left_margin: 10.0,
            right_margin: 10.0,
            top_margin: 10.0,
            bottom_margin: 15.0,
            cell_padding: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    setup: PageSetup,
}

impl PdfRenderer {
    pub fn render(&self, title: &str, ops: &[LayoutOp]) -> InvoiceResult<RenderedPdf> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| InvoiceError::rendering(format!("PDF font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| InvoiceError::rendering(format!("PDF font error: {e}")))?;

        let mut canvas = Canvas {
            setup: self.setup,
            layer: doc.get_page(page).get_layer(layer),
            doc: &doc,
            regular,
            bold,
            style: FontStyle::Regular,
            size: 10.0,
            x: self.setup.left_margin,
            y: self.setup.top_margin,
            page_count: 1,
        };

        for op in ops {
            canvas.apply(op);
        }
        let page_count = canvas.page_count;
        drop(canvas);

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| InvoiceError::rendering(format!("PDF save error: {e}")))?;
        let bytes = buf
            .into_inner()
            .map_err(|e| InvoiceError::rendering(format!("PDF buffer error: {e}")))?;

        Ok(RenderedPdf { bytes, page_count })
    }
}

struct Canvas<'a> {
    setup: PageSetup,
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    style: FontStyle,
    size: f32,
    x: f32,
    y: f32,
    page_count: usize,
}

impl Canvas<'_> {
    fn apply(&mut self, op: &LayoutOp) {
        match op {
            LayoutOp::SetFont { style, size } => {
                self.style = *style;
                self.size = *size;
            }
            LayoutOp::Cell {
                width,
                height,
                text,
                border,
                align,
                line_break,
            } => {
                self.ensure_room(*height);
                let width = self.resolve_width(*width);
                self.draw_cell(width, *height, text, *border, *align);
                if *line_break {
                    self.x = self.setup.left_margin;
                    self.y += height;
                } else {
                    self.x += width;
                }
            }
            LayoutOp::MultiCell {
                width,
                height,
                text,
                border,
                align,
            } => {
                let width = self.resolve_width(*width);
                let left = self.x;
                let lines = wrap_text(text, width - 2.0 * self.setup.cell_padding, self.style, self.size);
                for line in lines {
                    self.ensure_room(*height);
                    self.x = left;
                    self.draw_cell(width, *height, &line, *border, *align);
                    self.y += height;
                }
                self.x = self.setup.left_margin;
            }
            LayoutOp::Row {
                columns,
                line_height,
                border,
            } => self.draw_row(columns, *line_height, *border),
            LayoutOp::Ln(height) => {
                self.x = self.setup.left_margin;
                self.y += height;
            }
        }
    }

    fn draw_row(&mut self, columns: &[RowColumn], line_height: f32, border: bool) {
        let wrapped: Vec<Vec<String>> = columns
            .iter()
            .map(|col| {
                wrap_text(
                    &col.text,
                    col.width - 2.0 * self.setup.cell_padding,
                    self.style,
                    self.size,
                )
            })
            .collect();
        let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let row_height = line_count as f32 * line_height;

        self.ensure_room(row_height);
        let top = self.y;
        let mut x = self.setup.left_margin;
        for (col, lines) in columns.iter().zip(&wrapped) {
            if border {
                self.draw_rect(x, top, col.width, row_height);
            }
            for (i, line) in lines.iter().enumerate() {
                self.x = x;
                self.y = top + i as f32 * line_height;
                self.draw_cell(col.width, line_height, line, false, col.align);
            }
            x += col.width;
        }
        self.x = self.setup.left_margin;
        self.y = top + row_height;
    }

    fn draw_cell(&self, width: f32, height: f32, text: &str, border: bool, align: Align) {
        if border {
            self.draw_rect(self.x, self.y, width, height);
        }
        if text.is_empty() {
            return;
        }

        let text = printable(text);
        let text_width = measure_text(&text, self.style, self.size);
        let pad = self.setup.cell_padding;
        let text_x = match align {
            Align::Left => self.x + pad,
            Align::Center => self.x + (width - text_width) / 2.0,
            Align::Right => self.x + width - pad - text_width,
        };
        let baseline = self.y + height / 2.0 + 0.3 * self.size * PT_TO_MM;

        let font = match self.style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        };
        self.layer
            .use_text(text, self.size, Mm(text_x), Mm(PAGE_HEIGHT - baseline), font);
    }

    fn draw_rect(&self, x: f32, y: f32, width: f32, height: f32) {
        let corner = |x: f32, y: f32| (Point::new(Mm(x), Mm(PAGE_HEIGHT - y)), false);
        self.layer.add_line(Line {
            points: vec![
                corner(x, y),
                corner(x + width, y),
                corner(x + width, y + height),
                corner(x, y + height),
            ],
            is_closed: true,
        });
    }

    fn resolve_width(&self, width: f32) -> f32 {
        if width > 0.0 {
            width
        } else {
            PAGE_WIDTH - self.setup.right_margin - self.x
        }
    }

    /// Start a new page when `height` would cross the bottom margin.
    fn ensure_room(&mut self, height: f32) {
        let at_top = self.y <= self.setup.top_margin;
        if at_top || self.y + height <= PAGE_HEIGHT - self.setup.bottom_margin {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.page_count + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_count += 1;
        self.y = self.setup.top_margin;
    }
}

/// Builtin fonts only cover printable ASCII reliably.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c,
            '\t' => ' ',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            _ => '?',
        })
        .collect()
}

/// Estimated width in millimetres of `text` in Helvetica at `size` points.
pub fn measure_text(text: &str, style: FontStyle, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c {
            ' '..='~' => HELVETICA_WIDTHS[c as usize - 32] as u32,
            _ => 556,
        })
        .sum();
    let factor = match style {
        FontStyle::Regular => 1.0,
        FontStyle::Bold => 1.06,
    };
    units as f32 / 1000.0 * size * PT_TO_MM * factor
}

/// Greedy word wrap. Explicit newlines are kept, words longer than the
/// width are split by character. Always returns at least one line.
pub fn wrap_text(text: &str, max_width: f32, style: FontStyle, size: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if measure_text(&candidate, style, size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for c in word.chars() {
                current.push(c);
                if measure_text(&current, style, size) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, c.to_string()));
                }
            }
        }
        lines.push(current);
    }

    if lines.iter().all(String::is_empty) {
        return vec![String::new()];
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout::LayoutOp;

    #[test]
    fn test_measure_text_scales_with_size() {
        let small = measure_text("Queen mattress", FontStyle::Regular, 9.0);
        let large = measure_text("Queen mattress", FontStyle::Regular, 18.0);
        assert!((large - 2.0 * small).abs() < 0.001);
        assert!(measure_text("Total", FontStyle::Bold, 9.0) > measure_text("Total", FontStyle::Regular, 9.0));
    }

    #[test]
    fn test_wrap_text_fits_width() {
        let text = "King size bed frame with upholstered headboard and matching storage drawers in grey velvet";
        let lines = wrap_text(text, 50.0, FontStyle::Regular, 9.0);

        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| measure_text(l, FontStyle::Regular, 9.0) <= 50.0));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_text_breaks_long_words_and_keeps_newlines() {
        let lines = wrap_text(&"x".repeat(200), 20.0, FontStyle::Regular, 9.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat().len(), 200);

        let lines = wrap_text("line one\nline two", 100.0, FontStyle::Regular, 9.0);
        assert_eq!(lines, vec!["line one", "line two"]);

        assert_eq!(wrap_text("", 100.0, FontStyle::Regular, 9.0), vec![String::new()]);
    }

    #[test]
    fn test_printable_replaces_unsupported_chars() {
        assert_eq!(printable("Sofa \u{2014} grey\t✅"), "Sofa - grey ?");
    }

    #[test]
    fn test_render_single_page() {
        let ops = vec![
            LayoutOp::font(FontStyle::Bold, 12.0),
            LayoutOp::cell(190.0, 8.0, "Invoice").newline().bordered(),
            LayoutOp::multi_cell(0.0, 6.0, "Bill To: 1200 Elm St"),
        ];
        let pdf = PdfRenderer::default().render("Invoice 1", &ops).unwrap();

        assert!(pdf.bytes.starts_with(b"%PDF"));
        assert_eq!(pdf.page_count, 1);
    }

    #[test]
    fn test_render_breaks_pages() {
        let ops: Vec<_> = (0..80)
            .map(|i| LayoutOp::cell(190.0, 6.0, format!("Row {}", i)).newline().bordered())
            .collect();
        let pdf = PdfRenderer::default().render("Long", &ops).unwrap();

        // 272 mm of usable height per page at 6 mm per row
        assert_eq!(pdf.page_count, 2);
    }
}
