//! Fixed-position invoice layout
//!
//! Coordinates are millimetres from the top-left corner of an A4 page. Text
//! `y` is the baseline. Nothing here flows or paginates: every section has a
//! fixed slot and over-long text is truncated to fit it.

use super::{format_amount, Invoice};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 15.0;

const CONTENT_RIGHT: f32 = PAGE_WIDTH - MARGIN;
const HEADER_HEIGHT: f32 = 32.0;
const INFO_TOP: f32 = 46.0;
const COLUMN_WIDTH: f32 = 60.0;
const TABLE_TOP: f32 = 96.0;
const ROW_HEIGHT: f32 = 8.0;
const MAX_TABLE_ROWS: usize = 12;
const FOOTER_TOP: f32 = 272.0;

/// Millimetres per typographic point
const MM_PER_PT: f32 = 0.3528;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BRAND: Rgb = Rgb(31, 64, 122);
pub const LIGHT: Rgb = Rgb(232, 236, 243);
pub const TEXT: Rgb = Rgb(33, 37, 41);
pub const MUTED: Rgb = Rgb(108, 117, 125);
pub const WHITE: Rgb = Rgb(255, 255, 255);

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: Rgb,
        text: String,
    },
    FilledRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        /// Stroke width in points
        width: f32,
        color: Rgb,
    },
}

impl DrawOp {
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Estimated width of Helvetica text; good enough for right alignment.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * MM_PER_PT
}

fn fit(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[derive(Default)]
struct Canvas {
    ops: Vec<DrawOp>,
}

impl Canvas {
    fn text(&mut self, x: f32, y: f32, size: f32, bold: bool, color: Rgb, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text {
            x,
            y,
            size,
            bold,
            color,
            text,
        });
    }

    fn text_right(&mut self, right: f32, y: f32, size: f32, bold: bool, color: Rgb, text: impl Into<String>) {
        let text = text.into();
        let x = (right - text_width(&text, size)).max(MARGIN);
        self.text(x, y, size, bold, color, text);
    }

    fn text_center(&mut self, y: f32, size: f32, color: Rgb, text: impl Into<String>) {
        let text = text.into();
        let x = ((PAGE_WIDTH - text_width(&text, size)) / 2.0).max(MARGIN);
        self.text(x, y, size, false, color, text);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.ops.push(DrawOp::FilledRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn hline(&mut self, x1: f32, x2: f32, y: f32, width: f32, color: Rgb) {
        self.ops.push(DrawOp::Line {
            x1,
            y1: y,
            x2,
            y2: y,
            width,
            color,
        });
    }
}

/// Lay out the whole invoice.
pub fn layout(invoice: &Invoice) -> Vec<DrawOp> {
    let mut canvas = Canvas::default();
    header(&mut canvas, invoice);
    info_columns(&mut canvas, invoice);
    let table_bottom = items_table(&mut canvas, invoice);
    total_box(&mut canvas, invoice, table_bottom + 8.0);
    footer(&mut canvas, invoice);
    canvas.ops
}

fn header(canvas: &mut Canvas, invoice: &Invoice) {
    canvas.rect(0.0, 0.0, PAGE_WIDTH, HEADER_HEIGHT, BRAND);
    canvas.text(MARGIN, 20.0, 24.0, true, WHITE, "PRO-FATURA");
    canvas.text_right(CONTENT_RIGHT, 15.0, 12.0, true, WHITE, fit(&invoice.issuer.name, 40));
    canvas.text_right(CONTENT_RIGHT, 22.0, 9.0, false, WHITE, format!("No. {}", invoice.number));
}

fn column(canvas: &mut Canvas, x: f32, title: &str, rows: &[String]) {
    canvas.text(x, INFO_TOP, 9.0, true, BRAND, title);
    canvas.hline(x, x + COLUMN_WIDTH - 5.0, INFO_TOP + 2.0, 0.5, BRAND);
    let mut y = INFO_TOP + 8.0;
    for row in rows.iter().filter(|r| !r.trim().is_empty()) {
        canvas.text(x, y, 9.0, false, TEXT, fit(row, 34));
        y += 5.0;
    }
}

fn info_columns(canvas: &mut Canvas, invoice: &Invoice) {
    let issuer = &invoice.issuer;
    let issuer_rows = [
        issuer.name.clone(),
        issuer.address.clone(),
        labelled("NIPT", &issuer.fiscal_number),
        issuer.email.clone(),
        issuer.phone.clone(),
    ];

    let client = &invoice.client;
    let client_rows = [
        client.name.clone(),
        labelled("User", &client.username),
        client.email.clone(),
        labelled("Phone", client.phone.as_deref().unwrap_or_default()),
        labelled("NIPT", client.fiscal_number.as_deref().unwrap_or_default()),
    ];

    let detail_rows = [
        labelled("Number", &invoice.number),
        labelled("Date", &invoice.issue_date.format("%d.%m.%Y").to_string()),
        labelled("Due", &invoice.due_date.format("%d.%m.%Y").to_string()),
        labelled("Currency", &invoice.currency),
    ];

    column(canvas, MARGIN, "ISSUED BY", &issuer_rows);
    column(canvas, MARGIN + COLUMN_WIDTH, "BILLED TO", &client_rows);
    column(canvas, MARGIN + 2.0 * COLUMN_WIDTH, "INVOICE DETAILS", &detail_rows);
}

fn labelled(label: &str, value: &str) -> String {
    if value.trim().is_empty() {
        String::new()
    } else {
        format!("{label}: {}", value.trim())
    }
}

/// Returns the y of the table's bottom edge.
fn items_table(canvas: &mut Canvas, invoice: &Invoice) -> f32 {
    const NUMBER_X: f32 = MARGIN + 2.0;
    const DESCRIPTION_X: f32 = MARGIN + 12.0;
    const QTY_RIGHT: f32 = 135.0;
    const PRICE_RIGHT: f32 = 163.0;
    const AMOUNT_RIGHT: f32 = CONTENT_RIGHT - 2.0;

    canvas.rect(MARGIN, TABLE_TOP, CONTENT_RIGHT - MARGIN, ROW_HEIGHT, LIGHT);
    let header_y = TABLE_TOP + 5.5;
    canvas.text(NUMBER_X, header_y, 9.0, true, TEXT, "#");
    canvas.text(DESCRIPTION_X, header_y, 9.0, true, TEXT, "Description");
    canvas.text_right(QTY_RIGHT, header_y, 9.0, true, TEXT, "Qty");
    canvas.text_right(PRICE_RIGHT, header_y, 9.0, true, TEXT, "Unit price");
    canvas.text_right(AMOUNT_RIGHT, header_y, 9.0, true, TEXT, "Amount");

    let mut top = TABLE_TOP + ROW_HEIGHT;
    for (i, line) in invoice.lines.iter().take(MAX_TABLE_ROWS).enumerate() {
        let y = top + 5.5;
        canvas.text(NUMBER_X, y, 9.0, false, TEXT, (i + 1).to_string());
        canvas.text(DESCRIPTION_X, y, 9.0, false, TEXT, fit(&line.description, 48));
        canvas.text_right(QTY_RIGHT, y, 9.0, false, TEXT, line.quantity.to_string());
        canvas.text_right(PRICE_RIGHT, y, 9.0, false, TEXT, format_amount(line.unit_price, &invoice.currency));
        canvas.text_right(AMOUNT_RIGHT, y, 9.0, false, TEXT, format_amount(line.amount(), &invoice.currency));
        top += ROW_HEIGHT;
        canvas.hline(MARGIN, CONTENT_RIGHT, top, 0.3, MUTED);
    }
    top
}

fn total_box(canvas: &mut Canvas, invoice: &Invoice, top: f32) {
    const BOX_LEFT: f32 = 120.0;
    const LABEL_X: f32 = BOX_LEFT + 4.0;
    const VALUE_RIGHT: f32 = CONTENT_RIGHT - 4.0;

    let currency = &invoice.currency;
    canvas.text(LABEL_X, top + 5.0, 9.0, false, TEXT, "Subtotal");
    canvas.text_right(VALUE_RIGHT, top + 5.0, 9.0, false, TEXT, format_amount(invoice.subtotal(), currency));
    canvas.text(LABEL_X, top + 11.0, 9.0, false, TEXT, format!("VAT ({}%)", invoice.vat_percent));
    canvas.text_right(VALUE_RIGHT, top + 11.0, 9.0, false, TEXT, format_amount(invoice.vat_amount(), currency));

    let band = top + 15.0;
    canvas.rect(BOX_LEFT, band, CONTENT_RIGHT - BOX_LEFT, 10.0, BRAND);
    canvas.text(LABEL_X, band + 6.8, 11.0, true, WHITE, "TOTAL");
    canvas.text_right(VALUE_RIGHT, band + 6.8, 11.0, true, WHITE, format_amount(invoice.total(), currency));
}

fn footer(canvas: &mut Canvas, invoice: &Invoice) {
    canvas.hline(MARGIN, CONTENT_RIGHT, FOOTER_TOP, 0.5, MUTED);
    let issuer = &invoice.issuer;
    if !issuer.bank_account.trim().is_empty() {
        canvas.text_center(FOOTER_TOP + 6.0, 8.0, MUTED, format!("Bank account: {}", issuer.bank_account.trim()));
    }
    canvas.text_center(
        FOOTER_TOP + 11.0,
        8.0,
        MUTED,
        format!("Payment due by {}. Thank you for your business.", invoice.due_date.format("%d.%m.%Y")),
    );
    canvas.text_center(FOOTER_TOP + 16.0, 7.0, MUTED, "This pro-forma invoice is not a fiscal receipt.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{BilledClient, InvoiceLine, Issuer};
    use chrono::NaiveDate;

    fn invoice() -> Invoice {
        let issue_date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        Invoice {
            number: "20260309-42".into(),
            issue_date,
            due_date: issue_date,
            issuer: Issuer {
                name: "TenderDesk".into(),
                bank_account: "AL47 2121 1009 0000 0002 3569 8741".into(),
                ..Default::default()
            },
            client: BilledClient {
                name: "Acme Construction".into(),
                username: "acme".into(),
                email: "office@acme.al".into(),
                ..Default::default()
            },
            lines: vec![InvoiceLine {
                description: "Annual subscription (365 days)".into(),
                quantity: 1,
                unit_price: 150.0,
            }],
            currency: "EUR".into(),
            vat_percent: 20.0,
        }
    }

    fn texts(ops: &[DrawOp]) -> Vec<&str> {
        ops.iter().filter_map(DrawOp::text).collect()
    }

    #[test]
    fn test_sections_present() {
        let ops = layout(&invoice());
        let texts = texts(&ops);
        for expected in [
            "PRO-FATURA",
            "ISSUED BY",
            "BILLED TO",
            "INVOICE DETAILS",
            "Description",
            "Annual subscription (365 days)",
            "TOTAL",
            "180.00 EUR",
            "Bank account: AL47 2121 1009 0000 0002 3569 8741",
        ] {
            assert!(texts.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_everything_on_page() {
        for op in layout(&invoice()) {
            let (x, y) = match op {
                DrawOp::Text { x, y, .. } => (x, y),
                DrawOp::FilledRect { x, y, width, height, .. } => (x + width, y + height),
                DrawOp::Line { x2, y2, .. } => (x2, y2),
            };
            assert!((0.0..=PAGE_WIDTH).contains(&x), "{op:?}");
            assert!((0.0..=PAGE_HEIGHT).contains(&y), "{op:?}");
        }
    }

    #[test]
    fn test_long_description_truncated_and_empty_rows_skipped() {
        let mut invoice = invoice();
        invoice.lines[0].description = "x".repeat(120);
        let ops = layout(&invoice);
        let texts = texts(&ops);
        assert!(texts.iter().any(|t| t.len() == 48 && t.ends_with("...")));
        // no address given, no empty text op emitted
        assert!(texts.iter().all(|t| !t.trim().is_empty()));
    }
}
