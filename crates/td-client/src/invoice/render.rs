//! PDF rendering of laid-out draw operations

use printpdf::path::PaintMode;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, Point, Rect};

use super::layout::{DrawOp, Rgb, PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::{Error, Result};

fn pdf_error(err: impl std::fmt::Display) -> Error {
    Error::Pdf(err.to_string())
}

fn color(rgb: Rgb) -> Color {
    let Rgb(r, g, b) = rgb;
    Color::Rgb(printpdf::Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// PDF y axis points up from the bottom edge.
fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

/// Render `ops` onto a single A4 page and return the document bytes.
pub fn render(title: &str, ops: &[DrawOp]) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Invoice");
    let regular: IndirectFontRef = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;
    let canvas = doc.get_page(page).get_layer(layer);

    for op in ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                bold: is_bold,
                color: rgb,
                text,
            } => {
                canvas.set_fill_color(color(*rgb));
                let font = if *is_bold { &bold } else { &regular };
                canvas.use_text(text.as_str(), *size, Mm(*x), flip(*y), font);
            }
            DrawOp::FilledRect {
                x,
                y,
                width,
                height,
                color: rgb,
            } => {
                canvas.set_fill_color(color(*rgb));
                let rect = Rect::new(Mm(*x), flip(*y + *height), Mm(*x + *width), flip(*y))
                    .with_mode(PaintMode::Fill);
                canvas.add_rect(rect);
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color: rgb,
            } => {
                canvas.set_outline_color(color(*rgb));
                canvas.set_outline_thickness(*width);
                canvas.add_line(Line {
                    points: vec![
                        (Point::new(Mm(*x1), flip(*y1)), false),
                        (Point::new(Mm(*x2), flip(*y2)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::layout::BRAND;

    #[test]
    fn test_render_produces_pdf() {
        let ops = vec![
            DrawOp::FilledRect {
                x: 0.0,
                y: 0.0,
                width: 210.0,
                height: 30.0,
                color: BRAND,
            },
            DrawOp::Text {
                x: 15.0,
                y: 20.0,
                size: 24.0,
                bold: true,
                color: Rgb(255, 255, 255),
                text: "PRO-FATURA".into(),
            },
        ];
        let bytes = render("test", &ops).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 200);
    }
}
