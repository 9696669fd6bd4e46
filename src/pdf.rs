use std::io::BufWriter;

use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, LineDashPattern, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerIndex, PdfLayerReference, PdfPageIndex, Point,
};

use crate::error::{Result, TripError};
use crate::layout::{Align, Canvas, Rgb};
use crate::receipt::EncodedImage;

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

fn color(c: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        c.0 as f32 / 255.0,
        c.1 as f32 / 255.0,
        c.2 as f32 / 255.0,
        None,
    ))
}

/// [`Canvas`] backed by a printpdf document.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    font_size: f32,
    text_color: Rgb,
    draw_color: Rgb,
}

impl PdfCanvas {
    pub fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| TripError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            current_page: page,
            current_layer: layer,
            font_size: 12.0,
            text_color: Rgb::BLACK,
            draw_color: Rgb::BLACK,
        })
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc
            .get_page(self.current_page)
            .get_layer(self.current_layer)
    }

    /// printpdf measures from the bottom edge.
    fn pdf_y(y: f32) -> f32 {
        PAGE_H - y
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| TripError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| TripError::Pdf(e.to_string()))
    }
}

impl Canvas for PdfCanvas {
    fn page_width(&self) -> f32 {
        PAGE_W
    }

    fn page_height(&self) -> f32 {
        PAGE_H
    }

    fn add_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
    }

    fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    fn text(&mut self, value: &str, x: f32, y: f32, align: Align) {
        let width = approx_text_width(value, self.font_size);
        let x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
        };
        let layer = self.layer();
        layer.set_fill_color(color(self.text_color));
        layer.use_text(value, self.font_size, Mm(x), Mm(Self::pdf_y(y)), &self.font);
    }

    fn dashed_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let layer = self.layer();
        layer.set_outline_color(color(self.draw_color));
        layer.set_outline_thickness(0.5);
        layer.set_line_dash_pattern(LineDashPattern {
            dash_1: Some(3),
            gap_1: Some(3),
            ..Default::default()
        });
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(Self::pdf_y(y1))), false),
                (Point::new(Mm(x2), Mm(Self::pdf_y(y2))), false),
            ],
            is_closed: false,
        });
        layer.set_line_dash_pattern(LineDashPattern::default());
    }

    fn image(&mut self, image: &EncodedImage, x: f32, y: f32, w: f32, h: f32) -> Result<()> {
        let decoded = image.decode()?;
        // Alpha channels are dropped; receipts and logos are drawn opaque.
        let pixels = decoded.to_rgb8();
        let (px_w, px_h) = pixels.dimensions();
        let rgb = image::DynamicImage::ImageRgb8(pixels);
        let natural_w = px_w as f32 / DPI * MM_PER_INCH;
        let natural_h = px_h as f32 / DPI * MM_PER_INCH;

        Image::from_dynamic_image(&rgb).add_to_layer(
            self.layer(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(Self::pdf_y(y + h))),
                scale_x: Some(w / natural_w),
                scale_y: Some(h / natural_h),
                dpi: Some(DPI),
                ..Default::default()
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{render, DetailedLayout, LayoutOptions, ReportInput, ReportKind};
    use crate::models::{Branding, BudgetMethod, Expense, ExpenseCategory, Trip};
    use crate::receipt::fixtures;

    fn trip() -> Trip {
        Trip {
            destination: "Recife".to_string(),
            participants: "Ana".to_string(),
            date: "2025-03-10".to_string(),
            budget: 1000.0,
            budget_method: Some(BudgetMethod::Cash),
            vehicle: None,
        }
    }

    fn expenses() -> Vec<Expense> {
        vec![
            Expense {
                id: 1,
                category: ExpenseCategory::Fuel,
                amount: 150.0,
                receipt: Some(fixtures::jpeg_data_uri(64, 96)),
            },
            Expense {
                id: 2,
                category: ExpenseCategory::Lodging,
                amount: 400.0,
                receipt: Some(fixtures::png_data_uri(32, 16)),
            },
            Expense {
                id: 3,
                category: ExpenseCategory::Parking,
                amount: 12.0,
                receipt: Some("data:image/png;base64,quebrado".to_string()),
            },
        ]
    }

    #[test]
    fn test_render_summary_produces_pdf() {
        let trip = trip();
        let expenses = expenses();
        let branding = Branding {
            header: Some(fixtures::png_data_uri(420, 40)),
            footer: Some(fixtures::jpeg_data_uri(420, 30)),
        };
        let input = ReportInput { trip: &trip, expenses: &expenses, branding: &branding };
        let mut canvas = PdfCanvas::new("Resumo").unwrap();
        let out = render(&mut canvas, ReportKind::Summary, &input, LayoutOptions::default());
        assert_eq!(out.pages, 1);
        let bytes = canvas.into_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_detailed_produces_pdf() {
        let trip = trip();
        let expenses = expenses();
        let branding = Branding::default();
        let input = ReportInput { trip: &trip, expenses: &expenses, branding: &branding };
        for detailed in [DetailedLayout::OnePerPage, DetailedLayout::TwoPerPage] {
            let mut canvas = PdfCanvas::new("Comprovantes").unwrap();
            let options = LayoutOptions { detailed, ..Default::default() };
            let out = render(&mut canvas, ReportKind::Detailed, &input, options);
            assert_eq!(out.receipt_errors, 1);
            let bytes = canvas.into_bytes().unwrap();
            assert!(bytes.starts_with(b"%PDF"));
        }
    }

    #[test]
    fn test_text_alignment_offsets() {
        let w = approx_text_width("abcd", 10.0);
        assert!((w - 7.2).abs() < 1e-4);
    }
}
