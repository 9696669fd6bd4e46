//! Report layout: turns a trip snapshot into positioned text and images on
//! fixed-size pages. Everything is drawn through [`Canvas`]; the engine never
//! touches a PDF library directly.
//!
//! Units are millimetres, origin at the top-left corner, y growing downward.
//! Text y is the baseline.

mod detailed;
#[cfg(test)]
pub(crate) mod recorder;
mod summary;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fmt::money;
use crate::models::{Branding, Expense, Trip};
use crate::receipt::EncodedImage;

pub const PAGE_MARGIN: f32 = 20.0;
pub const BRANDING_PADDING: f32 = 10.0;
pub const LEFT: f32 = 15.0;
const IMAGE_MARGIN: f32 = 15.0;
/// Least content height a page must keep between header and bottom margin.
pub(crate) const MIN_CONTENT_H: f32 = 40.0;
/// Receipt boxes shorter than this are skipped as out of room.
const MIN_RECEIPT_H: f32 = 10.0;

pub const TITLE_SIZE: f32 = 22.0;
pub const BODY_SIZE: f32 = 12.0;
pub const NOTE_SIZE: f32 = 11.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const SLATE: Rgb = Rgb(100, 116, 139);
    pub const ORANGE: Rgb = Rgb(234, 88, 12);
    pub const GREEN: Rgb = Rgb(5, 150, 105);
    pub const RED: Rgb = Rgb(220, 38, 38);
}

/// The drawing backend the layout engine talks to.
pub trait Canvas {
    fn page_width(&self) -> f32;
    fn page_height(&self) -> f32;
    fn add_page(&mut self);
    fn set_font_size(&mut self, size: f32);
    fn set_text_color(&mut self, color: Rgb);
    fn set_draw_color(&mut self, color: Rgb);
    fn text(&mut self, value: &str, x: f32, y: f32, align: Align);
    fn dashed_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);
    /// Place an image with its top-left corner at (x, y), stretched to w × h.
    fn image(&mut self, image: &EncodedImage, x: f32, y: f32, w: f32, h: f32) -> Result<()>;
    /// Intrinsic pixel size of an encoded image.
    fn image_size(&self, image: &EncodedImage) -> Result<(u32, u32)> {
        image.dimensions()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Summary,
    Detailed,
}

impl ReportKind {
    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::Summary => "resumo_viagem",
            ReportKind::Detailed => "comprovantes_viagem",
        }
    }
}

/// How the detailed report distributes receipts over pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DetailedLayout {
    /// One expense per page, receipt fitted to the rest of the page.
    #[default]
    #[value(name = "one")]
    OnePerPage,
    /// Two expenses per page in equal top/bottom slots.
    #[value(name = "two")]
    TwoPerPage,
}

/// Which pages carry the branding footer. The header is always on every page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BrandingPolicy {
    #[default]
    #[value(name = "last-page")]
    FooterOnLastPage,
    #[value(name = "every-page")]
    EveryPage,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOptions {
    pub detailed: DetailedLayout,
    pub branding: BrandingPolicy,
}

/// Read-only view of everything a report needs.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub trip: &'a Trip,
    pub expenses: &'a [Expense],
    pub branding: &'a Branding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendered {
    pub pages: usize,
    pub receipt_errors: usize,
}

/// Lay out a report onto a canvas that already has its first page open.
pub fn render<C: Canvas>(
    canvas: &mut C,
    kind: ReportKind,
    input: &ReportInput<'_>,
    options: LayoutOptions,
) -> Rendered {
    tracing::debug!(?kind, expenses = input.expenses.len(), "laying out report");
    let sheet = Sheet::begin(canvas, input.branding, options.branding);
    match kind {
        ReportKind::Summary => summary::layout(sheet, input),
        ReportKind::Detailed => match options.detailed {
            DetailedLayout::OnePerPage => detailed::one_per_page(sheet, input),
            DetailedLayout::TwoPerPage => detailed::two_per_page(sheet, input),
        },
    }
}

/// `{slug}_{destination}.pdf` with filesystem-unsafe characters replaced.
pub fn report_filename(kind: ReportKind, destination: &str) -> String {
    format!("{}_{}.pdf", kind.slug(), sanitize_destination(destination))
}

fn sanitize_destination(destination: &str) -> String {
    let replaced: String = destination
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        "viagem".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Scale (iw, ih) to fit inside (max_w, max_h) preserving aspect ratio.
pub fn fit_image(iw: f32, ih: f32, max_w: f32, max_h: f32) -> Option<(f32, f32)> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !(valid(iw) && valid(ih) && valid(max_w) && valid(max_h)) {
        return None;
    }
    let scale = (max_w / iw).min(max_h / ih);
    Some((iw * scale, ih * scale))
}

// ---------------------------------------------------------------------------
// Page frame: branding placement and margins
// ---------------------------------------------------------------------------

struct Stamp {
    image: EncodedImage,
    height: f32,
}

pub(crate) struct PageFrame {
    header: Option<Stamp>,
    footer: Option<Stamp>,
    policy: BrandingPolicy,
    /// First usable baseline below the header.
    pub top: f32,
    /// Content must not start below this line.
    pub bottom: f32,
}

impl PageFrame {
    fn new<C: Canvas>(canvas: &C, branding: &Branding, policy: BrandingPolicy) -> Self {
        let page_h = canvas.page_height();
        let mut header = branding.header.as_deref().and_then(|src| stamp(canvas, src, "header"));
        let mut footer = branding.footer.as_deref().and_then(|src| stamp(canvas, src, "footer"));

        if let Some(h) = &header {
            if h.height + BRANDING_PADDING + MIN_CONTENT_H > page_h - PAGE_MARGIN {
                tracing::warn!(
                    height = h.height,
                    "branding header leaves no room for content; ignoring it"
                );
                header = None;
            }
        }
        let top = match &header {
            Some(h) => h.height + BRANDING_PADDING,
            None => PAGE_MARGIN,
        };
        if policy == BrandingPolicy::EveryPage {
            if let Some(f) = &footer {
                if top + MIN_CONTENT_H > page_h - (f.height + BRANDING_PADDING) {
                    tracing::warn!(
                        height = f.height,
                        "branding footer leaves no room for content; ignoring it"
                    );
                    footer = None;
                }
            }
        }
        let bottom_margin = match (&footer, policy) {
            (Some(f), BrandingPolicy::EveryPage) => f.height + BRANDING_PADDING,
            _ => PAGE_MARGIN,
        };
        Self {
            header,
            footer,
            policy,
            top,
            bottom: page_h - bottom_margin,
        }
    }

    fn decorate<C: Canvas>(&self, canvas: &mut C) {
        if let Some(header) = &self.header {
            draw_stamp(canvas, header, 0.0, "header");
        }
        if self.policy == BrandingPolicy::EveryPage {
            if let Some(footer) = &self.footer {
                let y = canvas.page_height() - footer.height;
                draw_stamp(canvas, footer, y, "footer");
            }
        }
    }
}

fn stamp<C: Canvas>(canvas: &C, src: &str, which: &str) -> Option<Stamp> {
    let image = match EncodedImage::from_source(src) {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!("ignoring branding {which}: {e}");
            return None;
        }
    };
    match canvas.image_size(&image) {
        Ok((w, h)) => {
            let height = h as f32 * canvas.page_width() / w as f32;
            Some(Stamp { image, height })
        }
        Err(e) => {
            tracing::warn!("ignoring branding {which}: {e}");
            None
        }
    }
}

fn draw_stamp<C: Canvas>(canvas: &mut C, stamp: &Stamp, y: f32, which: &str) {
    let width = canvas.page_width();
    if let Err(e) = canvas.image(&stamp.image, 0.0, y, width, stamp.height) {
        tracing::warn!("failed to draw branding {which}: {e}");
    }
}

/// A canvas plus the page bookkeeping shared by every report kind.
pub(crate) struct Sheet<'c, C: Canvas> {
    pub canvas: &'c mut C,
    pub frame: PageFrame,
    pub pages: usize,
    pub receipt_errors: usize,
}

impl<'c, C: Canvas> Sheet<'c, C> {
    fn begin(canvas: &'c mut C, branding: &Branding, policy: BrandingPolicy) -> Self {
        let frame = PageFrame::new(&*canvas, branding, policy);
        frame.decorate(canvas);
        Self {
            canvas,
            frame,
            pages: 1,
            receipt_errors: 0,
        }
    }

    /// Open a fresh page with its branding; returns the top cursor.
    pub fn new_page(&mut self) -> f32 {
        self.canvas.add_page();
        self.frame.decorate(self.canvas);
        self.pages += 1;
        self.frame.top
    }

    pub fn page_width(&self) -> f32 {
        self.canvas.page_width()
    }

    /// Content bottom for a page. On the last page of a `FooterOnLastPage`
    /// report the footer band is kept free, provided `min_room` still fits
    /// below `from`; otherwise the footer moves to a page of its own.
    pub fn bottom_for(&self, last_page: bool, from: f32, min_room: f32) -> f32 {
        if last_page && self.frame.policy == BrandingPolicy::FooterOnLastPage {
            if let Some(footer) = &self.frame.footer {
                let reserved = self.canvas.page_height() - footer.height - BRANDING_PADDING;
                if reserved - from >= min_room {
                    return reserved;
                }
            }
        }
        self.frame.bottom
    }

    pub fn write(&mut self, value: &str, x: f32, y: f32, size: f32, color: Rgb, align: Align) {
        self.canvas.set_font_size(size);
        self.canvas.set_text_color(color);
        self.canvas.text(value, x, y, align);
    }

    /// Draw one expense's receipt fitted into a box whose top edge is `top`.
    /// Returns the cursor below whatever was drawn.
    pub fn receipt(&mut self, expense: &Expense, seq: usize, top: f32, max_h: f32) -> f32 {
        let Some(src) = expense.receipt.as_deref() else {
            self.write("Sem comprovante anexado.", LEFT, top + 5.0, NOTE_SIZE, Rgb::SLATE, Align::Left);
            return top + 5.0;
        };
        if max_h < MIN_RECEIPT_H {
            tracing::warn!(expense = expense.id, seq, max_h, "no room left on the page for the receipt");
            self.write(
                "Comprovante omitido: sem espaço na página.",
                LEFT,
                top + 5.0,
                NOTE_SIZE,
                Rgb::SLATE,
                Align::Left,
            );
            return top + 5.0;
        }
        let max_w = self.page_width() - 2.0 * IMAGE_MARGIN;
        match self.place_receipt(src, top, max_w, max_h) {
            Ok(h) => top + h,
            Err(e) => {
                tracing::warn!(expense = expense.id, seq, "error adding receipt image: {e}");
                self.receipt_errors += 1;
                self.write(
                    "Erro ao carregar a imagem do comprovante.",
                    LEFT,
                    top + 5.0,
                    NOTE_SIZE,
                    Rgb::RED,
                    Align::Left,
                );
                top + 5.0
            }
        }
    }

    fn place_receipt(&mut self, src: &str, top: f32, max_w: f32, max_h: f32) -> Result<f32> {
        let image = EncodedImage::from_source(src)?;
        let (iw, ih) = self.canvas.image_size(&image)?;
        let (w, h) = fit_image(iw as f32, ih as f32, max_w, max_h).ok_or_else(|| {
            crate::error::TripError::Image(format!("no room for a {iw}x{ih} image"))
        })?;
        let x = (self.page_width() - w) / 2.0;
        self.canvas.image(&image, x, top, w, h)?;
        Ok(h)
    }

    /// Close the document: place a last-page footer if needed.
    pub fn finish(mut self, cursor: f32) -> Rendered {
        if self.frame.policy == BrandingPolicy::FooterOnLastPage {
            if let Some(height) = self.frame.footer.as_ref().map(|f| f.height) {
                let page_h = self.canvas.page_height();
                // Fitted images may overshoot their box by float rounding.
                if cursor + BRANDING_PADDING + height > page_h + 0.01 {
                    self.new_page();
                }
                if let Some(footer) = &self.frame.footer {
                    draw_stamp(self.canvas, footer, page_h - height, "footer");
                }
            }
        }
        Rendered {
            pages: self.pages,
            receipt_errors: self.receipt_errors,
        }
    }
}

pub(crate) fn expense_line(seq: usize, expense: &Expense) -> String {
    format!("{}. {} - {}", seq, expense.category.label(), money(expense.amount))
}
