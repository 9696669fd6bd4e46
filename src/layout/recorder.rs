//! In-memory canvas that records every drawing call per page.

use super::{Align, Canvas, Rgb};
use crate::error::Result;
use crate::receipt::EncodedImage;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Text {
        value: String,
        x: f32,
        y: f32,
        size: f32,
        color: Rgb,
        align: Align,
    },
    DashedLine {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
}

pub struct Recorder {
    width: f32,
    height: f32,
    size: f32,
    color: Rgb,
    pub pages: Vec<Vec<Op>>,
}

impl Recorder {
    pub fn a4() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            size: 12.0,
            color: Rgb::BLACK,
            pages: vec![Vec::new()],
        }
    }

    /// (value, y) of every text on a page, in drawing order.
    pub fn text_ops(&self, page: usize) -> Vec<(String, f32)> {
        self.pages[page]
            .iter()
            .filter_map(|op| match op {
                Op::Text { value, y, .. } => Some((value.clone(), *y)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self, page: usize) -> Vec<String> {
        self.text_ops(page).into_iter().map(|(v, _)| v).collect()
    }

    pub fn all_texts(&self) -> Vec<String> {
        (0..self.pages.len()).flat_map(|p| self.texts(p)).collect()
    }

    /// Color of the first text op whose value starts with `prefix`.
    pub fn color_of(&self, prefix: &str) -> Option<Rgb> {
        self.pages.iter().flatten().find_map(|op| match op {
            Op::Text { value, color, .. } if value.starts_with(prefix) => Some(*color),
            _ => None,
        })
    }

    /// (x, y, w, h) of every image on a page.
    pub fn images(&self, page: usize) -> Vec<(f32, f32, f32, f32)> {
        self.pages[page]
            .iter()
            .filter_map(|op| match op {
                Op::Image { x, y, w, h } => Some((*x, *y, *w, *h)),
                _ => None,
            })
            .collect()
    }

    /// y of every dashed line on a page.
    pub fn dashed_lines(&self, page: usize) -> Vec<f32> {
        self.pages[page]
            .iter()
            .filter_map(|op| match op {
                Op::DashedLine { y1, .. } => Some(*y1),
                _ => None,
            })
            .collect()
    }

    fn current(&mut self) -> &mut Vec<Op> {
        self.pages.last_mut().expect("recorder always has a page")
    }
}

impl Canvas for Recorder {
    fn page_width(&self) -> f32 {
        self.width
    }

    fn page_height(&self) -> f32 {
        self.height
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn set_font_size(&mut self, size: f32) {
        self.size = size;
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.color = color;
    }

    fn set_draw_color(&mut self, _color: Rgb) {}

    fn text(&mut self, value: &str, x: f32, y: f32, align: Align) {
        let op = Op::Text {
            value: value.to_string(),
            x,
            y,
            size: self.size,
            color: self.color,
            align,
        };
        self.current().push(op);
    }

    fn dashed_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.current().push(Op::DashedLine { x1, y1, x2, y2 });
    }

    fn image(&mut self, image: &EncodedImage, x: f32, y: f32, w: f32, h: f32) -> Result<()> {
        image.dimensions()?;
        self.current().push(Op::Image { x, y, w, h });
        Ok(())
    }
}
