use facture_types::{Color, Rect, Size};
use std::sync::Arc;

/// Encoded format of an embedded raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// A positioned text run. `y` is the top of the text box in top-left page
/// coordinates; backends convert to their own coordinate system.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
    pub color: Color,
    pub bold: bool,
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text(TextOp),
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Color,
    },
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<(Color, f32)>,
    },
    Image {
        rect: Rect,
        data: Arc<Vec<u8>>,
        format: ImageFormat,
    },
}

/// The drawing primitives for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOps {
    pub size: Size,
    pub ops: Vec<DrawOp>,
}

impl PageOps {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }
}

/// Document-level metadata written into the output file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMeta {
    pub title: String,
    pub producer: String,
    /// Resolved body font family.
    pub font_family: String,
    /// Creation date in PDF date syntax, e.g. `D:20260829120000Z`.
    pub creation_date: Option<String>,
}
