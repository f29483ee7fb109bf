//! A PDF emitter using the `lopdf` library.
//!
//! Draw primitives arrive in top-left page coordinates and are flipped to
//! PDF's bottom-left origin here. Text is written with the Type1 base-font
//! pair (regular/bold) derived from the resolved family; JPEG images embed
//! as `DCTDecode` XObjects.

use facture_render_core::{DocumentEmitter, DocumentMeta, DrawOp, ImageFormat, PageOps, TextOp};
use facture_types::Color;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

pub struct LopdfEmitter;

impl LopdfEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LopdfEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentEmitter for LopdfEmitter {
    fn emit(
        &mut self,
        meta: &DocumentMeta,
        pages: &[PageOps],
    ) -> Result<Vec<u8>, facture_render_core::RenderError> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let family = if meta.font_family.is_empty() {
            "Helvetica"
        } else {
            meta.font_family.as_str()
        };
        let font_regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => family,
            "Encoding" => "WinAnsiEncoding",
        });
        let font_bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => format!("{family}-Bold"),
            "Encoding" => "WinAnsiEncoding",
        });

        let mut page_ids: Vec<ObjectId> = Vec::with_capacity(pages.len());
        for page in pages {
            let mut ctx = PageContext::new(page.size.height);
            let mut xobjects = Dictionary::new();

            for op in &page.ops {
                match op {
                    DrawOp::Text(text) => ctx.draw_text(text),
                    DrawOp::Line {
                        x1,
                        y1,
                        x2,
                        y2,
                        width,
                        color,
                    } => ctx.draw_line(*x1, *y1, *x2, *y2, *width, color),
                    DrawOp::Rect { rect, fill, stroke } => ctx.draw_rect(rect, fill, stroke),
                    DrawOp::Image { rect, data, format } => match format {
                        ImageFormat::Jpeg => {
                            match jpeg_dimensions(data) {
                                Some((w, h)) => {
                                    let name = format!("Im{}", xobjects.len() + 1);
                                    let image_id = doc.add_object(jpeg_xobject(data, w, h));
                                    xobjects.set(name.as_bytes().to_vec(), image_id);
                                    ctx.draw_image(&name, rect);
                                }
                                None => {
                                    log::warn!("skipping JPEG with unreadable dimensions");
                                }
                            }
                        }
                        ImageFormat::Png => {
                            // The optimizer re-encodes raster assets as JPEG;
                            // anything else is dropped with a warning, as the
                            // document is still useful without the letterhead art.
                            log::warn!("PNG embedding is not supported by the lopdf emitter");
                        }
                    },
                }
            }

            let content = ctx.finish();
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().map_err(|e| {
                    facture_render_core::RenderError::Pdf(e.to_string())
                })?,
            ));

            let mut resources = dictionary! {
                "Font" => dictionary! {
                    FONT_REGULAR => font_regular_id,
                    FONT_BOLD => font_bold_id,
                },
            };
            if !xobjects.is_empty() {
                resources.set("XObject", Object::Dictionary(xobjects));
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    0.0.into(),
                    0.0.into(),
                    page.size.width.into(),
                    page.size.height.into(),
                ],
                "Contents" => content_id,
                "Resources" => resources,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::String(meta.producer.as_bytes().to_vec(), StringFormat::Literal),
            "Title" => Object::String(to_win_ansi(&meta.title), StringFormat::Literal),
        };
        if let Some(date) = &meta.creation_date {
            info.set(
                "CreationDate",
                Object::String(date.as_bytes().to_vec(), StringFormat::Literal),
            );
        }
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

// --- Internal page drawing context ---

struct PageContext {
    page_height: f32,
    content: Content,
    state: PageRenderState,
}

#[derive(Default, Clone, PartialEq)]
struct PageRenderState {
    font_name: String,
    font_size: f32,
    fill_color: Option<Color>,
}

impl PageContext {
    fn new(page_height: f32) -> Self {
        Self {
            page_height,
            content: Content { operations: vec![] },
            state: Default::default(),
        }
    }

    fn finish(self) -> Content {
        self.content
    }

    fn set_font(&mut self, size: f32, bold: bool) {
        let name = if bold { FONT_BOLD } else { FONT_REGULAR };
        if self.state.font_name != name || self.state.font_size != size {
            self.content.operations.push(Operation::new(
                "Tf",
                vec![Object::Name(name.as_bytes().to_vec()), size.into()],
            ));
            self.state.font_name = name.to_string();
            self.state.font_size = size;
        }
    }

    fn set_fill_color(&mut self, color: &Color) {
        if self.state.fill_color != Some(*color) {
            self.content.operations.push(Operation::new(
                "rg",
                vec![color.r_f().into(), color.g_f().into(), color.b_f().into()],
            ));
            self.state.fill_color = Some(*color);
        }
    }

    fn draw_text(&mut self, text: &TextOp) {
        if text.text.trim().is_empty() {
            return;
        }
        self.content.operations.push(Operation::new("BT", vec![]));
        self.set_font(text.size, text.bold);
        self.set_fill_color(&text.color);
        let baseline_y = text.y + text.size * 0.8;
        let pdf_y = self.page_height - baseline_y;
        self.content
            .operations
            .push(Operation::new("Td", vec![text.x.into(), pdf_y.into()]));
        self.content.operations.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(&text.text), StringFormat::Literal)],
        ));
        self.content.operations.push(Operation::new("ET", vec![]));
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: &Color) {
        self.content
            .operations
            .push(Operation::new("w", vec![width.into()]));
        self.content.operations.push(Operation::new(
            "RG",
            vec![color.r_f().into(), color.g_f().into(), color.b_f().into()],
        ));
        self.content.operations.push(Operation::new(
            "m",
            vec![x1.into(), (self.page_height - y1).into()],
        ));
        self.content.operations.push(Operation::new(
            "l",
            vec![x2.into(), (self.page_height - y2).into()],
        ));
        self.content.operations.push(Operation::new("S", vec![]));
    }

    fn draw_rect(
        &mut self,
        rect: &facture_types::Rect,
        fill: &Option<Color>,
        stroke: &Option<(Color, f32)>,
    ) {
        let pdf_y = self.page_height - (rect.y + rect.height);
        if let Some(color) = fill {
            self.set_fill_color(color);
            self.content.operations.push(Operation::new(
                "re",
                vec![
                    rect.x.into(),
                    pdf_y.into(),
                    rect.width.into(),
                    rect.height.into(),
                ],
            ));
            self.content.operations.push(Operation::new("f", vec![]));
        }
        if let Some((color, width)) = stroke {
            self.content
                .operations
                .push(Operation::new("w", vec![(*width).into()]));
            self.content.operations.push(Operation::new(
                "RG",
                vec![color.r_f().into(), color.g_f().into(), color.b_f().into()],
            ));
            self.content.operations.push(Operation::new(
                "re",
                vec![
                    rect.x.into(),
                    pdf_y.into(),
                    rect.width.into(),
                    rect.height.into(),
                ],
            ));
            self.content.operations.push(Operation::new("S", vec![]));
        }
    }

    fn draw_image(&mut self, name: &str, rect: &facture_types::Rect) {
        let pdf_y = self.page_height - (rect.y + rect.height);
        self.content.operations.push(Operation::new("q", vec![]));
        self.content.operations.push(Operation::new(
            "cm",
            vec![
                rect.width.into(),
                0.into(),
                0.into(),
                rect.height.into(),
                rect.x.into(),
                pdf_y.into(),
            ],
        ));
        self.content.operations.push(Operation::new(
            "Do",
            vec![Object::Name(name.as_bytes().to_vec())],
        ));
        self.content.operations.push(Operation::new("Q", vec![]));
    }
}

fn jpeg_xobject(data: &[u8], width: u16, height: u16) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        data.to_vec(),
    )
}

/// Reads the pixel dimensions from a JPEG SOF marker.
fn jpeg_dimensions(data: &[u8]) -> Option<(u16, u16)> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];
        // SOF0..SOF15 except DHT (C4), DAC (CC), and restart markers.
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]);
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]);
            return Some((width, height));
        }
        let len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + len;
    }
    None
}

fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if c as u32 <= 255 { c as u8 } else { b'?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use facture_types::{Rect, Size};

    fn one_page_with_text(text: &str) -> Vec<PageOps> {
        let mut page = PageOps::new(Size::new(595.0, 842.0));
        page.push(DrawOp::Text(TextOp {
            x: 40.0,
            y: 50.0,
            size: 12.0,
            text: text.to_string(),
            color: Color::default(),
            bold: false,
        }));
        page.push(DrawOp::Line {
            x1: 40.0,
            y1: 80.0,
            x2: 555.0,
            y2: 80.0,
            width: 0.75,
            color: Color::gray(0x33),
        });
        page.push(DrawOp::Rect {
            rect: Rect::new(300.0, 700.0, 220.0, 66.0),
            fill: Some(Color::gray(0xf2)),
            stroke: Some((Color::gray(0x33), 0.75)),
        });
        vec![page]
    }

    #[test]
    fn emits_a_loadable_pdf() {
        let mut emitter = LopdfEmitter::new();
        let meta = DocumentMeta {
            title: "Invoice INV-001".to_string(),
            producer: "facture".to_string(),
            font_family: "Helvetica".to_string(),
            creation_date: None,
        };
        let bytes = emitter.emit(&meta, &one_page_with_text("Hello")).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn page_count_matches_input() {
        let mut emitter = LopdfEmitter::new();
        let pages: Vec<PageOps> = (0..3)
            .map(|_| PageOps::new(Size::new(595.0, 842.0)))
            .collect();
        let bytes = emitter.emit(&DocumentMeta::default(), &pages).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn jpeg_sof_dimensions_parse() {
        // Minimal JPEG header: SOI, APP0 stub, SOF0 with 2x3 pixels.
        let data: Vec<u8> = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, // APP0, length 4
            0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x03, 0x00, 0x02, 0x01, 0x00, 0x00, 0x00,
        ];
        assert_eq!(jpeg_dimensions(&data), Some((2, 3)));
        assert_eq!(jpeg_dimensions(&[0x00, 0x01]), None);
    }
}
