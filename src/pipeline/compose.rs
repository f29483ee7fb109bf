//! Turns a document model plus its layout plan into backend-neutral page ops.
//!
//! Composition is pure: all pagination decisions were already made by the
//! layout pass, so this module only places primitives. Backends receive
//! top-left page coordinates and convert themselves.

use crate::pipeline::images::OptimizedImage;
use facture_layout::columns::{Alignment, ColumnLayout};
use facture_layout::measure::{HeuristicMeasurer, TextMeasurer};
use facture_layout::plan::{
    BODY_FONT_SIZE, CELL_PADDING, HEADER_BAND_HEIGHT, LayoutPlan, TITLE_BAND_HEIGHT,
};
use facture_layout::PageGeometry;
use facture_render_core::{DrawOp, PageOps, TextOp};
use facture_types::model::DocumentModel;
use facture_types::money::{format_amount, format_quantity};
use facture_types::{Color, Rect};

const INK: Color = Color::gray(0x22);
const MUTED: Color = Color::gray(0x66);
const RULE: Color = Color::gray(0xc8);
const BAND_FILL: Color = Color::gray(0xf0);

const TITLE_FONT_SIZE: f32 = 18.0;
const META_FONT_SIZE: f32 = 9.5;
const FOOTER_FONT_SIZE: f32 = 8.0;
const CELL_LINE_HEIGHT: f32 = 11.0;
const CHIP_WIDTH: f32 = 8.0;
const CHIP_HEIGHT: f32 = 8.0;
const LOGO_WIDTH: f32 = 96.0;
const LOGO_HEIGHT: f32 = 32.0;
const SEAL_SIZE: f32 = 48.0;
const NOTES_LINE_HEIGHT: f32 = 12.0;

/// Letterhead art after optimization, ready for embedding.
#[derive(Debug, Clone, Default)]
pub struct LetterheadAssets {
    pub logo: Option<OptimizedImage>,
    pub seal: Option<OptimizedImage>,
}

/// Builds the draw ops for every page of one document.
pub fn compose(
    model: &DocumentModel,
    plan: &LayoutPlan,
    geometry: &PageGeometry,
    assets: &LetterheadAssets,
) -> Vec<PageOps> {
    let measurer = HeuristicMeasurer;
    let mut pages: Vec<PageOps> = (0..plan.page_count)
        .map(|_| PageOps::new(geometry.page))
        .collect();

    compose_letterhead(&mut pages[0], model, plan, geometry, assets);

    for (page_index, page) in pages.iter_mut().enumerate() {
        let header_top = if page_index == 0 {
            plan.sections.table_top
        } else {
            plan.sections.continuation_table_top
        };
        compose_table_header(page, plan, geometry, header_top);
    }

    for row in &plan.rows {
        let item = &model.items[row.item_index];
        compose_row(&mut pages[row.page], plan, geometry, &measurer, row, item);
    }

    compose_totals(&mut pages[plan.totals_box.page], plan, &measurer);

    if let Some((page, y)) = plan.notes_origin {
        compose_notes(&mut pages[page], plan, geometry, y);
    }

    let page_count = pages.len();
    for (page_index, page) in pages.iter_mut().enumerate() {
        compose_footer(page, geometry, &measurer, page_index, page_count);
    }

    pages
}

fn compose_letterhead(
    page: &mut PageOps,
    model: &DocumentModel,
    plan: &LayoutPlan,
    geometry: &PageGeometry,
    assets: &LetterheadAssets,
) {
    let left = geometry.margin_left;
    let right = geometry.page.width - geometry.margin_right;
    let sections = &plan.sections;

    page.push(DrawOp::Text(TextOp {
        x: left,
        y: sections.title_y,
        size: TITLE_FONT_SIZE,
        text: model.kind.label().to_string(),
        color: INK,
        bold: true,
    }));
    if let Some(logo) = &assets.logo {
        page.push(DrawOp::Image {
            rect: Rect::new(right - LOGO_WIDTH, sections.title_y, LOGO_WIDTH, LOGO_HEIGHT),
            data: logo.bytes.clone(),
            format: logo.format,
        });
    }
    page.push(DrawOp::Line {
        x1: left,
        y1: sections.title_y + TITLE_BAND_HEIGHT - 6.0,
        x2: right,
        y2: sections.title_y + TITLE_BAND_HEIGHT - 6.0,
        width: 1.0,
        color: INK,
    });

    let mut meta = vec![format!("No. {}", model.document_number)];
    meta.push(format!("Date: {}", model.issue_date));
    if let Some(due) = &model.due_date {
        meta.push(format!("Due: {due}"));
    }
    for (i, line) in meta.iter().enumerate() {
        page.push(DrawOp::Text(TextOp {
            x: left,
            y: sections.meta_y + i as f32 * (META_FONT_SIZE + 3.0),
            size: META_FONT_SIZE,
            text: line.clone(),
            color: MUTED,
            bold: false,
        }));
    }

    // Customer on the left, issuer block on the right.
    page.push(DrawOp::Text(TextOp {
        x: left,
        y: sections.party_y,
        size: 12.0,
        text: model.customer.name.clone(),
        color: INK,
        bold: true,
    }));
    if !model.customer.address.is_empty() {
        page.push(DrawOp::Text(TextOp {
            x: left,
            y: sections.party_y + 16.0,
            size: META_FONT_SIZE,
            text: model.customer.address.clone(),
            color: MUTED,
            bold: false,
        }));
    }

    let issuer_x = left + plan.table_width * 0.55;
    let issuer = &model.issuer;
    let mut issuer_lines = vec![(issuer.name.clone(), true)];
    for field in [&issuer.address, &issuer.contact, &issuer.bank_details] {
        if !field.is_empty() {
            issuer_lines.push((field.clone(), false));
        }
    }
    for (i, (line, bold)) in issuer_lines.iter().enumerate() {
        page.push(DrawOp::Text(TextOp {
            x: issuer_x,
            y: sections.party_y + i as f32 * (META_FONT_SIZE + 3.0),
            size: META_FONT_SIZE,
            text: line.clone(),
            color: if *bold { INK } else { MUTED },
            bold: *bold,
        }));
    }
    if let Some(seal) = &assets.seal {
        page.push(DrawOp::Image {
            rect: Rect::new(right - SEAL_SIZE, sections.party_y, SEAL_SIZE, SEAL_SIZE),
            data: seal.bytes.clone(),
            format: seal.format,
        });
    }
}

fn compose_table_header(page: &mut PageOps, plan: &LayoutPlan, geometry: &PageGeometry, top: f32) {
    let left = geometry.margin_left;
    page.push(DrawOp::Rect {
        rect: Rect::new(left, top, plan.table_width, HEADER_BAND_HEIGHT),
        fill: Some(BAND_FILL),
        stroke: Some((RULE, 0.5)),
    });

    let measurer = HeuristicMeasurer;
    let mut x = left;
    for column in &plan.columns {
        let label = column.role.header_label();
        page.push(DrawOp::Text(TextOp {
            x: aligned_x(&measurer, x, column, label, BODY_FONT_SIZE),
            y: top + (HEADER_BAND_HEIGHT - BODY_FONT_SIZE) / 2.0,
            size: BODY_FONT_SIZE,
            text: label.to_string(),
            color: INK,
            bold: true,
        }));
        x += column.width;
    }
}

fn compose_row(
    page: &mut PageOps,
    plan: &LayoutPlan,
    geometry: &PageGeometry,
    measurer: &dyn TextMeasurer,
    row: &facture_layout::plan::RowLayout,
    item: &facture_types::model::ModelItem,
) {
    let left = geometry.margin_left;
    let mut x = left;
    let text_y = row.y + CELL_PADDING;

    for column in &plan.columns {
        match column.role {
            facture_layout::columns::ColumnRole::SeqNo => {
                cell_text(
                    page,
                    measurer,
                    column,
                    x,
                    text_y,
                    &(row.item_index + 1).to_string(),
                    false,
                );
            }
            facture_layout::columns::ColumnRole::Category => {
                if !row.category_lines.is_empty() {
                    let chip_y = text_y + (BODY_FONT_SIZE - CHIP_HEIGHT) / 2.0;
                    page.push(DrawOp::Rect {
                        rect: Rect::new(x + CELL_PADDING, chip_y, CHIP_WIDTH, CHIP_HEIGHT),
                        fill: Some(item.category_color),
                        stroke: None,
                    });
                    for (i, line) in row.category_lines.iter().enumerate() {
                        page.push(DrawOp::Text(TextOp {
                            x: x + CELL_PADDING + CHIP_WIDTH + 3.0,
                            y: text_y + i as f32 * CELL_LINE_HEIGHT,
                            size: BODY_FONT_SIZE,
                            text: line.clone(),
                            color: INK,
                            bold: false,
                        }));
                    }
                }
            }
            facture_layout::columns::ColumnRole::Description => {
                for (i, line) in row.description_lines.iter().enumerate() {
                    page.push(DrawOp::Text(TextOp {
                        x: x + CELL_PADDING,
                        y: text_y + i as f32 * CELL_LINE_HEIGHT,
                        size: BODY_FONT_SIZE,
                        text: line.clone(),
                        color: INK,
                        bold: false,
                    }));
                }
            }
            facture_layout::columns::ColumnRole::Quantity => {
                cell_text(page, measurer, column, x, text_y, &format_quantity(item.quantity), false);
            }
            facture_layout::columns::ColumnRole::Unit => {
                if let Some(unit) = &item.unit {
                    cell_text(page, measurer, column, x, text_y, unit, false);
                }
            }
            facture_layout::columns::ColumnRole::UnitPrice => {
                cell_text(page, measurer, column, x, text_y, &format_amount(item.unit_price), false);
            }
            facture_layout::columns::ColumnRole::Amount => {
                cell_text(page, measurer, column, x, text_y, &format_amount(item.amount), false);
            }
        }
        x += column.width;
    }

    page.push(DrawOp::Line {
        x1: left,
        y1: row.y + row.height,
        x2: left + plan.table_width,
        y2: row.y + row.height,
        width: 0.5,
        color: RULE,
    });
}

fn cell_text(
    page: &mut PageOps,
    measurer: &dyn TextMeasurer,
    column: &ColumnLayout,
    cell_x: f32,
    y: f32,
    text: &str,
    bold: bool,
) {
    page.push(DrawOp::Text(TextOp {
        x: aligned_x(measurer, cell_x, column, text, BODY_FONT_SIZE),
        y,
        size: BODY_FONT_SIZE,
        text: text.to_string(),
        color: INK,
        bold,
    }));
}

/// X-offset of a cell's text run honoring the column alignment.
fn aligned_x(
    measurer: &dyn TextMeasurer,
    cell_x: f32,
    column: &ColumnLayout,
    text: &str,
    size: f32,
) -> f32 {
    let text_width = measurer.text_width(text, size);
    match column.align {
        Alignment::Left => cell_x + CELL_PADDING,
        Alignment::Center => cell_x + ((column.width - text_width) / 2.0).max(CELL_PADDING),
        Alignment::Right => cell_x + (column.width - CELL_PADDING - text_width).max(CELL_PADDING),
    }
}

fn compose_totals(page: &mut PageOps, plan: &LayoutPlan, measurer: &dyn TextMeasurer) {
    let rect = plan.totals_box.rect;
    page.push(DrawOp::Rect {
        rect,
        fill: None,
        stroke: Some((RULE, 0.75)),
    });

    let line_height = 15.0;
    let mut y = rect.y + 6.0;
    for line in &plan.totals_box.lines {
        let size = if line.emphasis { 11.0 } else { BODY_FONT_SIZE };
        if line.emphasis {
            page.push(DrawOp::Line {
                x1: rect.x + 6.0,
                y1: y - 2.0,
                x2: rect.right() - 6.0,
                y2: y - 2.0,
                width: 0.75,
                color: INK,
            });
        }
        page.push(DrawOp::Text(TextOp {
            x: rect.x + 6.0,
            y,
            size,
            text: line.label.clone(),
            color: INK,
            bold: line.emphasis,
        }));
        let value_width = measurer.text_width(&line.value, size);
        page.push(DrawOp::Text(TextOp {
            x: rect.right() - 6.0 - value_width,
            y,
            size,
            text: line.value.clone(),
            color: INK,
            bold: line.emphasis,
        }));
        y += line_height;
    }
}

fn compose_notes(page: &mut PageOps, plan: &LayoutPlan, geometry: &PageGeometry, top: f32) {
    let left = geometry.margin_left;
    page.push(DrawOp::Text(TextOp {
        x: left,
        y: top,
        size: BODY_FONT_SIZE,
        text: "Notes".to_string(),
        color: INK,
        bold: true,
    }));
    for (i, line) in plan.notes_lines.iter().enumerate() {
        page.push(DrawOp::Text(TextOp {
            x: left,
            y: top + NOTES_LINE_HEIGHT + i as f32 * NOTES_LINE_HEIGHT,
            size: BODY_FONT_SIZE,
            text: line.clone(),
            color: MUTED,
            bold: false,
        }));
    }
}

fn compose_footer(
    page: &mut PageOps,
    geometry: &PageGeometry,
    measurer: &dyn TextMeasurer,
    page_index: usize,
    page_count: usize,
) {
    let text = format!("Page {} of {}", page_index + 1, page_count);
    let width = measurer.text_width(&text, FOOTER_FONT_SIZE);
    page.push(DrawOp::Text(TextOp {
        x: (geometry.page.width - width) / 2.0,
        y: geometry.page.height - geometry.margin_bottom + 8.0,
        size: FOOTER_FONT_SIZE,
        text,
        color: MUTED,
        bold: false,
    }));
}
