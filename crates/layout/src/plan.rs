//! Conversion of a validated document model into a concrete page layout.

use crate::columns::{ColumnLayout, ColumnRole, compute_columns};
use crate::config::PageGeometry;
use crate::measure::{HeuristicMeasurer, TextMeasurer, wrap_text};
use crate::LayoutError;
use facture_types::model::{DocumentModel, ModelItem};
use facture_types::money::{format_amount, format_rate};
use facture_types::Rect;
use std::sync::Arc;

pub const TITLE_BAND_HEIGHT: f32 = 36.0;
pub const META_BLOCK_HEIGHT: f32 = 44.0;
pub const PARTY_BLOCK_HEIGHT: f32 = 72.0;
pub const HEADER_BAND_HEIGHT: f32 = 24.0;
pub const ROW_HEIGHT: f32 = 26.0;
pub const TOTALS_BOX_WIDTH: f32 = 220.0;
pub const TOTALS_BOX_HEIGHT: f32 = 66.0;
pub const TOTALS_GAP: f32 = 12.0;
pub const BODY_FONT_SIZE: f32 = 9.0;
pub const CELL_PADDING: f32 = 4.0;
const NOTES_LINE_HEIGHT: f32 = 12.0;
const NOTES_MAX_LINES: usize = 6;

/// Y-offsets of the fixed letterhead sections, relative to the page top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionOffsets {
    pub title_y: f32,
    pub meta_y: f32,
    pub party_y: f32,
    /// Top of the table header band on the first page.
    pub table_top: f32,
    /// Top of the carried header band on continuation pages.
    pub continuation_table_top: f32,
}

/// Wrapped text cells for one item, computed before row placement. Cell
/// wrapping is the measurer-heavy part of layout, so it is exposed as
/// per-item work that a host can chunk and interleave.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedCells {
    pub description_lines: Vec<String>,
    pub category_lines: Vec<String>,
}

/// Placement of one item row, with its pre-wrapped text cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub item_index: usize,
    pub page: usize,
    pub y: f32,
    pub height: f32,
    pub description_lines: Vec<String>,
    pub category_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TotalsLine {
    pub label: String,
    pub value: String,
    /// Grand total renders in a larger weight.
    pub emphasis: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TotalsBox {
    pub page: usize,
    pub rect: Rect,
    pub lines: Vec<TotalsLine>,
}

/// Derived geometry for one render. Recomputed per run and immutable after
/// creation; callers replace it rather than patching it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub columns: Vec<ColumnLayout>,
    /// Actual table width: sum of column widths, which may overshoot the
    /// nominal content width when floors clamp.
    pub table_width: f32,
    pub rows: Vec<RowLayout>,
    /// Index of the first row of each page after the first.
    pub page_breaks: Vec<usize>,
    pub page_count: usize,
    pub sections: SectionOffsets,
    pub totals_box: TotalsBox,
    pub notes_lines: Vec<String>,
    /// Page and y-offset of the notes block, when notes are present.
    pub notes_origin: Option<(usize, f32)>,
}

/// Pure layout planner. Holds the page geometry and a text measurer; all
/// state for a run lives in the returned [`LayoutPlan`].
pub struct LayoutEngine {
    geometry: PageGeometry,
    measurer: Arc<dyn TextMeasurer>,
}

impl LayoutEngine {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            measurer: Arc::new(HeuristicMeasurer),
        }
    }

    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Wraps one item's text cells to the column widths. Per-item and
    /// independent, so large collections can be chunked by the caller.
    pub fn wrap_item(&self, item: &ModelItem) -> WrappedCells {
        let columns = compute_columns(self.geometry.content_width());
        let description_width = self.cell_text_width(&columns, ColumnRole::Description);
        let category_width = self.cell_text_width(&columns, ColumnRole::Category);
        self.wrap_cells(item, description_width, category_width)
    }

    fn wrap_cells(
        &self,
        item: &ModelItem,
        description_width: f32,
        category_width: f32,
    ) -> WrappedCells {
        let description_lines = wrap_text(
            self.measurer.as_ref(),
            &item.description,
            description_width,
            BODY_FONT_SIZE,
            2,
        );
        let category_lines = match &item.category {
            Some(category) => wrap_text(
                self.measurer.as_ref(),
                category,
                category_width,
                BODY_FONT_SIZE,
                2,
            ),
            None => Vec::new(),
        };
        WrappedCells {
            description_lines,
            category_lines,
        }
    }

    /// Computes the full layout plan for one document, wrapping every
    /// item's cells inline.
    pub fn plan(&self, model: &DocumentModel) -> Result<LayoutPlan, LayoutError> {
        self.plan_with_cells(model, Vec::new())
    }

    /// Computes the layout plan from pre-wrapped cells, one per item in
    /// order. Items past the end of `cells` are wrapped inline, so an
    /// empty vector degrades to [`LayoutEngine::plan`].
    pub fn plan_with_cells(
        &self,
        model: &DocumentModel,
        cells: Vec<WrappedCells>,
    ) -> Result<LayoutPlan, LayoutError> {
        let geo = &self.geometry;
        let content_width = geo.content_width();
        if content_width <= 0.0 {
            return Err(LayoutError::NoUsableWidth(format!(
                "page width {} with margins {}+{}",
                geo.page.width, geo.margin_left, geo.margin_right
            )));
        }

        let columns = compute_columns(content_width);
        let table_width: f32 = columns.iter().map(|c| c.width).sum();

        let sections = SectionOffsets {
            title_y: geo.margin_top,
            meta_y: geo.margin_top + TITLE_BAND_HEIGHT,
            party_y: geo.margin_top + TITLE_BAND_HEIGHT + META_BLOCK_HEIGHT,
            table_top: geo.margin_top + TITLE_BAND_HEIGHT + META_BLOCK_HEIGHT + PARTY_BLOCK_HEIGHT,
            continuation_table_top: geo.margin_top,
        };

        let usable_bottom = geo.page.height - geo.margin_bottom;
        if sections.continuation_table_top + HEADER_BAND_HEIGHT + ROW_HEIGHT > usable_bottom {
            return Err(LayoutError::NoUsableHeight(format!(
                "page height {} cannot fit a header band and one row",
                geo.page.height
            )));
        }

        let description_width = self.cell_text_width(&columns, ColumnRole::Description);
        let category_width = self.cell_text_width(&columns, ColumnRole::Category);

        let mut rows = Vec::with_capacity(model.items.len());
        let mut page_breaks = Vec::new();
        let mut page = 0usize;
        let mut y = sections.table_top + HEADER_BAND_HEIGHT;
        let mut cells = cells.into_iter();

        for (item_index, item) in model.items.iter().enumerate() {
            if y + ROW_HEIGHT > usable_bottom {
                page += 1;
                page_breaks.push(item_index);
                y = sections.continuation_table_top + HEADER_BAND_HEIGHT;
            }
            let WrappedCells {
                description_lines,
                category_lines,
            } = cells
                .next()
                .unwrap_or_else(|| self.wrap_cells(item, description_width, category_width));
            rows.push(RowLayout {
                item_index,
                page,
                y,
                height: ROW_HEIGHT,
                description_lines,
                category_lines,
            });
            y += ROW_HEIGHT;
        }

        // Totals box anchors bottom-right under the table; it spills to the
        // next page as a whole when it does not fit.
        let totals_needed = TOTALS_GAP + TOTALS_BOX_HEIGHT;
        if y + totals_needed > usable_bottom {
            page += 1;
            y = sections.continuation_table_top;
        }
        let totals_box = TotalsBox {
            page,
            rect: Rect::new(
                geo.margin_left + table_width - TOTALS_BOX_WIDTH,
                y + TOTALS_GAP,
                TOTALS_BOX_WIDTH,
                TOTALS_BOX_HEIGHT,
            ),
            lines: totals_lines(model),
        };
        y = totals_box.rect.bottom();

        let notes_lines = match &model.notes {
            Some(notes) => wrap_text(
                self.measurer.as_ref(),
                notes,
                content_width,
                BODY_FONT_SIZE,
                NOTES_MAX_LINES,
            ),
            None => Vec::new(),
        };
        let notes_origin = if notes_lines.is_empty() {
            None
        } else {
            let needed = notes_lines.len() as f32 * NOTES_LINE_HEIGHT + TOTALS_GAP;
            if y + needed > usable_bottom {
                page += 1;
                y = sections.continuation_table_top;
            }
            Some((page, y + TOTALS_GAP))
        };

        Ok(LayoutPlan {
            columns,
            table_width,
            rows,
            page_breaks,
            page_count: page + 1,
            sections,
            totals_box,
            notes_lines,
            notes_origin,
        })
    }

    fn cell_text_width(&self, columns: &[ColumnLayout], role: ColumnRole) -> f32 {
        columns
            .iter()
            .find(|c| c.role == role)
            .map(|c| (c.width - 2.0 * CELL_PADDING).max(1.0))
            .unwrap_or(1.0)
    }
}

fn totals_lines(model: &DocumentModel) -> Vec<TotalsLine> {
    let summary = &model.summary;
    let mut lines = vec![
        TotalsLine {
            label: "Subtotal".to_string(),
            value: format_amount(summary.subtotal),
            emphasis: false,
        },
        TotalsLine {
            label: format!("Tax ({})", format_rate(summary.tax_rate)),
            value: format_amount(summary.tax),
            emphasis: false,
        },
    ];
    if summary.adjustment != 0.0 {
        lines.push(TotalsLine {
            label: "Adjustment".to_string(),
            value: format_amount(summary.adjustment),
            emphasis: false,
        });
    }
    lines.push(TotalsLine {
        label: "Total".to_string(),
        value: format_amount(summary.total),
        emphasis: true,
    });
    lines
}
