//! Deterministic layout planning for estimate/invoice documents.
//!
//! The layout engine is pure: given a validated [`DocumentModel`] and a
//! [`PageGeometry`], [`LayoutEngine::plan`] computes column widths, row
//! placement, page breaks, and section offsets without performing any I/O.
//! The resulting [`LayoutPlan`] is replaced on every run, never patched.

pub mod columns;
pub mod config;
pub mod fonts;
pub mod measure;
pub mod plan;

pub use columns::{Alignment, ColumnLayout, ColumnRole, compute_columns};
pub use config::PageGeometry;
pub use fonts::{FontMeasurer, FontResolver, FontSource, ResolvedFont};
pub use measure::{HeuristicMeasurer, TextMeasurer};
pub use plan::{LayoutEngine, LayoutPlan, RowLayout, SectionOffsets, TotalsBox, WrappedCells};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("page geometry leaves no usable width: {0}")]
    NoUsableWidth(String),
    #[error("page geometry leaves no usable height: {0}")]
    NoUsableHeight(String),
}
