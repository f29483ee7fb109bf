//! The validated, normalized in-memory document representation.
//!
//! Built once per pipeline run by the validator and never mutated after
//! construction. Strings are trimmed, category colors resolved, and the
//! financial summary recomputed from the items.

use crate::color::Color;
use crate::document::{DocumentKind, FinancialSummary, IssuerProfile, Party};

/// Display colors for known item categories. Unknown categories fall back
/// to [`DEFAULT_CATEGORY_COLOR`].
pub const CATEGORY_COLORS: &[(&str, Color)] = &[
    ("design", Color::rgb(0x4a, 0x90, 0xd9)),
    ("development", Color::rgb(0x5c, 0xb8, 0x5c)),
    ("consulting", Color::rgb(0xf0, 0xad, 0x4e)),
    ("maintenance", Color::rgb(0x9b, 0x59, 0xb6)),
    ("travel", Color::rgb(0xe7, 0x4c, 0x3c)),
    ("materials", Color::rgb(0x16, 0xa0, 0x85)),
];

pub const DEFAULT_CATEGORY_COLOR: Color = Color::gray(0x88);

/// Resolves the display color for a category label (case-insensitive).
pub fn category_color(category: &str) -> Color {
    let lowered = category.trim().to_lowercase();
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_CATEGORY_COLOR)
}

/// A normalized line item with its resolved display color.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelItem {
    pub category: Option<String>,
    pub category_color: Color,
    pub description: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub unit_price: f64,
    pub amount: f64,
}

/// Validated, immutable representation of one document. Owned by a single
/// pipeline run and discarded when the run completes.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentModel {
    pub document_number: String,
    pub kind: DocumentKind,
    pub issue_date: String,
    pub due_date: Option<String>,
    pub issuer: IssuerProfile,
    pub customer: Party,
    pub items: Vec<ModelItem>,
    pub summary: FinancialSummary,
    pub notes: Option<String>,
}
