//! The raw request model handed to the pipeline by the caller.
//!
//! A `DocumentRequest` is consumed read-only; validation normalizes it into
//! a [`crate::model::DocumentModel`] before any layout work starts.

use serde::{Deserialize, Serialize};

/// Which kind of business document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Estimate,
    Invoice,
}

impl DocumentKind {
    /// Label used in document titles and suggested filenames.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Estimate => "Estimate",
            DocumentKind::Invoice => "Invoice",
        }
    }
}

/// A raster asset embedded in the letterhead (logo or seal).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedImage {
    #[serde(default)]
    pub name: String,
    /// Encoded image bytes (PNG or JPEG).
    #[serde(default)]
    pub bytes: Vec<u8>,
}

/// The issuing party, including letterhead configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IssuerProfile {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub bank_details: String,
    #[serde(default)]
    pub logo: Option<EmbeddedImage>,
    #[serde(default)]
    pub seal: Option<EmbeddedImage>,
}

/// The counterparty the document is addressed to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Party {
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// One billable line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(default)]
    pub category: Option<String>,
    pub description: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    pub unit_price: f64,
    pub amount: f64,
    /// When set, `amount` is taken as-is instead of `quantity * unit_price`.
    #[serde(default)]
    pub amount_overridden: bool,
}

/// Declared financial summary. Validation checks it against the items.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    pub subtotal: f64,
    /// Fractional rate, e.g. `0.1` for 10%.
    pub tax_rate: f64,
    pub tax: f64,
    #[serde(default)]
    pub adjustment: f64,
    pub total: f64,
}

/// Structured input describing one estimate/invoice to render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRequest {
    pub document_number: String,
    pub kind: DocumentKind,
    pub issue_date: String,
    #[serde(default)]
    pub due_date: Option<String>,
    pub issuer: IssuerProfile,
    pub customer: Party,
    pub items: Vec<LineItem>,
    pub summary: FinancialSummary,
    #[serde(default)]
    pub notes: Option<String>,
}
