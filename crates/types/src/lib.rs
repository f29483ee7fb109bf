pub mod color;
pub mod document;
pub mod geometry;
pub mod model;
pub mod money;

pub use color::Color;
pub use document::{
    DocumentKind, DocumentRequest, EmbeddedImage, FinancialSummary, IssuerProfile, LineItem, Party,
};
pub use geometry::{Rect, Size};
pub use model::{DocumentModel, ModelItem};
