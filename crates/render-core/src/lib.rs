//! Core rendering abstractions for document emission.
//!
//! This crate provides the seam between layout and the concrete PDF
//! backend: a small set of drawing primitives in top-left page coordinates
//! and the `DocumentEmitter` trait that turns them into binary output.

mod error;
mod traits;
mod types;

pub use error::RenderError;
pub use traits::DocumentEmitter;
pub use types::{DocumentMeta, DrawOp, ImageFormat, PageOps, TextOp};
