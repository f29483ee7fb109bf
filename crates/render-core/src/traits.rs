use crate::error::RenderError;
use crate::types::{DocumentMeta, PageOps};

/// A trait for document emitters, abstracting the binary-output backend.
///
/// Emission is one-shot: the orchestrator hands over the complete list of
/// laid-out pages and receives the finished document bytes.
pub trait DocumentEmitter {
    fn emit(&mut self, meta: &DocumentMeta, pages: &[PageOps]) -> Result<Vec<u8>, RenderError>;
}
