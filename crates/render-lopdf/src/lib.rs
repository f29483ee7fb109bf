//! PDF emission backed by the `lopdf` library.

mod renderer;

pub use renderer::LopdfEmitter;
