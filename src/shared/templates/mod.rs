//! HTML page rendering.
//!
//! Handlers build a context with `minijinja::context!` and render one of the
//! embedded pages through the shared [`Templates`] instance held in the
//! application state.

pub mod engine;

pub use engine::{TemplateError, Templates};
