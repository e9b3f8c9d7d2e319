//! Render engine interface.
//!
//! Rendering is pure: identical inputs always produce identical output, which
//! is what makes the results safe to cache. Callers reach the engine only
//! through the [`EngineGate`] readiness barrier.

mod runtime;
mod service;
mod types;

pub use runtime::EngineGate;
pub use service::SyntectEngine;
pub use types::{ComputeEngine, ComputeError, EngineInitError, HighlightOutput};
