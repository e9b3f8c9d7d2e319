use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highlighted code plus the syntax that was actually used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightOutput {
    pub html: String,
    /// Name of the resolved syntax; unknown tokens fall back to plain text.
    pub language: String,
}

/// Structured failure reported by the engine for a single input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ComputeError {
    pub message: String,
}

impl ComputeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The engine could not be made ready at all.
#[derive(Debug, Clone, Error)]
pub enum EngineInitError {
    #[error("failed to load syntax pack: {0}")]
    SyntaxPack(String),
    #[error("engine initialisation aborted: {0}")]
    Aborted(String),
}

/// Pure rendering functions behind the cache.
///
/// Implementations must be deterministic: equal inputs give equal outputs,
/// otherwise cached results would disagree with fresh ones.
pub trait ComputeEngine: Send + Sync {
    fn render_highlight(
        &self,
        code: &str,
        language: &str,
        prefix: &str,
    ) -> Result<HighlightOutput, ComputeError>;

    fn render_theme_css(&self, theme_data: &str, prefix: &str) -> Result<String, ComputeError>;
}
