mod classes;
mod highlight;
mod theme;

use std::sync::Arc;

use syntect::{dumps::from_uncompressed_data, parsing::SyntaxSet};

use crate::application::render::types::{
    ComputeEngine, ComputeError, EngineInitError, HighlightOutput,
};

/// syntect-backed engine over the syntax pack embedded at build time.
pub struct SyntectEngine {
    syntax_set: SyntaxSet,
}

impl SyntectEngine {
    /// Deserialize the embedded syntax pack. Slow; call it from the blocking pool.
    pub fn load() -> Result<Self, EngineInitError> {
        let syntax_bytes = include_bytes!(env!("SYNTAX_PACK_FILE"));
        let syntax_set: SyntaxSet = from_uncompressed_data(syntax_bytes)
            .map_err(|err| EngineInitError::SyntaxPack(err.to_string()))?;
        Ok(Self::with_syntax_set(syntax_set))
    }

    pub fn with_syntax_set(syntax_set: SyntaxSet) -> Self {
        Self { syntax_set }
    }

    /// Loader suitable for [`EngineGate::new`](crate::application::render::EngineGate::new).
    pub fn loader() -> Result<Arc<dyn ComputeEngine>, EngineInitError> {
        Ok(Arc::new(Self::load()?))
    }
}

impl ComputeEngine for SyntectEngine {
    fn render_highlight(
        &self,
        code: &str,
        language: &str,
        prefix: &str,
    ) -> Result<HighlightOutput, ComputeError> {
        highlight::highlight_code(&self.syntax_set, language, code, prefix)
    }

    fn render_theme_css(&self, theme_data: &str, prefix: &str) -> Result<String, ComputeError> {
        theme::theme_css(theme_data, prefix)
    }
}
