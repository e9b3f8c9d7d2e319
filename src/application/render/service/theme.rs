use std::io::Cursor;

use syntect::{
    highlighting::ThemeSet,
    html::{ClassStyle, css_for_theme_with_class_style},
};

use crate::application::render::types::ComputeError;

use super::classes::prefix_css_selectors;

/// Convert a TextMate `.tmTheme` document into class-based CSS.
pub(crate) fn theme_css(theme_data: &str, prefix: &str) -> Result<String, ComputeError> {
    let mut reader = Cursor::new(theme_data.as_bytes());
    let theme =
        ThemeSet::load_from_reader(&mut reader).map_err(|err| ComputeError::new(err.to_string()))?;

    let css = css_for_theme_with_class_style(&theme, ClassStyle::Spaced)
        .map_err(|err| ComputeError::new(err.to_string()))?;

    Ok(prefix_css_selectors(&css, prefix))
}
