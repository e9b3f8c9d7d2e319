use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use crate::application::render::types::{ComputeError, HighlightOutput};

use super::classes::prefix_html_classes;

pub(crate) fn highlight_code(
    syntax_set: &SyntaxSet,
    language: &str,
    code: &str,
    prefix: &str,
) -> Result<HighlightOutput, ComputeError> {
    let syntax =
        find_syntax(syntax_set, language).unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, ClassStyle::Spaced);

    // Newline-terminated syntaxes need every line, including the last, to end in `\n`.
    let mut code_with_newline = code.to_string();
    if !code_with_newline.is_empty() && !code_with_newline.ends_with('\n') {
        code_with_newline.push('\n');
    }

    for line in LinesWithEndings::from(code_with_newline.as_str()) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| ComputeError::new(format!("{} ({})", err, syntax.name)))?;
    }

    let html = generator.finalize();
    Ok(HighlightOutput {
        html: prefix_html_classes(&html, prefix),
        language: syntax.name.clone(),
    })
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(token))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}
