//! Syntax highlighting for code cells.
//!
//! Highlighting emits CSS classes (`hl-keyword`, `hl-string`, ...) rather than
//! inline colors, so the active theme decides how each role looks. Any failure
//! falls back to escaped plain text.

use std::sync::LazyLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::text::html_escape;

pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Highlights `source` as `language`, or escapes it unchanged when the
/// language is unknown or the grammar fails.
pub fn highlight_code(source: &str, language: Option<&str>) -> String {
    let Some(syntax) = language.and_then(find_syntax) else {
        log::debug!("no grammar for language {:?}, emitting plain text", language);
        return html_escape(source);
    };

    match highlight_with(source, syntax) {
        Ok(html) => html,
        Err(e) => {
            log::debug!("highlighting as {} failed: {}", syntax.name, e);
            html_escape(source)
        }
    }
}

fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    let language = language.trim();
    if language.is_empty() {
        return None;
    }
    let lower = language.to_ascii_lowercase();
    SYNTAX_SET
        .find_syntax_by_token(&lower)
        .or_else(|| SYNTAX_SET.find_syntax_by_name(language))
}

fn highlight_with(source: &str, syntax: &SyntaxReference) -> Result<String, syntect::Error> {
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, CLASS_STYLE);
    for line in LinesWithEndings::from(source) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}
