//! CSS styles for rendered notebooks.
//!
//! `STYLE` holds the theme-independent layout rules. Colors come only from
//! `palette_css`, which scopes a palette under one body class.

use crate::theme::Palette;

// ============================================================================
// Base Layout
// ============================================================================

pub const STYLE: &str = r#"
* { box-sizing: border-box; }

body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
}

.notebook-container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 2rem 1.5rem;
}

.cell { margin: 1rem 0; }

.input, .output {
    display: flex;
    gap: 0.75rem;
    align-items: flex-start;
}

.output { margin-top: 0.4rem; }

.prompt {
    flex: 0 0 5.5rem;
    text-align: right;
    font-family: "SF Mono", "Consolas", "Liberation Mono", monospace;
    font-size: 0.8rem;
    padding-top: 0.6rem;
    white-space: nowrap;
    user-select: none;
}

.input-area {
    flex: 1;
    min-width: 0;
    border: 1px solid;
    border-left-width: 4px;
    border-radius: 4px;
    overflow-x: auto;
}

.input-area pre { padding: 0.6rem 0.8rem; }

.output-area {
    flex: 1;
    min-width: 0;
    overflow-x: auto;
    padding: 0.4rem 0.8rem;
    border-left: 4px solid;
    border-radius: 4px;
}

pre {
    margin: 0;
    font-family: "SF Mono", "Consolas", "Liberation Mono", monospace;
    font-size: 0.85rem;
    line-height: 1.45;
    white-space: pre-wrap;
    word-wrap: break-word;
}

.output-image {
    display: block;
    max-width: 100%;
    height: auto;
    margin: 10px auto;
    border-radius: 4px;
}

.output-svg svg { max-width: 100%; height: auto; }

.output-html { overflow-x: auto; }

.error-header { margin-bottom: 0.4rem; }

.markdown-content {
    padding: 0 0.5rem 0 6.25rem;
    overflow-wrap: break-word;
}

.markdown-content img { max-width: 100%; }

.markdown-content code {
    font-family: "SF Mono", "Consolas", "Liberation Mono", monospace;
    font-size: 0.875em;
    padding: 0.1em 0.35em;
    border-radius: 3px;
}

.markdown-content pre {
    padding: 0.75rem;
    border-radius: 4px;
    overflow-x: auto;
}

.markdown-content pre code { padding: 0; font-size: inherit; }

.markdown-content blockquote {
    margin: 1em 0;
    padding: 0 1em;
    border-left: 4px solid;
}

.markdown-content li input[type="checkbox"] { margin-right: 0.4em; }

.raw-content { padding: 0.6rem 0.8rem 0.6rem 6.25rem; }

table, .dataframe {
    border-collapse: collapse;
    margin: 1em 0;
    font-size: 0.9em;
}

th, td {
    padding: 6px 12px;
    border: 1px solid;
    text-align: left;
}

@media (max-width: 700px) {
    .input, .output { flex-direction: column; gap: 0.25rem; }
    .prompt { flex-basis: auto; text-align: left; padding-top: 0; }
    .markdown-content, .raw-content { padding-left: 0.5rem; }
}

@media print {
    .notebook-container { max-width: none; padding: 0; }
    .cell { break-inside: avoid; }
}
"#;

// ============================================================================
// Theme Rules
// ============================================================================

/// Renders the color rules for one palette, every selector scoped under
/// `class` on the body element. `background` is the body background
/// declaration block.
pub fn palette_css(class: &str, p: &Palette<'_>, background: &str, dark: bool) -> String {
    let scheme = if dark { "dark" } else { "light" };
    let s = format!(".{}", class);

    format!(
        r#"
body{s} {{
    color-scheme: {scheme};
    color: {text};
{background}}}
{s} h1, {s} h2, {s} h3, {s} h4, {s} h5, {s} h6 {{ color: {heading}; }}
{s} a {{ color: {link}; }}
{s} .input-area {{ background: {code_bg}; border-color: {code_border}; }}
{s} .markdown-content code, {s} .markdown-content pre {{ background: {code_bg}; }}
{s} .markdown-content pre code {{ background: none; }}
{s} .markdown-content blockquote {{ border-color: {code_border}; }}
{s} .prompt {{ color: {exec}; }}
{s} .output-area {{ background: {out_bg}; color: {out_text}; border-color: {out_border}; }}
{s} .raw-content {{ color: {out_text}; }}
{s} .hl-keyword, {s} .hl-storage {{ color: {kw}; }}
{s} .hl-string {{ color: {string}; }}
{s} .hl-comment {{ color: {comment}; font-style: italic; }}
{s} .hl-constant.hl-numeric, {s} .hl-constant.hl-language {{ color: {number}; }}
{s} .hl-entity.hl-name.hl-function, {s} .hl-support.hl-function, {s} .hl-variable.hl-function {{ color: {function}; }}
{s} .hl-keyword.hl-operator {{ color: {operator}; }}
{s} .stream-stderr {{ color: {warn_text}; background: {warn_bg}; }}
{s} .output-error {{ color: {err_text}; background: {err_bg}; border-color: {err_text}; }}
{s} th {{ background: {th_bg}; color: {th_text}; }}
{s} th, {s} td {{ border-color: {t_border}; }}
{s} tbody tr:nth-child(even) {{ background: {t_alt}; }}
"#,
        s = s,
        scheme = scheme,
        text = p.text,
        background = background,
        heading = p.heading,
        link = p.link,
        code_bg = p.code_background,
        code_border = p.code_border,
        exec = p.execution_count,
        out_bg = p.output_background,
        out_text = p.output_text,
        out_border = p.output_border,
        kw = p.syntax_keyword,
        string = p.syntax_string,
        comment = p.syntax_comment,
        number = p.syntax_number,
        function = p.syntax_function,
        operator = p.syntax_operator,
        warn_text = p.warning_text,
        warn_bg = p.warning_background,
        err_text = p.error_text,
        err_bg = p.error_background,
        th_bg = p.table_header_background,
        th_text = p.table_header_text,
        t_border = p.table_border,
        t_alt = p.table_row_alt,
    )
}
