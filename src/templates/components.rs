//! Shared HTML components for rendered notebooks.
//!
//! Contains the document shell, prompt labels, and the cell and output
//! containers the renderer fills in.

use crate::text::html_escape;

use super::styles::STYLE;

// ============================================================================
// Document Shell
// ============================================================================

/// Stylesheets placed in the document head, in cascade order.
#[derive(Debug, Clone, Default)]
pub struct HeadStyles<'a> {
    /// Named-theme rules, appended to the base stylesheet.
    pub theme_css: Option<&'a str>,
    /// Custom-theme rules, in their own block.
    pub custom_theme_css: Option<&'a str>,
    /// Caller-supplied CSS, verbatim and last.
    pub override_css: Option<&'a str>,
}

pub fn base_html(title: &str, styles: &HeadStyles<'_>, body_class: &str, content: &str) -> String {
    let custom_theme_block = styles
        .custom_theme_css
        .map(|css| format!("\n    <style id=\"custom-theme\">{}</style>", css))
        .unwrap_or_default();
    let override_block = styles
        .override_css
        .filter(|css| !css.trim().is_empty())
        .map(|css| format!("\n    <style id=\"custom-css\">\n{}\n</style>", css))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="nbhtml">
    <title>{title}</title>
    <style>{STYLE}{theme}</style>{custom_theme}{overrides}
</head>
<body class="{body_class}">
    <main class="notebook-container">
{content}    </main>
</body>
</html>
"#,
        title = html_escape(title),
        theme = styles.theme_css.unwrap_or(""),
        custom_theme = custom_theme_block,
        overrides = override_block,
        body_class = html_escape(body_class),
        content = content,
    )
}

// ============================================================================
// Prompts
// ============================================================================

pub fn input_prompt(execution_count: Option<i64>) -> String {
    format!("In [{}]:", count_label(execution_count))
}

pub fn output_prompt(execution_count: Option<i64>) -> String {
    format!("Out [{}]:", count_label(execution_count))
}

/// A missing count is a blank, never `0` or `null`.
fn count_label(execution_count: Option<i64>) -> String {
    execution_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| " ".to_string())
}

// ============================================================================
// Containers
// ============================================================================

pub fn cell_container(kind_class: &str, id: Option<&str>, inner: &str) -> String {
    let id_attr = id
        .map(|id| format!(" id=\"{}\"", html_escape(id)))
        .unwrap_or_default();
    format!(
        "<div class=\"cell {}\"{}>\n{}</div>\n",
        kind_class, id_attr, inner
    )
}

pub fn input_block(execution_count: Option<i64>, highlighted: &str) -> String {
    format!(
        "<div class=\"input\">\n<div class=\"prompt input-prompt\">{}</div>\n<div class=\"input-area\"><pre class=\"highlight\"><code>{}</code></pre></div>\n</div>\n",
        input_prompt(execution_count),
        highlighted
    )
}

/// One output row. `prompt` is the label text, or empty for unlabelled outputs.
pub fn output_block(kind_class: &str, prompt: &str, inner: &str) -> String {
    format!(
        "<div class=\"output\">\n<div class=\"prompt output-prompt\">{}</div>\n<div class=\"output-area {}\">\n{}</div>\n</div>\n",
        prompt, kind_class, inner
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts() {
        assert_eq!(input_prompt(Some(3)), "In [3]:");
        assert_eq!(input_prompt(None), "In [ ]:");
        assert_eq!(output_prompt(Some(12)), "Out [12]:");
        assert_eq!(output_prompt(None), "Out [ ]:");
    }

    #[test]
    fn test_base_html_escapes_title() {
        let html = base_html("<b>&</b>", &HeadStyles::default(), "theme-light", "");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>&lt;b&gt;&amp;&lt;/b&gt;</title>"));
        assert!(html.contains("<body class=\"theme-light\">"));
        assert!(html.contains("<meta charset=\"UTF-8\">"));
    }

    #[test]
    fn test_base_html_style_blocks_in_order() {
        let styles = HeadStyles {
            theme_css: None,
            custom_theme_css: Some(".theme-custom a { color: red; }"),
            override_css: Some("body { margin: 3px; }"),
        };
        let html = base_html("t", &styles, "theme-custom", "");
        let custom = html.find("id=\"custom-theme\"").unwrap();
        let overrides = html.find("id=\"custom-css\"").unwrap();
        assert!(custom < overrides);
        assert!(html.contains("body { margin: 3px; }"));
    }

    #[test]
    fn test_blank_override_omitted() {
        let styles = HeadStyles {
            override_css: Some("   "),
            ..HeadStyles::default()
        };
        assert!(!base_html("t", &styles, "c", "").contains("custom-css"));
    }

    #[test]
    fn test_cell_container_escapes_id() {
        let html = cell_container("code-cell", Some("a\"b"), "");
        assert!(html.contains("id=\"a&quot;b\""));
        assert!(cell_container("raw-cell", None, "").starts_with("<div class=\"cell raw-cell\">"));
    }
}
