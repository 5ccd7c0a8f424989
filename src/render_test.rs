//! Scenario tests for whole-notebook rendering.
//!
//! Notebooks are built in memory so each test states exactly the cells and
//! outputs it renders.

use super::*;
use crate::models::{Cell, NotebookMetadata};
use crate::theme::{BackgroundStyle, CustomTheme, NamedTheme};
use serde_json::json;

const PNG: &str = "iVBORw0KGgo=";

// ============================================================================
// Helpers
// ============================================================================

fn notebook(cells: Vec<Cell>) -> Notebook {
    Notebook {
        cells,
        ..Notebook::default()
    }
}

fn render_default(cells: Vec<Cell>) -> String {
    render(&notebook(cells), &ConversionSettings::default(), "Notebook")
}

fn stdout(text: &str) -> Output {
    Output::Stream {
        name: StreamName::Stdout,
        text: text.to_string(),
    }
}

fn display(data: MimeBundle) -> Output {
    Output::DisplayData {
        data,
        metadata: Default::default(),
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_markdown_heading() {
    let html = render_default(vec![Cell::markdown("# Title")]);
    assert!(html.contains("<div class=\"markdown-content\">\n<h1>Title</h1>"));
    assert!(html.contains("<div class=\"cell markdown-cell\">"));
}

#[test]
fn test_code_cell_with_stdout() {
    let html = render_default(vec![Cell::code("print('hello')", Some(5), vec![stdout("hello\n")])]);
    assert!(html.contains("In [5]:"));
    assert!(html.contains("<pre class=\"stream-stdout\">hello\n</pre>"));
    assert!(html.contains("output-stream"));
    assert!(html.contains("hello"));
}

#[test]
fn test_error_output_strips_ansi() {
    let error = Output::Error {
        name: "ValueError".to_string(),
        value: "bad input".to_string(),
        traceback: vec![
            "Traceback line 1".to_string(),
            "\u{1b}[31mline2\u{1b}[0m".to_string(),
        ],
    };
    let html = render_default(vec![Cell::code("raise", Some(1), vec![error])]);
    assert!(html.contains("<strong>ValueError: bad input</strong>"));
    assert!(html.contains("<pre class=\"traceback\">Traceback line 1\nline2</pre>"));
    assert!(!html.contains('\u{1b}'));
    assert!(!html.contains("[31m"));
}

#[test]
fn test_png_embedded_as_data_uri() {
    let bundle = MimeBundle::new().with("image/png", PNG);
    let html = render_default(vec![Cell::code("plot()", Some(2), vec![display(bundle)])]);
    assert!(html.contains("<img class=\"output-image\" src=\"data:image/png;base64,iVBORw0KGgo=\""));
}

#[test]
fn test_named_and_custom_backgrounds_differ() {
    let nb = notebook(vec![Cell::markdown("text")]);

    let named = ConversionSettings {
        theme: Theme::Named(NamedTheme::Dracula),
        ..ConversionSettings::default()
    };
    let custom_theme = CustomTheme::from_named("Grid", NamedTheme::Dracula)
        .with_background_style(BackgroundStyle::Grid)
        .with_pattern_opacity(0.1);
    let custom = ConversionSettings {
        theme: Theme::Custom(custom_theme),
        ..ConversionSettings::default()
    };

    let named_html = render(&nb, &named, "t");
    let custom_html = render(&nb, &custom, "t");
    assert_ne!(named_html, custom_html);

    assert!(named_html.contains("<body class=\"theme-dracula\">"));
    assert!(!named_html.contains("theme-custom"));
    assert!(!named_html.contains("rgba(98, 114, 164, 0.1)"));

    assert!(custom_html.contains("<body class=\"theme-custom\">"));
    assert!(custom_html.contains("<style id=\"custom-theme\">"));
    assert!(custom_html.contains("rgba(98, 114, 164, 0.1)"));
    assert!(custom_html.contains("background-size: 20px 20px;"));
    assert!(!custom_html.contains("theme-dracula"));
}

#[test]
fn test_only_active_named_theme_included() {
    let settings = ConversionSettings {
        theme: Theme::Named(NamedTheme::Nord),
        ..ConversionSettings::default()
    };
    let html = render(&notebook(vec![]), &settings, "t");
    assert!(html.contains("body.theme-nord"));
    for other in NamedTheme::ALL.iter().filter(|t| **t != NamedTheme::Nord) {
        assert!(!html.contains(&format!("body.{}", other.css_class())));
    }
}

#[test]
fn test_script_never_unescaped() {
    let html = render_default(vec![
        Cell::code("x = '<script>alert(1)</script>'", Some(1), vec![stdout("<script>\n")]),
        Cell::markdown("hi <script>alert(2)</script>"),
        Cell::raw("<script>alert(3)</script>"),
    ]);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn test_rendering_is_deterministic() {
    let nb = notebook(vec![
        Cell::markdown("# A\n\nsee https://example.com"),
        Cell::code("1 + 1", Some(1), vec![display(MimeBundle::new().with("text/plain", "2"))]),
    ]);
    let settings = ConversionSettings::default();
    assert_eq!(render(&nb, &settings, "t"), render(&nb, &settings, "t"));
}

#[test]
fn test_images_preferred_over_plain_and_all_emitted() {
    let bundle = MimeBundle::new()
        .with("text/plain", "<Figure size 640x480>")
        .with("image/jpeg", "/9j/4AAQ")
        .with("image/png", PNG);
    let html = render_default(vec![Cell::code("fig", Some(3), vec![display(bundle)])]);

    let png = html.find("data:image/png;base64,").unwrap();
    let jpeg = html.find("data:image/jpeg;base64,").unwrap();
    assert!(png < jpeg);
    assert!(!html.contains("Figure size"));
}

#[test]
fn test_svg_markup_inlined() {
    let bundle = MimeBundle::new().with("image/svg+xml", json!(["<svg width=\"4\">", "</svg>"]));
    let html = render_default(vec![Cell::code("svg", Some(1), vec![display(bundle)])]);
    assert!(html.contains("<div class=\"output-svg\"><svg width=\"4\"></svg></div>"));
}

#[test]
fn test_html_preferred_over_plain() {
    let bundle = MimeBundle::new()
        .with("text/html", "<table><tr><td>1</td></tr></table>")
        .with("text/plain", "df");
    let html = render_default(vec![Cell::code("df", Some(4), vec![display(bundle)])]);
    assert!(html.contains("<div class=\"output-html\">\n<table><tr><td>1</td></tr></table>\n</div>"));
    assert!(!html.contains("<pre class=\"output-text\">df</pre>"));
}

#[test]
fn test_plain_text_escaped() {
    let bundle = MimeBundle::new().with("text/plain", "a < b");
    let html = render_default(vec![Cell::code("x", Some(1), vec![display(bundle)])]);
    assert!(html.contains("<pre class=\"output-text\">a &lt; b</pre>"));
}

#[test]
fn test_empty_bundle_emits_nothing() {
    let result = Output::ExecuteResult {
        data: MimeBundle::new().with("application/json", json!({"a": 1})),
        metadata: Default::default(),
        execution_count: Some(7),
    };
    let html = render_default(vec![Cell::code("x", Some(7), vec![result])]);
    assert!(html.contains("In [7]:"));
    assert!(!html.contains("Out [7]:"));
    assert!(!html.contains("output-result"));
}

#[test]
fn test_execute_result_prompt() {
    let result = Output::ExecuteResult {
        data: MimeBundle::new().with("text/plain", "42"),
        metadata: Default::default(),
        execution_count: None,
    };
    let html = render_default(vec![Cell::code("x", None, vec![result])]);
    assert!(html.contains("In [ ]:"));
    assert!(html.contains("Out [ ]:"));
    assert!(html.contains("<pre class=\"output-text\">42</pre>"));
}

#[test]
fn test_stderr_class() {
    let output = Output::Stream {
        name: StreamName::Stderr,
        text: "warning: \u{1b}[33mcareful\u{1b}[0m\n".to_string(),
    };
    let html = render_default(vec![Cell::code("x", Some(1), vec![output])]);
    assert!(html.contains("<pre class=\"stream-stderr\">warning: careful\n</pre>"));
}

#[test]
fn test_outputs_keep_authored_order() {
    let html = render_default(vec![Cell::code(
        "x",
        Some(1),
        vec![
            stdout("out-one\n"),
            display(MimeBundle::new().with("text/plain", "out-two")),
            stdout("out-three\n"),
        ],
    )]);
    let first = html.find("out-one").unwrap();
    let second = html.find("out-two").unwrap();
    let third = html.find("out-three").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn test_hidden_input() {
    let settings = ConversionSettings {
        include_input_cells: false,
        ..ConversionSettings::default()
    };
    let nb = notebook(vec![
        Cell::code("secret_source()", Some(1), vec![stdout("shown-output\n")]),
        Cell::code("no_outputs()", Some(2), vec![]),
    ]);
    let html = render(&nb, &settings, "t");
    assert!(!html.contains("secret_source"));
    assert!(!html.contains("In [1]:"));
    assert!(html.contains("shown-output"));
    assert!(!html.contains("no_outputs"));
    assert_eq!(html.matches("class=\"cell code-cell\"").count(), 1);
}

#[test]
fn test_images_written_as_resources() {
    let settings = ConversionSettings {
        embed_images_as_base64: false,
        resources_dir: "report_files/".to_string(),
        ..ConversionSettings::default()
    };
    let bundle = MimeBundle::new().with("image/png", PNG).with("image/jpeg", "/9j/");
    let nb = notebook(vec![
        Cell::markdown("intro"),
        Cell::code("plot()", Some(1), vec![stdout("x\n"), display(bundle)]),
    ]);
    let rendered = render_with_resources(&nb, &settings, "t");

    assert!(rendered.html.contains("src=\"report_files/output_1_1_0.png\""));
    assert!(rendered.html.contains("src=\"report_files/output_1_1_1.jpg\""));
    assert!(!rendered.html.contains("base64,"));
    assert_eq!(rendered.resources.len(), 2);
    assert_eq!(rendered.resources[0].filename, "output_1_1_0.png");
    assert_eq!(rendered.resources[0].mime, "image/png");
    assert_eq!(&rendered.resources[0].data[..4], &[0x89, b'P', b'N', b'G']);
}

#[test]
fn test_undecodable_image_falls_back_inline() {
    let settings = ConversionSettings {
        embed_images_as_base64: false,
        ..ConversionSettings::default()
    };
    let bundle = MimeBundle::new().with("image/png", "not base64!!");
    let rendered = render_with_resources(
        &notebook(vec![Cell::code("x", Some(1), vec![display(bundle)])]),
        &settings,
        "t",
    );
    assert!(rendered.resources.is_empty());
    assert!(rendered.html.contains("src=\"data:image/png;base64,notbase64!!\""));
}

#[test]
fn test_embedded_render_has_no_resources() {
    let bundle = MimeBundle::new().with("image/png", PNG);
    let rendered = render_with_resources(
        &notebook(vec![Cell::code("x", Some(1), vec![display(bundle)])]),
        &ConversionSettings::default(),
        "t",
    );
    assert!(rendered.resources.is_empty());
}

#[test]
fn test_custom_css_appended_last() {
    let settings = ConversionSettings {
        theme: Theme::Custom(CustomTheme::default()),
        custom_css: Some(".cell { margin: 0; }".to_string()),
        ..ConversionSettings::default()
    };
    let html = render(&notebook(vec![]), &settings, "t");
    let custom_theme = html.find("<style id=\"custom-theme\">").unwrap();
    let overrides = html.find(".cell { margin: 0; }").unwrap();
    assert!(custom_theme < overrides);
    assert!(overrides > html.rfind("body.theme-custom").unwrap());
}

#[test]
fn test_title_escaped() {
    let html = render(&notebook(vec![]), &ConversionSettings::default(), "A & <B>");
    assert!(html.contains("<title>A &amp; &lt;B&gt;</title>"));
}

#[test]
fn test_raw_cell_verbatim() {
    let html = render_default(vec![Cell::raw("\\begin{equation}\nx\n")]);
    assert!(html.contains("<pre class=\"raw-content\">\\begin{equation}\nx\n</pre>"));
}

#[test]
fn test_cell_id_rendered() {
    let mut cell = Cell::markdown("hi");
    cell.id = Some("intro-cell".to_string());
    let html = render_default(vec![cell]);
    assert!(html.contains("<div class=\"cell markdown-cell\" id=\"intro-cell\">"));
}

#[test]
fn test_empty_notebook_is_complete_document() {
    let html = render_default(vec![]);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<main class=\"notebook-container\">"));
    assert!(html.trim_end().ends_with("</html>"));
}

#[test]
fn test_notebook_language_drives_highlighting() {
    let nb = Notebook {
        metadata: NotebookMetadata {
            language: Some("python".to_string()),
            ..NotebookMetadata::default()
        },
        ..notebook(vec![Cell::code("def f(x):\n    return x  # done\n", Some(1), vec![])])
    };
    let html = render(&nb, &ConversionSettings::default(), "t");
    assert!(html.contains("<span class=\"hl-"));
    assert!(html.contains("hl-comment"));

    let plain = render_default(vec![Cell::code("def f(x):\n    return x\n", Some(1), vec![])]);
    assert!(!plain.contains("<span class=\"hl-"));
}

#[test]
fn test_custom_theme_colors_cannot_close_style() {
    let mut theme = CustomTheme::default();
    theme.link_color = "red; }</style><script>alert(1)</script><style>".to_string();
    let settings = ConversionSettings {
        theme: Theme::Custom(theme),
        ..ConversionSettings::default()
    };
    let html = render(&notebook(vec![]), &settings, "t");
    assert!(!html.contains("<script>"));
    assert_eq!(html.matches("</style>").count(), 2);
}
