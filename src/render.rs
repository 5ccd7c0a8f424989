//! Notebook to HTML rendering.
//!
//! Rendering is a pure function of the document, the settings and the title:
//! cells are emitted in order, each output in its authored position, and the
//! same inputs always produce byte-identical HTML.

use base64::Engine;

use crate::highlight::highlight_code;
use crate::markdown::render_markdown;
use crate::models::{Cell, CellKind, MimeBundle, Notebook, Output, StreamName, MIME_HTML, MIME_PLAIN, MIME_SVG};
use crate::templates::{base_html, cell_container, input_block, output_block, output_prompt, HeadStyles};
use crate::text::{compact_base64, html_escape, image_data_uri, strip_ansi};
use crate::theme::Theme;
use crate::ConversionSettings;

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

/// An image written next to the HTML instead of being embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// File name inside the resources directory.
    pub filename: String,
    pub mime: &'static str,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotebook {
    pub html: String,
    /// Empty when images are embedded.
    pub resources: Vec<Resource>,
}

pub fn render(notebook: &Notebook, settings: &ConversionSettings, title: &str) -> String {
    render_with_resources(notebook, settings, title).html
}

pub fn render_with_resources(
    notebook: &Notebook,
    settings: &ConversionSettings,
    title: &str,
) -> RenderedNotebook {
    let mut renderer = CellRenderer {
        settings,
        language: notebook.language(),
        resources: Vec::new(),
    };

    let body: String = notebook
        .cells
        .iter()
        .enumerate()
        .map(|(index, cell)| renderer.render_cell(index, cell))
        .collect();

    let custom_css;
    let mut styles = HeadStyles {
        override_css: settings.custom_css.as_deref(),
        ..HeadStyles::default()
    };
    match &settings.theme {
        Theme::Named(named) => styles.theme_css = Some(named.css()),
        Theme::Custom(custom) => {
            custom_css = custom.css();
            styles.custom_theme_css = Some(&custom_css);
        }
    }

    let html = base_html(title, &styles, &settings.theme.css_class(), &body);
    RenderedNotebook {
        html,
        resources: renderer.resources,
    }
}

struct CellRenderer<'a> {
    settings: &'a ConversionSettings,
    language: Option<&'a str>,
    resources: Vec<Resource>,
}

impl CellRenderer<'_> {
    fn render_cell(&mut self, index: usize, cell: &Cell) -> String {
        let id = cell.id.as_deref();
        let source = cell.source_text();

        match cell.kind {
            CellKind::Markdown => cell_container(
                "markdown-cell",
                id,
                &format!(
                    "<div class=\"markdown-content\">\n{}</div>\n",
                    render_markdown(&source, &cell.attachments)
                ),
            ),
            CellKind::Raw => cell_container(
                "raw-cell",
                id,
                &format!("<pre class=\"raw-content\">{}</pre>\n", html_escape(&source)),
            ),
            CellKind::Code => {
                let mut inner = String::new();
                if self.settings.include_input_cells {
                    inner.push_str(&input_block(
                        cell.execution_count,
                        &highlight_code(&source, self.language),
                    ));
                }
                for (output_index, output) in cell.outputs.iter().enumerate() {
                    inner.push_str(&self.render_output(index, output_index, output));
                }
                if inner.is_empty() {
                    return String::new();
                }
                cell_container("code-cell", id, &inner)
            }
        }
    }

    fn render_output(&mut self, cell_index: usize, output_index: usize, output: &Output) -> String {
        match output {
            Output::Stream { name, text } => {
                let class = match name {
                    StreamName::Stdout => "stream-stdout",
                    StreamName::Stderr => "stream-stderr",
                };
                output_block(
                    "output-stream",
                    "",
                    &format!(
                        "<pre class=\"{}\">{}</pre>\n",
                        class,
                        html_escape(&strip_ansi(text))
                    ),
                )
            }
            Output::DisplayData { data, .. } => {
                let content = self.render_bundle(cell_index, output_index, data);
                if content.is_empty() {
                    return String::new();
                }
                output_block("output-display", "", &content)
            }
            Output::ExecuteResult {
                data,
                execution_count,
                ..
            } => {
                let content = self.render_bundle(cell_index, output_index, data);
                if content.is_empty() {
                    return String::new();
                }
                output_block("output-result", &output_prompt(*execution_count), &content)
            }
            Output::Error {
                name,
                value,
                traceback,
            } => {
                let header = if value.is_empty() {
                    html_escape(name)
                } else {
                    format!("{}: {}", html_escape(name), html_escape(value))
                };
                let mut inner = format!(
                    "<div class=\"error-header\"><strong>{}</strong></div>\n",
                    header
                );
                if !traceback.is_empty() {
                    let lines: Vec<String> = traceback
                        .iter()
                        .map(|line| html_escape(&strip_ansi(line)))
                        .collect();
                    inner.push_str(&format!(
                        "<pre class=\"traceback\">{}</pre>\n",
                        lines.join("\n")
                    ));
                }
                output_block("output-error", "", &inner)
            }
        }
    }

    /// Picks representations by priority: every image present, else HTML,
    /// else plain text, else nothing.
    fn render_bundle(&mut self, cell_index: usize, output_index: usize, data: &MimeBundle) -> String {
        let mut content = String::new();

        for (image_index, (mime, payload)) in data.images().enumerate() {
            if mime == MIME_SVG && payload.trim_start().starts_with('<') {
                content.push_str(&format!("<div class=\"output-svg\">{}</div>\n", payload));
                continue;
            }
            let src = self.image_source(cell_index, output_index, image_index, mime, &payload);
            content.push_str(&format!(
                "<img class=\"output-image\" src=\"{}\" alt=\"output\">\n",
                html_escape(&src)
            ));
        }
        if !content.is_empty() {
            return content;
        }

        if let Some(html) = data.text(MIME_HTML) {
            return format!("<div class=\"output-html\">\n{}\n</div>\n", html);
        }
        if let Some(plain) = data.text(MIME_PLAIN) {
            return format!(
                "<pre class=\"output-text\">{}</pre>\n",
                html_escape(&strip_ansi(&plain))
            );
        }
        String::new()
    }

    /// Inline `data:` URI, or a path into the resources directory when
    /// embedding is off and the payload decodes.
    fn image_source(
        &mut self,
        cell_index: usize,
        output_index: usize,
        image_index: usize,
        mime: &'static str,
        payload: &str,
    ) -> String {
        if self.settings.embed_images_as_base64 || mime == MIME_SVG {
            return image_data_uri(mime, payload);
        }

        match base64::engine::general_purpose::STANDARD.decode(compact_base64(payload)) {
            Ok(data) => {
                let filename = format!(
                    "output_{}_{}_{}.{}",
                    cell_index,
                    output_index,
                    image_index,
                    extension_for(mime)
                );
                let src = format!(
                    "{}/{}",
                    self.settings.resources_dir.trim_end_matches('/'),
                    filename
                );
                self.resources.push(Resource {
                    filename,
                    mime,
                    data,
                });
                src
            }
            Err(e) => {
                log::warn!(
                    "cell {} output {}: {} payload is not valid base64 ({}), embedding inline",
                    cell_index,
                    output_index,
                    mime,
                    e
                );
                image_data_uri(mime, payload)
            }
        }
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        _ => "png",
    }
}
