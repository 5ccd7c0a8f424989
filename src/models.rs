//! Data models for notebook documents.
//!
//! This module contains the typed view of a Jupyter notebook used throughout
//! the converter: the document root, its ordered cells, and the outputs
//! attached to code cells. Parsing and re-serialization live in `notebook`.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{DEFAULT_NBFORMAT, DEFAULT_NBFORMAT_MINOR};

// ============================================================================
// Document
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self {
            major: DEFAULT_NBFORMAT,
            minor: DEFAULT_NBFORMAT_MINOR,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotebookMetadata {
    pub kernel_name: Option<String>,
    /// Source language, from `language_info.name` or `kernelspec.language`.
    pub language: Option<String>,
    pub language_version: Option<String>,
    /// The metadata map exactly as authored, written back on re-serialization.
    pub raw: Map<String, Value>,
}

impl NotebookMetadata {
    pub fn from_raw(raw: Map<String, Value>) -> Self {
        let kernelspec = raw.get("kernelspec");
        let language_info = raw.get("language_info");

        let kernel_name = kernelspec
            .and_then(|k| k.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let language = language_info
            .and_then(|l| l.get("name"))
            .or_else(|| kernelspec.and_then(|k| k.get("language")))
            .and_then(Value::as_str)
            .map(str::to_string);
        let language_version = language_info
            .and_then(|l| l.get("version"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            kernel_name,
            language,
            language_version,
            raw,
        }
    }

    /// Title stored in the notebook metadata, if any.
    pub fn title(&self) -> Option<&str> {
        self.raw
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notebook {
    pub format_version: FormatVersion,
    pub metadata: NotebookMetadata,
    /// Cells in authored order; rendering follows this order exactly.
    pub cells: Vec<Cell>,
}

impl Notebook {
    pub fn language(&self) -> Option<&str> {
        self.metadata.language.as_deref()
    }
}

// ============================================================================
// Cells
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Code,
    Markdown,
    Raw,
}

impl CellKind {
    /// Maps a `cell_type` string. Anything unrecognised is treated as code.
    pub fn from_type(cell_type: &str) -> Self {
        match cell_type {
            "markdown" => CellKind::Markdown,
            "raw" => CellKind::Raw,
            _ => CellKind::Code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Code => "code",
            CellKind::Markdown => "markdown",
            CellKind::Raw => "raw",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub kind: CellKind,
    pub id: Option<String>,
    /// Source lines; concatenated with no separator to form the cell text.
    pub source: Vec<String>,
    pub metadata: Map<String, Value>,
    /// Always empty unless `kind` is `Code`.
    pub outputs: Vec<Output>,
    /// Always `None` unless `kind` is `Code`.
    pub execution_count: Option<i64>,
    /// Inline attachments referenced from markdown as `attachment:<name>`.
    pub attachments: BTreeMap<String, MimeBundle>,
}

impl Cell {
    pub fn new(kind: CellKind, source: &str) -> Self {
        Self {
            kind,
            id: None,
            source: split_lines(source),
            metadata: Map::new(),
            outputs: Vec::new(),
            execution_count: None,
            attachments: BTreeMap::new(),
        }
    }

    pub fn code(source: &str, execution_count: Option<i64>, outputs: Vec<Output>) -> Self {
        Self {
            outputs,
            execution_count,
            ..Self::new(CellKind::Code, source)
        }
    }

    pub fn markdown(source: &str) -> Self {
        Self::new(CellKind::Markdown, source)
    }

    pub fn raw(source: &str) -> Self {
        Self::new(CellKind::Raw, source)
    }

    pub fn source_text(&self) -> String {
        self.source.concat()
    }
}

/// Splits text into lines that keep their trailing `\n`, the way notebooks store them.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

// ============================================================================
// Outputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamName {
    Stdout,
    Stderr,
}

impl StreamName {
    pub fn from_name(name: &str) -> Self {
        if name == "stderr" {
            StreamName::Stderr
        } else {
            StreamName::Stdout
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamName::Stdout => "stdout",
            StreamName::Stderr => "stderr",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Stream {
        name: StreamName,
        text: String,
    },
    DisplayData {
        data: MimeBundle,
        metadata: Map<String, Value>,
    },
    ExecuteResult {
        data: MimeBundle,
        metadata: Map<String, Value>,
        execution_count: Option<i64>,
    },
    Error {
        name: String,
        value: String,
        /// Raw traceback lines, possibly carrying ANSI color escapes.
        traceback: Vec<String>,
    },
}

impl Output {
    pub fn output_type(&self) -> &'static str {
        match self {
            Output::Stream { .. } => "stream",
            Output::DisplayData { .. } => "display_data",
            Output::ExecuteResult { .. } => "execute_result",
            Output::Error { .. } => "error",
        }
    }
}

pub const MIME_HTML: &str = "text/html";
pub const MIME_PLAIN: &str = "text/plain";
pub const MIME_SVG: &str = "image/svg+xml";

/// Image types in the order they are emitted.
pub const IMAGE_MIME_TYPES: [&str; 4] = ["image/png", "image/jpeg", MIME_SVG, "image/gif"];

/// Alternative representations of one output, keyed by MIME type.
///
/// Payloads are kept as raw JSON values: text types may be a string or an
/// array of strings, binary types are base64 text, and JSON types are objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MimeBundle(BTreeMap<String, Value>);

impl MimeBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }

    pub fn with(mut self, mime: &str, payload: impl Into<Value>) -> Self {
        self.insert(mime, payload);
        self
    }

    pub fn insert(&mut self, mime: &str, payload: impl Into<Value>) {
        self.0.insert(mime.to_string(), payload.into());
    }

    /// Payload for `mime` as text, joining line arrays with no separator.
    pub fn text(&self, mime: &str) -> Option<String> {
        self.0.get(mime).map(value_to_text)
    }

    /// Image representations present, in `IMAGE_MIME_TYPES` order.
    pub fn images(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        IMAGE_MIME_TYPES
            .into_iter()
            .filter_map(|mime| self.text(mime).map(|payload| (mime, payload)))
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}

/// Coerces a JSON value to text: strings as-is, arrays concatenated element by
/// element, null as empty, anything else as its JSON rendering.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_to_text).collect(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_kind_unknown_defaults_to_code() {
        assert_eq!(CellKind::from_type("markdown"), CellKind::Markdown);
        assert_eq!(CellKind::from_type("raw"), CellKind::Raw);
        assert_eq!(CellKind::from_type("heading"), CellKind::Code);
        assert_eq!(CellKind::from_type(""), CellKind::Code);
    }

    #[test]
    fn test_split_lines_keeps_newlines() {
        assert_eq!(split_lines("a\nb\n"), vec!["a\n", "b\n"]);
        assert_eq!(split_lines("a\nb"), vec!["a\n", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!("x")), "x");
        assert_eq!(value_to_text(&json!(["a\n", "b"])), "a\nb");
        assert_eq!(value_to_text(&json!([1, "x"])), "1x");
        assert_eq!(value_to_text(&Value::Null), "");
    }

    #[test]
    fn test_metadata_language_prefers_language_info() {
        let raw = json!({
            "kernelspec": {"name": "python3", "language": "python"},
            "language_info": {"name": "Python", "version": "3.11.4"}
        });
        let meta = NotebookMetadata::from_raw(raw.as_object().unwrap().clone());
        assert_eq!(meta.kernel_name.as_deref(), Some("python3"));
        assert_eq!(meta.language.as_deref(), Some("Python"));
        assert_eq!(meta.language_version.as_deref(), Some("3.11.4"));
    }

    #[test]
    fn test_metadata_language_falls_back_to_kernelspec() {
        let raw = json!({"kernelspec": {"name": "ir", "language": "R"}});
        let meta = NotebookMetadata::from_raw(raw.as_object().unwrap().clone());
        assert_eq!(meta.language.as_deref(), Some("R"));
        assert!(meta.title().is_none());
    }

    #[test]
    fn test_metadata_title() {
        let raw = json!({"title": "  Results  "});
        let meta = NotebookMetadata::from_raw(raw.as_object().unwrap().clone());
        assert_eq!(meta.title(), Some("Results"));
    }

    #[test]
    fn test_mime_bundle_images_in_fixed_order() {
        let bundle = MimeBundle::new()
            .with("image/gif", "R0lG")
            .with("text/plain", "<Figure>")
            .with("image/png", "iVBO");
        let mimes: Vec<&str> = bundle.images().map(|(mime, _)| mime).collect();
        assert_eq!(mimes, vec!["image/png", "image/gif"]);
    }

    #[test]
    fn test_mime_bundle_text_joins_arrays() {
        let bundle = MimeBundle::new().with("text/plain", json!(["1\n", "2"]));
        assert_eq!(bundle.text("text/plain").as_deref(), Some("1\n2"));
        assert!(bundle.text("text/html").is_none());
    }
}
