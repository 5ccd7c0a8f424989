//! nbhtml - convert Jupyter notebooks into standalone, themed HTML.
//!
//! The crate exposes two operations to its callers: parse notebook text into a
//! [`Notebook`], and render a notebook plus [`ConversionSettings`] into an
//! HTML string. Everything else (file queues, theme persistence, UI) belongs
//! to the caller.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod error;
pub mod highlight;
pub mod markdown;
pub mod models;
pub mod notebook;
pub mod render;
pub mod templates;
pub mod text;
pub mod theme;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_NBFORMAT: u32 = 4;
pub const DEFAULT_NBFORMAT_MINOR: u32 = 0;
pub const NOTEBOOK_EXTENSION: &str = "ipynb";
/// Sibling directory for extracted images: `<stem>_files/`.
pub const RESOURCES_SUFFIX: &str = "_files";
pub const DEFAULT_RESOURCES_DIR: &str = "notebook_files";

pub const MIN_PATTERN_OPACITY: f64 = 0.01;
pub const MAX_PATTERN_OPACITY: f64 = 0.3;
pub const DEFAULT_PATTERN_OPACITY: f64 = 0.1;

// ============================================================================
// Conversion Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Embed raster images as `data:` URIs; otherwise they are returned as
    /// resources and referenced under `resources_dir`.
    pub embed_images_as_base64: bool,
    pub include_input_cells: bool,
    pub theme: Theme,
    /// Raw CSS appended after all generated styles.
    pub custom_css: Option<String>,
    pub resources_dir: String,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            embed_images_as_base64: true,
            include_input_cells: true,
            theme: Theme::default(),
            custom_css: None,
            resources_dir: DEFAULT_RESOURCES_DIR.to_string(),
        }
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// Parses and renders in one step.
pub fn convert(raw: &str, settings: &ConversionSettings, title: &str) -> Result<String> {
    let notebook = parse_notebook(raw)?;
    Ok(render(&notebook, settings, title))
}

/// Converts `input` and writes the HTML to `output`, plus any extracted images
/// into `<output stem>_files/`. The title is the notebook's metadata title or
/// the input file stem.
pub fn convert_file(input: &Path, output: &Path, settings: &ConversionSettings) -> Result<PathBuf> {
    let raw = fs::read_to_string(input).map_err(|e| ConvertError::io(input, e))?;
    let notebook = parse_notebook(&raw)?;

    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("notebook")
        .to_string();
    let title = notebook
        .metadata
        .title()
        .map(str::to_string)
        .or_else(|| input.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .unwrap_or_else(|| stem.clone());

    let mut settings = settings.clone();
    let resources_name = format!("{}{}", stem, RESOURCES_SUFFIX);
    if !settings.embed_images_as_base64 {
        settings.resources_dir = resources_name.clone();
    }

    let rendered = render_with_resources(&notebook, &settings, &title);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
    }
    fs::write(output, &rendered.html).map_err(|e| ConvertError::io(output, e))?;

    if !rendered.resources.is_empty() {
        let dir = output.with_file_name(&resources_name);
        fs::create_dir_all(&dir).map_err(|e| ConvertError::io(&dir, e))?;
        for resource in &rendered.resources {
            let path = dir.join(&resource.filename);
            fs::write(&path, &resource.data).map_err(|e| ConvertError::io(&path, e))?;
        }
        log::debug!(
            "wrote {} resource(s) to {}",
            rendered.resources.len(),
            dir.display()
        );
    }

    Ok(output.to_path_buf())
}

// Re-export commonly used types
pub use error::{ConvertError, Result};

pub use models::{
    Cell, CellKind, FormatVersion, MimeBundle, Notebook, NotebookMetadata, Output, StreamName,
};

pub use notebook::{notebook_to_json, notebook_to_string, parse_notebook};

pub use render::{render, render_with_resources, RenderedNotebook, Resource};

pub use text::{html_escape, strip_ansi};

pub use theme::{
    clamp_pattern_opacity, resolve_css, BackgroundStyle, CustomTheme, NamedTheme, Palette, Theme,
};
