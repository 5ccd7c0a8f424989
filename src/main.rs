//! nbhtml command line entry point.
//!
//! Converts one or more notebooks (or directories of notebooks) into
//! standalone HTML files, in parallel. A failing notebook is logged and
//! counted; it never stops the rest of the batch.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use nbhtml::{
    convert_file, ConversionSettings, ConvertError, CustomTheme, NamedTheme, Result, Theme,
    NOTEBOOK_EXTENSION,
};

const CHECKPOINT_DIR: &str = ".ipynb_checkpoints";

#[derive(Parser, Debug)]
#[command(name = "nbhtml")]
#[command(about = "Convert Jupyter notebooks into standalone themed HTML")]
struct Cli {
    /// Notebook files or directories containing notebooks
    #[arg(required_unless_present_any = ["list_themes", "export_theme"])]
    inputs: Vec<PathBuf>,

    /// Directory for the generated HTML (default: next to each notebook)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Leave code cell sources out of the output
    #[arg(long)]
    no_input: bool,

    /// Write images to a `<name>_files/` directory instead of embedding them
    #[arg(long)]
    no_embed_images: bool,

    /// Built-in theme id
    #[arg(short, long, default_value = "light")]
    theme: String,

    /// Custom theme JSON file (overrides --theme)
    #[arg(long)]
    theme_file: Option<PathBuf>,

    /// Extra CSS appended after the theme
    #[arg(long)]
    css: Option<PathBuf>,

    /// Write --theme as an editable custom theme JSON file and exit
    #[arg(long)]
    export_theme: Option<PathBuf>,

    /// Print the built-in themes and exit
    #[arg(long)]
    list_themes: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns the number of notebooks that failed.
fn run(cli: &Cli) -> Result<usize> {
    if cli.list_themes {
        for theme in NamedTheme::ALL {
            let tone = if theme.is_dark() { "dark" } else { "light" };
            println!("{:<16} {} ({})", theme.id(), theme.display_name(), tone);
        }
        return Ok(0);
    }

    if let Some(path) = &cli.export_theme {
        let base: NamedTheme = cli.theme.parse()?;
        let json = CustomTheme::from_named(base.display_name(), base).to_json()?;
        fs::write(path, json).map_err(|e| ConvertError::io(path, e))?;
        info!("Wrote {} theme to {}", base.id(), path.display());
        return Ok(0);
    }

    let settings = load_settings(cli)?;
    let jobs = collect_jobs(cli);
    if jobs.is_empty() {
        warn!("No notebooks found");
        return Ok(0);
    }
    info!("Converting {} notebook(s)", jobs.len());

    let failed = jobs
        .par_iter()
        .filter(|(input, output)| match convert_file(input, output, &settings) {
            Ok(written) => {
                info!("{} -> {}", input.display(), written.display());
                false
            }
            Err(e) => {
                error!("{}: {}", input.display(), e);
                true
            }
        })
        .count();

    info!("Done: {} converted, {} failed", jobs.len() - failed, failed);
    Ok(failed)
}

fn load_settings(cli: &Cli) -> Result<ConversionSettings> {
    let theme = match &cli.theme_file {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
            Theme::Custom(CustomTheme::from_json(&text)?)
        }
        None => Theme::Named(cli.theme.parse()?),
    };

    let custom_css = match &cli.css {
        Some(path) => Some(fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?),
        None => None,
    };

    Ok(ConversionSettings {
        embed_images_as_base64: !cli.no_embed_images,
        include_input_cells: !cli.no_input,
        theme,
        custom_css,
        ..ConversionSettings::default()
    })
}

/// Pairs every notebook found with the HTML path it converts to.
fn collect_jobs(cli: &Cli) -> Vec<(PathBuf, PathBuf)> {
    let mut jobs = Vec::new();

    for input in &cli.inputs {
        if input.is_dir() {
            let max_depth = if cli.recursive { usize::MAX } else { 1 };
            let walker = WalkDir::new(input)
                .max_depth(max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.file_name() != CHECKPOINT_DIR);
            for entry in walker.filter_map(|e| e.ok()) {
                let path = entry.path();
                if entry.file_type().is_file() && is_notebook(path) {
                    let relative = path.strip_prefix(input).unwrap_or(path);
                    jobs.push((path.to_path_buf(), output_path(cli, path, relative)));
                }
            }
        } else if input.exists() {
            if !is_notebook(input) {
                warn!("{} does not have a .{} extension", input.display(), NOTEBOOK_EXTENSION);
            }
            let name = input.file_name().map(Path::new).unwrap_or(input);
            jobs.push((input.clone(), output_path(cli, input, name)));
        } else {
            error!("{} does not exist", input.display());
        }
    }

    jobs
}

fn is_notebook(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(NOTEBOOK_EXTENSION)
}

/// `relative` keeps the layout below the input directory when writing to
/// `--output-dir`.
fn output_path(cli: &Cli, input: &Path, relative: &Path) -> PathBuf {
    match &cli.output_dir {
        Some(dir) => dir.join(relative).with_extension("html"),
        None => input.with_extension("html"),
    }
}
