//! HTML templates and styling for rendered notebooks.
//!
//! ## Module Structure
//!
//! - `styles` - Base stylesheet and per-palette theme rules
//! - `patterns` - Background patterns for custom themes
//! - `components` - Document shell, prompts, and cell/output containers

mod components;
mod patterns;
mod styles;

pub use components::{
    base_html, cell_container, input_block, input_prompt, output_block, output_prompt, HeadStyles,
};
pub use patterns::{background_css, is_dark_color, parse_hex_color, solid_background, with_alpha};
pub use styles::{palette_css, STYLE};
