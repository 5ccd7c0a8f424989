//! Background generation for custom themes.
//!
//! Each style yields a block of CSS declarations for the body. Pattern layers
//! are always drawn at a small fraction of the pattern color's intensity so
//! cell content stays legible.

use crate::theme::{clamp_pattern_opacity, BackgroundStyle, CustomTheme};

const DOT_SPACING_PX: u32 = 20;
const GRID_SPACING_PX: u32 = 20;
const DIAGONAL_SPACING_PX: u32 = 15;
const PAPER_MAJOR_PX: u32 = 100;
const PAPER_MINOR_PX: u32 = 20;

pub fn solid_background(color: &str) -> String {
    format!("    background-color: {};\n", color)
}

pub fn background_css(theme: &CustomTheme) -> String {
    let palette = theme.palette();
    let base = palette.background;
    let opacity = clamp_pattern_opacity(theme.pattern_opacity);
    let pattern = palette.pattern;

    match theme.background_style {
        BackgroundStyle::Solid => solid_background(base),
        BackgroundStyle::Gradient => format!(
            "    background-color: {base};\n    background-image: linear-gradient(135deg, {base} 0%, {second} 100%);\n    background-attachment: fixed;\n",
            base = base,
            second = palette.background_secondary,
        ),
        BackgroundStyle::Dots => {
            let dot = with_alpha(pattern, (opacity * 3.0).clamp(0.0, 1.0));
            format!(
                "{}    background-image: radial-gradient(circle, {dot} 1px, transparent 1.5px);\n    background-size: {n}px {n}px;\n",
                solid_background(base),
                dot = dot,
                n = DOT_SPACING_PX,
            )
        }
        BackgroundStyle::Grid => format!(
            "{}    background-image: {};\n    background-size: {n}px {n}px;\n",
            solid_background(base),
            grid_lines(&with_alpha(pattern, opacity)),
            n = GRID_SPACING_PX,
        ),
        BackgroundStyle::DiagonalLines => {
            let line = with_alpha(pattern, opacity);
            format!(
                "{}    background-image: repeating-linear-gradient(45deg, transparent 0, transparent {gap}px, {line} {gap}px, {line} {n}px);\n",
                solid_background(base),
                line = line,
                gap = DIAGONAL_SPACING_PX - 1,
                n = DIAGONAL_SPACING_PX,
            )
        }
        BackgroundStyle::Noise => format!(
            "{}    background-image: url(\"{}\");\n",
            solid_background(base),
            noise_texture(opacity),
        ),
        BackgroundStyle::Paper => two_grid_background(
            base,
            &with_alpha(pattern, opacity * 0.5),
            &with_alpha(pattern, opacity * 0.3),
        ),
        BackgroundStyle::Blueprint => two_grid_background(
            base,
            &with_alpha(palette.heading, opacity),
            &with_alpha(palette.heading, opacity * 0.5),
        ),
    }
}

fn grid_lines(color: &str) -> String {
    format!(
        "linear-gradient({c} 1px, transparent 1px), linear-gradient(90deg, {c} 1px, transparent 1px)",
        c = color
    )
}

fn two_grid_background(base: &str, major: &str, minor: &str) -> String {
    format!(
        "{}    background-image: {}, {};\n    background-size: {M}px {M}px, {M}px {M}px, {m}px {m}px, {m}px {m}px;\n",
        solid_background(base),
        grid_lines(major),
        grid_lines(minor),
        M = PAPER_MAJOR_PX,
        m = PAPER_MINOR_PX,
    )
}

/// Fractal-noise SVG as a data URI, tiled behind the content.
fn noise_texture(opacity: f64) -> String {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='200' height='200'>\
         <filter id='n'><feTurbulence type='fractalNoise' baseFrequency='0.85' numOctaves='3' stitchTiles='stitch'/></filter>\
         <rect width='100%' height='100%' filter='url(#n)' opacity='{}'/></svg>",
        format_alpha(opacity)
    );
    format!("data:image/svg+xml,{}", urlencoding::encode(&svg))
}

// ============================================================================
// Color Helpers
// ============================================================================

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (alpha ignored).
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| channel(&format!("{c}{c}")));
            Some((it.next()??, it.next()??, it.next()??))
        }
        6 | 8 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

/// `color` at the given alpha. Hex colors become `rgba()`; anything else is
/// mixed with transparent.
pub fn with_alpha(color: &str, alpha: f64) -> String {
    match parse_hex_color(color) {
        Some((r, g, b)) => format!("rgba({}, {}, {}, {})", r, g, b, format_alpha(alpha)),
        None => format!(
            "color-mix(in srgb, {} {}%, transparent)",
            color.trim(),
            format_alpha(alpha * 100.0)
        ),
    }
}

/// Relative luminance below one half counts as dark. Non-hex colors are light.
pub fn is_dark_color(color: &str) -> bool {
    parse_hex_color(color).is_some_and(|(r, g, b)| {
        let luminance = 0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b);
        luminance < 128.0
    })
}

fn format_alpha(value: f64) -> String {
    let text = format!("{:.3}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
