//! Visual themes for rendered notebooks.
//!
//! A conversion uses exactly one theme: either one of the ten built-in
//! palettes, or a user-authored custom theme with its own background pattern.
//! Both resolve to CSS scoped under a per-theme body class, so a custom theme
//! replaces the built-in rules instead of layering on top of them.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{ConvertError, Result};
use crate::templates::{background_css, is_dark_color, palette_css, solid_background};
use crate::{DEFAULT_PATTERN_OPACITY, MAX_PATTERN_OPACITY, MIN_PATTERN_OPACITY};

pub const CUSTOM_THEME_CLASS: &str = "theme-custom";

// ============================================================================
// Palette
// ============================================================================

/// The full set of colors a theme assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette<'a> {
    pub background: &'a str,
    pub background_secondary: &'a str,
    pub text: &'a str,
    pub heading: &'a str,
    pub link: &'a str,
    pub code_background: &'a str,
    pub code_border: &'a str,
    pub execution_count: &'a str,
    pub output_background: &'a str,
    pub syntax_keyword: &'a str,
    pub syntax_string: &'a str,
    pub syntax_comment: &'a str,
    pub syntax_number: &'a str,
    pub syntax_function: &'a str,
    pub syntax_operator: &'a str,
    pub output_text: &'a str,
    pub output_border: &'a str,
    pub warning_text: &'a str,
    pub warning_background: &'a str,
    pub error_text: &'a str,
    pub error_background: &'a str,
    pub table_header_background: &'a str,
    pub table_header_text: &'a str,
    pub table_border: &'a str,
    pub table_row_alt: &'a str,
    pub pattern: &'a str,
}

// ============================================================================
// Named Themes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamedTheme {
    Light,
    Dark,
    SolarizedLight,
    SolarizedDark,
    Monokai,
    Dracula,
    Nord,
    Sepia,
    OneDark,
    Gruvbox,
}

impl NamedTheme {
    /// All built-ins, in declaration order.
    pub const ALL: [NamedTheme; 10] = [
        NamedTheme::Light,
        NamedTheme::Dark,
        NamedTheme::SolarizedLight,
        NamedTheme::SolarizedDark,
        NamedTheme::Monokai,
        NamedTheme::Dracula,
        NamedTheme::Nord,
        NamedTheme::Sepia,
        NamedTheme::OneDark,
        NamedTheme::Gruvbox,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            NamedTheme::Light => "light",
            NamedTheme::Dark => "dark",
            NamedTheme::SolarizedLight => "solarized-light",
            NamedTheme::SolarizedDark => "solarized-dark",
            NamedTheme::Monokai => "monokai",
            NamedTheme::Dracula => "dracula",
            NamedTheme::Nord => "nord",
            NamedTheme::Sepia => "sepia",
            NamedTheme::OneDark => "one-dark",
            NamedTheme::Gruvbox => "gruvbox",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NamedTheme::Light => "Light",
            NamedTheme::Dark => "Dark",
            NamedTheme::SolarizedLight => "Solarized Light",
            NamedTheme::SolarizedDark => "Solarized Dark",
            NamedTheme::Monokai => "Monokai",
            NamedTheme::Dracula => "Dracula",
            NamedTheme::Nord => "Nord",
            NamedTheme::Sepia => "Sepia",
            NamedTheme::OneDark => "One Dark",
            NamedTheme::Gruvbox => "Gruvbox",
        }
    }

    pub fn is_dark(&self) -> bool {
        !matches!(
            self,
            NamedTheme::Light | NamedTheme::SolarizedLight | NamedTheme::Sepia
        )
    }

    /// Body class that scopes this theme's rules.
    pub fn css_class(&self) -> String {
        format!("theme-{}", self.id())
    }

    pub fn palette(&self) -> &'static Palette<'static> {
        match self {
            NamedTheme::Light => &LIGHT,
            NamedTheme::Dark => &DARK,
            NamedTheme::SolarizedLight => &SOLARIZED_LIGHT,
            NamedTheme::SolarizedDark => &SOLARIZED_DARK,
            NamedTheme::Monokai => &MONOKAI,
            NamedTheme::Dracula => &DRACULA,
            NamedTheme::Nord => &NORD,
            NamedTheme::Sepia => &SEPIA,
            NamedTheme::OneDark => &ONE_DARK,
            NamedTheme::Gruvbox => &GRUVBOX,
        }
    }

    pub fn css(&self) -> &'static str {
        let index = NamedTheme::ALL
            .iter()
            .position(|t| t == self)
            .unwrap_or_default();
        &NAMED_THEME_CSS[index]
    }
}

impl fmt::Display for NamedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for NamedTheme {
    type Err = ConvertError;

    /// Accepts the id (`solarized-dark`), the display name, or either with
    /// underscores or different casing.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        NamedTheme::ALL
            .into_iter()
            .find(|t| {
                t.id() == wanted || t.display_name().to_ascii_lowercase().replace(' ', "-") == wanted
            })
            .ok_or_else(|| ConvertError::InvalidTheme(format!("unknown theme `{}`", s.trim())))
    }
}

// Built once per process.
static NAMED_THEME_CSS: LazyLock<Vec<String>> = LazyLock::new(|| {
    NamedTheme::ALL
        .iter()
        .map(|theme| {
            let palette = theme.palette();
            palette_css(
                &theme.css_class(),
                palette,
                &solid_background(palette.background),
                theme.is_dark(),
            )
        })
        .collect()
});

const LIGHT: Palette<'static> = Palette {
    background: "#ffffff",
    background_secondary: "#f5f7fa",
    text: "#24292f",
    heading: "#1f2328",
    link: "#0969da",
    code_background: "#f6f8fa",
    code_border: "#d0d7de",
    execution_count: "#6e7781",
    output_background: "#ffffff",
    syntax_keyword: "#cf222e",
    syntax_string: "#0a3069",
    syntax_comment: "#6e7781",
    syntax_number: "#0550ae",
    syntax_function: "#8250df",
    syntax_operator: "#953800",
    output_text: "#24292f",
    output_border: "#d0d7de",
    warning_text: "#9a6700",
    warning_background: "#fff8c5",
    error_text: "#cf222e",
    error_background: "#ffebe9",
    table_header_background: "#f6f8fa",
    table_header_text: "#1f2328",
    table_border: "#d0d7de",
    table_row_alt: "#f6f8fa",
    pattern: "#d0d7de",
};

const DARK: Palette<'static> = Palette {
    background: "#0d1117",
    background_secondary: "#161b22",
    text: "#c9d1d9",
    heading: "#f0f6fc",
    link: "#58a6ff",
    code_background: "#161b22",
    code_border: "#30363d",
    execution_count: "#8b949e",
    output_background: "#0d1117",
    syntax_keyword: "#ff7b72",
    syntax_string: "#a5d6ff",
    syntax_comment: "#8b949e",
    syntax_number: "#79c0ff",
    syntax_function: "#d2a8ff",
    syntax_operator: "#ffa657",
    output_text: "#c9d1d9",
    output_border: "#30363d",
    warning_text: "#d29922",
    warning_background: "#2d2410",
    error_text: "#ff7b72",
    error_background: "#2d1517",
    table_header_background: "#161b22",
    table_header_text: "#f0f6fc",
    table_border: "#30363d",
    table_row_alt: "#161b22",
    pattern: "#30363d",
};

const SOLARIZED_LIGHT: Palette<'static> = Palette {
    background: "#fdf6e3",
    background_secondary: "#eee8d5",
    text: "#657b83",
    heading: "#586e75",
    link: "#268bd2",
    code_background: "#eee8d5",
    code_border: "#93a1a1",
    execution_count: "#93a1a1",
    output_background: "#fdf6e3",
    syntax_keyword: "#859900",
    syntax_string: "#2aa198",
    syntax_comment: "#93a1a1",
    syntax_number: "#d33682",
    syntax_function: "#268bd2",
    syntax_operator: "#cb4b16",
    output_text: "#657b83",
    output_border: "#eee8d5",
    warning_text: "#b58900",
    warning_background: "#fcf0cf",
    error_text: "#dc322f",
    error_background: "#fbe3da",
    table_header_background: "#eee8d5",
    table_header_text: "#586e75",
    table_border: "#93a1a1",
    table_row_alt: "#f5efdc",
    pattern: "#93a1a1",
};

const SOLARIZED_DARK: Palette<'static> = Palette {
    background: "#002b36",
    background_secondary: "#073642",
    text: "#839496",
    heading: "#93a1a1",
    link: "#268bd2",
    code_background: "#073642",
    code_border: "#586e75",
    execution_count: "#586e75",
    output_background: "#002b36",
    syntax_keyword: "#859900",
    syntax_string: "#2aa198",
    syntax_comment: "#586e75",
    syntax_number: "#d33682",
    syntax_function: "#268bd2",
    syntax_operator: "#cb4b16",
    output_text: "#839496",
    output_border: "#073642",
    warning_text: "#b58900",
    warning_background: "#0f3a3a",
    error_text: "#dc322f",
    error_background: "#3a1f26",
    table_header_background: "#073642",
    table_header_text: "#93a1a1",
    table_border: "#586e75",
    table_row_alt: "#04313d",
    pattern: "#586e75",
};

const MONOKAI: Palette<'static> = Palette {
    background: "#272822",
    background_secondary: "#3e3d32",
    text: "#f8f8f2",
    heading: "#a6e22e",
    link: "#66d9ef",
    code_background: "#3e3d32",
    code_border: "#75715e",
    execution_count: "#75715e",
    output_background: "#272822",
    syntax_keyword: "#f92672",
    syntax_string: "#e6db74",
    syntax_comment: "#75715e",
    syntax_number: "#ae81ff",
    syntax_function: "#a6e22e",
    syntax_operator: "#f92672",
    output_text: "#f8f8f2",
    output_border: "#49483e",
    warning_text: "#fd971f",
    warning_background: "#3a3022",
    error_text: "#f92672",
    error_background: "#3d2230",
    table_header_background: "#3e3d32",
    table_header_text: "#f8f8f2",
    table_border: "#75715e",
    table_row_alt: "#2f302a",
    pattern: "#75715e",
};

const DRACULA: Palette<'static> = Palette {
    background: "#282a36",
    background_secondary: "#44475a",
    text: "#f8f8f2",
    heading: "#bd93f9",
    link: "#8be9fd",
    code_background: "#21222c",
    code_border: "#44475a",
    execution_count: "#6272a4",
    output_background: "#282a36",
    syntax_keyword: "#ff79c6",
    syntax_string: "#f1fa8c",
    syntax_comment: "#6272a4",
    syntax_number: "#bd93f9",
    syntax_function: "#50fa7b",
    syntax_operator: "#ff79c6",
    output_text: "#f8f8f2",
    output_border: "#44475a",
    warning_text: "#ffb86c",
    warning_background: "#3b3230",
    error_text: "#ff5555",
    error_background: "#3d2a35",
    table_header_background: "#44475a",
    table_header_text: "#f8f8f2",
    table_border: "#6272a4",
    table_row_alt: "#2e303e",
    pattern: "#6272a4",
};

const NORD: Palette<'static> = Palette {
    background: "#2e3440",
    background_secondary: "#3b4252",
    text: "#d8dee9",
    heading: "#88c0d0",
    link: "#81a1c1",
    code_background: "#3b4252",
    code_border: "#4c566a",
    execution_count: "#616e88",
    output_background: "#2e3440",
    syntax_keyword: "#81a1c1",
    syntax_string: "#a3be8c",
    syntax_comment: "#616e88",
    syntax_number: "#b48ead",
    syntax_function: "#88c0d0",
    syntax_operator: "#81a1c1",
    output_text: "#d8dee9",
    output_border: "#434c5e",
    warning_text: "#ebcb8b",
    warning_background: "#3f3f3e",
    error_text: "#bf616a",
    error_background: "#3f3640",
    table_header_background: "#3b4252",
    table_header_text: "#eceff4",
    table_border: "#4c566a",
    table_row_alt: "#333a47",
    pattern: "#4c566a",
};

const SEPIA: Palette<'static> = Palette {
    background: "#f4ecd8",
    background_secondary: "#e9dfc4",
    text: "#5b4636",
    heading: "#704214",
    link: "#8b4513",
    code_background: "#ede3c9",
    code_border: "#cbb994",
    execution_count: "#9c8266",
    output_background: "#f8f1e0",
    syntax_keyword: "#a0522d",
    syntax_string: "#6b8e23",
    syntax_comment: "#9c8266",
    syntax_number: "#b8860b",
    syntax_function: "#8b4513",
    syntax_operator: "#7f5539",
    output_text: "#5b4636",
    output_border: "#d8c9a3",
    warning_text: "#b8860b",
    warning_background: "#f3e3b5",
    error_text: "#a52a2a",
    error_background: "#f2d4c9",
    table_header_background: "#e9dfc4",
    table_header_text: "#5b4636",
    table_border: "#cbb994",
    table_row_alt: "#efe6cf",
    pattern: "#cbb994",
};

const ONE_DARK: Palette<'static> = Palette {
    background: "#282c34",
    background_secondary: "#21252b",
    text: "#abb2bf",
    heading: "#e5c07b",
    link: "#61afef",
    code_background: "#21252b",
    code_border: "#3e4451",
    execution_count: "#5c6370",
    output_background: "#282c34",
    syntax_keyword: "#c678dd",
    syntax_string: "#98c379",
    syntax_comment: "#5c6370",
    syntax_number: "#d19a66",
    syntax_function: "#61afef",
    syntax_operator: "#56b6c2",
    output_text: "#abb2bf",
    output_border: "#3e4451",
    warning_text: "#e5c07b",
    warning_background: "#3a3528",
    error_text: "#e06c75",
    error_background: "#3b2a2e",
    table_header_background: "#21252b",
    table_header_text: "#e6e6e6",
    table_border: "#3e4451",
    table_row_alt: "#2c313a",
    pattern: "#3e4451",
};

const GRUVBOX: Palette<'static> = Palette {
    background: "#282828",
    background_secondary: "#3c3836",
    text: "#ebdbb2",
    heading: "#fabd2f",
    link: "#83a598",
    code_background: "#3c3836",
    code_border: "#504945",
    execution_count: "#928374",
    output_background: "#282828",
    syntax_keyword: "#fb4934",
    syntax_string: "#b8bb26",
    syntax_comment: "#928374",
    syntax_number: "#d3869b",
    syntax_function: "#8ec07c",
    syntax_operator: "#fe8019",
    output_text: "#ebdbb2",
    output_border: "#504945",
    warning_text: "#fabd2f",
    warning_background: "#3c3422",
    error_text: "#fb4934",
    error_background: "#3c2624",
    table_header_background: "#3c3836",
    table_header_text: "#fbf1c7",
    table_border: "#504945",
    table_row_alt: "#32302f",
    pattern: "#665c54",
};

// ============================================================================
// Custom Themes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackgroundStyle {
    #[default]
    Solid,
    Gradient,
    Dots,
    Grid,
    DiagonalLines,
    Noise,
    Paper,
    Blueprint,
}

impl BackgroundStyle {
    pub const ALL: [BackgroundStyle; 8] = [
        BackgroundStyle::Solid,
        BackgroundStyle::Gradient,
        BackgroundStyle::Dots,
        BackgroundStyle::Grid,
        BackgroundStyle::DiagonalLines,
        BackgroundStyle::Noise,
        BackgroundStyle::Paper,
        BackgroundStyle::Blueprint,
    ];
}

/// A user-authored theme. Serializes to a flat camelCase record whose field
/// names are stable across versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomTheme {
    pub name: String,
    pub background_color: String,
    /// Second gradient stop; the primary background when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color_secondary: Option<String>,
    pub text_color: String,
    pub heading_color: String,
    pub link_color: String,
    pub code_background_color: String,
    pub code_border_color: String,
    pub execution_count_color: String,
    pub output_background_color: String,
    pub syntax_keyword_color: String,
    pub syntax_string_color: String,
    pub syntax_comment_color: String,
    pub syntax_number_color: String,
    pub syntax_function_color: String,
    pub syntax_operator_color: String,
    pub output_text_color: String,
    pub output_border_color: String,
    pub warning_text_color: String,
    pub warning_background_color: String,
    pub error_text_color: String,
    pub error_background_color: String,
    pub table_header_background_color: String,
    pub table_header_text_color: String,
    pub table_border_color: String,
    pub table_row_alt_color: String,
    pub pattern_color: String,
    pub background_style: BackgroundStyle,
    #[serde(deserialize_with = "deserialize_pattern_opacity")]
    pub pattern_opacity: f64,
}

impl Default for CustomTheme {
    fn default() -> Self {
        Self::from_named("Custom", NamedTheme::Light)
    }
}

impl CustomTheme {
    /// Starts a custom theme from a built-in palette.
    pub fn from_named(name: &str, base: NamedTheme) -> Self {
        let p = base.palette();
        Self {
            name: name.to_string(),
            background_color: p.background.to_string(),
            background_color_secondary: Some(p.background_secondary.to_string()),
            text_color: p.text.to_string(),
            heading_color: p.heading.to_string(),
            link_color: p.link.to_string(),
            code_background_color: p.code_background.to_string(),
            code_border_color: p.code_border.to_string(),
            execution_count_color: p.execution_count.to_string(),
            output_background_color: p.output_background.to_string(),
            syntax_keyword_color: p.syntax_keyword.to_string(),
            syntax_string_color: p.syntax_string.to_string(),
            syntax_comment_color: p.syntax_comment.to_string(),
            syntax_number_color: p.syntax_number.to_string(),
            syntax_function_color: p.syntax_function.to_string(),
            syntax_operator_color: p.syntax_operator.to_string(),
            output_text_color: p.output_text.to_string(),
            output_border_color: p.output_border.to_string(),
            warning_text_color: p.warning_text.to_string(),
            warning_background_color: p.warning_background.to_string(),
            error_text_color: p.error_text.to_string(),
            error_background_color: p.error_background.to_string(),
            table_header_background_color: p.table_header_background.to_string(),
            table_header_text_color: p.table_header_text.to_string(),
            table_border_color: p.table_border.to_string(),
            table_row_alt_color: p.table_row_alt.to_string(),
            pattern_color: p.pattern.to_string(),
            background_style: BackgroundStyle::Solid,
            pattern_opacity: DEFAULT_PATTERN_OPACITY,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ConvertError::InvalidTheme(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConvertError::InvalidTheme(e.to_string()))
    }

    pub fn with_pattern_opacity(mut self, opacity: f64) -> Self {
        self.pattern_opacity = clamp_pattern_opacity(opacity);
        self
    }

    pub fn with_background_style(mut self, style: BackgroundStyle) -> Self {
        self.background_style = style;
        self
    }

    pub fn secondary_background(&self) -> &str {
        self.background_color_secondary
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.background_color)
    }

    pub fn is_dark(&self) -> bool {
        is_dark_color(&self.background_color)
    }

    /// The theme's colors as emitted into CSS. A value that could escape its
    /// declaration falls back to the matching `Light` color.
    pub fn palette(&self) -> Palette<'_> {
        let base = NamedTheme::Light.palette();
        Palette {
            background: css_color(&self.background_color, base.background),
            background_secondary: css_color(self.secondary_background(), base.background_secondary),
            text: css_color(&self.text_color, base.text),
            heading: css_color(&self.heading_color, base.heading),
            link: css_color(&self.link_color, base.link),
            code_background: css_color(&self.code_background_color, base.code_background),
            code_border: css_color(&self.code_border_color, base.code_border),
            execution_count: css_color(&self.execution_count_color, base.execution_count),
            output_background: css_color(&self.output_background_color, base.output_background),
            syntax_keyword: css_color(&self.syntax_keyword_color, base.syntax_keyword),
            syntax_string: css_color(&self.syntax_string_color, base.syntax_string),
            syntax_comment: css_color(&self.syntax_comment_color, base.syntax_comment),
            syntax_number: css_color(&self.syntax_number_color, base.syntax_number),
            syntax_function: css_color(&self.syntax_function_color, base.syntax_function),
            syntax_operator: css_color(&self.syntax_operator_color, base.syntax_operator),
            output_text: css_color(&self.output_text_color, base.output_text),
            output_border: css_color(&self.output_border_color, base.output_border),
            warning_text: css_color(&self.warning_text_color, base.warning_text),
            warning_background: css_color(&self.warning_background_color, base.warning_background),
            error_text: css_color(&self.error_text_color, base.error_text),
            error_background: css_color(&self.error_background_color, base.error_background),
            table_header_background: css_color(
                &self.table_header_background_color,
                base.table_header_background,
            ),
            table_header_text: css_color(&self.table_header_text_color, base.table_header_text),
            table_border: css_color(&self.table_border_color, base.table_border),
            table_row_alt: css_color(&self.table_row_alt_color, base.table_row_alt),
            pattern: css_color(&self.pattern_color, base.pattern),
        }
    }

    pub fn css(&self) -> String {
        palette_css(
            CUSTOM_THEME_CLASS,
            &self.palette(),
            &background_css(self),
            self.is_dark(),
        )
    }
}

/// Characters that let a color value break out of its declaration.
const CSS_BREAKOUT: [char; 6] = ['<', '>', '{', '}', ';', '\\'];

fn css_color<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() || value.contains(CSS_BREAKOUT) || value.contains(char::is_control) {
        log::warn!("ignoring unsafe theme color {:?}, using {}", value, fallback);
        fallback
    } else {
        value
    }
}

/// Pattern opacity is clamped into `[0.01, 0.3]`; non-finite values fall back
/// to the default.
pub fn clamp_pattern_opacity(opacity: f64) -> f64 {
    if opacity.is_finite() {
        opacity.clamp(MIN_PATTERN_OPACITY, MAX_PATTERN_OPACITY)
    } else {
        DEFAULT_PATTERN_OPACITY
    }
}

fn deserialize_pattern_opacity<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map_or(DEFAULT_PATTERN_OPACITY, clamp_pattern_opacity))
}

// ============================================================================
// Theme
// ============================================================================

/// The active theme: a built-in id, or a full custom record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Theme {
    Named(NamedTheme),
    Custom(CustomTheme),
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Named(NamedTheme::Light)
    }
}

impl Theme {
    pub fn css_class(&self) -> String {
        match self {
            Theme::Named(named) => named.css_class(),
            Theme::Custom(_) => CUSTOM_THEME_CLASS.to_string(),
        }
    }
}

impl From<NamedTheme> for Theme {
    fn from(named: NamedTheme) -> Self {
        Theme::Named(named)
    }
}

impl From<CustomTheme> for Theme {
    fn from(custom: CustomTheme) -> Self {
        Theme::Custom(custom)
    }
}

pub fn resolve_css(theme: &Theme) -> String {
    match theme {
        Theme::Named(named) => named.css().to_string(),
        Theme::Custom(custom) => custom.css(),
    }
}

// ============================================================================
// Tests
// ============================================================================
