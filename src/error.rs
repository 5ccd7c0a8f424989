//! Error types for notebook conversion.
//!
//! Only input that cannot be read as a notebook at all is an error. Everything
//! else (unknown cell types, unknown MIME types, highlighting trouble) is
//! handled by fallbacks inside the component that meets it.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Raw input is not JSON, or has no top-level `cells` array.
    #[error("Malformed notebook: {0}")]
    MalformedInput(String),

    /// A custom theme record could not be read.
    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the failure lies in the document itself rather than the filesystem.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ConvertError::MalformedInput(_))
    }
}
