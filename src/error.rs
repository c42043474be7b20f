//! Error types for the badge compositor

use thiserror::Error;

/// Result type alias for compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, compositing or exporting badges
#[derive(Error, Debug)]
pub enum Error {
    /// A source could not be fetched or decoded
    #[error("Failed to load image: {0}")]
    LoadError(String),

    /// An image or target area has a zero dimension
    #[error("Invalid geometry: {0}")]
    GeometryError(String),

    /// Nothing (or something unknown) was selected
    #[error("Invalid selection: {0}")]
    SelectionError(String),

    /// A composite is already in flight
    #[error("A composite operation is already in progress")]
    Busy,

    /// A load did not settle in time
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// PNG encoding failed
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// Invalid configuration or catalog
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Filesystem error while exporting or writing placeholders
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short name of the failure class, used for user-facing notifications.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::LoadError(_) | Error::Timeout(_) => "LoadError",
            Error::GeometryError(_) => "GeometryError",
            Error::SelectionError(_) => "SelectionError",
            Error::Busy => "Busy",
            Error::EncodeError(_) => "EncodeError",
            Error::ConfigError(_) => "ConfigError",
            Error::Io(_) => "IoError",
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::LoadError(err.to_string())
    }
}
