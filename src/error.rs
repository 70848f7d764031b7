//! Error types for the rulebook renderer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for rulebook operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading inputs or writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document descriptor is not valid JSON for a [`crate::Document`].
    #[error("Invalid document descriptor: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be parsed.
    #[error("Invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The logo could not be loaded or is not a supported image format.
    #[error("Image error: {0}")]
    Image(String),

    /// Typst rejected the generated page markup.
    #[error("Typst compilation failed: {0}")]
    Compile(String),

    /// The compiled document could not be exported.
    #[error("Export failed: {0}")]
    Export(String),
}
