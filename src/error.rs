use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide error type.
///
/// Only the input, configuration and I/O variants are fatal to a run.
/// `Generation` and `Http` are produced by text-generation engines and are
/// recovered by the naming orchestrator before they reach the pipeline.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The feedback file does not exist.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The feedback file has an unexpected extension.
    #[error("invalid input file type: '{0}'")]
    InvalidFileType(String),

    /// The feedback table has no column with the configured name.
    #[error("feedback column '{0}' not found in input header")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// A text-generation engine returned an unusable response.
    #[error("generation failed: {0}")]
    Generation(String),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, TopologyError>;
