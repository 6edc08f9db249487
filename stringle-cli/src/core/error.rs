use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Any of these stops a run before a single file is touched.
#[derive(Error, Debug)]
pub enum StringleError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Duplicate search term(s): {}", .0.join(", "))]
    DuplicatePattern(Vec<String>),

    #[error("Invalid replacement: {0}")]
    InvalidReplacement(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StringleError>;
