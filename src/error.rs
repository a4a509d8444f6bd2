//! Error types for buttonlog

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, tabulating or charting event logs
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse {path}: {source}")]
    StreamParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Timestamp parse error: {0}")]
    TimestampParse(String),

    #[error("Event {event_id} in stream {file_id} references unknown agent {agent}")]
    UnknownAgent {
        file_id: String,
        event_id: String,
        agent: String,
    },

    #[error("Invalid event stream {path}: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: crate::schema::ValidationError,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Rendering error: {0}")]
    Render(String),

    #[error("No event stream files found in {0}")]
    NoInput(PathBuf),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }
}
