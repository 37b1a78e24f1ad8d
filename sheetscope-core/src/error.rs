//! Error types raised at the library boundary

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a file into a [`crate::reader::Workbook`]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("not a readable workbook: {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("failed to read sheet '{sheet}' of {}", .path.display())]
    Sheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },
}

/// Failure reported by, or while interpreting, an external table classifier
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The response did not follow the expected structure; worth asking again
    #[error("malformed classifier response: {0}")]
    Malformed(String),

    /// The classifier itself failed; retrying will not help
    #[error("classifier backend failed: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for ClassifyError {
    fn from(e: serde_json::Error) -> Self {
        ClassifyError::Malformed(e.to_string())
    }
}
