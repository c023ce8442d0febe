//! Error types for refnorm
//!
//! All fallible operations return `Result<T, Error>`.
//! Every variant is fatal for a run: nothing is written once one is raised.

use std::path::PathBuf;

/// refnorm error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File missing, unreadable, or unwritable
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not syntactically valid JSON
    #[error("Parse error: invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Root object has no `colors` key
    #[error("Parse error: document has no \"colors\" object")]
    MissingColors,

    /// A value exists but has the wrong JSON type
    #[error("Parse error: {path}: expected {expected}, found {found}")]
    InvalidShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A reference string does not represent an integer
    #[error("Parse error: colors.{color}.references[{index}]: {value:?} is not an integer")]
    InvalidReference {
        color: String,
        index: usize,
        value: String,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for refnorm operations
pub type Result<T> = std::result::Result<T, Error>;
