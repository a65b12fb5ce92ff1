//! Error type shared by every engine operation.
//!
//! Nothing here is fatal: each variant maps to "show a message, keep the
//! user's buffer".

use thiserror::Error;

use crate::document::Format;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed YAML or JSON. Surfaced inline, never blocks typing.
    #[error("invalid {format}: {message}")]
    Parse { format: Format, message: String },
    /// An operation that needs exactly one document got another count.
    #[error("expected exactly one document, found {count}")]
    MultiDocument { count: usize },
    /// Structural conflicts between local edits and the server; local edits
    /// are left untouched.
    #[error("merge conflict at {}", .paths.join(", "))]
    MergeConflict { paths: Vec<String> },
    #[error("cannot serialize document: {0}")]
    Serialization(String),
    #[error("editor session is closed")]
    SessionClosed,
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    pub(crate) fn parse(format: Format, err: impl std::fmt::Display) -> Self {
        EngineError::Parse {
            format,
            message: err.to_string(),
        }
    }

    /// Conflicting paths, empty for every other variant.
    pub fn conflicts(&self) -> &[String] {
        match self {
            EngineError::MergeConflict { paths } => paths,
            _ => &[],
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
