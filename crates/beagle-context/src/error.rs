use thiserror::Error;

/// Malformed path text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("empty path segment at position {0}")]
    EmptySegment(usize),

    #[error("unclosed '[' at position {0}")]
    UnclosedBracket(usize),

    #[error("unclosed string starting at position {0}")]
    UnclosedString(usize),

    #[error("invalid index {0:?}")]
    InvalidIndex(String),

    #[error("unexpected character {ch:?} at position {position}")]
    UnexpectedChar { ch: char, position: usize },
}

/// Why a path mutation could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    #[error("path {path:?} does not exist")]
    DoesNotExist { path: String },

    #[error("value at {path:?} is not a container of the required shape")]
    TypeMismatch { path: String },

    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
}

/// Malformed cross-boundary payload.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("malformed wire payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
