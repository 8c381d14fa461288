use beagle_context::PathError;
use thiserror::Error;

/// Malformed expression text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unclosed expression starting at position {0}")]
    UnclosedExpression(usize),

    #[error("empty expression")]
    EmptyExpression,

    #[error("unexpected character {ch:?} at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unclosed '(' in call to {0:?}")]
    UnclosedCall(String),

    #[error("unclosed '[' at position {0}")]
    UnclosedBracket(usize),

    #[error("unclosed string starting at position {0}")]
    UnclosedString(usize),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("invalid path: {0}")]
    Path(#[from] PathError),
}

/// Failure while applying an operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("{0}")]
    Arity(String),

    #[error("unknown operation {0:?}")]
    UnknownOperation(String),

    #[error("invalid operand for {operation:?}: {detail}")]
    InvalidOperand {
        operation: &'static str,
        detail: String,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: i64, len: usize },
}
