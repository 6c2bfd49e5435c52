use thiserror::Error;

use crate::arithmetic::MathOp;

/// Everything that can go wrong while parsing or evaluating an expression
/// or rendering a template. All variants are terminal for the current call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Malformed expression text.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A math operand that is null, non-numeric or an unparsable string.
    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    #[error("division by zero in `{0}`")]
    DivisionByZero(MathOp),

    /// Ordering comparison between null or mutually unordered values.
    #[error("not comparable: {0}")]
    NotComparable(String),

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// A template placeholder resolved to null; carries the placeholder path.
    #[error("no value found for placeholder: {0}")]
    MissingPlaceholder(String),

    #[error("invalid context: {0}")]
    InvalidContext(String),
}

/// Payload-free discriminant of [`EvalError`], handy for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    InvalidOperand,
    DivisionByZero,
    NotComparable,
    UnsupportedOperator,
    MissingPlaceholder,
    InvalidContext,
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Syntax(_) => ErrorKind::Syntax,
            EvalError::InvalidOperand(_) => ErrorKind::InvalidOperand,
            EvalError::DivisionByZero(_) => ErrorKind::DivisionByZero,
            EvalError::NotComparable(_) => ErrorKind::NotComparable,
            EvalError::UnsupportedOperator(_) => ErrorKind::UnsupportedOperator,
            EvalError::MissingPlaceholder(_) => ErrorKind::MissingPlaceholder,
            EvalError::InvalidContext(_) => ErrorKind::InvalidContext,
        }
    }
}

// Type alias for results that use `EvalError` as the error type
pub type Result<T> = std::result::Result<T, EvalError>;
