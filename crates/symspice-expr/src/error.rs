//! Error types for symspice-expr.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("division by a zero rational function")]
    DivisionByZero,

    #[error("root finding failed: {0}")]
    RootFinding(String),

    #[error("expression parse error at position {pos}: {message}")]
    Parse { pos: usize, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
