//! Error types for symspice-parser.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unknown element type: {0}")]
    UnknownElement(String),

    #[error(transparent)]
    Core(#[from] symspice_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
