//! Harness error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("unknown mode '{0}' (expected strict, hardened or both)")]
    InvalidMode(String),
    #[error("invalid inputs: {0}")]
    InvalidInputs(String),
    #[error(
        "precondition: bound {max_length} exceeds {available} readable bytes and no terminator lies within them"
    )]
    Precondition { max_length: usize, available: usize },
    #[error("{failed} of {total} cases failed")]
    VerificationFailed { failed: usize, total: usize },
    #[error("{0} invalid log line(s)")]
    InvalidLog(usize),
}
