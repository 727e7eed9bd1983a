use thiserror::Error;

/// Errors raised by the correlation engine.
///
/// Every variant is fatal to the attack pipeline; none are retried (see the
/// crate-level error handling notes).
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    BadInput(String),

    #[error("sample shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("sample has zero variance, correlation is undefined: {0}")]
    InvalidSample(String),

    #[error("DES functional self-test failed")]
    SelfTestFailed,

    #[error("attack cancelled before completion")]
    Cancelled,
}
