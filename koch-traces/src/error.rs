use thiserror::Error;

/// Errors raised while loading or writing trace/timing data files.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    BadInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
