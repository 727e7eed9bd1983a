use thiserror::Error;

/// Top-level CLI error, composing the engine and I/O crates' error types.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] koch_core::Error),

    #[error(transparent)]
    Traces(#[from] koch_traces::Error),

    #[error("DES functional self-test failed")]
    SelfTestFailed,
}
