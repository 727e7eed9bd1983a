//! Shared plumbing for the `ta` and `pa` binaries: tracing setup and the
//! top-level error type.

pub mod error;

pub use error::Error;

/// Installs a `tracing-subscriber` that writes structured logs to stderr,
/// respecting `RUST_LOG` (defaulting to `info`). Stdout is reserved for the
/// single recovered-key line each binary prints on success.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Runs `koch_des::check()` and converts a failure into the CLI error type.
///
/// # Errors
/// Returns [`Error::SelfTestFailed`] if the DES self-test fails.
pub fn self_test() -> Result<(), Error> {
    if koch_des::check() {
        Ok(())
    } else {
        Err(Error::SelfTestFailed)
    }
}
