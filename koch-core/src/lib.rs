//! Correlation-based last-round subkey recovery engine.
//!
//! Given an [`acquisition::AcquisitionSet`] (ciphertexts paired with either
//! timing or power observations) this crate ranks 6-bit subkey fragments per
//! DES S-box ([`ranker`]), enumerates a bounded set of full 48-bit candidates
//! ([`enumerator`]), re-scores them against the whole acquisition set
//! ([`rescorer`]), and orchestrates the three phases across a `rayon`
//! thread pool ([`driver`]).

pub mod acquisition;
pub mod correlation;
pub mod driver;
pub mod enumerator;
pub mod error;
pub mod leakage;
pub mod ranker;
pub mod rescorer;

pub use acquisition::{AcquisitionSet, FocusWindow, Observations};
pub use driver::{CancellationToken, DriverConfig, RecoveredKey};
pub use error::Error;
pub use leakage::Mode;
