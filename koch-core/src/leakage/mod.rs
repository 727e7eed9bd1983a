//! Leakage models: map a ciphertext and a key hypothesis to a predicted
//! Hamming-weight leakage. Each submodule provides a per-S-box ranking form
//! and a full-48-bit-candidate re-scoring form, per attack kind.

pub mod pa;
pub mod ta;

/// Which attack's leakage model to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ta,
    Pa,
}
