use crate::error::Error;

/// A half-open index range into each power trace's sample sequence,
/// restricting correlation to the clock cycles where the targeted
/// intermediate is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusWindow {
    pub lo: usize,
    pub hi: usize,
}

impl FocusWindow {
    #[must_use]
    pub const fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.hi - self.lo
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }
}

impl Default for FocusWindow {
    /// The window used against the reference traces: clock cycles 23-24,
    /// sample indices 575..625.
    fn default() -> Self {
        Self::new(575, 625)
    }
}

/// The observation half of an acquisition set: either scalar timings (TA) or
/// per-sample power traces (PA).
#[derive(Debug, Clone)]
pub enum Observations {
    Timing(Vec<f64>),
    Power {
        samples: Vec<Vec<f64>>,
        focus: FocusWindow,
    },
}

/// An immutable, ordered collection of (ciphertext, observation) pairs
/// shared read-only among all ranking and re-scoring workers.
#[derive(Debug, Clone)]
pub struct AcquisitionSet {
    ciphertexts: Vec<u64>,
    observations: Observations,
}

impl AcquisitionSet {
    pub fn new_timing(ciphertexts: Vec<u64>, timings: Vec<f64>) -> Result<Self, Error> {
        if ciphertexts.len() < 2 {
            return Err(Error::BadInput(format!(
                "need at least 2 acquisitions, got {}",
                ciphertexts.len()
            )));
        }
        if ciphertexts.len() != timings.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} ciphertexts but {} timings",
                ciphertexts.len(),
                timings.len()
            )));
        }
        Ok(Self {
            ciphertexts,
            observations: Observations::Timing(timings),
        })
    }

    pub fn new_power(
        ciphertexts: Vec<u64>,
        samples: Vec<Vec<f64>>,
        focus: FocusWindow,
    ) -> Result<Self, Error> {
        if ciphertexts.len() < 2 {
            return Err(Error::BadInput(format!(
                "need at least 2 acquisitions, got {}",
                ciphertexts.len()
            )));
        }
        if ciphertexts.len() != samples.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} ciphertexts but {} traces",
                ciphertexts.len(),
                samples.len()
            )));
        }
        let trace_len = samples[0].len();
        if samples.iter().any(|row| row.len() != trace_len) {
            return Err(Error::ShapeMismatch(
                "power traces do not share a common length".into(),
            ));
        }
        if focus.hi > trace_len || focus.is_empty() {
            return Err(Error::ShapeMismatch(format!(
                "focus window {:?} does not fit inside traces of length {trace_len}",
                focus
            )));
        }
        Ok(Self {
            ciphertexts,
            observations: Observations::Power { samples, focus },
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ciphertexts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ciphertexts.is_empty()
    }

    #[must_use]
    pub fn ciphertexts(&self) -> &[u64] {
        &self.ciphertexts
    }

    #[must_use]
    pub const fn observations(&self) -> &Observations {
        &self.observations
    }

    /// The N×(hi-lo) matrix of samples restricted to the focus window, one
    /// row per acquisition. Only meaningful for `Observations::Power`.
    #[must_use]
    pub fn focus_window_matrix(&self) -> Option<Vec<Vec<f64>>> {
        match &self.observations {
            Observations::Power { samples, focus } => Some(
                samples
                    .iter()
                    .map(|row| row[focus.lo..focus.hi].to_vec())
                    .collect(),
            ),
            Observations::Timing(_) => None,
        }
    }
}
