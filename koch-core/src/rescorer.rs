//! Full-key re-scorer: evaluates every surviving 48-bit candidate against
//! the whole acquisition set and returns the best-correlated one.

use rayon::prelude::*;

use crate::acquisition::{AcquisitionSet, Observations};
use crate::correlation;
use crate::driver::CancellationToken;
use crate::error::Error;
use crate::leakage::{Mode, pa, ta};

/// Candidates are re-scored in chunks so the cancellation hook can be
/// polled between batches without adding per-candidate overhead.
const CHUNK_SIZE: usize = 4096;

fn score_candidate(acq: &AcquisitionSet, mode: Mode, key48: u64) -> Result<f64, Error> {
    let weights: Vec<f64> = acq
        .ciphertexts()
        .iter()
        .map(|&ct| match mode {
            Mode::Ta => ta::full_key_weight(ct, key48),
            Mode::Pa => pa::full_key_weight(ct, key48),
        })
        .collect();

    match acq.observations() {
        Observations::Timing(timings) => correlation::pcc_scalar_scalar(timings, &weights),
        Observations::Power { .. } => {
            let window = acq
                .focus_window_matrix()
                .expect("power observations carry a focus window");
            let column_scores = correlation::pcc_vector_scalar(&window, &weights)?;
            Ok(column_scores
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max))
        }
    }
}

fn pick_better(a: (u64, f64), b: (u64, f64)) -> (u64, f64) {
    if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) { b } else { a }
}

/// Re-scores every candidate and returns `(key, score)` for the winner.
/// Ties are broken by the lowest key value.
///
/// # Errors
/// Returns [`Error::Cancelled`] if `cancel` trips between chunks, or
/// propagates a correlation error from a malformed candidate/acquisition
/// pairing.
pub fn rescore(
    acq: &AcquisitionSet,
    mode: Mode,
    candidates: &[u64],
    cancel: &CancellationToken,
) -> Result<(u64, f64), Error> {
    if candidates.is_empty() {
        return Err(Error::BadInput("no candidates to re-score".into()));
    }

    let mut best: Option<(u64, f64)> = None;
    for chunk in candidates.chunks(CHUNK_SIZE) {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let chunk_results: Vec<(u64, f64)> = chunk
            .par_iter()
            .map(|&key| score_candidate(acq, mode, key).map(|score| (key, score)))
            .collect::<Result<Vec<_>, Error>>()?;

        for candidate in chunk_results {
            best = Some(match best {
                None => candidate,
                Some(current) => pick_better(current, candidate),
            });
        }
    }

    best.ok_or_else(|| Error::BadInput("no candidates to re-score".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::AcquisitionSet;

    #[test]
    fn tie_breaks_on_lowest_key() {
        assert_eq!(pick_better((5, 0.9), (3, 0.9)), (3, 0.9));
        assert_eq!(pick_better((3, 0.9), (5, 0.9)), (3, 0.9));
        assert_eq!(pick_better((5, 0.8), (3, 0.9)), (3, 0.9));
    }

    #[test]
    fn rescore_rejects_empty_candidate_list() {
        let ciphertexts: Vec<u64> = (0..4u64).collect();
        let timings = vec![1.0, 2.0, 3.0, 4.0];
        let acq = AcquisitionSet::new_timing(ciphertexts, timings).unwrap();
        let cancel = CancellationToken::new();
        let result = rescore(&acq, Mode::Ta, &[], &cancel);
        assert!(matches!(result, Err(Error::BadInput(_))));
    }

    #[test]
    fn rescore_honors_pre_tripped_cancellation() {
        let ciphertexts: Vec<u64> = (0..4u64).collect();
        let timings = vec![1.0, 2.0, 3.0, 4.0];
        let acq = AcquisitionSet::new_timing(ciphertexts, timings).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = rescore(&acq, Mode::Ta, &[0x1], &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
