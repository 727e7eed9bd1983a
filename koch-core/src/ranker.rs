//! Per-S-box ranker: scores all 64 candidate 6-bit subkey fragments against
//! the acquisition set and returns them sorted by descending correlation.

use rayon::prelude::*;

use crate::acquisition::{AcquisitionSet, Observations};
use crate::correlation;
use crate::error::Error;
use crate::leakage::{Mode, pa, ta};

/// One candidate fragment and its correlation score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedFragment {
    pub fragment: u64,
    pub score: f64,
}

/// The 64 candidate fragments for one S-box, sorted by descending score.
pub type SboxRanking = Vec<RankedFragment>;

fn weight_vector(acq: &AcquisitionSet, mode: Mode, sbox: usize, fragment: u64) -> Vec<f64> {
    acq.ciphertexts()
        .iter()
        .map(|&ct| match mode {
            Mode::Ta => ta::rank_fragment(ct, sbox, fragment),
            Mode::Pa => pa::rank_fragment(ct, sbox, fragment),
        })
        .collect()
}

/// Ranks the 64 candidate fragments for S-box `sbox` against `acq`.
///
/// # Errors
/// Propagates [`Error::InvalidSample`]/[`Error::ShapeMismatch`] from the
/// underlying correlation estimator.
pub fn rank_sbox(acq: &AcquisitionSet, mode: Mode, sbox: usize) -> Result<SboxRanking, Error> {
    let weights: Vec<Vec<f64>> = (0..64u64)
        .into_par_iter()
        .map(|fragment| weight_vector(acq, mode, sbox, fragment))
        .collect();

    let scores: Vec<f64> = match acq.observations() {
        Observations::Timing(timings) => correlation::pcc_scalar_batch(timings, &weights)?,
        Observations::Power { .. } => {
            let window = acq
                .focus_window_matrix()
                .expect("power observations carry a focus window");
            correlation::pcc_vector_batch(&window, &weights)?
                .into_iter()
                .map(|column_scores| {
                    column_scores
                        .into_iter()
                        .fold(f64::NEG_INFINITY, f64::max)
                })
                .collect()
        }
    };

    let mut ranked: SboxRanking = (0..64u64)
        .zip(scores)
        .map(|(fragment, score)| RankedFragment { fragment, score })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.fragment.cmp(&b.fragment))
    });
    debug_assert_eq!(ranked.len(), 64);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_is_sorted_descending_and_covers_all_fragments() {
        let ciphertexts: Vec<u64> = (0..64u64).map(|i| i.wrapping_mul(0x9E37_79B9)).collect();
        let timings: Vec<f64> = ciphertexts
            .iter()
            .map(|&ct| ta::rank_fragment(ct, 0, 5) + 0.01 * (ct % 7) as f64)
            .collect();
        let acq = AcquisitionSet::new_timing(ciphertexts, timings).unwrap();
        let ranking = rank_sbox(&acq, Mode::Ta, 0).unwrap();

        assert_eq!(ranking.len(), 64);
        let mut seen = std::collections::HashSet::new();
        for window in ranking.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
        for entry in &ranking {
            assert!(seen.insert(entry.fragment), "duplicate fragment in ranking");
        }
    }
}
