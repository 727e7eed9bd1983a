//! Candidate enumerator: turns 8 per-S-box rankings into a bounded set of
//! full 48-bit last-round subkey candidates via a recursive odometer with an
//! adaptive, geometrically-decaying admission rule.

use crate::ranker::SboxRanking;

/// Tuning knobs for candidate enumeration. Not part of the correctness
/// contract, only the trade-off between recall and candidate-set size.
#[derive(Debug, Clone, Copy)]
pub struct EnumeratorParams {
    pub threshold: f64,
    pub step: f64,
    pub fast_path_min_n: usize,
}

impl EnumeratorParams {
    #[must_use]
    pub const fn ta_defaults() -> Self {
        Self {
            threshold: 1.0,
            step: 0.80,
            fast_path_min_n: 250,
        }
    }

    #[must_use]
    pub const fn pa_defaults() -> Self {
        Self {
            threshold: 1.0,
            step: 0.95,
            fast_path_min_n: 250,
        }
    }
}

/// Fragments of `ranking` admitted under `params`'s geometric-decay rule.
/// The top fragment is always admitted; fragment `i` (`i` > 0) is admitted
/// only while `ranking[0].score / ranking[i].score <= threshold + step^(i-1)`
/// and all fragments before it were admitted.
#[must_use]
pub fn admitted_fragments(ranking: &SboxRanking, params: &EnumeratorParams) -> Vec<u64> {
    let mut admitted = Vec::new();
    let Some(top) = ranking.first() else {
        return admitted;
    };
    for (i, entry) in ranking.iter().enumerate() {
        if i == 0 {
            admitted.push(entry.fragment);
            continue;
        }
        if entry.score <= 0.0 {
            break;
        }
        let tolerance = params.threshold + params.step.powi(i as i32 - 1);
        if top.score / entry.score <= tolerance {
            admitted.push(entry.fragment);
        } else {
            break;
        }
    }
    admitted
}

fn odometer(admitted_sets: &[Vec<u64>], sbox: usize, acc: u64, out: &mut Vec<u64>) {
    if sbox == admitted_sets.len() {
        out.push(acc);
        return;
    }
    for &fragment in &admitted_sets[sbox] {
        let next = acc | (fragment << koch_des::sbox_fragment_shift(sbox));
        odometer(admitted_sets, sbox + 1, next, out);
    }
}

/// Enumerates full-key candidates from 8 per-S-box rankings.
///
/// When `n_acquisitions >= params.fast_path_min_n`, skips enumeration
/// entirely and emits only the Cartesian product's single rank-0 candidate
/// (the "big number" fast path).
#[must_use]
pub fn enumerate_candidates(
    rankings: &[SboxRanking],
    params: &EnumeratorParams,
    n_acquisitions: usize,
) -> Vec<u64> {
    assert_eq!(rankings.len(), koch_des::NUM_SBOXES);

    if n_acquisitions >= params.fast_path_min_n {
        let key = rankings.iter().enumerate().fold(0u64, |acc, (sbox, r)| {
            acc | (r[0].fragment << koch_des::sbox_fragment_shift(sbox))
        });
        return vec![key];
    }

    let admitted_sets: Vec<Vec<u64>> = rankings
        .iter()
        .map(|r| admitted_fragments(r, params))
        .collect();
    let mut candidates = Vec::new();
    odometer(&admitted_sets, 0, 0, &mut candidates);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::RankedFragment;

    fn ranking_with_scores(scores: &[f64]) -> SboxRanking {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| RankedFragment {
                fragment: i as u64,
                score,
            })
            .collect()
    }

    #[test]
    fn enumerator_cap_matches_geometric_decay_example() {
        // R_s[0].score / R_s[i].score = 1 + 0.5 * i, step = 0.8.
        let mut scores = vec![1.0];
        for i in 1..64usize {
            scores.push(1.0 / (1.0 + 0.5 * i as f64));
        }
        let ranking = ranking_with_scores(&scores);
        let params = EnumeratorParams {
            threshold: 1.0,
            step: 0.8,
            fast_path_min_n: 250,
        };
        let admitted = admitted_fragments(&ranking, &params);
        assert_eq!(admitted, vec![0, 1]);
    }

    #[test]
    fn enumerator_combines_admitted_sets_into_product_without_duplicates() {
        let rankings: Vec<SboxRanking> = (0..koch_des::NUM_SBOXES)
            .map(|_| {
                let mut scores = vec![1.0];
                for i in 1..64usize {
                    scores.push(1.0 / (1.0 + 0.5 * i as f64));
                }
                ranking_with_scores(&scores)
            })
            .collect();
        let params = EnumeratorParams {
            threshold: 1.0,
            step: 0.8,
            fast_path_min_n: 250,
        };
        let candidates = enumerate_candidates(&rankings, &params, 10);
        assert_eq!(candidates.len(), 256);
        let unique: std::collections::HashSet<u64> = candidates.iter().copied().collect();
        assert_eq!(unique.len(), candidates.len());
    }

    #[test]
    fn fast_path_emits_single_rank_zero_candidate() {
        let scores: Vec<f64> = std::iter::once(1.0).chain(std::iter::repeat(0.01).take(63)).collect();
        let rankings: Vec<SboxRanking> = (0..koch_des::NUM_SBOXES)
            .map(|_| ranking_with_scores(&scores))
            .collect();
        let params = EnumeratorParams::ta_defaults();
        let candidates = enumerate_candidates(&rankings, &params, 1000);
        assert_eq!(candidates.len(), 1);
    }
}
