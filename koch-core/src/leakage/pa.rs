//! Power-attack leakage model: the Hamming weight of the L15⊕L16 difference
//! hypothesised under a key guess, masked to one S-box's output nibble for
//! ranking and left unmasked (the full 32-bit difference) for full-key
//! re-scoring.

/// Ranking weight for S-box `sbox` under fragment hypothesis `fragment`.
#[must_use]
pub fn rank_fragment(ciphertext: u64, sbox: usize, fragment: u64) -> f64 {
    let ip = koch_des::initial_permutation(ciphertext);
    let r = koch_des::right_half(ip);
    let l = koch_des::left_half(ip);
    let shifted = fragment << koch_des::sbox_fragment_shift(sbox);
    let hyp_l15 = l ^ koch_des::permutation(koch_des::sboxes(koch_des::expansion(r) ^ shifted));
    let diff = koch_des::inverse_permutation(r ^ hyp_l15);
    f64::from(koch_des::hamming_weight(
        diff & koch_des::sbox_output_mask(sbox),
    ))
}

/// Re-scoring weight for a full 48-bit candidate `key48`: the Hamming weight
/// of the full L15⊕L16 difference, unmasked.
#[must_use]
pub fn full_key_weight(ciphertext: u64, key48: u64) -> f64 {
    let ip = koch_des::initial_permutation(ciphertext);
    let r = koch_des::right_half(ip);
    let l = koch_des::left_half(ip);
    let hyp_l15 = l ^ koch_des::permutation(koch_des::sboxes(koch_des::expansion(r) ^ key48));
    let diff = koch_des::inverse_permutation(r ^ hyp_l15);
    f64::from(koch_des::hamming_weight(diff))
}

/// Maps a 1-indexed target bit of L15 (as in the DES standard, 1..=32) to
/// the S-box whose output nibble produced it, via the inverse of the P
/// permutation. Diagnostic only; not used by the ranker or re-scorer.
#[must_use]
pub fn target_bit_to_sbox(target_bit: u32) -> usize {
    debug_assert!((1..=32).contains(&target_bit));
    // `inverse_permutation` maps a post-P bit position to its pre-P source
    // bit; source bit `b` (1-indexed) belongs to S-box `(b - 1) / 4`.
    let post_p_bit_mask = 1u32 << (32 - target_bit);
    let source_bit = koch_des::inverse_permutation(post_p_bit_mask).trailing_zeros();
    ((31 - source_bit) / 4) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_fragment_stays_within_nibble_weight_bounds() {
        let ct = 0x1122_3344_5566_7788u64;
        for sbox in 0..koch_des::NUM_SBOXES {
            for fragment in 0..64u64 {
                let w = rank_fragment(ct, sbox, fragment);
                assert!((0.0..=4.0).contains(&w));
            }
        }
    }

    #[test]
    fn full_key_weight_stays_within_32_bit_weight_bounds() {
        let ct = 0x1122_3344_5566_7788u64;
        let w = full_key_weight(ct, 0x0123_4567_89AB);
        assert!((0.0..=32.0).contains(&w));
    }

    #[test]
    fn target_bit_maps_into_valid_sbox_range() {
        for bit in 1..=32 {
            assert!(target_bit_to_sbox(bit) < koch_des::NUM_SBOXES);
        }
    }
}
