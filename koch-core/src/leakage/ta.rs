//! Timing-attack leakage model: last-round-only for ranking, last-round plus
//! the preceding round for full-key re-scoring.

/// Ranking weight for S-box `sbox` under fragment hypothesis `fragment`:
/// `HW(Sboxes(E(R16) XOR K_s) AND mask_s)`.
#[must_use]
pub fn rank_fragment(ciphertext: u64, sbox: usize, fragment: u64) -> f64 {
    let r16 = koch_des::right_half(koch_des::initial_permutation(ciphertext));
    let shifted = fragment << koch_des::sbox_fragment_shift(sbox);
    let sbox_out = koch_des::sboxes(koch_des::expansion(r16) ^ shifted);
    f64::from(koch_des::hamming_weight(
        sbox_out & koch_des::sbox_output_mask(sbox),
    ))
}

/// Estimates the round-15 subkey from a guessed round-16 subkey via
/// `PC2(RS(n_pc2(key48)))`. Exact on 40 of 48 bits for any real key; see
/// `koch_des::pc2_uncertain_mask`.
#[must_use]
pub fn derive_k15(key48: u64) -> u64 {
    koch_des::pc2(koch_des::rs(koch_des::inverse_pc2(key48)))
}

/// Re-scoring weight for a full 48-bit candidate `key48`: the sum of the
/// round-16 and round-15 S-box output Hamming weights, where the round-15
/// subkey is derived from `key48` via [`derive_k15`].
#[must_use]
pub fn full_key_weight(ciphertext: u64, key48: u64) -> f64 {
    let ip = koch_des::initial_permutation(ciphertext);
    let r16 = koch_des::right_half(ip);
    let l16 = koch_des::left_half(ip);

    let sbox_out_16 = koch_des::sboxes(koch_des::expansion(r16) ^ key48);
    let hw16 = koch_des::hamming_weight(sbox_out_16);

    let k15 = derive_k15(key48);
    let r15 = l16 ^ koch_des::permutation(sbox_out_16);
    let sbox_out_15 = koch_des::sboxes(koch_des::expansion(r15) ^ k15);
    let hw15 = koch_des::hamming_weight(sbox_out_15);

    f64::from(hw16 + hw15)
}
