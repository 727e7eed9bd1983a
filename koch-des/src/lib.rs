//! Standard DES bit-level primitives.
//!
//! Every function here operates on right-aligned integers: an N-bit quantity
//! is stored in the low N bits of its backing `u32`/`u64`, bit `N-1` is the
//! most significant (textbook "position 1") bit. This mirrors the way the
//! FIPS 46-3 tables are conventionally printed (1-indexed, most significant
//! bit first) and keeps every permutation a single table-driven pass.
//!
//! S-box group `s` (`s` in `0..8`) always means the standard DES group, so
//! `s = 0` is S1 and occupies the most-significant 6-bit field of the 48-bit
//! expansion output (bits 42..48) and the most-significant nibble of the
//! 32-bit substitution output (bits 28..32). Callers building a packed
//! 48-bit last-round subkey candidate place fragment `s` at
//! [`sbox_fragment_shift`] so that XOR-ing the candidate against
//! [`expansion`]'s output lines the bits up correctly.

use std::sync::LazyLock;

/// Number of DES S-boxes (and 6-bit subkey fragments in a round key).
pub const NUM_SBOXES: usize = 8;

/// Bit-shift at which S-box `s`'s 6-bit fragment sits within a 48-bit value
/// (expansion output or round key).
#[must_use]
pub const fn sbox_fragment_shift(s: usize) -> u32 {
    42 - 6 * s as u32
}

/// Bit-shift at which S-box `s`'s 4-bit output nibble sits within the 32-bit
/// substitution output.
#[must_use]
pub const fn sbox_output_shift(s: usize) -> u32 {
    28 - 4 * s as u32
}

/// Mask selecting S-box `s`'s 4-bit output nibble within the 32-bit
/// substitution output.
#[must_use]
pub const fn sbox_output_mask(s: usize) -> u32 {
    0xFu32 << sbox_output_shift(s)
}

/// Extract `table.len()` bits from `source` (an `source_width`-bit,
/// right-aligned value) according to 1-indexed, most-significant-bit-first
/// `table` entries. Returns a right-aligned value of `table.len()` bits.
fn permute(source: u64, source_width: u32, table: &[u8]) -> u64 {
    let out_len = table.len() as u32;
    let mut out = 0u64;
    for (i, &pos) in table.iter().enumerate() {
        let bit = (source >> (source_width - u32::from(pos))) & 1;
        out |= bit << (out_len - 1 - i as u32);
    }
    out
}

#[rustfmt::skip]
const IP_TABLE: [u8; 64] = [
    58, 50, 42, 34, 26, 18, 10,  2,
    60, 52, 44, 36, 28, 20, 12,  4,
    62, 54, 46, 38, 30, 22, 14,  6,
    64, 56, 48, 40, 32, 24, 16,  8,
    57, 49, 41, 33, 25, 17,  9,  1,
    59, 51, 43, 35, 27, 19, 11,  3,
    61, 53, 45, 37, 29, 21, 13,  5,
    63, 55, 47, 39, 31, 23, 15,  7,
];

#[rustfmt::skip]
const IP_INV_TABLE: [u8; 64] = [
    40,  8, 48, 16, 56, 24, 64, 32,
    39,  7, 47, 15, 55, 23, 63, 31,
    38,  6, 46, 14, 54, 22, 62, 30,
    37,  5, 45, 13, 53, 21, 61, 29,
    36,  4, 44, 12, 52, 20, 60, 28,
    35,  3, 43, 11, 51, 19, 59, 27,
    34,  2, 42, 10, 50, 18, 58, 26,
    33,  1, 41,  9, 49, 17, 57, 25,
];

#[rustfmt::skip]
const E_TABLE: [u8; 48] = [
    32,  1,  2,  3,  4,  5,
     4,  5,  6,  7,  8,  9,
     8,  9, 10, 11, 12, 13,
    12, 13, 14, 15, 16, 17,
    16, 17, 18, 19, 20, 21,
    20, 21, 22, 23, 24, 25,
    24, 25, 26, 27, 28, 29,
    28, 29, 30, 31, 32,  1,
];

#[rustfmt::skip]
const P_TABLE: [u8; 32] = [
    16,  7, 20, 21, 29, 12, 28, 17,
     1, 15, 23, 26,  5, 18, 31, 10,
     2,  8, 24, 14, 32, 27,  3,  9,
    19, 13, 30,  6, 22, 11,  4, 25,
];

/// PC-1, producing the 56-bit C‖D value (C in the high 28 bits, D in the low
/// 28) directly from the 64-bit key (parity bits included, as in the
/// standard).
#[rustfmt::skip]
const PC1_TABLE: [u8; 56] = [
    // C
    57, 49, 41, 33, 25, 17,  9,
     1, 58, 50, 42, 34, 26, 18,
    10,  2, 59, 51, 43, 35, 27,
    19, 11,  3, 60, 52, 44, 36,
    // D
    63, 55, 47, 39, 31, 23, 15,
     7, 62, 54, 46, 38, 30, 22,
    14,  6, 61, 53, 45, 37, 29,
    21, 13,  5, 28, 20, 12,  4,
];

#[rustfmt::skip]
const PC2_TABLE: [u8; 48] = [
    14, 17, 11, 24,  1,  5,
     3, 28, 15,  6, 21, 10,
    23, 19, 12,  4, 26,  8,
    16,  7, 27, 20, 13,  2,
    41, 52, 31, 37, 47, 55,
    30, 40, 51, 45, 33, 48,
    44, 49, 39, 56, 34, 53,
    46, 42, 50, 36, 29, 32,
];

const SHIFT_SCHEDULE: [u32; 16] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

#[rustfmt::skip]
const S_BOXES: [[u8; 64]; 8] = [
    [
        14,  4, 13,  1,  2, 15, 11,  8,  3, 10,  6, 12,  5,  9,  0,  7,
         0, 15,  7,  4, 14,  2, 13,  1, 10,  6, 12, 11,  9,  5,  3,  8,
         4,  1, 14,  8, 13,  6,  2, 11, 15, 12,  9,  7,  3, 10,  5,  0,
        15, 12,  8,  2,  4,  9,  1,  7,  5, 11,  3, 14, 10,  0,  6, 13,
    ],
    [
        15,  1,  8, 14,  6, 11,  3,  4,  9,  7,  2, 13, 12,  0,  5, 10,
         3, 13,  4,  7, 15,  2,  8, 14, 12,  0,  1, 10,  6,  9, 11,  5,
         0, 14,  7, 11, 10,  4, 13,  1,  5,  8, 12,  6,  9,  3,  2, 15,
        13,  8, 10,  1,  3, 15,  4,  2, 11,  6,  7, 12,  0,  5, 14,  9,
    ],
    [
        10,  0,  9, 14,  6,  3, 15,  5,  1, 13, 12,  7, 11,  4,  2,  8,
        13,  7,  0,  9,  3,  4,  6, 10,  2,  8,  5, 14, 12, 11, 15,  1,
        13,  6,  4,  9,  8, 15,  3,  0, 11,  1,  2, 12,  5, 10, 14,  7,
         1, 10, 13,  0,  6,  9,  8,  7,  4, 15, 14,  3, 11,  5,  2, 12,
    ],
    [
         7, 13, 14,  3,  0,  6,  9, 10,  1,  2,  8,  5, 11, 12,  4, 15,
        13,  8, 11,  5,  6, 15,  0,  3,  4,  7,  2, 12,  1, 10, 14,  9,
        10,  6,  9,  0, 12, 11,  7, 13, 15,  1,  3, 14,  5,  2,  8,  4,
         3, 15,  0,  6, 10,  1, 13,  8,  9,  4,  5, 11, 12,  7,  2, 14,
    ],
    [
         2, 12,  4,  1,  7, 10, 11,  6,  8,  5,  3, 15, 13,  0, 14,  9,
        14, 11,  2, 12,  4,  7, 13,  1,  5,  0, 15, 10,  3,  9,  8,  6,
         4,  2,  1, 11, 10, 13,  7,  8, 15,  9, 12,  5,  6,  3,  0, 14,
        11,  8, 12,  7,  1, 14,  2, 13,  6, 15,  0,  9, 10,  4,  5,  3,
    ],
    [
        12,  1, 10, 15,  9,  2,  6,  8,  0, 13,  3,  4, 14,  7,  5, 11,
        10, 15,  4,  2,  7, 12,  9,  5,  6,  1, 13, 14,  0, 11,  3,  8,
         9, 14, 15,  5,  2,  8, 12,  3,  7,  0,  4, 10,  1, 13, 11,  6,
         4,  3,  2, 12,  9,  5, 15, 10, 11, 14,  1,  7,  6,  0,  8, 13,
    ],
    [
         4, 11,  2, 14, 15,  0,  8, 13,  3, 12,  9,  7,  5, 10,  6,  1,
        13,  0, 11,  7,  4,  9,  1, 10, 14,  3,  5, 12,  2, 15,  8,  6,
         1,  4, 11, 13, 12,  3,  7, 14, 10, 15,  6,  8,  0,  5,  9,  2,
         6, 11, 13,  8,  1,  4, 10,  7,  9,  5,  0, 15, 14,  2,  3, 12,
    ],
    [
        13,  2,  8,  4,  6, 15, 11,  1, 10,  9,  3, 14,  5,  0, 12,  7,
         1, 15, 13,  8, 10,  3,  7,  4, 12,  5,  6, 11,  0, 14,  9,  2,
         7, 11,  4,  1,  9, 12, 14,  2,  0,  6, 10, 13, 15,  3,  5,  8,
         2,  1, 14,  7,  4, 10,  8, 13, 15, 12,  9,  0,  3,  5,  6, 11,
    ],
];

static INV_P_TABLE: LazyLock<[u8; 32]> = LazyLock::new(|| {
    let mut inv = [0u8; 32];
    for (k, &pos) in P_TABLE.iter().enumerate() {
        inv[pos as usize - 1] = (k + 1) as u8;
    }
    inv
});

/// Mask (within a 48-bit `pc2` output) of the bits that [`inverse_pc2`]'s
/// zero-fill cannot reconstruct.
///
/// PC2 selects only 48 of the 56 C‖D positions; the other 8 are invisible to
/// any function of a 48-bit round key alone. When `pc2(rs(inverse_pc2(k16)))`
/// is used to estimate k15 from a guessed k16, the output bits that trace
/// back (through `rs`'s rotation) to one of those 8 unselected CD16
/// positions inherit the zero-fill's fabricated value instead of the true
/// one. This mask has exactly one set bit per such output position; the
/// other 40 bits of the estimate are exact for any real key.
static PC2_UNCERTAIN_MASK: LazyLock<u64> = LazyLock::new(|| {
    let mut unselected = [true; 56];
    for &pos in &PC2_TABLE {
        unselected[pos as usize - 1] = false;
    }

    let mut mask = 0u64;
    for (i, &dest_global) in PC2_TABLE.iter().enumerate() {
        let dest_global = dest_global as usize;
        let (base, local) = if dest_global <= 28 { (0, dest_global) } else { (28, dest_global - 28) };
        // rs() right-rotates each 28-bit half by one position; the bit RS
        // places at `local` came from source position `local - 1` (or 28,
        // for local == 1) in the pre-rotation half.
        let source_local = if local == 1 { 28 } else { local - 1 };
        if unselected[base + source_local - 1] {
            mask |= 1u64 << (48 - 1 - i as u32);
        }
    }
    mask
});

/// Returns [`PC2_UNCERTAIN_MASK`]: the 8 bits of a `pc2(rs(inverse_pc2(_)))`
/// k15 estimate that are zero-fill artifacts rather than exact.
#[must_use]
pub fn pc2_uncertain_mask() -> u64 {
    *PC2_UNCERTAIN_MASK
}

/// DES initial permutation (IP).
#[must_use]
pub fn initial_permutation(x: u64) -> u64 {
    permute(x, 64, &IP_TABLE)
}

fn inverse_initial_permutation(x: u64) -> u64 {
    permute(x, 64, &IP_INV_TABLE)
}

/// DES expansion (E), mapping the 32-bit right half to a 48-bit value.
#[must_use]
pub fn expansion(r: u32) -> u64 {
    permute(u64::from(r), 32, &E_TABLE)
}

/// DES linear permutation (P) applied to a 32-bit S-box substitution output.
#[must_use]
pub fn permutation(x: u32) -> u32 {
    permute(u64::from(x), 32, &P_TABLE) as u32
}

/// Inverse of [`permutation`] (`n_p` in the attack literature): recovers the
/// pre-P 32-bit S-box output from a post-P value.
#[must_use]
pub fn inverse_permutation(x: u32) -> u32 {
    permute(u64::from(x), 32, &*INV_P_TABLE) as u32
}

/// Parallel S-box substitution: takes the 48-bit output of `expansion(R) ^ K`
/// and returns the combined 32-bit output, S-box `s`'s nibble occupying
/// [`sbox_output_shift`]`(s)`.
#[must_use]
pub fn sboxes(x: u64) -> u32 {
    let mut out = 0u32;
    for s in 0..NUM_SBOXES {
        let chunk = ((x >> sbox_fragment_shift(s)) & 0x3F) as u8;
        let row = ((chunk & 0x20) >> 4) | (chunk & 0x01);
        let col = (chunk >> 1) & 0x0F;
        let value = u32::from(S_BOXES[s][(row as usize) * 16 + col as usize]);
        out |= value << sbox_output_shift(s);
    }
    out
}

/// PC-2, compressing a 56-bit C‖D key half pair into a 48-bit round key.
#[must_use]
pub fn pc2(x: u64) -> u64 {
    permute(x, 56, &PC2_TABLE)
}

/// Best-effort inverse of [`pc2`] (`n_pc2`): scatters the 48 known bits of a
/// round key back into their 56-bit C‖D positions, leaving the 8 positions
/// PC-2 never selects as zero. Composed as `pc2(rs(inverse_pc2(k16)))` to
/// estimate a neighbouring round key, this reproduces 40 of 48 bits exactly;
/// the other 8 are shadowed by the zero-fill (see [`pc2_uncertain_mask`]).
#[must_use]
pub fn inverse_pc2(x: u64) -> u64 {
    let mut out = 0u64;
    for (k, &target) in PC2_TABLE.iter().enumerate() {
        let bit = (x >> (48 - (k as u32 + 1))) & 1;
        out |= bit << (56 - u32::from(target));
    }
    out
}

fn rotate_left_28(v: u32, amount: u32) -> u32 {
    ((v << amount) | (v >> (28 - amount))) & 0x0FFF_FFFF
}

fn rotate_right_28(v: u32, amount: u32) -> u32 {
    ((v >> amount) | (v << (28 - amount))) & 0x0FFF_FFFF
}

/// One-position key-schedule rotation (`RS`), applied to a 56-bit C‖D value
/// in the direction opposite the forward key schedule (i.e. "one round
/// earlier"): both halves are rotated right by one bit.
#[must_use]
pub fn rs(x: u64) -> u64 {
    let c = ((x >> 28) & 0x0FFF_FFFF) as u32;
    let d = (x & 0x0FFF_FFFF) as u32;
    let c = rotate_right_28(c, 1);
    let d = rotate_right_28(d, 1);
    (u64::from(c) << 28) | u64::from(d)
}

/// Right half (R) of a 64-bit value after [`initial_permutation`].
#[must_use]
pub const fn right_half(x: u64) -> u32 {
    x as u32
}

/// Left half (L) of a 64-bit value after [`initial_permutation`].
#[must_use]
pub const fn left_half(x: u64) -> u32 {
    (x >> 32) as u32
}

/// Population count.
#[must_use]
pub const fn hamming_weight(x: u32) -> u32 {
    x.count_ones()
}

/// Computes the 16 round keys of the standard DES key schedule from a 64-bit
/// key (with parity bits, as conventionally formatted).
#[must_use]
pub fn key_schedule(key: u64) -> [u64; 16] {
    let cd0 = permute(key, 64, &PC1_TABLE);
    let mut c = ((cd0 >> 28) & 0x0FFF_FFFF) as u32;
    let mut d = (cd0 & 0x0FFF_FFFF) as u32;

    let mut schedule = [0u64; 16];
    for (round, &shift) in SHIFT_SCHEDULE.iter().enumerate() {
        c = rotate_left_28(c, shift);
        d = rotate_left_28(d, shift);
        let cd = (u64::from(c) << 28) | u64::from(d);
        schedule[round] = pc2(cd);
    }
    schedule
}

fn f_function(r: u32, round_key: u64) -> u32 {
    permutation(sboxes(expansion(r) ^ round_key))
}

fn encrypt_block(plaintext: u64, key: u64) -> u64 {
    let round_keys = key_schedule(key);
    let ip = initial_permutation(plaintext);
    let mut l = (ip >> 32) as u32;
    let mut r = ip as u32;
    for round_key in round_keys {
        let new_r = l ^ f_function(r, round_key);
        l = r;
        r = new_r;
    }
    let preoutput = (u64::from(r) << 32) | u64::from(l);
    inverse_initial_permutation(preoutput)
}

/// Functional self-test: encrypts the FIPS 46-3 known-answer test vector and
/// compares the result against the documented ciphertext.
#[must_use]
pub fn check() -> bool {
    const KEY: u64 = 0x133457799BBC_DFF1;
    const PLAINTEXT: u64 = 0x0123456789AB_CDEF;
    const CIPHERTEXT: u64 = 0x85E813540F0A_B405;
    encrypt_block(PLAINTEXT, KEY) == CIPHERTEXT
}
