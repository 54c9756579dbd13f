// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Deterministic draw derivation.
//!
//! A draw is a pure function of its 144-hash window:
//! `seed = SHA256(hash_0 || .. || hash_143)` over the ASCII hex strings,
//! then six 256-bit values `r_i = HMAC-SHA256(key = seed, msg = "i")`.
//! Front numbers are drawn without replacement from an ordered shrinking
//! pool (`pool.remove(r_i mod pool.len())`); the back number is
//! `(r_5 mod 26) + 1`. The removal semantics are load-bearing: replaying
//! the same window must reproduce the reference vectors exactly.

use std::ops::Range;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::{BACK_MAX, FRONT_PICKS, FRONT_POOL_MAX, WINDOW_SIZE};
use crate::error::{KernelError, KernelResult};

type HmacSha256 = Hmac<Sha256>;

/// Front numbers (sorted ascending, distinct) plus the back number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub front: [u8; FRONT_PICKS],
    pub back: u8,
}

/// The half-open height window consumed by draw `id`.
pub fn window_for_draw(id: u64) -> Range<u64> {
    let start = id * WINDOW_SIZE as u64;
    start..start + WINDOW_SIZE as u64
}

/// Keyed counter construction: `count` 256-bit values from one seed.
fn seed_expand(seed: &[u8; 32], count: usize) -> Vec<[u8; 32]> {
    (0..count)
        .map(|counter| {
            let mut mac = HmacSha256::new_from_slice(seed)
                .expect("HMAC-SHA256 accepts any key length");
            mac.update(counter.to_string().as_bytes());
            mac.finalize().into_bytes().into()
        })
        .collect()
}

/// `value mod modulus` where `value` is a 256-bit big-endian integer.
/// Folding byte by byte in u128 is exact for any modulus that fits u64.
fn mod_be_bytes(value: &[u8; 32], modulus: u64) -> u64 {
    debug_assert!(modulus > 0);
    let m = modulus as u128;
    let mut acc: u128 = 0;
    for &b in value {
        acc = ((acc << 8) | b as u128) % m;
    }
    acc as u64
}

/// Derives the draw for a window of exactly [`WINDOW_SIZE`] ordered hashes.
pub fn derive<S: AsRef<str>>(hashes: &[S]) -> KernelResult<Draw> {
    if hashes.len() != WINDOW_SIZE {
        return Err(KernelError::WrongWindowSize {
            expected: WINDOW_SIZE,
            got: hashes.len(),
        });
    }

    let mut hasher = Sha256::new();
    for hash in hashes {
        hasher.update(hash.as_ref().as_bytes());
    }
    let seed: [u8; 32] = hasher.finalize().into();

    let randoms = seed_expand(&seed, FRONT_PICKS + 1);

    let mut pool: Vec<u8> = (1..=FRONT_POOL_MAX).collect();
    let mut front = [0u8; FRONT_PICKS];
    for (i, slot) in front.iter_mut().enumerate() {
        let index = mod_be_bytes(&randoms[i], pool.len() as u64) as usize;
        *slot = pool.remove(index);
    }
    front.sort_unstable();

    let back = mod_be_bytes(&randoms[FRONT_PICKS], BACK_MAX as u64) as u8 + 1;

    Ok(Draw { front, back })
}

/// True iff `(front, back)` is exactly what [`derive`] produces for the
/// given window.
pub fn verify<S: AsRef<str>>(
    hashes: &[S],
    front: &[u8; FRONT_PICKS],
    back: u8,
) -> KernelResult<bool> {
    let draw = derive(hashes)?;
    Ok(draw.front == *front && draw.back == back)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(heights: Range<u64>) -> Vec<String> {
        heights.map(|h| format!("{h:064x}")).collect()
    }

    #[test]
    fn golden_vector_window_zero() {
        let draw = derive(&window(0..144)).unwrap();
        assert_eq!(draw.front, [40, 42, 46, 57, 66]);
        assert_eq!(draw.back, 17);
    }

    #[test]
    fn golden_vector_window_one() {
        let draw = derive(&window(144..288)).unwrap();
        assert_eq!(draw.front, [18, 30, 34, 47, 61]);
        assert_eq!(draw.back, 17);
    }

    #[test]
    fn golden_vector_all_zero_hashes() {
        let hashes = vec!["0".repeat(64); WINDOW_SIZE];
        let draw = derive(&hashes).unwrap();
        assert_eq!(draw.front, [31, 43, 53, 56, 59]);
        assert_eq!(draw.back, 7);
    }

    #[test]
    fn derivation_is_deterministic() {
        let hashes = window(1000..1144);
        assert_eq!(derive(&hashes).unwrap(), derive(&hashes).unwrap());
    }

    #[test]
    fn wrong_window_size_is_rejected() {
        assert_eq!(
            derive(&window(0..143)),
            Err(KernelError::WrongWindowSize { expected: 144, got: 143 })
        );
        assert_eq!(
            derive(&window(0..145)),
            Err(KernelError::WrongWindowSize { expected: 144, got: 145 })
        );
    }

    #[test]
    fn verify_accepts_derived_and_rejects_tampered() {
        let hashes = window(288..432);
        let draw = derive(&hashes).unwrap();
        assert!(verify(&hashes, &draw.front, draw.back).unwrap());

        let wrong_back = if draw.back == 1 { 2 } else { draw.back - 1 };
        assert!(!verify(&hashes, &draw.front, wrong_back).unwrap());

        let mut wrong_front = draw.front;
        wrong_front[0] = if wrong_front[0] == 1 { 2 } else { wrong_front[0] - 1 };
        assert!(!verify(&hashes, &wrong_front, draw.back).unwrap());
    }

    #[test]
    fn numbers_stay_in_range_and_distinct() {
        for w in 0..32u64 {
            let start = w * 144;
            let draw = derive(&window(start..start + 144)).unwrap();
            assert!(draw.front.windows(2).all(|p| p[0] < p[1]), "sorted+distinct");
            assert!(draw.front.iter().all(|&n| (1..=FRONT_POOL_MAX).contains(&n)));
            assert!((1..=BACK_MAX).contains(&draw.back));
        }
    }

    #[test]
    fn window_ranges_tile_the_ledger() {
        assert_eq!(window_for_draw(0), 0..144);
        assert_eq!(window_for_draw(1), 144..288);
        assert_eq!(window_for_draw(10).start, window_for_draw(9).end);
    }

    #[test]
    fn mod_be_bytes_matches_small_values() {
        let mut v = [0u8; 32];
        v[31] = 200;
        assert_eq!(mod_be_bytes(&v, 69), 200 % 69);
        v[30] = 1; // 456
        assert_eq!(mod_be_bytes(&v, 26), 456 % 26);
        let max = [0xffu8; 32];
        // 2^256 - 1 mod 2 == 1
        assert_eq!(mod_be_bytes(&max, 2), 1);
    }
}
