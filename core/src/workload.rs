//! Seeded input vectors, so every variant sorts the same data for a given seed.

use anyhow::{Result, anyhow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `10^exponent`, the vector length encoded as `e<exponent>` in log file names.
pub fn vector_length(exponent: u32) -> Result<usize> {
    10usize
        .checked_pow(exponent)
        .ok_or_else(|| anyhow!("vector length 10^{} does not fit in usize", exponent))
}

/// Non-negative integers drawn from a PRNG seeded with `seed`.
pub fn generate(len: usize, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0..i32::MAX)).collect()
}

/// Order-independent fingerprint used to check that a sort kept the multiset.
pub fn checksum(data: &[i32]) -> (usize, i64) {
    (data.len(), data.iter().map(|&v| v as i64).sum())
}
