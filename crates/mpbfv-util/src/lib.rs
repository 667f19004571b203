#![crate_name = "mpbfv_util"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Utilities for the mpbfv library: primality and noise sampling.

use num_bigint_dig::{prime::probably_prime, BigUint};
use num_traits::PrimInt;
use rand::{CryptoRng, RngCore};
use rand_distr::{Distribution, Normal};

/// Returns whether the modulus p is prime; this function is 100% accurate.
pub fn is_prime(p: u64) -> bool {
    probably_prime(&BigUint::from(p), 0)
}

/// Sample a vector of independent centered binomial distributions of a given
/// variance. Returns an error if the variance is strictly larger than 16.
pub fn sample_vec_cbd<R: RngCore + CryptoRng>(
    vector_size: usize,
    variance: usize,
    rng: &mut R,
) -> Result<Vec<i64>, &'static str> {
    if !(1..=16).contains(&variance) {
        return Err("The variance should be between 1 and 16");
    }
    sample_cbd(vector_size, 2 * variance, rng)
}

/// Sample a vector of centered binomial distributions with a fractional
/// variance, rounded to the nearest multiple of 1/2.
///
/// A variance of 0.5 samples ternary values with probabilities (1/4, 1/2, 1/4).
pub fn sample_vec_cbd_f32<R: RngCore + CryptoRng>(
    vector_size: usize,
    variance: f32,
    rng: &mut R,
) -> Result<Vec<i64>, &'static str> {
    let pairs = (2.0 * variance).round();
    if !(1.0..=32.0).contains(&pairs) {
        return Err("The variance should be between 0.5 and 16");
    }
    sample_cbd(vector_size, pairs as usize, rng)
}

/// Each sample is the difference of the popcounts of two `half_bits`-bit
/// uniform words, so its variance is `half_bits / 2`.
fn sample_cbd<R: RngCore + CryptoRng>(
    vector_size: usize,
    half_bits: usize,
    rng: &mut R,
) -> Result<Vec<i64>, &'static str> {
    debug_assert!((1..=32).contains(&half_bits));

    let number_bits = 2 * half_bits;
    let mask_add = (1u128 << half_bits) - 1;
    let mask_sub = mask_add << half_bits;

    let mut out = Vec::with_capacity(vector_size);
    let mut current_pool = 0u128;
    let mut current_pool_nbits = 0;
    for _ in 0..vector_size {
        if current_pool_nbits < number_bits {
            current_pool |= (rng.next_u64() as u128) << current_pool_nbits;
            current_pool_nbits += 64;
        }
        out.push(
            ((current_pool & mask_add).count_ones() as i64)
                - ((current_pool & mask_sub).count_ones() as i64),
        );
        current_pool >>= number_bits;
        current_pool_nbits -= number_bits;
    }
    Ok(out)
}

/// Sample a vector of rounded Gaussians of a given variance.
///
/// Used for smudging noise, whose variance may exceed what the centered
/// binomial sampler supports.
pub fn sample_vec_normal<R: RngCore + CryptoRng>(
    vector_size: usize,
    variance: f64,
    rng: &mut R,
) -> Result<Vec<i64>, &'static str> {
    if !variance.is_finite() || variance <= 0.0 || variance >= 2f64.powi(100) {
        return Err("The variance should be positive and smaller than 2^100");
    }
    let normal = Normal::new(0.0, variance.sqrt()).map_err(|_| "Invalid normal distribution")?;
    Ok((0..vector_size)
        .map(|_| normal.sample(rng).round() as i64)
        .collect())
}

/// Compute the sample variance of a list of values.
///
/// Panics if the length of value is < 2.
pub fn variance<T: PrimInt>(values: &[T]) -> f64 {
    assert!(values.len() > 1);
    let values = values
        .iter()
        .map(|v| v.to_f64().unwrap_or_default())
        .collect::<Vec<_>>();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (values.len() as f64 - 1.0)
}
