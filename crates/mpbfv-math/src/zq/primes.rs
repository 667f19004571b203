//! Generation of NTT-friendly primes.

use mpbfv_util::is_prime;

/// Returns the largest prime of `num_bits` bits congruent to 1 modulo
/// `modulo`, and strictly smaller than `upper_bound`.
///
/// Returns None if no such prime exists. Aborts in debug mode if `num_bits`
/// is not between 10 and 62, or if `modulo` is not a power of two.
pub fn generate_prime(num_bits: usize, modulo: u64, upper_bound: u64) -> Option<u64> {
    debug_assert!((10..=62).contains(&num_bits));
    debug_assert!(modulo.is_power_of_two());

    let lower_bound = 1u64 << (num_bits - 1);
    let upper_bound = upper_bound.min(1u64 << num_bits);
    if upper_bound < 2 + modulo {
        return None;
    }

    let mut candidate = ((upper_bound - 2) / modulo) * modulo + 1;
    while candidate >= lower_bound {
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate = candidate.checked_sub(modulo)?;
    }
    None
}
