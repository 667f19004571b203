#![warn(missing_docs, unused_imports)]

//! Ring operations for moduli up to 62 bits.

pub mod primes;

use crate::{Error, Result};
use rand::{CryptoRng, Rng, RngCore};

/// Structure encapsulating an integer modulus up to 62 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modulus {
    pub(crate) p: u64,
}

impl Modulus {
    /// Create a modulus from an integer of at most 62 bits.
    pub fn new(p: u64) -> Result<Self> {
        if p < 2 || (p >> 62) != 0 {
            Err(Error::InvalidModulus(p))
        } else {
            Ok(Self { p })
        }
    }

    /// Returns the value of the modulus.
    pub const fn modulus(&self) -> u64 {
        self.p
    }

    /// Modular addition of a and b.
    ///
    /// Aborts if a >= p or b >= p in debug mode.
    pub const fn add(&self, a: u64, b: u64) -> u64 {
        debug_assert!(a < self.p && b < self.p);
        let c = a + b;
        if c >= self.p {
            c - self.p
        } else {
            c
        }
    }

    /// Modular subtraction of a and b.
    ///
    /// Aborts if a >= p or b >= p in debug mode.
    pub const fn sub(&self, a: u64, b: u64) -> u64 {
        debug_assert!(a < self.p && b < self.p);
        if a >= b {
            a - b
        } else {
            a + self.p - b
        }
    }

    /// Modular multiplication of a and b.
    ///
    /// Aborts if a >= p or b >= p in debug mode.
    pub const fn mul(&self, a: u64, b: u64) -> u64 {
        debug_assert!(a < self.p && b < self.p);
        ((a as u128 * b as u128) % (self.p as u128)) as u64
    }

    /// Modular negation.
    ///
    /// Aborts if a >= p in debug mode.
    pub const fn neg(&self, a: u64) -> u64 {
        debug_assert!(a < self.p);
        if a == 0 {
            0
        } else {
            self.p - a
        }
    }

    /// Modular exponentiation.
    ///
    /// Aborts if a >= p in debug mode.
    pub fn pow(&self, a: u64, n: u64) -> u64 {
        debug_assert!(a < self.p);
        let mut result = 1 % self.p;
        let mut base = a;
        let mut exponent = n;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            exponent >>= 1;
        }
        result
    }

    /// Modular inversion, computed with the extended Euclidean algorithm.
    ///
    /// Returns None if a is not invertible modulo p.
    pub fn inv(&self, a: u64) -> Option<u64> {
        let (mut old_r, mut r) = (self.reduce(a) as i128, self.p as i128);
        let (mut old_s, mut s) = (1i128, 0i128);
        while r != 0 {
            let quotient = old_r / r;
            (old_r, r) = (r, old_r - quotient * r);
            (old_s, s) = (s, old_s - quotient * s);
        }
        if old_r != 1 {
            None
        } else {
            Some(old_s.rem_euclid(self.p as i128) as u64)
        }
    }

    /// Modular reduction of a u64.
    pub const fn reduce(&self, a: u64) -> u64 {
        a % self.p
    }

    /// Modular reduction of a u128.
    pub const fn reduce_u128(&self, a: u128) -> u64 {
        (a % (self.p as u128)) as u64
    }

    /// Modular reduction of an i64, returning a value in [0, p).
    pub const fn reduce_i64(&self, a: i64) -> u64 {
        a.rem_euclid(self.p as i64) as u64
    }

    /// Returns the representative of a in (-p/2, p/2].
    ///
    /// Aborts if a >= p in debug mode.
    pub const fn center(&self, a: u64) -> i64 {
        debug_assert!(a < self.p);
        if a > self.p >> 1 {
            a as i64 - self.p as i64
        } else {
            a as i64
        }
    }

    /// Modular addition of vectors in place.
    ///
    /// Aborts if a and b differ in size, and if any of their values is >= p in
    /// debug mode.
    pub fn add_vec(&self, a: &mut [u64], b: &[u64]) {
        debug_assert_eq!(a.len(), b.len());
        a.iter_mut().zip(b).for_each(|(ai, bi)| *ai = self.add(*ai, *bi));
    }

    /// Modular subtraction of vectors in place.
    ///
    /// Aborts if a and b differ in size, and if any of their values is >= p in
    /// debug mode.
    pub fn sub_vec(&self, a: &mut [u64], b: &[u64]) {
        debug_assert_eq!(a.len(), b.len());
        a.iter_mut().zip(b).for_each(|(ai, bi)| *ai = self.sub(*ai, *bi));
    }

    /// Modular multiplication of vectors in place.
    ///
    /// Aborts if a and b differ in size, and if any of their values is >= p in
    /// debug mode.
    pub fn mul_vec(&self, a: &mut [u64], b: &[u64]) {
        debug_assert_eq!(a.len(), b.len());
        a.iter_mut().zip(b).for_each(|(ai, bi)| *ai = self.mul(*ai, *bi));
    }

    /// Modular scalar multiplication of a vector in place.
    pub fn scalar_mul_vec(&self, a: &mut [u64], b: u64) {
        let b = self.reduce(b);
        a.iter_mut().for_each(|ai| *ai = self.mul(*ai, b));
    }

    /// Modular negation of a vector in place.
    pub fn neg_vec(&self, a: &mut [u64]) {
        a.iter_mut().for_each(|ai| *ai = self.neg(*ai));
    }

    /// Modular reduction of a vector in place.
    pub fn reduce_vec(&self, a: &mut [u64]) {
        a.iter_mut().for_each(|ai| *ai = self.reduce(*ai));
    }

    /// Modular reduction of a vector of i64.
    pub fn reduce_vec_i64(&self, a: &[i64]) -> Vec<u64> {
        a.iter().map(|ai| self.reduce_i64(*ai)).collect()
    }

    /// Center a vector of values in [0, p) into (-p/2, p/2].
    pub fn center_vec(&self, a: &[u64]) -> Vec<i64> {
        a.iter().map(|ai| self.center(*ai)).collect()
    }

    /// Sample a vector of values uniformly at random in [0, p).
    pub fn random_vec<R: RngCore + CryptoRng>(&self, size: usize, rng: &mut R) -> Vec<u64> {
        (0..size).map(|_| rng.gen_range(0..self.p)).collect()
    }
}
