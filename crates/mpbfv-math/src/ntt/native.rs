use crate::zq::Modulus;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::iter::successors;

/// Number-Theoretic Transform operator for the negacyclic ring
/// ZZ_p\[x\]/(x^size + 1).
///
/// The forward transform leaves its output in bit-reversed order; the
/// backward transform expects its input in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NttOperator {
    p: Modulus,
    size: usize,
    psi_rev: Box<[u64]>,
    psi_inv_rev: Box<[u64]>,
    size_inv: u64,
}

impl NttOperator {
    /// Create an NTT operator given a modulus for a specific size.
    ///
    /// Returns None if the modulus does not support the NTT for this specific
    /// size.
    pub fn new(p: &Modulus, size: usize) -> Option<Self> {
        if !super::supports_ntt(p.p, size) {
            return None;
        }

        let size_inv = p.inv(size as u64)?;
        let psi = Self::primitive_root(size, p)?;
        let psi_inv = p.inv(psi)?;

        let powers = successors(Some(1u64), |n| Some(p.mul(*n, psi)))
            .take(size)
            .collect_vec();
        let powers_inv = successors(Some(1u64), |n| Some(p.mul(*n, psi_inv)))
            .take(size)
            .collect_vec();

        let (psi_rev, psi_inv_rev): (Vec<u64>, Vec<u64>) = (0..size)
            .map(|i| {
                let j = i.reverse_bits() >> (size.leading_zeros() + 1);
                (powers[j], powers_inv[j])
            })
            .unzip();

        Some(Self {
            p: p.clone(),
            size,
            psi_rev: psi_rev.into_boxed_slice(),
            psi_inv_rev: psi_inv_rev.into_boxed_slice(),
            size_inv,
        })
    }

    /// Returns the size of the transform.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Compute the forward NTT in place.
    /// Aborts if a is not of the size handled by the operator.
    pub fn forward(&self, a: &mut [u64]) {
        debug_assert_eq!(a.len(), self.size);

        let mut t = self.size;
        let mut m = 1;
        while m < self.size {
            t >>= 1;
            for i in 0..m {
                let s = self.psi_rev[m + i];
                let j1 = 2 * i * t;
                for j in j1..(j1 + t) {
                    let u = a[j];
                    let v = self.p.mul(a[j + t], s);
                    a[j] = self.p.add(u, v);
                    a[j + t] = self.p.sub(u, v);
                }
            }
            m <<= 1;
        }
    }

    /// Compute the backward NTT in place.
    /// Aborts if a is not of the size handled by the operator.
    pub fn backward(&self, a: &mut [u64]) {
        debug_assert_eq!(a.len(), self.size);

        let mut t = 1;
        let mut m = self.size;
        while m > 1 {
            let h = m >> 1;
            for i in 0..h {
                let s = self.psi_inv_rev[h + i];
                let j1 = 2 * i * t;
                for j in j1..(j1 + t) {
                    let u = a[j];
                    let v = a[j + t];
                    a[j] = self.p.add(u, v);
                    a[j + t] = self.p.mul(self.p.sub(u, v), s);
                }
            }
            t <<= 1;
            m = h;
        }

        a.iter_mut()
            .for_each(|ai| *ai = self.p.mul(*ai, self.size_inv));
    }

    /// Returns a 2n-th primitive root modulo p.
    fn primitive_root(n: usize, p: &Modulus) -> Option<u64> {
        debug_assert!(super::supports_ntt(p.p, n));

        let lambda = (p.p - 1) / (2 * n as u64);

        let mut rng: ChaCha8Rng = SeedableRng::seed_from_u64(0);
        for _ in 0..100 {
            let mut root = rng.gen_range(0..p.p);
            root = p.pow(root, lambda);
            if Self::is_primitive_root(root, 2 * n, p) {
                return Some(root);
            }
        }

        None
    }

    /// Returns whether a is a n-th primitive root of unity, for n a power of
    /// two.
    fn is_primitive_root(a: u64, n: usize, p: &Modulus) -> bool {
        debug_assert!(a < p.p);

        (p.pow(a, n as u64) == 1) && (p.pow(a, (n / 2) as u64) != 1)
    }
}
