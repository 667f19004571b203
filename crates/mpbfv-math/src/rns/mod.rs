#![warn(missing_docs, unused_imports)]

//! Residue-Number System operations.

use crate::{zq::Modulus, Error, Result};
use itertools::izip;
use ndarray::ArrayView1;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt::Debug;

/// Context for a Residue Number System.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct RnsContext {
    moduli_u64: Box<[u64]>,
    garner: Box<[BigUint]>,
    product: BigUint,
}

impl Debug for RnsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RnsContext")
            .field("moduli_u64", &self.moduli_u64)
            .field("product", &self.product)
            .finish()
    }
}

impl RnsContext {
    /// Create a RNS context from a list of moduli.
    ///
    /// Returns an error if the list is empty, or if the moduli are not
    /// pairwise coprime.
    pub fn new(moduli_u64: &[u64]) -> Result<Self> {
        if moduli_u64.is_empty() {
            return Err(Error::Default("The list of moduli is empty".to_string()));
        }

        let moduli = moduli_u64
            .iter()
            .map(|qi| Modulus::new(*qi))
            .collect::<Result<Vec<_>>>()?;

        let product = moduli_u64
            .iter()
            .fold(BigUint::one(), |acc, qi| acc * *qi);

        let mut garner = Vec::with_capacity(moduli.len());
        for qi in &moduli {
            let q_star_i = &product / qi.modulus();
            let q_star_i_mod_qi = (&q_star_i % qi.modulus())
                .iter_u64_digits()
                .next()
                .unwrap_or(0);
            let q_tilde_i = qi.inv(q_star_i_mod_qi).ok_or_else(|| {
                Error::Default("The moduli are not pairwise coprime".to_string())
            })?;
            garner.push(&q_star_i * q_tilde_i);
        }

        Ok(Self {
            moduli_u64: moduli_u64.to_owned().into_boxed_slice(),
            garner: garner.into_boxed_slice(),
            product,
        })
    }

    /// Returns the product of the moduli used when creating the RNS context.
    pub const fn modulus(&self) -> &BigUint {
        &self.product
    }

    /// Returns the moduli of the RNS context.
    pub fn moduli(&self) -> &[u64] {
        &self.moduli_u64
    }

    /// Project a BigUint into its rests.
    pub fn project(&self, a: &BigUint) -> Vec<u64> {
        self.moduli_u64
            .iter()
            .map(|qi| (a % *qi).iter_u64_digits().next().unwrap_or(0))
            .collect()
    }

    /// Lift rests into a BigUint in [0, product).
    ///
    /// Aborts if the number of rests is different than the number of moduli in
    /// debug mode.
    pub fn lift(&self, rests: ArrayView1<u64>) -> BigUint {
        debug_assert_eq!(rests.len(), self.moduli_u64.len());

        let mut result = BigUint::zero();
        for (r, garner) in izip!(rests.iter(), self.garner.iter()) {
            result += garner * *r;
        }
        result % &self.product
    }

    /// Getter for the i-th garner coefficient.
    pub fn get_garner(&self, i: usize) -> Option<&BigUint> {
        self.garner.get(i)
    }
}

/// Scaling factor when performing a RNS scaling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingFactor {
    pub(crate) numerator: BigUint,
    pub(crate) denominator: BigUint,
    pub(crate) is_one: bool,
}

impl ScalingFactor {
    /// Create a new scaling factor. Aborts if the denominator is 0.
    pub fn new(numerator: &BigUint, denominator: &BigUint) -> Self {
        assert_ne!(denominator, &BigUint::zero());
        Self {
            numerator: numerator.clone(),
            denominator: denominator.clone(),
            is_one: numerator == denominator,
        }
    }

    /// Returns the identity element of `Self`.
    pub fn one() -> Self {
        Self {
            numerator: BigUint::one(),
            denominator: BigUint::one(),
            is_one: true,
        }
    }

    /// Round `x * numerator / denominator` to the nearest integer, rounding
    /// halves away from zero.
    pub(crate) fn scale_and_round(&self, x: &BigUint) -> BigUint {
        if self.is_one {
            x.clone()
        } else {
            let numerator: BigUint = (x * &self.numerator) << 1;
            (numerator + &self.denominator) / (&self.denominator << 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RnsContext, ScalingFactor};
    use ndarray::ArrayView1;
    use num_bigint::BigUint;
    use rand::{thread_rng, RngCore};

    #[test]
    fn constructor() {
        assert!(RnsContext::new(&[2]).is_ok());
        assert!(RnsContext::new(&[2, 3]).is_ok());
        assert!(RnsContext::new(&[4, 15, 1153]).is_ok());

        assert!(RnsContext::new(&[]).is_err());
        assert!(RnsContext::new(&[2, 4]).is_err());
        assert!(RnsContext::new(&[2, 3, 5, 30]).is_err());
    }

    #[test]
    fn modulus() {
        let rns = RnsContext::new(&[2, 3, 5]).unwrap();
        assert_eq!(rns.modulus(), &BigUint::from(30u64));
        assert_eq!(rns.moduli(), &[2, 3, 5]);
    }

    #[test]
    fn project_lift() {
        let mut rng = thread_rng();
        let moduli = [4611686018326724609u64, 4611686018309947393, 4611686018282684417];
        let rns = RnsContext::new(&moduli).unwrap();
        for _ in 0..100 {
            let mut bytes = [0u8; 23];
            rng.fill_bytes(&mut bytes);
            let a = BigUint::from_bytes_le(&bytes);
            let rests = rns.project(&a);
            assert_eq!(rns.lift(ArrayView1::from(&rests)), a);
        }
    }

    #[test]
    fn scaling_factor_rounds() {
        let f = ScalingFactor::new(&BigUint::from(1u64), &BigUint::from(4u64));
        assert_eq!(f.scale_and_round(&BigUint::from(5u64)), BigUint::from(1u64));
        assert_eq!(f.scale_and_round(&BigUint::from(6u64)), BigUint::from(2u64));
        assert_eq!(f.scale_and_round(&BigUint::from(7u64)), BigUint::from(2u64));
        assert!(ScalingFactor::one().is_one);
    }
}
