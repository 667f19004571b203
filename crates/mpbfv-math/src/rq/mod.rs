#![warn(missing_docs, unused_imports)]

//! Polynomials in R_q\[x\] = (ZZ_q1 x ... x ZZ_qn)\[x\] where the qi's are
//! prime moduli in zq.

mod context;
mod convert;
mod ops;
mod scaler;
mod serialize;

pub mod traits;

pub use context::Context;
pub use scaler::Scaler;

use crate::{Error, Result};
use itertools::izip;
use mpbfv_util::{sample_vec_cbd, sample_vec_normal};
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use traits::TryConvertFrom;
use zeroize::Zeroize;

/// Possible representations of the underlying polynomial.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// This is the list of coefficients ci, such that the polynomial is c0 + c1
    /// * x + ... + c_(degree - 1) * x^(degree - 1)
    #[default]
    PowerBasis,
    /// This is the NTT representation of the PowerBasis representation.
    Ntt,
}

/// An exponent for a substitution x -> x^k.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SubstitutionExponent {
    /// The value of the exponent.
    pub exponent: usize,

    ctx: Arc<Context>,
}

impl SubstitutionExponent {
    /// Creates a substitution element from an exponent.
    ///
    /// Returns an error if the exponent is even modulo 2 * degree.
    pub fn new(ctx: &Arc<Context>, exponent: usize) -> Result<Self> {
        let exponent = exponent % (2 * ctx.degree);
        if exponent & 1 == 0 {
            return Err(Error::Default(
                "The exponent should be odd modulo 2 * degree".to_string(),
            ));
        }
        Ok(Self {
            exponent,
            ctx: ctx.clone(),
        })
    }
}

/// Struct that holds a polynomial for a specific context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poly {
    ctx: Arc<Context>,
    representation: Representation,
    coefficients: Array2<u64>,
}

impl Zeroize for Poly {
    fn zeroize(&mut self) {
        self.coefficients.iter_mut().for_each(|c| c.zeroize());
    }
}

impl AsRef<Poly> for Poly {
    fn as_ref(&self) -> &Poly {
        self
    }
}

impl AsMut<Poly> for Poly {
    fn as_mut(&mut self) -> &mut Poly {
        self
    }
}

impl Poly {
    /// Creates a polynomial holding the constant 0.
    pub fn zero(ctx: &Arc<Context>, representation: Representation) -> Self {
        Self {
            ctx: ctx.clone(),
            representation,
            coefficients: Array2::zeros((ctx.q.len(), ctx.degree)),
        }
    }

    /// Current representation of the polynomial.
    pub const fn representation(&self) -> &Representation {
        &self.representation
    }

    /// Returns the context of the underlying polynomial.
    pub fn ctx(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Returns a view of the coefficients, one row per modulus.
    pub fn coefficients(&self) -> ArrayView2<u64> {
        self.coefficients.view()
    }

    /// Change the representation of the underlying polynomial.
    ///
    /// This is the only way to move between the power basis and the NTT
    /// representation; every arithmetic operation requires its operands to
    /// already agree.
    pub fn change_representation(&mut self, to: Representation) {
        match (self.representation, to) {
            (Representation::PowerBasis, Representation::Ntt) => {
                for (mut row, op) in izip!(self.coefficients.outer_iter_mut(), self.ctx.ops.iter())
                {
                    let mut values = row.to_vec();
                    op.forward(&mut values);
                    row.assign(&ArrayView1::from(&values));
                }
            }
            (Representation::Ntt, Representation::PowerBasis) => {
                for (mut row, op) in izip!(self.coefficients.outer_iter_mut(), self.ctx.ops.iter())
                {
                    let mut values = row.to_vec();
                    op.backward(&mut values);
                    row.assign(&ArrayView1::from(&values));
                }
            }
            _ => {}
        }
        self.representation = to;
    }

    /// Returns a copy of the polynomial in the requested representation.
    pub fn to_representation(&self, to: Representation) -> Self {
        let mut p = self.clone();
        p.change_representation(to);
        p
    }

    /// Generate a random polynomial.
    pub fn random<R: RngCore + CryptoRng>(
        ctx: &Arc<Context>,
        representation: Representation,
        rng: &mut R,
    ) -> Self {
        let mut p = Poly::zero(ctx, representation);
        for (mut row, qi) in izip!(p.coefficients.outer_iter_mut(), ctx.q.iter()) {
            row.iter_mut().for_each(|c| *c = rng.gen_range(0..qi.modulus()));
        }
        p
    }

    /// Generate a random polynomial deterministically from a seed.
    pub fn random_from_seed(
        ctx: &Arc<Context>,
        representation: Representation,
        seed: <ChaCha8Rng as SeedableRng>::Seed,
    ) -> Self {
        let mut rng = ChaCha8Rng::from_seed(seed);
        Self::random(ctx, representation, &mut rng)
    }

    /// Generate a small polynomial from a centered binomial distribution of
    /// the given variance.
    ///
    /// Returns an error if the variance does not belong to [1, ..., 16].
    pub fn small<R: RngCore + CryptoRng>(
        ctx: &Arc<Context>,
        representation: Representation,
        variance: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let coeffs = sample_vec_cbd(ctx.degree, variance, rng)
            .map_err(|e| Error::Default(e.to_string()))?;
        let mut p = Poly::try_convert_from(coeffs.as_slice(), ctx, Representation::PowerBasis)?;
        p.change_representation(representation);
        Ok(p)
    }

    /// Generate a polynomial with rounded Gaussian coefficients of the given
    /// variance.
    pub fn gaussian<R: RngCore + CryptoRng>(
        ctx: &Arc<Context>,
        representation: Representation,
        variance: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let coeffs = sample_vec_normal(ctx.degree, variance, rng)
            .map_err(|e| Error::Default(e.to_string()))?;
        let mut p = Poly::try_convert_from(coeffs.as_slice(), ctx, Representation::PowerBasis)?;
        p.change_representation(representation);
        Ok(p)
    }

    /// Substitute x by x^i in a polynomial, i.e. apply the automorphism
    /// defined by the exponent.
    ///
    /// The polynomial must be in power basis representation.
    pub fn substitute(&self, i: &SubstitutionExponent) -> Result<Poly> {
        if self.ctx != i.ctx {
            return Err(Error::InvalidContext);
        }
        if self.representation != Representation::PowerBasis {
            return Err(Error::IncorrectRepresentation(
                self.representation,
                Representation::PowerBasis,
            ));
        }

        let degree = self.ctx.degree;
        let mut q = Poly::zero(&self.ctx, Representation::PowerBasis);
        for (mut out, row, qi) in izip!(
            q.coefficients.outer_iter_mut(),
            self.coefficients.outer_iter(),
            self.ctx.q.iter()
        ) {
            for (j, c) in row.iter().enumerate() {
                let index = (j * i.exponent) % (2 * degree);
                if index < degree {
                    out[index] = *c;
                } else {
                    out[index - degree] = qi.neg(*c);
                }
            }
        }
        Ok(q)
    }
}

#[cfg(test)]
mod tests {
    use super::{Context, Poly, Representation, SubstitutionExponent};
    use num_bigint::BigUint;
    use rand::thread_rng;
    use std::{error::Error, sync::Arc};

    const MODULI: &[u64; 3] = &[1153, 4611686018326724609, 4611686018309947393];

    #[test]
    fn zero() -> Result<(), Box<dyn Error>> {
        let ctx = Arc::new(Context::new(MODULI, 16)?);
        let p = Poly::zero(&ctx, Representation::PowerBasis);
        assert!(p.coefficients().iter().all(|c| *c == 0));
        assert_eq!(p.coefficients().dim(), (3, 16));
        assert_eq!(Vec::<BigUint>::from(&p), vec![BigUint::default(); 16]);
        Ok(())
    }

    #[test]
    fn zeroizing_as_ref() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let ctx = Arc::new(Context::new(MODULI, 16)?);
        let p = Poly::random(&ctx, Representation::Ntt, &mut rng);
        let mut z = zeroize::Zeroizing::new(p.clone());
        assert_eq!(z.as_ref(), &p);
        z.as_mut().change_representation(Representation::PowerBasis);
        assert_eq!(z.representation(), &Representation::PowerBasis);
        Ok(())
    }

    #[test]
    fn change_representation_round_trip() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let ctx = Arc::new(Context::new(MODULI, 16)?);
        for _ in 0..50 {
            let p = Poly::random(&ctx, Representation::PowerBasis, &mut rng);
            let mut q = p.clone();
            q.change_representation(Representation::Ntt);
            assert_eq!(q.representation(), &Representation::Ntt);
            q.change_representation(Representation::PowerBasis);
            assert_eq!(p, q);
        }
        Ok(())
    }

    #[test]
    fn random_from_seed_is_deterministic() -> Result<(), Box<dyn Error>> {
        let ctx = Arc::new(Context::new(MODULI, 16)?);
        let p = Poly::random_from_seed(&ctx, Representation::Ntt, [1u8; 32]);
        let q = Poly::random_from_seed(&ctx, Representation::Ntt, [1u8; 32]);
        let r = Poly::random_from_seed(&ctx, Representation::Ntt, [2u8; 32]);
        assert_eq!(p, q);
        assert_ne!(p, r);
        Ok(())
    }

    #[test]
    fn small() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let ctx = Arc::new(Context::new(MODULI, 16)?);
        assert!(Poly::small(&ctx, Representation::PowerBasis, 0, &mut rng).is_err());
        assert!(Poly::small(&ctx, Representation::PowerBasis, 17, &mut rng).is_err());

        let p = Poly::small(&ctx, Representation::PowerBasis, 4, &mut rng)?;
        let q = ctx.modulus();
        for c in Vec::<BigUint>::from(&p) {
            assert!(c <= BigUint::from(8u64) || c >= q - 8u64);
        }
        Ok(())
    }

    #[test]
    fn substitute() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let ctx = Arc::new(Context::new(MODULI, 16)?);
        assert!(SubstitutionExponent::new(&ctx, 2).is_err());
        assert!(SubstitutionExponent::new(&ctx, 34).is_err());

        let p = Poly::random(&ctx, Representation::PowerBasis, &mut rng);

        // x -> x^1 is the identity, x -> x^(2n + 1) as well.
        assert_eq!(p.substitute(&SubstitutionExponent::new(&ctx, 1)?)?, p);
        assert_eq!(p.substitute(&SubstitutionExponent::new(&ctx, 33)?)?, p);

        // Substitutions compose: (x^3)^11 = x^33 = x.
        let q = p.substitute(&SubstitutionExponent::new(&ctx, 3)?)?;
        assert_eq!(q.substitute(&SubstitutionExponent::new(&ctx, 11)?)?, p);

        // The Ntt representation is rejected.
        let p_ntt = p.to_representation(Representation::Ntt);
        assert!(p_ntt
            .substitute(&SubstitutionExponent::new(&ctx, 3)?)
            .is_err());
        Ok(())
    }
}
