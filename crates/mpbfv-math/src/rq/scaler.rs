#![warn(missing_docs, unused_imports)]

//! Polynomial scaler.

use super::{Context, Poly, Representation};
use crate::{rns::ScalingFactor, zq::Modulus, Error, Result};
use ndarray::{ArrayView1, Axis};
use num_bigint::BigUint;
use std::sync::Arc;

/// Context extender.
///
/// Scales polynomials of a context by a factor and rounds them into another
/// context. With a factor of one this is a base extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scaler {
    from: Arc<Context>,
    to: Arc<Context>,
    factor: ScalingFactor,
}

impl Scaler {
    /// Create a scaler from a context `from` to a context `to`.
    pub fn new(from: &Arc<Context>, to: &Arc<Context>, factor: ScalingFactor) -> Result<Self> {
        if from.degree != to.degree {
            return Err(Error::Default("Incompatible degrees".to_string()));
        }
        Ok(Self {
            from: from.clone(),
            to: to.clone(),
            factor,
        })
    }
}

impl Poly {
    /// Scale a polynomial using a scaler.
    ///
    /// Each coefficient is first centered in (-q/2, q/2] before being scaled
    /// and rounded. The polynomial must be in power basis representation.
    pub fn scale(&self, scaler: &Scaler) -> Result<Poly> {
        if self.ctx != scaler.from {
            return Err(Error::InvalidContext);
        }
        if self.representation != Representation::PowerBasis {
            return Err(Error::IncorrectRepresentation(
                self.representation,
                Representation::PowerBasis,
            ));
        }

        let mut out = Poly::zero(&scaler.to, Representation::PowerBasis);
        for (j, column) in self.coefficients.axis_iter(Axis(1)).enumerate() {
            let (y, negative) = self.scale_coefficient(column, &scaler.factor);
            for (i, qi) in scaler.to.q.iter().enumerate() {
                let r = reduce(&y, qi);
                out.coefficients[[i, j]] = if negative { qi.neg(r) } else { r };
            }
        }
        Ok(out)
    }

    /// Scale every coefficient by a factor, round it, and reduce it modulo
    /// `modulus`.
    ///
    /// This is the t/q rounding of decryption when the factor is t/q and the
    /// modulus is t. The polynomial must be in power basis representation.
    pub fn scale_and_round(&self, factor: &ScalingFactor, modulus: &Modulus) -> Result<Vec<u64>> {
        if self.representation != Representation::PowerBasis {
            return Err(Error::IncorrectRepresentation(
                self.representation,
                Representation::PowerBasis,
            ));
        }

        Ok(self
            .coefficients
            .axis_iter(Axis(1))
            .map(|column| {
                let (y, negative) = self.scale_coefficient(column, factor);
                let r = reduce(&y, modulus);
                if negative {
                    modulus.neg(r)
                } else {
                    r
                }
            })
            .collect())
    }

    /// Returns the absolute value of the scaled coefficient, and whether it is
    /// negative.
    fn scale_coefficient(&self, column: ArrayView1<u64>, factor: &ScalingFactor) -> (BigUint, bool) {
        let q = self.ctx.modulus();
        let x = self.ctx.rns.lift(column);
        if (&x << 1) > *q {
            (factor.scale_and_round(&(q - &x)), true)
        } else {
            (factor.scale_and_round(&x), false)
        }
    }
}

fn reduce(a: &BigUint, p: &Modulus) -> u64 {
    (a % p.modulus()).iter_u64_digits().next().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::Scaler;
    use crate::{
        rns::ScalingFactor,
        rq::{traits::TryConvertFrom, Context, Poly, Representation},
        zq::Modulus,
    };
    use num_bigint::BigUint;
    use rand::thread_rng;
    use std::{error::Error, sync::Arc};

    const Q: &[u64; 3] = &[
        4611686018326724609,
        4611686018309947393,
        4611686018282684417,
    ];

    #[test]
    fn base_extension_preserves_small_values() -> Result<(), Box<dyn Error>> {
        let from = Arc::new(Context::new(&Q[..1], 16)?);
        let to = Arc::new(Context::new(Q, 16)?);
        let scaler = Scaler::new(&from, &to, ScalingFactor::one())?;

        let values = (-8i64..8).collect::<Vec<_>>();
        let p = Poly::try_convert_from(values.as_slice(), &from, Representation::PowerBasis)?;
        let expected = Poly::try_convert_from(values.as_slice(), &to, Representation::PowerBasis)?;
        assert_eq!(p.scale(&scaler)?, expected);

        let p_ntt = p.to_representation(Representation::Ntt);
        assert!(p_ntt.scale(&scaler).is_err());
        Ok(())
    }

    #[test]
    fn scale_and_round_to_plaintext() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let ctx = Arc::new(Context::new(Q, 16)?);
        let t = Modulus::new(65537)?;
        let delta = ctx.modulus() / 65537u64;

        let m = t.random_vec(16, &mut rng);
        let noise = (-8i64..8).collect::<Vec<_>>();
        let mut p = Poly::try_convert_from(m.as_slice(), &ctx, Representation::PowerBasis)?;
        p *= &delta;
        p += &Poly::try_convert_from(noise.as_slice(), &ctx, Representation::PowerBasis)?;

        let factor = ScalingFactor::new(&BigUint::from(65537u64), ctx.modulus());
        assert_eq!(p.scale_and_round(&factor, &t)?, m);
        Ok(())
    }
}
