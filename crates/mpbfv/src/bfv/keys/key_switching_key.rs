//! Key-switching keys for the BFV encryption scheme
//!
//! A key-switching key from `from` to `s` holds, for every modulus q_i of the
//! ciphertext context, an encryption under `s` of `g_i * from`, where the g_i
//! are the Garner coefficients of the RNS basis. Decomposing a polynomial into
//! its residues p_i = [p]_{q_i} gives p = sum_i p_i * g_i mod q, so the key
//! turns `p * from` into a ciphertext under `s` with a small noise increase.

use crate::bfv::{traits::TryConvertFrom, BfvParameters, SecretKey};
use crate::proto::bfv::KeySwitchingKey as KeySwitchingKeyProto;
use crate::{Error, Result};
use itertools::izip;
use mpbfv_math::rq::{traits::TryConvertFrom as TryConvertFromPoly, Poly, Representation};
use mpbfv_traits::{DeserializeWithContext, Serialize};
use rand::{CryptoRng, RngCore};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Key switching key for the BFV encryption scheme.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct KeySwitchingKey {
    /// The parameters of the underlying BFV encryption scheme.
    pub(crate) par: Arc<BfvParameters>,

    /// The first component of the key, one polynomial per modulus.
    pub(crate) c0: Box<[Poly]>,

    /// The second component of the key, uniformly random.
    pub(crate) c1: Box<[Poly]>,
}

impl KeySwitchingKey {
    /// Generate a [`KeySwitchingKey`] to this [`SecretKey`] from a polynomial
    /// `from` in power basis representation.
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, from: &Poly, rng: &mut R) -> Result<Self> {
        let c1 = (0..sk.par.moduli().len())
            .map(|_| Poly::random(&sk.par.ctx, Representation::Ntt, rng))
            .collect::<Vec<_>>();
        let c0 = Self::generate_c0(sk, from, &c1, rng)?;
        Ok(Self {
            par: sk.par.clone(),
            c0: c0.into_boxed_slice(),
            c1: c1.into_boxed_slice(),
        })
    }

    /// Create a key from its components, both in Ntt representation.
    pub(crate) fn from_parts(c0: Vec<Poly>, c1: Vec<Poly>, par: &Arc<BfvParameters>) -> Result<Self> {
        if c0.len() != par.moduli().len() || c1.len() != par.moduli().len() {
            return Err(Error::DefaultError(
                "Incorrect number of key switching components".to_string(),
            ));
        }
        for p in c0.iter().chain(c1.iter()) {
            if p.ctx() != &par.ctx {
                return Err(Error::MathError(mpbfv_math::Error::InvalidContext));
            }
            if p.representation() != &Representation::Ntt {
                return Err(Error::MathError(
                    mpbfv_math::Error::IncorrectRepresentation(
                        *p.representation(),
                        Representation::Ntt,
                    ),
                ));
            }
        }
        Ok(Self {
            par: par.clone(),
            c0: c0.into_boxed_slice(),
            c1: c1.into_boxed_slice(),
        })
    }

    /// Computes c0_i = g_i * from + e_i - c1_i * s for every c1_i.
    pub(crate) fn generate_c0<R: RngCore + CryptoRng>(
        sk: &SecretKey,
        from: &Poly,
        c1: &[Poly],
        rng: &mut R,
    ) -> Result<Vec<Poly>> {
        if from.ctx() != &sk.par.ctx {
            return Err(Error::MathError(mpbfv_math::Error::InvalidContext));
        }
        if from.representation() != &Representation::PowerBasis {
            return Err(Error::MathError(
                mpbfv_math::Error::IncorrectRepresentation(
                    *from.representation(),
                    Representation::PowerBasis,
                ),
            ));
        }

        let s = sk.to_poly()?;
        let rns = sk.par.ctx.rns();
        c1.iter()
            .enumerate()
            .map(|(i, c1i)| {
                let garner = rns.get_garner(i).ok_or_else(|| {
                    Error::DefaultError("Too many key switching components".to_string())
                })?;
                let mut a = Zeroizing::new(from * garner);
                a.change_representation(Representation::Ntt);
                let mut b =
                    Poly::small(&sk.par.ctx, Representation::Ntt, sk.par.variance, rng)?;
                b -= &(c1i * s.as_ref());
                b += &*a;
                Ok(b)
            })
            .collect()
    }

    /// Key switch a polynomial in power basis representation, returning the
    /// pair (d0, d1) in Ntt representation such that d0 + d1 * s is close to
    /// p * from.
    pub fn key_switch(&self, p: &Poly) -> Result<(Poly, Poly)> {
        if p.ctx() != &self.par.ctx {
            return Err(Error::MathError(mpbfv_math::Error::InvalidContext));
        }
        if p.representation() != &Representation::PowerBasis {
            return Err(Error::MathError(
                mpbfv_math::Error::IncorrectRepresentation(
                    *p.representation(),
                    Representation::PowerBasis,
                ),
            ));
        }

        let mut d0 = Poly::zero(&self.par.ctx, Representation::Ntt);
        let mut d1 = Poly::zero(&self.par.ctx, Representation::Ntt);
        for (row, c0i, c1i) in izip!(p.coefficients().outer_iter(), self.c0.iter(), self.c1.iter()) {
            let mut pi = Poly::try_convert_from(
                row.to_vec().as_slice(),
                &self.par.ctx,
                Representation::PowerBasis,
            )?;
            pi.change_representation(Representation::Ntt);
            d0 += &(&pi * c0i);
            d1 += &(&pi * c1i);
        }
        Ok((d0, d1))
    }
}

impl From<&KeySwitchingKey> for KeySwitchingKeyProto {
    fn from(value: &KeySwitchingKey) -> Self {
        KeySwitchingKeyProto {
            c0: value.c0.iter().map(|p| p.to_bytes()).collect(),
            c1: value.c1.iter().map(|p| p.to_bytes()).collect(),
        }
    }
}

impl TryConvertFrom<&KeySwitchingKeyProto> for KeySwitchingKey {
    fn try_convert_from(value: &KeySwitchingKeyProto, par: &Arc<BfvParameters>) -> Result<Self> {
        let c0 = value
            .c0
            .iter()
            .map(|b| Poly::from_bytes(b, &par.ctx))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let c1 = value
            .c1
            .iter()
            .map(|b| Poly::from_bytes(b, &par.ctx))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        KeySwitchingKey::from_parts(c0, c1, par)
    }
}
