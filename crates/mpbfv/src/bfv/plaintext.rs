//! Plaintext type in the BFV encryption scheme.

use crate::bfv::{encoding::EncodingEnum, BfvParameters, Encoding};
use crate::{Error, Result};
use mpbfv_math::rq::{traits::TryConvertFrom, Poly, Representation};
use mpbfv_traits::{FheDecoder, FheEncoder, FheParametrized, FhePlaintext};
use std::sync::Arc;
use zeroize::Zeroize;

/// A plaintext object, that encodes a vector according to a specific encoding.
#[derive(Debug, Clone, Eq, zeroize_derive::Zeroize, zeroize_derive::ZeroizeOnDrop)]
pub struct Plaintext {
    /// The parameters of the underlying BFV encryption scheme.
    #[zeroize(skip)]
    pub(crate) par: Arc<BfvParameters>,
    /// The value after encoding, i.e. the coefficients modulo t.
    pub(crate) value: Box<[u64]>,
    /// The encoding of the plaintext, if known
    #[zeroize(skip)]
    pub(crate) encoding: Option<Encoding>,
}

impl FheParametrized for Plaintext {
    type Parameters = BfvParameters;
}

impl FhePlaintext for Plaintext {
    type Encoding = Encoding;
}

impl Plaintext {
    pub(crate) fn new(value: Vec<u64>, encoding: Option<Encoding>, par: &Arc<BfvParameters>) -> Self {
        Self {
            par: par.clone(),
            value: value.into_boxed_slice(),
            encoding,
        }
    }

    /// Returns Δ·m in Ntt representation.
    pub(crate) fn to_poly(&self) -> Result<Poly> {
        let mut m = Poly::try_convert_from(
            self.value.as_ref(),
            &self.par.ctx,
            Representation::PowerBasis,
        )?;
        m *= &self.par.delta;
        m.change_representation(Representation::Ntt);
        Ok(m)
    }

    /// Generate a zero plaintext.
    pub fn zero(encoding: Encoding, par: &Arc<BfvParameters>) -> Result<Self> {
        Ok(Self::new(vec![0u64; par.degree()], Some(encoding), par))
    }

    /// Returns the coefficients of the plaintext polynomial, modulo t.
    pub fn value(&self) -> &[u64] {
        &self.value
    }

    /// Returns the encoding of the plaintext, if known.
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }
}

// Implement the equality manually; we want to say that two plaintexts are equal
// even if one of them doesn't store its encoding information.
impl PartialEq for Plaintext {
    fn eq(&self, other: &Self) -> bool {
        let same_encoding = match (&self.encoding, &other.encoding) {
            (Some(e1), Some(e2)) => e1 == e2,
            _ => true,
        };
        self.par == other.par && self.value == other.value && same_encoding
    }
}

impl<'a> FheEncoder<&'a [u64]> for Plaintext {
    type Error = Error;
    fn try_encode(
        value: &'a [u64],
        encoding: Encoding,
        par: &Arc<BfvParameters>,
    ) -> Result<Self> {
        if value.len() > par.degree() {
            return Err(Error::TooManyValues(value.len(), par.degree()));
        }
        let v = value
            .iter()
            .map(|vi| par.plaintext.reduce(*vi))
            .collect::<Vec<_>>();

        let mut w = vec![0u64; par.degree()];
        match encoding.encoding {
            EncodingEnum::Poly => w[..v.len()].copy_from_slice(&v),
            EncodingEnum::Simd => {
                let op = par
                    .op
                    .as_ref()
                    .ok_or_else(|| Error::EncodingNotSupported(EncodingEnum::Simd.to_string()))?;
                for (i, vi) in v.iter().enumerate() {
                    w[par.matrix_reps_index_map[i]] = *vi;
                }
                op.backward(&mut w);
            }
        }

        Ok(Self::new(w, Some(encoding), par))
    }
}

impl<'a> FheEncoder<&'a [i64]> for Plaintext {
    type Error = Error;
    fn try_encode(
        value: &'a [i64],
        encoding: Encoding,
        par: &Arc<BfvParameters>,
    ) -> Result<Self> {
        let w = par.plaintext.reduce_vec_i64(value);
        Plaintext::try_encode(w.as_slice(), encoding, par)
    }
}

impl<'a> FheEncoder<&'a Vec<u64>> for Plaintext {
    type Error = Error;
    fn try_encode(
        value: &'a Vec<u64>,
        encoding: Encoding,
        par: &Arc<BfvParameters>,
    ) -> Result<Self> {
        Plaintext::try_encode(value.as_slice(), encoding, par)
    }
}

impl<'a> FheEncoder<&'a Vec<i64>> for Plaintext {
    type Error = Error;
    fn try_encode(
        value: &'a Vec<i64>,
        encoding: Encoding,
        par: &Arc<BfvParameters>,
    ) -> Result<Self> {
        Plaintext::try_encode(value.as_slice(), encoding, par)
    }
}

impl FheDecoder<Plaintext> for Vec<u64> {
    type Error = Error;

    fn try_decode<O>(pt: &Plaintext, encoding: O) -> Result<Vec<u64>>
    where
        O: Into<Option<Encoding>>,
    {
        let enc = match (pt.encoding, encoding.into()) {
            (None, None) => {
                return Err(Error::UnspecifiedInput("No encoding specified".to_string()))
            }
            (Some(pt_enc), Some(arg_enc)) if pt_enc != arg_enc => {
                return Err(Error::EncodingMismatch(arg_enc.into(), pt_enc.into()))
            }
            (Some(enc), _) | (None, Some(enc)) => enc,
        };

        let mut w = pt.value.to_vec();
        match enc.encoding {
            EncodingEnum::Poly => Ok(w),
            EncodingEnum::Simd => {
                let op = pt
                    .par
                    .op
                    .as_ref()
                    .ok_or_else(|| Error::EncodingNotSupported(EncodingEnum::Simd.to_string()))?;
                op.forward(&mut w);
                let w_reordered = pt
                    .par
                    .matrix_reps_index_map
                    .iter()
                    .map(|j| w[*j])
                    .collect();
                w.zeroize();
                Ok(w_reordered)
            }
        }
    }
}

impl FheDecoder<Plaintext> for Vec<i64> {
    type Error = Error;

    fn try_decode<E>(pt: &Plaintext, encoding: E) -> Result<Vec<i64>>
    where
        E: Into<Option<Encoding>>,
    {
        let v = Vec::<u64>::try_decode(pt, encoding)?;
        Ok(pt.par.plaintext.center_vec(&v))
    }
}
