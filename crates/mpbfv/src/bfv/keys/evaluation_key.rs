//! Evaluation keys for the BFV encryption scheme.
//!
//! An evaluation key gathers the Galois keys needed to rotate the columns of
//! SIMD-encoded ciphertexts.

use crate::bfv::{traits::TryConvertFrom, BfvParameters, Ciphertext, GaloisKey, SecretKey};
use crate::proto::bfv::{EvaluationKey as EvaluationKeyProto, GaloisKey as GaloisKeyProto};
use crate::{Error, Result};
use mpbfv_traits::{DeserializeParametrized, FheParametrized, Serialize};
use prost::Message;
use rand::{CryptoRng, RngCore};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Evaluation key for the BFV encryption scheme, holding one Galois key per
/// supported rotation.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EvaluationKey {
    pub(crate) par: Arc<BfvParameters>,

    /// Map from Galois element to Galois key.
    pub(crate) gk: BTreeMap<usize, GaloisKey>,
}

impl EvaluationKey {
    /// Generate an [`EvaluationKey`] supporting the column rotations by each
    /// of `rotations`.
    pub fn new<R: RngCore + CryptoRng>(
        sk: &SecretKey,
        rotations: &[i32],
        rng: &mut R,
    ) -> Result<Self> {
        let mut gk = BTreeMap::new();
        for i in rotations {
            let element = Self::galois_element(&sk.par, *i)?;
            if let std::collections::btree_map::Entry::Vacant(entry) = gk.entry(element) {
                entry.insert(GaloisKey::new(sk, element, rng)?);
            }
        }
        Ok(Self {
            par: sk.par.clone(),
            gk,
        })
    }

    /// Create an evaluation key from Galois keys.
    pub(crate) fn from_galois_keys(
        gk: BTreeMap<usize, GaloisKey>,
        par: &Arc<BfvParameters>,
    ) -> Self {
        Self {
            par: par.clone(),
            gk,
        }
    }

    /// The Galois element 3^i mod 2n implementing a rotation of the columns
    /// by i. Negative rotations wrap around the row.
    pub(crate) fn galois_element(par: &Arc<BfvParameters>, i: i32) -> Result<usize> {
        if !par.supports_simd() {
            return Err(Error::EncodingNotSupported("Simd".to_string()));
        }
        let row_size = (par.degree() >> 1) as i64;
        let m = (par.degree() << 1) as u64;
        let k = (i as i64).rem_euclid(row_size);
        let element = (0..k).fold(1u64, |acc, _| (acc * 3) % m);
        Ok(element as usize)
    }

    /// Reports whether the evaluation key supports rotating the columns by i.
    pub fn supports_column_rotation_by(&self, i: i32) -> bool {
        Self::galois_element(&self.par, i)
            .map(|element| element == 1 || self.gk.contains_key(&element))
            .unwrap_or(false)
    }

    /// Homomorphically rotate the columns of the SIMD-encoded plaintext by i:
    /// slot j of each row receives slot j + i of the same row.
    pub fn rotates_columns_by(&self, ct: &Ciphertext, i: i32) -> Result<Ciphertext> {
        let element = Self::galois_element(&self.par, i)?;
        if element == 1 {
            return Ok(ct.clone());
        }
        let gk = self.gk.get(&element).ok_or(Error::MissingRotationKey(i))?;
        gk.relinearize(ct)
    }

    /// Returns the parameters of the key.
    pub fn parameters(&self) -> &Arc<BfvParameters> {
        &self.par
    }
}

impl From<&EvaluationKey> for EvaluationKeyProto {
    fn from(ek: &EvaluationKey) -> Self {
        EvaluationKeyProto {
            gk: ek.gk.values().map(GaloisKeyProto::from).collect(),
        }
    }
}

impl TryConvertFrom<&EvaluationKeyProto> for EvaluationKey {
    fn try_convert_from(value: &EvaluationKeyProto, par: &Arc<BfvParameters>) -> Result<Self> {
        let gk = value
            .gk
            .iter()
            .map(|gkp| {
                let gk = GaloisKey::try_convert_from(gkp, par)?;
                Ok((gk.element.exponent, gk))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self::from_galois_keys(gk, par))
    }
}

impl FheParametrized for EvaluationKey {
    type Parameters = BfvParameters;
}

impl Serialize for EvaluationKey {
    fn to_bytes(&self) -> Vec<u8> {
        EvaluationKeyProto::from(self).encode_to_vec()
    }
}

impl DeserializeParametrized for EvaluationKey {
    type Error = Error;

    fn from_bytes(bytes: &[u8], par: &Arc<Self::Parameters>) -> Result<Self> {
        let ek: EvaluationKeyProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        EvaluationKey::try_convert_from(&ek, par)
    }
}
