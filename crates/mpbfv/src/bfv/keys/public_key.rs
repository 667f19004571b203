//! Public keys for the BFV encryption scheme

use crate::bfv::traits::TryConvertFrom;
use crate::bfv::{BfvParameters, Ciphertext, Encoding, Plaintext};
use crate::proto::bfv::{Ciphertext as CiphertextProto, PublicKey as PublicKeyProto};
use crate::{Error, Result};
use mpbfv_math::rq::{Poly, Representation};
use mpbfv_traits::{DeserializeParametrized, FheEncrypter, FheParametrized, Serialize};
use prost::Message;
use rand::{CryptoRng, RngCore};
use std::sync::Arc;
use zeroize::Zeroizing;

use super::SecretKey;

/// Public key for the BFV encryption scheme.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PublicKey {
    /// The BFV parameters
    pub(crate) par: Arc<BfvParameters>,
    /// The public key ciphertext, an encryption of zero
    pub(crate) c: Ciphertext,
}

impl PublicKey {
    /// Generate a new [`PublicKey`] from a [`SecretKey`].
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        let zero = Plaintext::zero(Encoding::poly(), &sk.par)?;
        let c: Ciphertext = sk.try_encrypt(&zero, rng)?;
        Ok(Self {
            par: sk.par.clone(),
            c,
        })
    }

    /// Create a public key from its two polynomials (p0, p1), both in Ntt
    /// representation.
    pub(crate) fn from_polys(p0: Poly, p1: Poly, par: &Arc<BfvParameters>) -> Result<Self> {
        Ok(Self {
            par: par.clone(),
            c: Ciphertext::new(vec![p0, p1], par)?,
        })
    }
}

impl FheParametrized for PublicKey {
    type Parameters = BfvParameters;
}

impl FheEncrypter<Plaintext, Ciphertext> for PublicKey {
    type Error = Error;

    fn try_encrypt<R: RngCore + CryptoRng>(
        &self,
        pt: &Plaintext,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        if self.par != pt.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }

        let ctx = &self.par.ctx;
        let u = Zeroizing::new(Poly::small(
            ctx,
            Representation::Ntt,
            self.par.variance,
            rng,
        )?);
        let e1 = Zeroizing::new(Poly::small(
            ctx,
            Representation::Ntt,
            self.par.variance,
            rng,
        )?);
        let e2 = Zeroizing::new(Poly::small(
            ctx,
            Representation::Ntt,
            self.par.variance,
            rng,
        )?);

        let m = Zeroizing::new(pt.to_poly()?);
        let mut c0 = &*u * &self.c.c[0];
        c0 += &*e1;
        c0 += &*m;
        let mut c1 = &*u * &self.c.c[1];
        c1 += &*e2;

        Ciphertext::new(vec![c0, c1], &self.par)
    }
}

impl From<&PublicKey> for PublicKeyProto {
    fn from(pk: &PublicKey) -> Self {
        PublicKeyProto {
            c: Some(CiphertextProto::from(&pk.c)),
        }
    }
}

impl Serialize for PublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        PublicKeyProto::from(self).encode_to_vec()
    }
}

impl DeserializeParametrized for PublicKey {
    type Error = Error;

    fn from_bytes(bytes: &[u8], par: &Arc<Self::Parameters>) -> Result<Self> {
        let proto: PublicKeyProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        let c = proto.c.as_ref().ok_or(Error::SerializationError)?;
        let c = Ciphertext::try_convert_from(c, par)?;
        if c.c.len() != 2 {
            return Err(Error::SerializationError);
        }
        Ok(Self {
            par: par.clone(),
            c,
        })
    }
}
