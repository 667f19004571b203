//! Relinearization for the BFV encryption scheme
//!
//! A relinearization key is a key switching key from s² to s. Applied to the
//! third part of a ciphertext after a multiplication, it yields a two-part
//! ciphertext encrypting the same plaintext under s.

use std::sync::Arc;

use crate::bfv::traits::TryConvertFrom;
use crate::bfv::{BfvParameters, Ciphertext, KeySwitchingKey, SecretKey};
use crate::proto::bfv::{
    KeySwitchingKey as KeySwitchingKeyProto, RelinearizationKey as RelinearizationKeyProto,
};
use crate::{Error, Result};
use mpbfv_math::rq::Representation;
use mpbfv_traits::{DeserializeParametrized, FheParametrized, Serialize};
use prost::Message;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// A relinearization key, i.e. a key switching key from s² to s.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RelinearizationKey {
    pub(crate) ksk: KeySwitchingKey,
}

impl RelinearizationKey {
    /// Generate a [`RelinearizationKey`] from a [`SecretKey`].
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        let s = sk.to_poly()?;
        let mut s2 = Zeroizing::new(s.as_ref() * s.as_ref());
        s2.change_representation(Representation::PowerBasis);
        let ksk = KeySwitchingKey::new(sk, &s2, rng)?;
        Ok(Self { ksk })
    }

    /// Relinearize an "extended" ciphertext (c₀, c₁, c₂) into a [`Ciphertext`]
    pub fn relinearizes(&self, ct: &mut Ciphertext) -> Result<()> {
        if ct.c.len() != 3 {
            return Err(Error::DefaultError(
                "Only supports relinearization of ciphertext with 3 parts".to_string(),
            ));
        }
        if ct.par != self.ksk.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }

        let c2 = ct.c[2].to_representation(Representation::PowerBasis);
        let (c0, c1) = self.ksk.key_switch(&c2)?;
        ct.c[0] += &c0;
        ct.c[1] += &c1;
        ct.c.truncate(2);
        Ok(())
    }

    /// Returns the parameters of the key.
    pub fn parameters(&self) -> &Arc<BfvParameters> {
        &self.ksk.par
    }
}

impl From<&RelinearizationKey> for RelinearizationKeyProto {
    fn from(value: &RelinearizationKey) -> Self {
        RelinearizationKeyProto {
            ksk: Some(KeySwitchingKeyProto::from(&value.ksk)),
        }
    }
}

impl TryConvertFrom<&RelinearizationKeyProto> for RelinearizationKey {
    fn try_convert_from(value: &RelinearizationKeyProto, par: &Arc<BfvParameters>) -> Result<Self> {
        let ksk = value
            .ksk
            .as_ref()
            .ok_or_else(|| Error::DefaultError("Invalid serialization".to_string()))?;
        Ok(RelinearizationKey {
            ksk: KeySwitchingKey::try_convert_from(ksk, par)?,
        })
    }
}

impl Serialize for RelinearizationKey {
    fn to_bytes(&self) -> Vec<u8> {
        RelinearizationKeyProto::from(self).encode_to_vec()
    }
}

impl FheParametrized for RelinearizationKey {
    type Parameters = BfvParameters;
}

impl DeserializeParametrized for RelinearizationKey {
    type Error = Error;

    fn from_bytes(bytes: &[u8], par: &Arc<Self::Parameters>) -> Result<Self> {
        let rk: RelinearizationKeyProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        RelinearizationKey::try_convert_from(&rk, par)
    }
}

#[cfg(test)]
mod tests {
    use super::RelinearizationKey;
    use crate::bfv::{BfvParameters, Ciphertext, SecretKey};
    use mpbfv_math::rq::{Poly, Representation};
    use mpbfv_traits::{DeserializeParametrized, FheDecrypter, Serialize};
    use rand::thread_rng;
    use std::error::Error;

    #[test]
    fn relinearization() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let params = BfvParameters::default_arc(4, 16);
        for _ in 0..20 {
            let sk = SecretKey::random(&params, &mut rng)?;
            let rk = RelinearizationKey::new(&sk, &mut rng)?;

            // Encrypt zero in a 3-part ciphertext: c0 = -c1 * s - c2 * s^2 + e.
            let s = sk.to_poly()?;
            let c1 = Poly::random(params.ctx(), Representation::Ntt, &mut rng);
            let c2 = Poly::random(params.ctx(), Representation::Ntt, &mut rng);
            let mut c0 = Poly::small(params.ctx(), Representation::Ntt, 16, &mut rng)?;
            c0 -= &(&c1 * s.as_ref());
            c0 -= &(&(&c2 * s.as_ref()) * s.as_ref());
            let mut ct = Ciphertext::new(vec![c0, c1, c2], &params)?;

            let pt = sk.try_decrypt(&ct)?;
            assert!(pt.value().iter().all(|v| *v == 0));

            rk.relinearizes(&mut ct)?;
            assert_eq!(ct.c.len(), 2);
            let pt = sk.try_decrypt(&ct)?;
            assert!(pt.value().iter().all(|v| *v == 0));

            assert!(rk.relinearizes(&mut ct).is_err());
        }
        Ok(())
    }

    #[test]
    fn serialize() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let params = BfvParameters::default_arc(4, 16);
        let sk = SecretKey::random(&params, &mut rng)?;
        let rk = RelinearizationKey::new(&sk, &mut rng)?;
        let bytes = rk.to_bytes();
        assert_eq!(rk, RelinearizationKey::from_bytes(&bytes, &params)?);
        Ok(())
    }
}
