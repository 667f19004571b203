//! Ciphertext type in the BFV encryption scheme.

use crate::bfv::{parameters::BfvParameters, traits::TryConvertFrom};
use crate::proto::bfv::Ciphertext as CiphertextProto;
use crate::{Error, Result};
use mpbfv_math::rq::{Poly, Representation};
use mpbfv_traits::{
    DeserializeParametrized, DeserializeWithContext, FheCiphertext, FheParametrized, Serialize,
};
use prost::Message;
use std::sync::Arc;

/// A ciphertext encrypting a plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    /// The parameters of the underlying BFV encryption scheme.
    pub(crate) par: Arc<BfvParameters>,

    /// The ciphertext elements.
    pub c: Vec<Poly>,

    /// The number of multiplications on the longest path that produced this
    /// ciphertext.
    pub depth: usize,
}

impl Ciphertext {
    /// Create a ciphertext from a vector of polynomials.
    /// A ciphertext must contain at least two polynomials, and all polynomials
    /// must be in Ntt representation and with the same context.
    pub fn new(c: Vec<Poly>, par: &Arc<BfvParameters>) -> Result<Self> {
        if c.len() < 2 {
            return Err(Error::TooFewValues(c.len(), 2));
        }

        // Check that all polynomials have the expected representation and context.
        for ci in c.iter() {
            if ci.representation() != &Representation::Ntt {
                return Err(Error::MathError(
                    mpbfv_math::Error::IncorrectRepresentation(
                        *ci.representation(),
                        Representation::Ntt,
                    ),
                ));
            }
            if ci.ctx() != &par.ctx {
                return Err(Error::MathError(mpbfv_math::Error::InvalidContext));
            }
        }

        Ok(Self {
            par: par.clone(),
            c,
            depth: 0,
        })
    }

    /// Get the i-th polynomial of the ciphertext.
    pub fn get(&self, i: usize) -> Option<&Poly> {
        self.c.get(i)
    }

    /// Returns the multiplicative depth of the ciphertext.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the parameters of the ciphertext.
    pub fn parameters(&self) -> &Arc<BfvParameters> {
        &self.par
    }
}

impl FheCiphertext for Ciphertext {}

impl FheParametrized for Ciphertext {
    type Parameters = BfvParameters;
}

impl Serialize for Ciphertext {
    fn to_bytes(&self) -> Vec<u8> {
        CiphertextProto::from(self).encode_to_vec()
    }
}

impl DeserializeParametrized for Ciphertext {
    fn from_bytes(bytes: &[u8], par: &Arc<BfvParameters>) -> Result<Self> {
        if let Ok(ctp) = Message::decode(bytes) {
            Ciphertext::try_convert_from(&ctp, par)
        } else {
            Err(Error::SerializationError)
        }
    }

    type Error = Error;
}

/// Conversions from and to protobuf.
impl From<&Ciphertext> for CiphertextProto {
    fn from(ct: &Ciphertext) -> Self {
        CiphertextProto {
            c: ct.c.iter().map(|ci| ci.to_bytes()).collect(),
            depth: ct.depth as u32,
        }
    }
}

impl TryConvertFrom<&CiphertextProto> for Ciphertext {
    fn try_convert_from(value: &CiphertextProto, par: &Arc<BfvParameters>) -> Result<Self> {
        if value.c.len() < 2 {
            return Err(Error::DefaultError("Not enough polynomials".to_string()));
        }

        let c = value
            .c
            .iter()
            .map(|cip| Poly::from_bytes(cip, &par.ctx))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut ct = Ciphertext::new(c, par)?;
        ct.depth = value.depth as usize;
        Ok(ct)
    }
}

#[cfg(test)]
mod tests {
    use crate::bfv::{
        traits::TryConvertFrom, BfvParameters, Ciphertext, Encoding, Multiplicator, Plaintext,
        RelinearizationKey, SecretKey,
    };
    use crate::proto::bfv::Ciphertext as CiphertextProto;
    use crate::Error;
    use mpbfv_math::rq::{Poly, Representation};
    use mpbfv_traits::{DeserializeParametrized, FheEncoder, FheEncrypter, Serialize};
    use rand::thread_rng;
    use std::error::Error as StdError;

    #[test]
    fn proto_conversion() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        for params in [
            BfvParameters::default_arc(2, 16),
            BfvParameters::default_arc(4, 16),
        ] {
            let sk = SecretKey::random(&params, &mut rng)?;
            let v = params.plaintext.random_vec(params.degree(), &mut rng);
            let pt = Plaintext::try_encode(&v, Encoding::poly(), &params)?;
            let ct = sk.try_encrypt(&pt, &mut rng)?;
            let ct_proto = CiphertextProto::from(&ct);
            assert_eq!(ct, Ciphertext::try_convert_from(&ct_proto, &params)?);

            let rk = RelinearizationKey::new(&sk, &mut rng)?;
            let ct = Multiplicator::default(&rk)?.multiply(&ct, &ct)?;
            let ct_proto = CiphertextProto::from(&ct);
            assert_eq!(ct_proto.depth, 1);
            assert_eq!(ct, Ciphertext::try_convert_from(&ct_proto, &params)?)
        }
        Ok(())
    }

    #[test]
    fn serialize() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = BfvParameters::default_arc(2, 16);
        let sk = SecretKey::random(&params, &mut rng)?;
        let v = params.plaintext.random_vec(params.degree(), &mut rng);
        let pt = Plaintext::try_encode(&v, Encoding::simd(), &params)?;
        let ct = sk.try_encrypt(&pt, &mut rng)?;
        let bytes = ct.to_bytes();
        assert_eq!(ct, Ciphertext::from_bytes(&bytes, &params)?);

        assert_eq!(
            Ciphertext::from_bytes(&[0xff, 0xff], &params),
            Err(Error::SerializationError)
        );
        Ok(())
    }

    #[test]
    fn new() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = BfvParameters::default_arc(2, 16);
        let other = BfvParameters::default_arc(3, 16);

        let p = Poly::random(params.ctx(), Representation::Ntt, &mut rng);
        assert_eq!(
            Ciphertext::new(vec![p.clone()], &params),
            Err(Error::TooFewValues(1, 2))
        );

        let q = p.to_representation(Representation::PowerBasis);
        assert!(Ciphertext::new(vec![p.clone(), q], &params).is_err());

        let r = Poly::random(other.ctx(), Representation::Ntt, &mut rng);
        assert!(Ciphertext::new(vec![p.clone(), r], &params).is_err());

        let ct = Ciphertext::new(vec![p.clone(), p.clone()], &params)?;
        assert_eq!(ct.depth(), 0);
        assert_eq!(ct.get(0), Some(&p));
        assert_eq!(ct.get(2), None);
        Ok(())
    }
}
