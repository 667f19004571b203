//! Conversions between a ciphertext under the joint key and an additive
//! sharing of its plaintext.
//!
//! [`MessageShare::participant`] and [`MessageShare::lead`] turn a ciphertext
//! into one [`MessageShare`] per party, such that the shares sum to the
//! plaintext modulo t. [`EncryptionShare`]s turn the message shares back into
//! a fresh ciphertext under the joint key.

use std::sync::Arc;

use crate::bfv::{BfvParameters, Ciphertext, Plaintext, SecretKey};
use crate::proto::mbfv::{
    EncryptionShare as EncryptionShareProto, MaskedDecryptionShare as MaskedDecryptionShareProto,
};
use crate::{Error, Result};
use mpbfv_math::rq::{Poly, Representation};
use mpbfv_traits::{DeserializeWithContext, Serialize};
use prost::Message;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::{decryption::partial_phase, Aggregate, CommonRandomPoly};

/// An additive share of a plaintext, i.e. a vector of coefficients modulo t.
///
/// Message shares are secret and are never serialized.
#[derive(Debug, Clone, PartialEq, Eq, zeroize_derive::Zeroize, zeroize_derive::ZeroizeOnDrop)]
pub struct MessageShare {
    #[zeroize(skip)]
    pub(crate) par: Arc<BfvParameters>,
    pub(crate) values: Box<[u64]>,
}

/// A participant's decryption share, masked by its message share:
/// `s_i * c1 + e_i - Δ * M_i`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MaskedDecryptionShare {
    pub(crate) par: Arc<BfvParameters>,
    pub(crate) ct: Arc<Ciphertext>,
    pub(crate) h_share: Poly,
}

impl MessageShare {
    /// Participant side of the conversion of a ciphertext to shares.
    ///
    /// Samples a uniform message share `M_i` and returns it together with the
    /// masked decryption share to send to the lead party.
    pub fn participant<R: RngCore + CryptoRng>(
        sk_share: &SecretKey,
        ct: &Arc<Ciphertext>,
        rng: &mut R,
    ) -> Result<(Self, MaskedDecryptionShare)> {
        let par = sk_share.par.clone();
        let mut h_share = partial_phase(sk_share, ct, rng)?;

        let values = par.plaintext.random_vec(par.degree(), rng);
        let share = Self {
            par: par.clone(),
            values: values.into_boxed_slice(),
        };
        let m = Zeroizing::new(share.to_plaintext().to_poly()?);
        h_share -= &*m;

        Ok((
            share,
            MaskedDecryptionShare {
                par,
                ct: ct.clone(),
                h_share,
            },
        ))
    }

    /// Lead side of the conversion of a ciphertext to shares.
    ///
    /// Decrypts the ciphertext masked by the `num_parties - 1` shares of the
    /// participants; the result is the message share of the lead.
    pub fn lead<R: RngCore + CryptoRng, T>(
        sk_share: &SecretKey,
        ct: &Arc<Ciphertext>,
        masked_shares: T,
        num_parties: usize,
        rng: &mut R,
    ) -> Result<Self>
    where
        T: IntoIterator<Item = MaskedDecryptionShare>,
    {
        if num_parties == 0 {
            return Err(Error::TooFewValues(0, 1));
        }
        let par = sk_share.par.clone();

        let mut h = Zeroizing::new(partial_phase(sk_share, ct, rng)?);
        *h += &ct.c[0];
        let mut found = 0;
        for sh in masked_shares {
            if sh.ct != *ct {
                return Err(Error::DefaultError(
                    "Shares decrypt different ciphertexts".to_string(),
                ));
            }
            *h += &sh.h_share;
            found += 1;
        }
        if found != num_parties - 1 {
            return Err(Error::PartyCountMismatch {
                expected: num_parties - 1,
                found,
            });
        }

        h.change_representation(Representation::PowerBasis);
        let values = h.scale_and_round(&par.decryption_factor, &par.plaintext)?;
        Ok(Self {
            par,
            values: values.into_boxed_slice(),
        })
    }

    /// Sum message shares into the plaintext they share.
    pub fn combine<T>(shares: T) -> Result<Plaintext>
    where
        T: IntoIterator<Item = MessageShare>,
    {
        <Plaintext as Aggregate<MessageShare>>::from_shares(shares)
    }

    /// Returns the coefficients of the share, modulo t.
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    fn to_plaintext(&self) -> Plaintext {
        Plaintext::new(self.values.to_vec(), None, &self.par)
    }
}

impl Aggregate<MessageShare> for Plaintext {
    fn from_shares<T>(iter: T) -> Result<Self>
    where
        T: IntoIterator<Item = MessageShare>,
    {
        let mut shares = iter.into_iter();
        let share = shares.next().ok_or(Error::TooFewValues(0, 1))?;
        let mut values = Zeroizing::new(share.values.to_vec());
        for sh in shares {
            if sh.par != share.par {
                return Err(Error::DefaultError(
                    "Incompatible BFV parameters".to_string(),
                ));
            }
            share.par.plaintext.add_vec(&mut values, &sh.values);
        }
        Ok(Plaintext::new(values.to_vec(), None, &share.par))
    }
}

impl MaskedDecryptionShare {
    /// Deserialize a MaskedDecryptionShare from bytes with the given
    /// parameters and ciphertext.
    pub fn deserialize(
        bytes: &[u8],
        par: &Arc<BfvParameters>,
        ct: &Arc<Ciphertext>,
    ) -> Result<Self> {
        let proto: MaskedDecryptionShareProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        Ok(Self {
            par: par.clone(),
            ct: ct.clone(),
            h_share: Poly::from_bytes(&proto.h_share, &par.ctx)?,
        })
    }
}

impl Serialize for MaskedDecryptionShare {
    fn to_bytes(&self) -> Vec<u8> {
        MaskedDecryptionShareProto {
            h_share: self.h_share.to_bytes(),
        }
        .encode_to_vec()
    }
}

/// A party's share of the re-encryption of the message shares:
/// `Δ * M_i - a * s_i + e_i`, for the common random polynomial `a`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EncryptionShare {
    pub(crate) par: Arc<BfvParameters>,
    pub(crate) crp: CommonRandomPoly,
    pub(crate) share: Poly,
}

impl EncryptionShare {
    /// Encrypt a message share under the secret key share, using the common
    /// random polynomial as the second part of the ciphertext.
    pub fn new<R: RngCore + CryptoRng>(
        message_share: &MessageShare,
        sk_share: &SecretKey,
        crp: &CommonRandomPoly,
        rng: &mut R,
    ) -> Result<Self> {
        if message_share.par != sk_share.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }
        let m = Zeroizing::new(message_share.to_plaintext().to_poly()?);
        let ct = sk_share.encrypt_poly_with_a(&m, crp.poly.clone(), rng)?;
        let share = ct.c.into_iter().next().ok_or(Error::TooFewValues(0, 2))?;
        Ok(Self {
            par: sk_share.par.clone(),
            crp: crp.clone(),
            share,
        })
    }

    /// Deserialize an EncryptionShare from bytes with the given parameters.
    pub fn deserialize(bytes: &[u8], par: &Arc<BfvParameters>) -> Result<Self> {
        let proto: EncryptionShareProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        Ok(Self {
            par: par.clone(),
            crp: CommonRandomPoly::deserialize(&proto.crp, par)?,
            share: Poly::from_bytes(&proto.share, &par.ctx)?,
        })
    }
}

impl Aggregate<EncryptionShare> for Ciphertext {
    fn from_shares<T>(iter: T) -> Result<Self>
    where
        T: IntoIterator<Item = EncryptionShare>,
    {
        let mut shares = iter.into_iter();
        let share = shares.next().ok_or(Error::TooFewValues(0, 1))?;
        let mut c0 = share.share;
        for sh in shares {
            if sh.par != share.par {
                return Err(Error::DefaultError(
                    "Incompatible BFV parameters".to_string(),
                ));
            }
            if sh.crp != share.crp {
                return Err(Error::DefaultError(
                    "Shares use different common random polynomials".to_string(),
                ));
            }
            c0 += &sh.share;
        }
        Ciphertext::new(vec![c0, share.crp.poly], &share.par)
    }
}

impl Serialize for EncryptionShare {
    fn to_bytes(&self) -> Vec<u8> {
        EncryptionShareProto {
            share: self.share.to_bytes(),
            crp: self.crp.to_bytes(),
        }
        .encode_to_vec()
    }
}
