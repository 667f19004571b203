//! Threshold decryption.

use std::sync::Arc;

use crate::bfv::{BfvParameters, Ciphertext, Plaintext, SecretKey};
use crate::proto::mbfv::DecryptionShare as DecryptionShareProto;
use crate::{Error, Result};
use mpbfv_math::rq::{Poly, Representation};
use mpbfv_traits::{DeserializeWithContext, Serialize};
use prost::Message;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::{Aggregate, Role};

/// A party's share in the decryption protocol.
///
/// Each party uses the `DecryptionShare` to generate their share of the
/// plaintext output. This is the "Protocol 3: KeySwitch" protocol detailed in
/// [Multiparty BFV](https://eprint.iacr.org/2020/304.pdf) (p7), with an output
/// key of zero. The lead party also folds the first part of the ciphertext
/// into its share. Use the [`Aggregate`] impl to combine the shares into a
/// [`Plaintext`].
///
/// Decryption is only correct while the noise of the ciphertext, plus the
/// smudging noise of the shares, stays below Δ/2. An overflow cannot be
/// detected and yields a wrong plaintext.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DecryptionShare {
    pub(crate) par: Arc<BfvParameters>,
    pub(crate) ct: Arc<Ciphertext>,
    pub(crate) role: Role,
    pub(crate) h_share: Poly,
}

impl DecryptionShare {
    /// Participate in a new Decryption protocol.
    ///
    /// 1. *Private input*: BFV secret key share
    /// 2. *Public input*: Ciphertext to decrypt
    ///
    /// The lead computes `c0 + s_0 * c1 + e_0`, a participant `s_i * c1 + e_i`,
    /// where the `e_i` are sampled with the smudging variance.
    pub fn new<R: RngCore + CryptoRng>(
        role: Role,
        sk_share: &SecretKey,
        ct: &Arc<Ciphertext>,
        rng: &mut R,
    ) -> Result<Self> {
        let mut h_share = partial_phase(sk_share, ct, rng)?;
        if role.is_lead() {
            h_share += &ct.c[0];
        }
        Ok(Self {
            par: sk_share.par.clone(),
            ct: ct.clone(),
            role,
            h_share,
        })
    }

    /// The role of the party that produced the share.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Deserialize a DecryptionShare from bytes with the given parameters and
    /// ciphertext.
    pub fn deserialize(
        bytes: &[u8],
        par: &Arc<BfvParameters>,
        ct: &Arc<Ciphertext>,
    ) -> Result<Self> {
        if ct.par != *par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }
        let proto: DecryptionShareProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        Ok(Self {
            par: par.clone(),
            ct: ct.clone(),
            role: Role::try_from(proto.role)?,
            h_share: Poly::from_bytes(&proto.h_share, &par.ctx)?,
        })
    }
}

/// Computes `s * c1 + e` for a 2-part ciphertext, with `e` sampled with the
/// smudging variance of the parameters.
pub(crate) fn partial_phase<R: RngCore + CryptoRng>(
    sk: &SecretKey,
    ct: &Ciphertext,
    rng: &mut R,
) -> Result<Poly> {
    if sk.par != ct.par {
        return Err(Error::DefaultError(
            "Incompatible BFV parameters".to_string(),
        ));
    }
    if ct.c.len() != 2 {
        return Err(Error::TooManyValues(ct.c.len(), 2));
    }

    let par = &sk.par;
    let s = sk.to_poly()?;
    let e = Zeroizing::new(Poly::gaussian(
        &par.ctx,
        Representation::Ntt,
        par.smudging_variance as f64,
        rng,
    )?);

    let mut h = &ct.c[1] * &*s;
    h += &*e;
    Ok(h)
}

impl Aggregate<DecryptionShare> for Plaintext {
    fn from_shares<T>(iter: T) -> Result<Self>
    where
        T: IntoIterator<Item = DecryptionShare>,
    {
        let mut shares = iter.into_iter();
        let share = shares.next().ok_or(Error::TooFewValues(0, 1))?;
        let mut num_leads = usize::from(share.role.is_lead());
        let mut h = Zeroizing::new(share.h_share.clone());
        for sh in shares {
            if sh.ct != share.ct {
                return Err(Error::DefaultError(
                    "Shares decrypt different ciphertexts".to_string(),
                ));
            }
            num_leads += usize::from(sh.role.is_lead());
            *h += &sh.h_share;
        }
        match num_leads {
            0 => return Err(Error::MissingLeadShare),
            1 => {}
            _ => return Err(Error::TooManyLeadShares),
        }

        h.change_representation(Representation::PowerBasis);
        let w = h.scale_and_round(&share.par.decryption_factor, &share.par.plaintext)?;
        Ok(Plaintext::new(w, None, &share.par))
    }
}

impl Serialize for DecryptionShare {
    fn to_bytes(&self) -> Vec<u8> {
        DecryptionShareProto {
            role: self.role.into(),
            h_share: self.h_share.to_bytes(),
        }
        .encode_to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mpbfv_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
    use rand::thread_rng;
    use std::error::Error as StdError;

    use crate::bfv::{Encoding, PublicKey};
    use crate::mbfv::{AggregateIter, CommonRandomPoly, PublicKeyShare};

    struct Party {
        sk_share: SecretKey,
        pk_share: PublicKeyShare,
    }

    fn setup(
        par: &Arc<BfvParameters>,
        num_parties: usize,
    ) -> std::result::Result<(Vec<Party>, PublicKey), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let crp = CommonRandomPoly::new(par, &mut rng)?;
        let mut parties = Vec::with_capacity(num_parties);
        for i in 0..num_parties {
            let sk_share = SecretKey::random(par, &mut rng)?;
            let pk_share = PublicKeyShare::new(Role::of(i), &sk_share, crp.clone(), &mut rng)?;
            parties.push(Party { sk_share, pk_share });
        }
        let pk = parties
            .iter()
            .map(|p| p.pk_share.clone())
            .aggregate()?;
        Ok((parties, pk))
    }

    #[test]
    fn encrypt_decrypt() -> std::result::Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        for par in [
            BfvParameters::default_arc(2, 16),
            BfvParameters::default_arc(4, 16),
        ] {
            for num_parties in [1, 2, 5] {
                let (parties, pk) = setup(&par, num_parties)?;

                let v = par.plaintext.random_vec(par.degree(), &mut rng);
                let pt = Plaintext::try_encode(&v, Encoding::poly(), &par)?;
                let ct = Arc::new(pk.try_encrypt(&pt, &mut rng)?);

                let pt: Plaintext = parties
                    .iter()
                    .enumerate()
                    .map(|(i, p)| DecryptionShare::new(Role::of(i), &p.sk_share, &ct, &mut rng))
                    .collect::<Result<Vec<_>>>()?
                    .into_iter()
                    .aggregate()?;
                let w = Vec::<u64>::try_decode(&pt, Encoding::poly())?;
                assert_eq!(w, v);
            }
        }
        Ok(())
    }

    #[test]
    fn single_party_matches_secret_key() -> std::result::Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(2, 16);
        let sk = SecretKey::random(&par, &mut rng)?;
        let v = par.plaintext.random_vec(par.degree(), &mut rng);
        let ct = Arc::new(sk.try_encrypt(&Plaintext::try_encode(&v, Encoding::simd(), &par)?, &mut rng)?);

        let share = DecryptionShare::new(Role::Lead, &sk, &ct, &mut rng)?;
        let pt = Plaintext::from_shares([share])?;
        assert_eq!(pt, sk.try_decrypt(&ct)?);
        Ok(())
    }

    #[test]
    fn rejects_invalid_shares() -> std::result::Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(2, 16);
        let (parties, pk) = setup(&par, 2)?;
        let pt = Plaintext::zero(Encoding::poly(), &par)?;
        let ct1 = Arc::new(pk.try_encrypt(&pt, &mut rng)?);
        let ct2 = Arc::new(pk.try_encrypt(&pt, &mut rng)?);

        let lead = DecryptionShare::new(Role::Lead, &parties[0].sk_share, &ct1, &mut rng)?;
        let participant =
            DecryptionShare::new(Role::Participant, &parties[1].sk_share, &ct1, &mut rng)?;
        let stray = DecryptionShare::new(Role::Participant, &parties[1].sk_share, &ct2, &mut rng)?;

        assert_eq!(
            Plaintext::from_shares(Vec::<DecryptionShare>::new()),
            Err(Error::TooFewValues(0, 1))
        );
        assert_eq!(
            Plaintext::from_shares([participant.clone()]),
            Err(Error::MissingLeadShare)
        );
        assert_eq!(
            Plaintext::from_shares([lead.clone(), lead.clone(), participant]),
            Err(Error::TooManyLeadShares)
        );
        assert!(Plaintext::from_shares([lead, stray]).is_err());

        // Three-part ciphertexts must be relinearized first.
        let mut ct3 = (*ct1).clone();
        ct3.c.push(ct3.c[1].clone());
        assert_eq!(
            DecryptionShare::new(Role::Lead, &parties[0].sk_share, &Arc::new(ct3), &mut rng),
            Err(Error::TooManyValues(3, 2))
        );
        Ok(())
    }

    #[test]
    fn serialize() -> std::result::Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(2, 16);
        let (parties, pk) = setup(&par, 2)?;
        let ct = Arc::new(pk.try_encrypt(&Plaintext::zero(Encoding::poly(), &par)?, &mut rng)?);
        for (i, p) in parties.iter().enumerate() {
            let share = DecryptionShare::new(Role::of(i), &p.sk_share, &ct, &mut rng)?;
            let bytes = share.to_bytes();
            assert_eq!(share, DecryptionShare::deserialize(&bytes, &par, &ct)?);
        }
        Ok(())
    }
}
