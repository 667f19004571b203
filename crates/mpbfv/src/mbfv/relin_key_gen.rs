//! Joint relinearization key generation.
//!
//! The protocol runs in two passes. The first pass folds the parties' secret
//! keys into a [`JointKeySwitchKey`], a key switching key from the joint
//! secret S to itself. In the second pass every party multiplies that key by
//! its own secret, and the sum of the resulting [`RelinKeyShare`]s is a key
//! switching key from S² to S, i.e. a [`RelinearizationKey`].

use std::sync::Arc;

use crate::bfv::{BfvParameters, KeySwitchingKey, RelinearizationKey, SecretKey};
use crate::{Error, Result};
use itertools::izip;
use mpbfv_math::rq::{Poly, Representation};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::Aggregate;

/// Running sum of the self key switching keys of the parties.
///
/// Each digit j holds `b_j = sum_i (-a_j * s_i + e_i + g_j * s_i)` over the
/// parties folded so far, for a common uniform `a_j`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct KeySwitchAccumulator {
    par: Arc<BfvParameters>,
    c0: Vec<Poly>,
    c1: Vec<Poly>,
    contributors: usize,
}

impl KeySwitchAccumulator {
    /// Start the accumulation with the secret key of the lead party. The
    /// common polynomials `a_j` are sampled here, one per modulus.
    pub fn start<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        let c1 = (0..sk.par.moduli().len())
            .map(|_| Poly::random(&sk.par.ctx, Representation::Ntt, rng))
            .collect::<Vec<_>>();
        let c0 = Self::self_key_switch(sk, &c1, rng)?;
        Ok(Self {
            par: sk.par.clone(),
            c0,
            c1,
            contributors: 1,
        })
    }

    /// Fold the secret key of one more party into the accumulator.
    pub fn extend_with<R: RngCore + CryptoRng>(
        mut self,
        sk: &SecretKey,
        rng: &mut R,
    ) -> Result<Self> {
        if sk.par != self.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }
        let c0 = Self::self_key_switch(sk, &self.c1, rng)?;
        self.c0.iter_mut().zip(c0.iter()).for_each(|(a, b)| *a += b);
        self.contributors += 1;
        Ok(self)
    }

    /// The number of parties folded into the accumulator.
    pub fn contributors(&self) -> usize {
        self.contributors
    }

    /// Close the accumulation, checking that exactly `num_parties` parties
    /// contributed.
    pub fn finalize(self, num_parties: usize) -> Result<JointKeySwitchKey> {
        if self.contributors != num_parties {
            return Err(Error::PartyCountMismatch {
                expected: num_parties,
                found: self.contributors,
            });
        }
        Ok(JointKeySwitchKey {
            ksk: KeySwitchingKey::from_parts(self.c0, self.c1, &self.par)?,
        })
    }

    fn self_key_switch<R: RngCore + CryptoRng>(
        sk: &SecretKey,
        c1: &[Poly],
        rng: &mut R,
    ) -> Result<Vec<Poly>> {
        let mut s = sk.to_poly()?;
        s.change_representation(Representation::PowerBasis);
        KeySwitchingKey::generate_c0(sk, &s, c1, rng)
    }
}

/// Key switching key from the joint secret to itself, produced by
/// [`KeySwitchAccumulator::finalize`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct JointKeySwitchKey {
    pub(crate) ksk: KeySwitchingKey,
}

impl JointKeySwitchKey {
    /// Returns the parameters of the key.
    pub fn parameters(&self) -> &Arc<BfvParameters> {
        &self.ksk.par
    }
}

/// A party's share of the relinearization key: `(s_i * b_j + e, s_i * a_j + e')`
/// for every digit j of the joint key switching key.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RelinKeyShare {
    pub(crate) par: Arc<BfvParameters>,
    pub(crate) h0: Box<[Poly]>,
    pub(crate) h1: Box<[Poly]>,
}

impl RelinKeyShare {
    /// Compute the share of the party holding `sk` from the joint key
    /// switching key.
    pub fn new<R: RngCore + CryptoRng>(
        sk: &SecretKey,
        joint: &JointKeySwitchKey,
        rng: &mut R,
    ) -> Result<Self> {
        let par = joint.ksk.par.clone();
        if sk.par != par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }

        let s = sk.to_poly()?;
        let mut h0 = Vec::with_capacity(joint.ksk.c0.len());
        let mut h1 = Vec::with_capacity(joint.ksk.c1.len());
        for (b, a) in izip!(joint.ksk.c0.iter(), joint.ksk.c1.iter()) {
            let mut h0_j = Poly::small(&par.ctx, Representation::Ntt, par.variance, rng)?;
            h0_j += &(b * &*s);
            let mut h1_j = Poly::small(&par.ctx, Representation::Ntt, par.variance, rng)?;
            h1_j += &*Zeroizing::new(a * &*s);
            h0.push(h0_j);
            h1.push(h1_j);
        }

        Ok(Self {
            par,
            h0: h0.into_boxed_slice(),
            h1: h1.into_boxed_slice(),
        })
    }
}

impl Aggregate<RelinKeyShare> for RelinearizationKey {
    fn from_shares<T>(iter: T) -> Result<Self>
    where
        T: IntoIterator<Item = RelinKeyShare>,
    {
        let mut shares = iter.into_iter();
        let share = shares.next().ok_or(Error::TooFewValues(0, 1))?;
        let par = share.par.clone();
        let (h0, h1) = shares.try_fold(
            (share.h0.into_vec(), share.h1.into_vec()),
            |(mut h0, mut h1), sh| {
                if sh.par != par {
                    return Err(Error::DefaultError(
                        "Incompatible BFV parameters".to_string(),
                    ));
                }
                izip!(h0.iter_mut(), sh.h0.iter()).for_each(|(a, b)| *a += b);
                izip!(h1.iter_mut(), sh.h1.iter()).for_each(|(a, b)| *a += b);
                Ok((h0, h1))
            },
        )?;
        Ok(RelinearizationKey {
            ksk: KeySwitchingKey::from_parts(h0, h1, &par)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mpbfv_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
    use rand::thread_rng;
    use std::error::Error as StdError;

    use crate::bfv::{Encoding, Multiplicator, Plaintext};
    use crate::mbfv::AggregateIter;

    fn joint_secret(sk_shares: &[SecretKey], par: &Arc<BfvParameters>) -> SecretKey {
        let mut s = vec![0i64; par.degree()];
        for sk in sk_shares {
            s.iter_mut().zip(sk.coeffs.iter()).for_each(|(a, b)| *a += b);
        }
        SecretKey::new(s, par)
    }

    #[test]
    fn relinearization_key() -> std::result::Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(4, 16);
        for num_parties in [1, 2, 5] {
            let sk_shares = (0..num_parties)
                .map(|_| SecretKey::random(&par, &mut rng))
                .collect::<Result<Vec<_>>>()?;

            let joint = sk_shares[1..]
                .iter()
                .try_fold(KeySwitchAccumulator::start(&sk_shares[0], &mut rng)?, |acc, sk| {
                    acc.extend_with(sk, &mut rng)
                })?
                .finalize(num_parties)?;
            let rk: RelinearizationKey = sk_shares
                .iter()
                .map(|sk| RelinKeyShare::new(sk, &joint, &mut rng))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .aggregate()?;

            let sk = joint_secret(&sk_shares, &par);
            let v1 = par.plaintext.random_vec(par.degree(), &mut rng);
            let v2 = par.plaintext.random_vec(par.degree(), &mut rng);
            let ct1 = sk.try_encrypt(&Plaintext::try_encode(&v1, Encoding::simd(), &par)?, &mut rng)?;
            let ct2 = sk.try_encrypt(&Plaintext::try_encode(&v2, Encoding::simd(), &par)?, &mut rng)?;

            let ct3 = Multiplicator::default(&rk)?.multiply(&ct1, &ct2)?;
            assert_eq!(ct3.c.len(), 2);
            let w = Vec::<u64>::try_decode(&sk.try_decrypt(&ct3)?, Encoding::simd())?;
            let mut expected = v1.clone();
            par.plaintext.mul_vec(&mut expected, &v2);
            assert_eq!(w, expected);
        }
        Ok(())
    }

    #[test]
    fn accumulator_counts_parties() -> std::result::Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(2, 16);
        let sk0 = SecretKey::random(&par, &mut rng)?;
        let sk1 = SecretKey::random(&par, &mut rng)?;

        let acc = KeySwitchAccumulator::start(&sk0, &mut rng)?.extend_with(&sk1, &mut rng)?;
        assert_eq!(acc.contributors(), 2);
        assert_eq!(
            acc.clone().finalize(3),
            Err(Error::PartyCountMismatch {
                expected: 3,
                found: 2
            })
        );
        assert!(acc.finalize(2).is_ok());

        let other_par = BfvParameters::default_arc(3, 16);
        let other_sk = SecretKey::random(&other_par, &mut rng)?;
        assert!(KeySwitchAccumulator::start(&sk0, &mut rng)?
            .extend_with(&other_sk, &mut rng)
            .is_err());
        assert_eq!(
            RelinearizationKey::from_shares(Vec::<RelinKeyShare>::new()),
            Err(Error::TooFewValues(0, 1))
        );
        Ok(())
    }
}
