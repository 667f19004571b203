//! Galois keys for the BFV encryption scheme

use crate::bfv::{traits::TryConvertFrom, BfvParameters, Ciphertext, KeySwitchingKey, SecretKey};
use crate::proto::bfv::{GaloisKey as GaloisKeyProto, KeySwitchingKey as KeySwitchingKeyProto};
use crate::{Error, Result};
use mpbfv_math::rq::{
    traits::TryConvertFrom as TryConvertFromPoly, Poly, Representation, SubstitutionExponent,
};
use rand::{CryptoRng, RngCore};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Galois key for the BFV encryption scheme.
/// A Galois key is a special type of key switching key,
/// which switch from `s(x^i)` to `s(x)` where `s(x)` is the secret key.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GaloisKey {
    pub(crate) element: SubstitutionExponent,
    pub(crate) ksk: KeySwitchingKey,
}

impl GaloisKey {
    /// Generate a [`GaloisKey`] from a [`SecretKey`].
    pub fn new<R: RngCore + CryptoRng>(
        sk: &SecretKey,
        exponent: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let element = SubstitutionExponent::new(&sk.par.ctx, exponent)?;
        let s_sub = Self::substituted_secret(sk, &element)?;
        let ksk = KeySwitchingKey::new(sk, &s_sub, rng)?;
        Ok(Self { element, ksk })
    }

    /// Returns s(x^i) in power basis representation.
    pub(crate) fn substituted_secret(
        sk: &SecretKey,
        element: &SubstitutionExponent,
    ) -> Result<Zeroizing<Poly>> {
        let s = Zeroizing::new(Poly::try_convert_from(
            sk.coeffs.as_ref(),
            &sk.par.ctx,
            Representation::PowerBasis,
        )?);
        Ok(Zeroizing::new(s.substitute(element)?))
    }

    /// Relinearize a [`Ciphertext`] using the [`GaloisKey`], i.e. apply the
    /// substitution x -> x^i to the encrypted plaintext.
    pub fn relinearize(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        if ct.c.len() != 2 {
            return Err(Error::TooManyValues(ct.c.len(), 2));
        }
        if ct.par != self.ksk.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }

        let c0 = ct.c[0].to_representation(Representation::PowerBasis);
        let mut c0 = c0.substitute(&self.element)?;
        c0.change_representation(Representation::Ntt);
        let c1 = ct.c[1]
            .to_representation(Representation::PowerBasis)
            .substitute(&self.element)?;

        let (d0, d1) = self.ksk.key_switch(&c1)?;
        c0 += &d0;

        let mut out = Ciphertext::new(vec![c0, d1], &ct.par)?;
        out.depth = ct.depth;
        Ok(out)
    }
}

impl From<&GaloisKey> for GaloisKeyProto {
    fn from(value: &GaloisKey) -> Self {
        GaloisKeyProto {
            ksk: Some(KeySwitchingKeyProto::from(&value.ksk)),
            exponent: value.element.exponent as u32,
        }
    }
}

impl TryConvertFrom<&GaloisKeyProto> for GaloisKey {
    fn try_convert_from(value: &GaloisKeyProto, par: &Arc<BfvParameters>) -> Result<Self> {
        let ksk = value
            .ksk
            .as_ref()
            .ok_or_else(|| Error::DefaultError("Invalid serialization".to_string()))?;
        Ok(GaloisKey {
            element: SubstitutionExponent::new(&par.ctx, value.exponent as usize)?,
            ksk: KeySwitchingKey::try_convert_from(ksk, par)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::GaloisKey;
    use crate::bfv::{BfvParameters, Encoding, Plaintext, SecretKey};
    use mpbfv_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
    use rand::thread_rng;
    use std::error::Error;

    #[test]
    fn relinearization() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let params = BfvParameters::default_arc(4, 16);
        let n = params.degree();
        for _ in 0..10 {
            let sk = SecretKey::random(&params, &mut rng)?;
            let v = params.plaintext.random_vec(n, &mut rng);
            let pt = Plaintext::try_encode(&v, Encoding::poly(), &params)?;
            let ct = sk.try_encrypt(&pt, &mut rng)?;

            for exponent in [3, 2 * n - 1] {
                let gk = GaloisKey::new(&sk, exponent, &mut rng)?;
                let ct2 = gk.relinearize(&ct)?;
                let pt2 = sk.try_decrypt(&ct2)?;
                let w = Vec::<u64>::try_decode(&pt2, Encoding::poly())?;

                // The coefficient j of m(x) lands on x^(j * exponent mod 2n).
                let mut expected = vec![0u64; n];
                for (j, vj) in v.iter().enumerate() {
                    let index = (j * exponent) % (2 * n);
                    if index < n {
                        expected[index] = *vj;
                    } else {
                        expected[index - n] = params.plaintext.neg(*vj);
                    }
                }
                assert_eq!(w, expected);
            }
        }
        Ok(())
    }

    #[test]
    fn even_exponent() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let params = BfvParameters::default_arc(4, 16);
        let sk = SecretKey::random(&params, &mut rng)?;
        assert!(GaloisKey::new(&sk, 2, &mut rng).is_err());
        Ok(())
    }
}
