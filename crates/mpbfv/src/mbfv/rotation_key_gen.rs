//! Joint rotation key generation.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::bfv::{BfvParameters, EvaluationKey, GaloisKey, KeySwitchingKey, SecretKey};
use crate::{Error, Result};
use mpbfv_math::rq::{Poly, Representation, SubstitutionExponent};
use rand::{CryptoRng, RngCore};

#[derive(Debug, PartialEq, Eq, Clone)]
struct PartialGaloisKey {
    element: SubstitutionExponent,
    c0: Vec<Poly>,
    c1: Vec<Poly>,
}

/// Running sum of the Galois keys of the parties, keyed by Galois element.
///
/// For every element g, digit j holds
/// `sum_i (-a_j * s_i + e_i + g_j * s_i(x^g))` over the parties folded so far,
/// for a common uniform `a_j` sampled by the lead party.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RotationKeyAccumulator {
    par: Arc<BfvParameters>,
    keys: BTreeMap<usize, PartialGaloisKey>,
    contributors: usize,
}

impl RotationKeyAccumulator {
    /// Start the accumulation with the secret key of the lead party, for the
    /// column rotations by each of `rotations`.
    ///
    /// A rotation by a multiple of the row size is the identity and needs no
    /// key.
    pub fn start<R: RngCore + CryptoRng>(
        sk: &SecretKey,
        rotations: &[i32],
        rng: &mut R,
    ) -> Result<Self> {
        let mut keys = BTreeMap::new();
        for i in rotations {
            let g = EvaluationKey::galois_element(&sk.par, *i)?;
            if g == 1 || keys.contains_key(&g) {
                continue;
            }
            let element = SubstitutionExponent::new(&sk.par.ctx, g)?;
            let c1 = (0..sk.par.moduli().len())
                .map(|_| Poly::random(&sk.par.ctx, Representation::Ntt, rng))
                .collect::<Vec<_>>();
            let s_sub = GaloisKey::substituted_secret(sk, &element)?;
            let c0 = KeySwitchingKey::generate_c0(sk, &s_sub, &c1, rng)?;
            keys.insert(g, PartialGaloisKey { element, c0, c1 });
        }
        Ok(Self {
            par: sk.par.clone(),
            keys,
            contributors: 1,
        })
    }

    /// Fold the secret key of one more party into every Galois key of the
    /// accumulator.
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
        for key in self.keys.values_mut() {
            let s_sub = GaloisKey::substituted_secret(sk, &key.element)?;
            let c0 = KeySwitchingKey::generate_c0(sk, &s_sub, &key.c1, rng)?;
            key.c0.iter_mut().zip(c0.iter()).for_each(|(a, b)| *a += b);
        }
        self.contributors += 1;
        Ok(self)
    }

    /// The number of parties folded into the accumulator.
    pub fn contributors(&self) -> usize {
        self.contributors
    }

    /// Close the accumulation, checking that exactly `num_parties` parties
    /// contributed, and return the joint [`EvaluationKey`].
    pub fn finalize(self, num_parties: usize) -> Result<EvaluationKey> {
        if self.contributors != num_parties {
            return Err(Error::PartyCountMismatch {
                expected: num_parties,
                found: self.contributors,
            });
        }
        let gk = self
            .keys
            .into_iter()
            .map(|(g, key)| {
                let ksk = KeySwitchingKey::from_parts(key.c0, key.c1, &self.par)?;
                Ok((
                    g,
                    GaloisKey {
                        element: key.element,
                        ksk,
                    },
                ))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(EvaluationKey::from_galois_keys(gk, &self.par))
    }
}
