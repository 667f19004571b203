use std::sync::Arc;

use crate::bfv::BfvParameters;
use crate::Result;
use mpbfv_math::rq::{Poly, Representation};
use mpbfv_traits::{DeserializeWithContext, Serialize};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// A common random polynomial, i.e. a uniformly random polynomial known to
/// every party and used as the `a` part of the jointly generated keys and
/// ciphertexts.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CommonRandomPoly {
    pub(crate) poly: Poly,
}

impl CommonRandomPoly {
    /// Generate a new random CRP.
    pub fn new<R: RngCore + CryptoRng>(par: &Arc<BfvParameters>, rng: &mut R) -> Result<Self> {
        let poly = Poly::random(&par.ctx, Representation::Ntt, rng);
        Ok(Self { poly })
    }

    /// Generate a new CRP from a shared deterministic seed.
    pub fn new_deterministic(
        par: &Arc<BfvParameters>,
        seed: <ChaCha8Rng as SeedableRng>::Seed,
    ) -> Result<Self> {
        let poly = Poly::random_from_seed(&par.ctx, Representation::Ntt, seed);
        Ok(Self { poly })
    }

    /// Derive a CRP from a public coin, e.g. a session identifier agreed on
    /// by the parties. The seed is the SHA-256 digest of the coin.
    pub fn from_public_coin(par: &Arc<BfvParameters>, coin: &[u8]) -> Result<Self> {
        let seed: <ChaCha8Rng as SeedableRng>::Seed = Sha256::digest(coin).into();
        Self::new_deterministic(par, seed)
    }

    /// Generate a new random CRP vector.
    ///
    /// The size of the vector is equal to the number of ciphertext moduli, as
    /// required for the relinearization key generation protocol.
    pub fn new_vec<R: RngCore + CryptoRng>(
        par: &Arc<BfvParameters>,
        rng: &mut R,
    ) -> Result<Vec<Self>> {
        (0..par.moduli().len())
            .map(|_| Self::new(par, rng))
            .collect()
    }

    /// Deserialize a CRP from bytes
    pub fn deserialize(bytes: &[u8], par: &Arc<BfvParameters>) -> Result<Self> {
        let poly = Poly::from_bytes(bytes, &par.ctx)?;
        if poly.representation() != &Representation::Ntt {
            return Err(crate::Error::MathError(
                mpbfv_math::Error::IncorrectRepresentation(
                    *poly.representation(),
                    Representation::Ntt,
                ),
            ));
        }
        Ok(Self { poly })
    }

    /// Returns the polynomial, in Ntt representation.
    pub fn poly(&self) -> &Poly {
        &self.poly
    }
}

impl Serialize for CommonRandomPoly {
    fn to_bytes(&self) -> Vec<u8> {
        self.poly.to_bytes()
    }
}
