//! Secret keys for the BFV encryption scheme

use crate::bfv::{BfvParameters, Ciphertext, Plaintext};
use crate::{Error, Result};
use mpbfv_math::rq::{traits::TryConvertFrom, Poly, Representation};
use mpbfv_traits::{FheDecrypter, FheEncrypter, FheParametrized};
use mpbfv_util::sample_vec_cbd_f32;
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Secret key for the BFV encryption scheme.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SecretKey {
    /// The BFV parameters
    pub(crate) par: Arc<BfvParameters>,
    /// The secret key coefficients
    pub coeffs: Box<[i64]>,
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.coeffs.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

impl SecretKey {
    /// The variance used for secret key sampling
    pub const SK_VARIANCE: f32 = 0.5;

    /// Generate a random [`SecretKey`] with ternary coefficients.
    pub fn random<R: RngCore + CryptoRng>(par: &Arc<BfvParameters>, rng: &mut R) -> Result<Self> {
        let s_coefficients = sample_vec_cbd_f32(par.degree(), Self::SK_VARIANCE, rng)
            .map_err(|e| Error::DefaultError(e.to_string()))?;
        Ok(Self::new(s_coefficients, par))
    }

    /// Generate a [`SecretKey`] from its coefficients.
    pub fn new(coeffs: Vec<i64>, par: &Arc<BfvParameters>) -> Self {
        Self {
            par: par.clone(),
            coeffs: coeffs.into_boxed_slice(),
        }
    }

    /// The secret key as a polynomial in Ntt representation.
    pub(crate) fn to_poly(&self) -> Result<Zeroizing<Poly>> {
        let mut s = Zeroizing::new(Poly::try_convert_from(
            self.coeffs.as_ref(),
            &self.par.ctx,
            Representation::PowerBasis,
        )?);
        s.change_representation(Representation::Ntt);
        Ok(s)
    }

    /// Computes c_0 + c_1 * s + ... + c_k * s^k, in power basis.
    fn phase(&self, ct: &Ciphertext) -> Result<Zeroizing<Poly>> {
        if self.par != ct.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }

        let s = self.to_poly()?;
        let mut si = s.clone();
        let mut c = Zeroizing::new(ct.c[0].clone());
        for ci in ct.c.iter().skip(1) {
            let mut cis = Zeroizing::new(ci.clone());
            *cis.as_mut() *= si.as_ref();
            *c.as_mut() += &*cis;
            *si.as_mut() *= s.as_ref();
        }
        c.change_representation(Representation::PowerBasis);
        Ok(c)
    }

    /// Measure the noise in a [`Ciphertext`], in bits.
    ///
    /// This operations may run in a variable time depending on the value of the
    /// noise.
    pub fn measure_noise(&self, ct: &Ciphertext) -> Result<usize> {
        let plaintext = self.try_decrypt(ct)?;
        let mut m = Zeroizing::new(plaintext.to_poly()?);
        m.change_representation(Representation::PowerBasis);

        let mut c = self.phase(ct)?;
        *c.as_mut() -= &*m;

        let ciphertext_modulus = self.par.ctx.modulus();
        let noise = Vec::<BigUint>::from(c.as_ref())
            .iter()
            .map(|coeff| std::cmp::min(coeff.bits(), (ciphertext_modulus - coeff).bits()) as usize)
            .max()
            .unwrap_or(0);
        Ok(noise)
    }

    /// Encrypt a polynomial in Ntt representation using `a` as the uniform
    /// polynomial of the ciphertext: (p + e - a * s, a).
    pub(crate) fn encrypt_poly_with_a<R: RngCore + CryptoRng>(
        &self,
        p: &Poly,
        a: Poly,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        if p.representation() != &Representation::Ntt || a.representation() != &Representation::Ntt
        {
            return Err(Error::MathError(
                mpbfv_math::Error::IncorrectRepresentation(*p.representation(), Representation::Ntt),
            ));
        }

        let s = self.to_poly()?;
        let a_s = Zeroizing::new(&a * s.as_ref());

        let mut b = Poly::small(&self.par.ctx, Representation::Ntt, self.par.variance, rng)?;
        b -= &*a_s;
        b += p;

        Ciphertext::new(vec![b, a], &self.par)
    }

    /// Encrypt a polynomial in Ntt representation with a fresh uniform
    /// polynomial.
    pub(crate) fn encrypt_poly<R: RngCore + CryptoRng>(
        &self,
        p: &Poly,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        let a = Poly::random(&self.par.ctx, Representation::Ntt, rng);
        self.encrypt_poly_with_a(p, a, rng)
    }
}

impl FheParametrized for SecretKey {
    type Parameters = BfvParameters;
}

impl FheEncrypter<Plaintext, Ciphertext> for SecretKey {
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
        let m = Zeroizing::new(pt.to_poly()?);
        self.encrypt_poly(m.as_ref(), rng)
    }
}

impl FheDecrypter<Plaintext, Ciphertext> for SecretKey {
    type Error = Error;

    fn try_decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        let c = self.phase(ct)?;
        let w = c.scale_and_round(&self.par.decryption_factor, &self.par.plaintext)?;
        Ok(Plaintext::new(w, None, &self.par))
    }
}
