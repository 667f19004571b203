use std::sync::Arc;

use mpbfv_math::rq::{Poly, Representation};

use crate::{
    bfv::{BfvParameters, Ciphertext, RelinearizationKey},
    Error, Result,
};

/// Multiplicator that implements the BFV multiplication: both operands are
/// extended to the multiplication basis Q ∪ P, tensored, scaled back to Q by
/// t / Q, and optionally relinearized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multiplicator {
    par: Arc<BfvParameters>,
    rk: Option<RelinearizationKey>,
}

impl Multiplicator {
    /// Construct a multiplicator without relinearization; products are
    /// three-part ciphertexts.
    pub fn new(par: &Arc<BfvParameters>) -> Self {
        Self {
            par: par.clone(),
            rk: None,
        }
    }

    /// Default multiplication strategy using relinearization.
    pub fn default(rk: &RelinearizationKey) -> Result<Self> {
        let mut multiplicator = Self::new(rk.parameters());
        multiplicator.enable_relinearization(rk)?;
        Ok(multiplicator)
    }

    /// Relinearize the products with the provided key.
    pub fn enable_relinearization(&mut self, rk: &RelinearizationKey) -> Result<()> {
        if rk.parameters() != &self.par {
            return Err(Error::DefaultError(
                "Invalid relinearization key context".to_string(),
            ));
        }
        self.rk = Some(rk.clone());
        Ok(())
    }

    /// Multiply two ciphertexts using the defined multiplication strategy.
    pub fn multiply(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext> {
        if lhs.par != self.par || rhs.par != self.par {
            return Err(Error::DefaultError(
                "Ciphertexts do not have the same parameters".to_string(),
            ));
        }
        if lhs.c.len() != 2 || rhs.c.len() != 2 {
            return Err(Error::DefaultError(
                "Multiplication can only be performed on ciphertexts of size 2".to_string(),
            ));
        }

        let mul_params = &self.par.mul_params;
        let extend = |p: &Poly| -> Result<Poly> {
            let mut q = p
                .to_representation(Representation::PowerBasis)
                .scale(&mul_params.extender)?;
            q.change_representation(Representation::Ntt);
            Ok(q)
        };

        // Extend
        let c00 = extend(&lhs.c[0])?;
        let c01 = extend(&lhs.c[1])?;
        let c10 = extend(&rhs.c[0])?;
        let c11 = extend(&rhs.c[1])?;

        // Multiply
        let c0 = &c00 * &c10;
        let mut c1 = &c00 * &c11;
        c1 += &(&c01 * &c10);
        let c2 = &c01 * &c11;

        // Scale
        let c = [c0, c1, c2]
            .into_iter()
            .map(|mut p| {
                p.change_representation(Representation::PowerBasis);
                let mut q = p.scale(&mul_params.down_scaler)?;
                q.change_representation(Representation::Ntt);
                Ok(q)
            })
            .collect::<Result<Vec<_>>>()?;

        // Create a ciphertext
        let mut ct = Ciphertext::new(c, &self.par)?;
        ct.depth = std::cmp::max(lhs.depth, rhs.depth) + 1;

        // Relinearize
        if let Some(rk) = self.rk.as_ref() {
            rk.relinearizes(&mut ct)?;
        }

        Ok(ct)
    }
}

#[cfg(test)]
mod tests {
    use super::Multiplicator;
    use crate::bfv::{BfvParameters, Encoding, Plaintext, RelinearizationKey, SecretKey};
    use mpbfv_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
    use rand::thread_rng;
    use std::error::Error;

    #[test]
    fn mul() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(4, 16);
        for _ in 0..10 {
            // We will encode `values` in an Simd format, and check that the product is
            // computed correctly.
            let values = par.plaintext.random_vec(par.degree(), &mut rng);
            let mut expected = values.clone();
            par.plaintext.mul_vec(&mut expected, &values);

            let sk = SecretKey::random(&par, &mut rng)?;
            let pt = Plaintext::try_encode(&values, Encoding::simd(), &par)?;
            let ct1 = sk.try_encrypt(&pt, &mut rng)?;
            let ct2 = sk.try_encrypt(&pt, &mut rng)?;

            let rk = RelinearizationKey::new(&sk, &mut rng)?;
            let multiplicator = Multiplicator::default(&rk)?;
            let ct3 = multiplicator.multiply(&ct1, &ct2)?;
            assert_eq!(ct3.c.len(), 2);
            assert_eq!(ct3.depth(), 1);
            let pt = sk.try_decrypt(&ct3)?;
            assert_eq!(Vec::<u64>::try_decode(&pt, Encoding::simd())?, expected);

            // Without relinearization, the product has three parts and still
            // decrypts correctly.
            let ct4 = Multiplicator::new(&par).multiply(&ct1, &ct2)?;
            assert_eq!(ct4.c.len(), 3);
            let pt = sk.try_decrypt(&ct4)?;
            assert_eq!(Vec::<u64>::try_decode(&pt, Encoding::simd())?, expected);
            assert!(multiplicator.multiply(&ct4, &ct1).is_err());
        }
        Ok(())
    }

    #[test]
    fn depth() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(4, 16);
        let sk = SecretKey::random(&par, &mut rng)?;
        let rk = RelinearizationKey::new(&sk, &mut rng)?;
        let multiplicator = Multiplicator::default(&rk)?;

        let values = [1u64, 2, 3, 4, 5];
        let pt = Plaintext::try_encode(&values[..], Encoding::simd(), &par)?;
        let ct = sk.try_encrypt(&pt, &mut rng)?;
        let ct2 = multiplicator.multiply(&ct, &ct)?;
        let ct3 = multiplicator.multiply(&ct2, &ct)?;
        assert_eq!(ct3.depth(), 2);
        let ct_sum = &ct3 + &ct;
        assert_eq!(ct_sum.depth(), 2);

        let w = Vec::<u64>::try_decode(&sk.try_decrypt(&ct3)?, Encoding::simd())?;
        assert_eq!(&w[..5], &[1, 8, 27, 64, 125]);
        Ok(())
    }

    #[test]
    fn incompatible_key() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(4, 16);
        let other = BfvParameters::default_arc(3, 16);
        let sk = SecretKey::random(&other, &mut rng)?;
        let rk = RelinearizationKey::new(&sk, &mut rng)?;
        let mut multiplicator = Multiplicator::new(&par);
        assert!(multiplicator.enable_relinearization(&rk).is_err());
        Ok(())
    }
}
