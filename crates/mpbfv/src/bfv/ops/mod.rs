//! Operations over ciphertexts

mod mul;

pub use mul::Multiplicator;

use super::Ciphertext;
use itertools::izip;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

impl Add<&Ciphertext> for &Ciphertext {
    type Output = Ciphertext;

    fn add(self, rhs: &Ciphertext) -> Ciphertext {
        let mut self_clone = self.clone();
        self_clone += rhs;
        self_clone
    }
}

impl AddAssign<&Ciphertext> for Ciphertext {
    fn add_assign(&mut self, rhs: &Ciphertext) {
        assert_eq!(self.par, rhs.par);
        assert_eq!(self.c.len(), rhs.c.len());
        izip!(&mut self.c, &rhs.c).for_each(|(c1i, c2i)| *c1i += c2i);
        self.depth = std::cmp::max(self.depth, rhs.depth);
    }
}

impl Sub<&Ciphertext> for &Ciphertext {
    type Output = Ciphertext;

    fn sub(self, rhs: &Ciphertext) -> Ciphertext {
        let mut self_clone = self.clone();
        self_clone -= rhs;
        self_clone
    }
}

impl SubAssign<&Ciphertext> for Ciphertext {
    fn sub_assign(&mut self, rhs: &Ciphertext) {
        assert_eq!(self.par, rhs.par);
        assert_eq!(self.c.len(), rhs.c.len());
        izip!(&mut self.c, &rhs.c).for_each(|(c1i, c2i)| *c1i -= c2i);
        self.depth = std::cmp::max(self.depth, rhs.depth);
    }
}

impl Neg for &Ciphertext {
    type Output = Ciphertext;

    fn neg(self) -> Ciphertext {
        let c = self.c.iter().map(|c1i| -c1i).collect();
        Ciphertext {
            par: self.par.clone(),
            c,
            depth: self.depth,
        }
    }
}

impl Neg for Ciphertext {
    type Output = Ciphertext;

    fn neg(mut self) -> Ciphertext {
        self.c = self.c.into_iter().map(|c1i| -c1i).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::bfv::{BfvParameters, Ciphertext, Encoding, Plaintext, SecretKey};
    use mpbfv_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
    use rand::thread_rng;
    use std::error::Error;

    #[test]
    fn add_sub_neg() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        for params in [
            BfvParameters::default_arc(2, 16),
            BfvParameters::default_arc(4, 16),
        ] {
            let sk = SecretKey::random(&params, &mut rng)?;
            for encoding in [Encoding::poly(), Encoding::simd()] {
                let a = params.plaintext.random_vec(params.degree(), &mut rng);
                let b = params.plaintext.random_vec(params.degree(), &mut rng);
                let mut sum = a.clone();
                params.plaintext.add_vec(&mut sum, &b);
                let mut diff = a.clone();
                params.plaintext.sub_vec(&mut diff, &b);
                let mut neg = a.clone();
                params.plaintext.neg_vec(&mut neg);

                let pt_a = Plaintext::try_encode(&a, encoding, &params)?;
                let pt_b = Plaintext::try_encode(&b, encoding, &params)?;
                let ct_a = sk.try_encrypt(&pt_a, &mut rng)?;
                let ct_b = sk.try_encrypt(&pt_b, &mut rng)?;

                let decrypt = |ct: &Ciphertext| -> Result<Vec<u64>, Box<dyn Error>> {
                    Ok(Vec::<u64>::try_decode(&sk.try_decrypt(ct)?, encoding)?)
                };

                assert_eq!(decrypt(&(&ct_a + &ct_b))?, sum);
                assert_eq!(decrypt(&(&ct_a - &ct_b))?, diff);
                assert_eq!(decrypt(&(-&ct_a))?, neg);
                assert_eq!(decrypt(&(-ct_a.clone()))?, neg);

                let mut ct_c = ct_a.clone();
                ct_c += &ct_b;
                ct_c -= &ct_b;
                assert_eq!(decrypt(&ct_c)?, a);
            }
        }
        Ok(())
    }
}
