//! Create parameters for the BFV encryption scheme

use crate::proto::bfv::Parameters;
use crate::{Error, ParametersError, Result};
use itertools::Itertools;
use mpbfv_math::{
    ntt::NttOperator,
    rns::ScalingFactor,
    rq::{Context, Scaler},
    zq::{primes::generate_prime, Modulus},
};
use mpbfv_traits::{Deserialize, FheParameters, Serialize};
use num_bigint::BigUint;
use prost::Message;
use std::fmt::Debug;
use std::sync::Arc;

/// Parameters for the BFV encryption scheme.
#[derive(PartialEq, Eq)]
pub struct BfvParameters {
    /// Number of coefficients in a polynomial.
    polynomial_degree: usize,

    /// Modulus of the plaintext.
    plaintext_modulus: u64,

    /// Vector of coprime moduli q_i for the ciphertext.
    pub(crate) moduli: Box<[u64]>,

    /// Vector of the sizes of the coprime moduli q_i for the ciphertext.
    moduli_sizes: Box<[usize]>,

    /// Error variance
    pub(crate) variance: usize,

    /// Variance of the noise flooding the partial decryptions.
    pub(crate) smudging_variance: usize,

    /// Context for the underlying polynomials
    pub(crate) ctx: Arc<Context>,

    /// Ntt operator for the SIMD plaintext, if possible.
    pub(crate) op: Option<Arc<NttOperator>>,

    /// Scaling factor Δ = floor(q / t) for the plaintext
    pub(crate) delta: BigUint,

    /// Scaling factor t / q used when decrypting
    pub(crate) decryption_factor: ScalingFactor,

    /// Plaintext Modulus
    pub(crate) plaintext: Modulus,

    // Parameters for the multiplications
    pub(crate) mul_params: MultiplicationParameters,

    pub(crate) matrix_reps_index_map: Box<[usize]>,
}

impl Debug for BfvParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BfvParameters")
            .field("polynomial_degree", &self.polynomial_degree)
            .field("plaintext_modulus", &self.plaintext_modulus)
            .field("moduli", &self.moduli)
            .finish()
    }
}

impl FheParameters for BfvParameters {}

impl BfvParameters {
    /// Returns the underlying polynomial degree
    pub const fn degree(&self) -> usize {
        self.polynomial_degree
    }

    /// Returns a reference to the ciphertext moduli
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Returns a reference to the ciphertext moduli sizes
    pub fn moduli_sizes(&self) -> &[usize] {
        &self.moduli_sizes
    }

    /// Returns the plaintext modulus
    pub const fn plaintext(&self) -> u64 {
        self.plaintext_modulus
    }

    /// Returns the error variance
    pub const fn variance(&self) -> usize {
        self.variance
    }

    /// Returns the variance of the noise added to partial decryptions
    pub const fn smudging_variance(&self) -> usize {
        self.smudging_variance
    }

    /// Returns the context of the ciphertext polynomials
    pub fn ctx(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Returns whether the plaintext modulus supports the SIMD encoding.
    pub fn supports_simd(&self) -> bool {
        self.op.is_some()
    }

    #[cfg(test)]
    pub fn default_arc(num_moduli: usize, degree: usize) -> Arc<Self> {
        if !degree.is_power_of_two() || degree < 8 {
            panic!("Invalid degree");
        }
        BfvParametersBuilder::new()
            .set_degree(degree)
            .set_plaintext_modulus(65537)
            .set_moduli_sizes(&vec![62usize; num_moduli])
            .build_arc()
            .unwrap()
    }
}

/// Builder for parameters for the Bfv encryption scheme.
#[derive(Debug)]
pub struct BfvParametersBuilder {
    degree: usize,
    plaintext: u64,
    variance: usize,
    smudging_variance: Option<usize>,
    ciphertext_moduli: Vec<u64>,
    ciphertext_moduli_sizes: Vec<usize>,
}

impl BfvParametersBuilder {
    /// Creates a new instance of the builder
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            degree: Default::default(),
            plaintext: Default::default(),
            variance: 10,
            smudging_variance: None,
            ciphertext_moduli: Default::default(),
            ciphertext_moduli_sizes: Default::default(),
        }
    }

    /// Sets the polynomial degree. The build fails if the degree is not a
    /// power of two larger or equal to 8.
    pub fn set_degree(&mut self, degree: usize) -> &mut Self {
        self.degree = degree;
        self
    }

    /// Sets the plaintext modulus. The build fails if the plaintext is not
    /// between 2 and 2^62 - 1.
    pub fn set_plaintext_modulus(&mut self, plaintext: u64) -> &mut Self {
        self.plaintext = plaintext;
        self
    }

    /// Sets the sizes of the ciphertext moduli.
    /// Only one of `set_moduli_sizes` and `set_moduli`
    /// can be specified.
    pub fn set_moduli_sizes(&mut self, sizes: &[usize]) -> &mut Self {
        self.ciphertext_moduli_sizes = sizes.to_owned();
        self
    }

    /// Sets the ciphertext moduli to use.
    /// Only one of `set_moduli_sizes` and `set_moduli`
    /// can be specified.
    pub fn set_moduli(&mut self, moduli: &[u64]) -> &mut Self {
        self.ciphertext_moduli = moduli.to_owned();
        self
    }

    /// Sets the error variance. The build fails if the variance is not
    /// between one and sixteen.
    pub fn set_variance(&mut self, variance: usize) -> &mut Self {
        self.variance = variance;
        self
    }

    /// Sets the variance of the noise flooding the partial decryptions.
    ///
    /// Unless set, it follows the error variance.
    pub fn set_smudging_variance(&mut self, smudging_variance: usize) -> &mut Self {
        self.smudging_variance = Some(smudging_variance);
        self
    }

    /// Generate ciphertext moduli with the specified sizes
    fn generate_moduli(moduli_sizes: &[usize], degree: usize) -> Result<Vec<u64>> {
        let mut moduli = vec![];
        for size in moduli_sizes {
            if *size > 62 || *size < 10 {
                return Err(Error::ParametersError(ParametersError::InvalidModulusSize(
                    *size, 10, 62,
                )));
            }

            let mut upper_bound = 1 << size;
            loop {
                if let Some(prime) = generate_prime(*size, 2 * degree as u64, upper_bound) {
                    if !moduli.contains(&prime) {
                        moduli.push(prime);
                        break;
                    } else {
                        upper_bound = prime;
                    }
                } else {
                    return Err(Error::ParametersError(ParametersError::NotEnoughPrimes(
                        *size, degree,
                    )));
                }
            }
        }

        Ok(moduli)
    }

    /// Build a new `BfvParameters` inside an `Arc`.
    pub fn build_arc(&self) -> Result<Arc<BfvParameters>> {
        self.build().map(Arc::new)
    }

    /// Build a new `BfvParameters`.
    pub fn build(&self) -> Result<BfvParameters> {
        // Check that the degree is a power of 2 (and large enough).
        if self.degree < 8 || !self.degree.is_power_of_two() {
            return Err(Error::ParametersError(ParametersError::InvalidDegree(
                self.degree,
            )));
        }

        // This checks that the plaintext modulus is valid.
        let plaintext_modulus = Modulus::new(self.plaintext).map_err(|e| {
            Error::ParametersError(ParametersError::InvalidPlaintext(e.to_string()))
        })?;

        if self.variance == 0 || self.variance > 16 {
            return Err(Error::UnspecifiedInput(format!(
                "The variance should be between 1 and 16, found {}",
                self.variance
            )));
        }
        let smudging_variance = self.smudging_variance.unwrap_or(self.variance);
        if smudging_variance == 0 {
            return Err(Error::UnspecifiedInput(
                "Smudging variance must be greater than 0".to_string(),
            ));
        }

        // Check that one of `ciphertext_moduli` and `ciphertext_moduli_sizes` is
        // specified.
        if !self.ciphertext_moduli.is_empty() && !self.ciphertext_moduli_sizes.is_empty() {
            return Err(Error::ParametersError(ParametersError::TooManySpecified(
                "Only one of `ciphertext_moduli` and `ciphertext_moduli_sizes` can be specified"
                    .to_string(),
            )));
        } else if self.ciphertext_moduli.is_empty() && self.ciphertext_moduli_sizes.is_empty() {
            return Err(Error::ParametersError(ParametersError::TooFewSpecified(
                "One of `ciphertext_moduli` and `ciphertext_moduli_sizes` must be specified"
                    .to_string(),
            )));
        }

        // Get or generate the moduli
        let mut moduli = self.ciphertext_moduli.clone();
        if !self.ciphertext_moduli_sizes.is_empty() {
            moduli = Self::generate_moduli(&self.ciphertext_moduli_sizes, self.degree)?
        }

        // Key switching decomposes by RNS residue: with a single modulus the
        // only digit is as large as q.
        if moduli.len() < 2 {
            return Err(Error::ParametersError(ParametersError::TooFewSpecified(
                "At least two ciphertext moduli are required".to_string(),
            )));
        }

        // Recomputes the moduli sizes
        let moduli_sizes = moduli
            .iter()
            .map(|m| 64 - m.leading_zeros() as usize)
            .collect_vec();

        let ctx = Context::new_arc(&moduli, self.degree)?;
        let q = ctx.modulus();
        let t = BigUint::from(plaintext_modulus.modulus());
        if &t >= q {
            return Err(Error::ParametersError(ParametersError::InvalidPlaintext(
                "The plaintext modulus should be smaller than the ciphertext modulus"
                    .to_string(),
            )));
        }
        let delta = q / &t;
        let decryption_factor = ScalingFactor::new(&t, q);

        // For the multiplication, we want to extend to a context that is ~60
        // bits larger.
        let modulus_size = moduli_sizes.iter().sum::<usize>();
        let n_moduli = (modulus_size + 60).div_ceil(62);
        let mut mul_moduli = moduli.clone();
        let mut upper_bound = 1 << 62;
        while mul_moduli.len() != moduli.len() + n_moduli {
            upper_bound = generate_prime(62, 2 * self.degree as u64, upper_bound).ok_or(
                Error::ParametersError(ParametersError::NotEnoughPrimes(62, self.degree)),
            )?;
            if !mul_moduli.contains(&upper_bound) {
                mul_moduli.push(upper_bound)
            }
        }
        let mul_ctx = Context::new_arc(&mul_moduli, self.degree)?;
        let mul_params = MultiplicationParameters::new(
            &ctx,
            &mul_ctx,
            ScalingFactor::one(),
            ScalingFactor::new(&t, q),
        )?;

        let op = NttOperator::new(&plaintext_modulus, self.degree);

        // We use the same code as SEAL
        // https://github.com/microsoft/SEAL/blob/82b07db635132e297282649e2ab5908999089ad2/native/src/seal/batchencoder.cpp
        let row_size = self.degree >> 1;
        let m = self.degree << 1;
        let gen = 3;
        let mut pos = 1;
        let mut matrix_reps_index_map = vec![0usize; self.degree];
        for i in 0..row_size {
            let index1 = (pos - 1) >> 1;
            let index2 = (m - pos - 1) >> 1;
            matrix_reps_index_map[i] = index1.reverse_bits() >> (self.degree.leading_zeros() + 1);
            matrix_reps_index_map[row_size | i] =
                index2.reverse_bits() >> (self.degree.leading_zeros() + 1);
            pos *= gen;
            pos &= m - 1;
        }

        Ok(BfvParameters {
            polynomial_degree: self.degree,
            plaintext_modulus: self.plaintext,
            moduli: moduli.into_boxed_slice(),
            moduli_sizes: moduli_sizes.into_boxed_slice(),
            variance: self.variance,
            smudging_variance,
            ctx,
            op: op.map(Arc::new),
            delta,
            decryption_factor,
            plaintext: plaintext_modulus,
            mul_params,
            matrix_reps_index_map: matrix_reps_index_map.into_boxed_slice(),
        })
    }
}

impl Serialize for BfvParameters {
    fn to_bytes(&self) -> Vec<u8> {
        Parameters {
            degree: self.polynomial_degree as u32,
            plaintext: self.plaintext_modulus,
            moduli: self.moduli.to_vec(),
            variance: self.variance as u32,
            smudging_variance: self.smudging_variance as u32,
        }
        .encode_to_vec()
    }
}

impl Deserialize for BfvParameters {
    fn try_deserialize(bytes: &[u8]) -> Result<Self> {
        let params: Parameters = Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        BfvParametersBuilder::new()
            .set_degree(params.degree as usize)
            .set_plaintext_modulus(params.plaintext)
            .set_moduli(&params.moduli)
            .set_variance(params.variance as usize)
            .set_smudging_variance(params.smudging_variance as usize)
            .build()
    }
    type Error = Error;
}

/// Multiplication parameters
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct MultiplicationParameters {
    pub(crate) extender: Scaler,
    pub(crate) down_scaler: Scaler,
    pub(crate) mul_ctx: Arc<Context>,
}

impl MultiplicationParameters {
    fn new(
        from: &Arc<Context>,
        to: &Arc<Context>,
        up_self_factor: ScalingFactor,
        down_factor: ScalingFactor,
    ) -> Result<Self> {
        Ok(Self {
            extender: Scaler::new(from, to, up_self_factor)?,
            down_scaler: Scaler::new(to, from, down_factor)?,
            mul_ctx: to.clone(),
        })
    }
}
