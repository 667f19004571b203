use std::fmt::Display;

use mpbfv_traits::FhePlaintextEncoding;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum EncodingEnum {
    Poly,
    Simd,
}

impl Display for EncodingEnum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An encoding for the plaintext.
///
/// `Poly` places the values in the coefficients of the plaintext polynomial;
/// `Simd` places them in the slots of a 2 x (degree / 2) matrix, and requires
/// a plaintext modulus congruent to 1 modulo 2 * degree.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Encoding {
    pub(crate) encoding: EncodingEnum,
}

impl Encoding {
    /// A Poly encoding encodes a vector as coefficients of a polynomial;
    /// homomorphic operations are therefore polynomial operations.
    pub fn poly() -> Self {
        Self {
            encoding: EncodingEnum::Poly,
        }
    }

    /// A Simd encoding encodes a vector so that homomorphic operations are
    /// component-wise operations on the coefficients of the underlying
    /// vectors. The Simd encoding require that the plaintext modulus is
    /// congruent to 1 modulo the degree of the underlying polynomial.
    pub fn simd() -> Self {
        Self {
            encoding: EncodingEnum::Simd,
        }
    }
}

impl From<Encoding> for String {
    fn from(e: Encoding) -> Self {
        String::from(&e)
    }
}

impl From<&Encoding> for String {
    fn from(e: &Encoding) -> Self {
        e.encoding.to_string()
    }
}

impl FhePlaintextEncoding for Encoding {}
