//! Protobuf messages of the math crate.

/// A polynomial in R_q, stored modulus by modulus.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Rq {
    /// 1 for PowerBasis, 2 for Ntt.
    #[prost(uint32, tag = "1")]
    pub representation: u32,
    #[prost(uint32, tag = "2")]
    pub degree: u32,
    #[prost(uint64, repeated, tag = "3")]
    pub coefficients: ::prost::alloc::vec::Vec<u64>,
}
