#![allow(missing_docs)]
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublicKeyShare {
    #[prost(bytes = "vec", tag = "1")]
    pub p0_share: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub crp: ::prost::alloc::vec::Vec<u8>,
    /// 1 for the lead party, 2 for a participant.
    #[prost(uint32, tag = "3")]
    pub role: u32,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DecryptionShare {
    /// 1 for the lead party, 2 for a participant.
    #[prost(uint32, tag = "1")]
    pub role: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub h_share: ::prost::alloc::vec::Vec<u8>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MaskedDecryptionShare {
    #[prost(bytes = "vec", tag = "1")]
    pub h_share: ::prost::alloc::vec::Vec<u8>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EncryptionShare {
    #[prost(bytes = "vec", tag = "1")]
    pub share: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub crp: ::prost::alloc::vec::Vec<u8>,
}
