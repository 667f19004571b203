//! Protobuf definitions for the types exchanged between parties.

/// Protobuf for the BFV encryption scheme.
pub mod bfv;
/// Protobuf for the multiparty protocols.
pub mod mbfv;
