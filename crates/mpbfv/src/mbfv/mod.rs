#![warn(missing_docs, unused_imports)]

//! The Multiparty BFV scheme, as described by Christian Mouchet et. al., with
//! share-conversion bootstrapping.
//!
//! N parties each hold a share of the joint secret key. Party 0 is the lead;
//! the order in which the parties act in each protocol matters. The building
//! blocks (key shares, decryption shares, message shares) can be exchanged
//! between processes, and [`protocol`] drives whole sessions in-process.

mod aggregate;
pub mod config;
mod crp;
mod decryption;
pub mod protocol;
mod public_key_gen;
mod relin_key_gen;
mod role;
mod rotation_key_gen;
mod round;
mod share_conversion;

pub use aggregate::{Aggregate, AggregateIter};
pub use config::ProtocolConfig;
pub use crp::CommonRandomPoly;
pub use decryption::DecryptionShare;
pub use protocol::{
    encryption_to_shares, joint_key_gen, joint_relinearization_key_gen, joint_rotation_key_gen,
    multiparty_bootstrap, shares_to_encryption, threshold_decrypt,
};
pub use public_key_gen::PublicKeyShare;
pub use relin_key_gen::{JointKeySwitchKey, KeySwitchAccumulator, RelinKeyShare};
pub use role::Role;
pub use rotation_key_gen::RotationKeyAccumulator;
pub use round::Round;
pub use share_conversion::{EncryptionShare, MaskedDecryptionShare, MessageShare};
