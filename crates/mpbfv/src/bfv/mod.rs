#![warn(missing_docs, unused_imports)]

//! The Brakerski-Fan-Vercauteren homomorphic encryption scheme

mod ciphertext;
mod encoding;
mod keys;
mod ops;
mod parameters;
mod plaintext;
pub mod traits;

pub use ciphertext::Ciphertext;
pub use encoding::Encoding;
pub use keys::{
    EvaluationKey, GaloisKey, KeySwitchingKey, PublicKey, RelinearizationKey, SecretKey,
};
pub use ops::Multiplicator;
pub use parameters::{BfvParameters, BfvParametersBuilder};
pub use plaintext::Plaintext;
