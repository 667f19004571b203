//! Keys for the BFV encryption scheme

mod evaluation_key;
mod galois_key;
mod key_switching_key;
mod public_key;
mod relinearization_key;
mod secret_key;

pub use evaluation_key::EvaluationKey;
pub use galois_key::GaloisKey;
pub use key_switching_key::KeySwitchingKey;
pub use public_key::PublicKey;
pub use relinearization_key::RelinearizationKey;
pub use secret_key::SecretKey;
