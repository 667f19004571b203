use crate::rq::Representation;
use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates an invalid modulus
    #[error("Invalid modulus: modulus {0} should be between 2 and (1 << 62) - 1.")]
    InvalidModulus(u64),

    /// Indicates an error in the serialization / deserialization.
    #[error("{0}")]
    Serialization(String),

    /// Indicates that there is no more contexts to switch to.
    #[error("Invalid context provided.")]
    InvalidContext,

    /// Indicates that the provided context is not compatible with the value.
    #[error("Incorrect representation: found {0:?}, expected {1:?}")]
    IncorrectRepresentation(Representation, Representation),

    /// Indicates a default error
    #[error("{0}")]
    Default(String),
}
