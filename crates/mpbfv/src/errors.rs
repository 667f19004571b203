use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that an error from the underlying mathematical library was
    /// encountered.
    #[error("{0}")]
    MathError(#[from] mpbfv_math::Error),

    /// Indicates a serialization error.
    #[error("Serialization error")]
    SerializationError,

    /// Indicates that too many values were provided.
    #[error("Too many values provided: {0} exceeds limit {1}")]
    TooManyValues(usize, usize),

    /// Indicates that too few values were provided.
    #[error("Too few values provided: {0} is below limit {1}")]
    TooFewValues(usize, usize),

    /// Indicates that an input is invalid.
    #[error("{0}")]
    UnspecifiedInput(String),

    /// Indicates a mismatch in the encodings.
    #[error("Encoding mismatch: found {0}, expected {1}")]
    EncodingMismatch(String, String),

    /// Indicates that the encoding is not supported.
    #[error("Does not support {0} encoding")]
    EncodingNotSupported(String),

    /// Indicates a parameter error.
    #[error("{0}")]
    ParametersError(#[from] ParametersError),

    /// Indicates that the number of contributions does not match the number
    /// of parties.
    #[error("Expected {expected} parties, found {found}")]
    PartyCountMismatch {
        /// The number of parties of the session.
        expected: usize,
        /// The number of contributions received.
        found: usize,
    },

    /// Indicates that no rotation key was generated for this rotation.
    #[error("No rotation key for a rotation by {0}")]
    MissingRotationKey(i32),

    /// Indicates that a round is aggregated before every party contributed.
    #[error("Incomplete round: {found} of {expected} contributions received")]
    IncompleteRound {
        /// The number of contributions the round expects.
        expected: usize,
        /// The number of contributions received.
        found: usize,
    },

    /// Indicates that a party contributed twice to the same round.
    #[error("Party {0} already contributed to this round")]
    DuplicateContribution(usize),

    /// Indicates that a party is not expected in this round.
    #[error("Party {0} does not take part in this round")]
    UnexpectedParty(usize),

    /// Indicates that no share was produced by the lead party.
    #[error("Missing the share of the lead party")]
    MissingLeadShare,

    /// Indicates that more than one share claims the lead role.
    #[error("More than one share of the lead party")]
    TooManyLeadShares,

    /// Indicates a default error.
    #[error("{0}")]
    DefaultError(String),
}

/// Separate enum to indicate parameters-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParametersError {
    /// Indicates that the degree is invalid.
    #[error("Invalid degree: {0} is not a power of 2 larger than 8")]
    InvalidDegree(usize),

    /// Indicates that the moduli sizes are invalid.
    #[error("Invalid modulus size: {0}, should be between {1} and {2} bits")]
    InvalidModulusSize(usize, usize, usize),

    /// Indicates that there exists not enough primes of this size.
    #[error("Not enough primes of size {0} for polynomials of degree {1}")]
    NotEnoughPrimes(usize, usize),

    /// Indicates that the plaintext is invalid.
    #[error("{0}")]
    InvalidPlaintext(String),

    /// Indicates that too many parameters were specified.
    #[error("{0}")]
    TooManySpecified(String),

    /// Indicates that too few parameters were specified.
    #[error("{0}")]
    TooFewSpecified(String),
}
