#![crate_name = "mpbfv_math"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Mathematical utilities for the mpbfv library: modular arithmetic, the
//! number-theoretic transform, residue number systems and polynomial rings.

mod errors;
mod proto;

pub mod ntt;
pub mod rns;
pub mod rq;
pub mod zq;

pub use errors::{Error, Result};
