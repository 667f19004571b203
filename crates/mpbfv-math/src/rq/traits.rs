//! Traits associated with polynomials.

use super::{Context, Representation};
use crate::Result;
use std::sync::Arc;

/// Conversions into a polynomial of a given context and representation.
///
/// The values are interpreted in the requested representation; no NTT is
/// applied during the conversion.
pub trait TryConvertFrom<T>
where
    Self: Sized,
{
    /// Attempt to convert the `value` into a polynomial with a specific
    /// context and representation.
    fn try_convert_from(
        value: T,
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self>;
}
