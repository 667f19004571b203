use crate::Result;

/// Aggregate shares in an MPC protocol.
///
/// Each protocol of the multiparty scheme ends with the shares of every party
/// being combined into a single value, e.g. the public key shares into the
/// joint public key.
pub trait Aggregate<S>: Sized {
    /// Aggregate shares in an MPC protocol.
    fn from_shares<T>(iter: T) -> Result<Self>
    where
        T: IntoIterator<Item = S>;
}

/// Iterator adapter to aggregate the shares of a protocol.
pub trait AggregateIter<S>: Iterator<Item = S> + Sized {
    /// Aggregate the shares yielded by the iterator.
    fn aggregate<A: Aggregate<S>>(self) -> Result<A> {
        A::from_shares(self)
    }
}

impl<S, I: Iterator<Item = S>> AggregateIter<S> for I {}
