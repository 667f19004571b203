//! Rounds of the multiparty protocols.
//!
//! A [`Round`] collects exactly one contribution from every party expected in
//! a step of a protocol, and refuses to hand out the contributions before all
//! of them arrived.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::{Error, Result};

use super::Aggregate;

/// The contributions of the parties to one round of a protocol.
#[derive(Debug, Clone)]
pub struct Round<T> {
    parties: Range<usize>,
    shares: BTreeMap<usize, T>,
}

impl<T> Round<T> {
    /// A round expecting a contribution from every party 0..num_parties.
    pub fn all(num_parties: usize) -> Self {
        Self {
            parties: 0..num_parties,
            shares: BTreeMap::new(),
        }
    }

    /// A round expecting a contribution from every participant
    /// 1..num_parties, i.e. every party except the lead.
    pub fn participants(num_parties: usize) -> Self {
        Self {
            parties: 1..num_parties.max(1),
            shares: BTreeMap::new(),
        }
    }

    /// Record the contribution of a party.
    pub fn insert(&mut self, party: usize, share: T) -> Result<()> {
        if !self.parties.contains(&party) {
            return Err(Error::UnexpectedParty(party));
        }
        if self.shares.contains_key(&party) {
            return Err(Error::DuplicateContribution(party));
        }
        self.shares.insert(party, share);
        Ok(())
    }

    /// The number of contributions the round expects.
    pub fn expected(&self) -> usize {
        self.parties.len()
    }

    /// The number of contributions received so far.
    pub fn received(&self) -> usize {
        self.shares.len()
    }

    /// Returns whether every expected party contributed.
    pub fn is_complete(&self) -> bool {
        self.received() == self.expected()
    }

    /// The contributions, ordered by party index.
    pub fn into_shares(self) -> Result<Vec<T>> {
        if !self.is_complete() {
            return Err(Error::IncompleteRound {
                expected: self.expected(),
                found: self.received(),
            });
        }
        Ok(self.shares.into_values().collect())
    }

    /// Aggregate the contributions of a complete round.
    pub fn aggregate<A: Aggregate<T>>(self) -> Result<A> {
        A::from_shares(self.into_shares()?)
    }
}

#[cfg(test)]
mod tests {
    use super::Round;
    use crate::Error;

    #[test]
    fn all() -> Result<(), Error> {
        let mut round = Round::all(3);
        assert_eq!(round.expected(), 3);
        round.insert(2, "c")?;
        round.insert(0, "a")?;
        assert_eq!(
            round.clone().into_shares(),
            Err(Error::IncompleteRound {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(round.insert(2, "d"), Err(Error::DuplicateContribution(2)));
        assert_eq!(round.insert(3, "d"), Err(Error::UnexpectedParty(3)));
        round.insert(1, "b")?;
        assert!(round.is_complete());
        assert_eq!(round.into_shares()?, vec!["a", "b", "c"]);
        Ok(())
    }

    #[test]
    fn participants() -> Result<(), Error> {
        let mut round = Round::participants(3);
        assert_eq!(round.expected(), 2);
        assert_eq!(round.insert(0, 0u64), Err(Error::UnexpectedParty(0)));
        round.insert(1, 1u64)?;
        round.insert(2, 2u64)?;
        assert_eq!(round.into_shares()?, vec![1, 2]);

        // A single party has no participants.
        let round = Round::<u64>::participants(1);
        assert!(round.is_complete());
        assert!(round.into_shares()?.is_empty());
        Ok(())
    }
}
