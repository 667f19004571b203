use crate::{Error, Result};

/// The role of a party in the protocols.
///
/// Party 0 is the lead: its decryption share carries the first component of
/// the ciphertext, and it is the one decrypting the masked ciphertext when
/// converting a ciphertext to shares. Every other party is a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The lead party, with index 0.
    Lead,
    /// Any other party.
    Participant,
}

impl Role {
    /// The role of the party with the given index.
    pub const fn of(party: usize) -> Self {
        if party == 0 {
            Role::Lead
        } else {
            Role::Participant
        }
    }

    /// Returns whether this is the lead role.
    pub const fn is_lead(&self) -> bool {
        matches!(self, Role::Lead)
    }
}

impl From<Role> for u32 {
    fn from(role: Role) -> Self {
        match role {
            Role::Lead => 1,
            Role::Participant => 2,
        }
    }
}

impl TryFrom<u32> for Role {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(Role::Lead),
            2 => Ok(Role::Participant),
            _ => Err(Error::SerializationError),
        }
    }
}
