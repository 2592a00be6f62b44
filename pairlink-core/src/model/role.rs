use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the room a participant is on.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Created the room and published the offer.
    Initiator,
    /// Read the offer and published the answer.
    Joiner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => write!(f, "initiator"),
            Role::Joiner => write!(f, "joiner"),
        }
    }
}
