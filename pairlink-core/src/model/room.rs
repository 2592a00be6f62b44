use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of generated room identifiers.
pub const ROOM_ID_LEN: usize = 9;

/// Namespace key shared out-of-band between the two participants.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Fresh base-36 token, e.g. `ab12cd345`.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..ROOM_ID_LEN)
            .filter_map(|_| char::from_digit(rng.gen_range(0..36), 36))
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
