use crate::model::SdpKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-room storage location in the exchange store.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Offer,
    Answer,
    Candidates,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Offer => "offer",
            Slot::Answer => "answer",
            Slot::Candidates => "candidates",
        }
    }
}

impl From<SdpKind> for Slot {
    fn from(kind: SdpKind) -> Self {
        match kind {
            SdpKind::Offer => Slot::Offer,
            SdpKind::Answer => Slot::Answer,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
