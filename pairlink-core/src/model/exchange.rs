use crate::model::{CandidateRecord, SessionDescription, Slot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single write to the exchange store. The slot follows from the variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d")]
pub enum Entry {
    /// Write-once description (offer or answer, by its kind).
    Description(SessionDescription),
    /// Appended to the candidate sequence.
    Candidate(CandidateRecord),
}

impl Entry {
    pub fn slot(&self) -> Slot {
        match self {
            Entry::Description(desc) => desc.kind.into(),
            Entry::Candidate(_) => Slot::Candidates,
        }
    }
}

/// Current content of a slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SlotValue {
    Description(SessionDescription),
    Candidates(Vec<CandidateRecord>),
}

/// Reply to a candidate append.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppendReceipt {
    pub len: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    RoomNotFound,
    /// The room exists but nothing has been written to the requested slot.
    SlotEmpty,
    SlotTaken,
    KindMismatch,
    RoomFull,
    BadRequest,
}

/// JSON error payload returned by the exchange service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}
