use crate::model::Role;
use serde::{Deserialize, Serialize};

/// ICE candidate in its JSON init form.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct Candidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_mline_index: Option<u16>,
    #[serde(default)]
    pub username_fragment: Option<String>,
}

/// One entry of a room's shared candidate sequence.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct CandidateRecord {
    pub from: Role,
    pub candidate: Candidate,
}

impl CandidateRecord {
    pub fn new(from: Role, candidate: Candidate) -> Self {
        Self { from, candidate }
    }
}
