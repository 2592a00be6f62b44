use pairlink_core::{CandidateRecord, SessionDescription};
use std::time::Instant;

/// Everything published under one room. A record exists iff an offer does.
#[derive(Debug, Clone)]
pub struct RoomRecord {
    pub offer: SessionDescription,
    pub answer: Option<SessionDescription>,
    pub candidates: Vec<CandidateRecord>,
    pub last_active: Instant,
}

impl RoomRecord {
    pub fn new(offer: SessionDescription) -> Self {
        Self {
            offer,
            answer: None,
            candidates: Vec::new(),
            last_active: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}
