use crate::error::ExchangeError;
use crate::exchange::Exchange;
use crate::transport::Transport;
use pairlink_core::{Candidate, CandidateRecord, Entry, RoomId, Role};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

/// Moves ICE candidates between a transport and the room's shared candidate
/// sequence.
///
/// Outgoing candidates are queued and published in discovery order. Incoming
/// entries are read from a cursor into the sequence; the relay's own entries
/// are skipped and each distinct candidate reaches the transport at most once.
pub struct CandidateRelay {
    room: RoomId,
    role: Role,
    exchange: Arc<dyn Exchange>,
    cursor: usize,
    delivered: HashSet<Candidate>,
    outbox: VecDeque<Candidate>,
}

impl CandidateRelay {
    pub fn new(room: RoomId, role: Role, exchange: Arc<dyn Exchange>) -> Self {
        Self {
            room,
            role,
            exchange,
            cursor: 0,
            delivered: HashSet::new(),
            outbox: VecDeque::new(),
        }
    }

    /// Index of the next sequence entry this relay will read.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Local candidates still waiting to be published.
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    pub async fn on_local_candidate_discovered(
        &mut self,
        candidate: Candidate,
    ) -> Result<(), ExchangeError> {
        self.outbox.push_back(candidate);
        self.flush().await
    }

    /// Publishes queued candidates in order. A transient failure leaves the
    /// failed candidate and everything after it queued.
    pub async fn flush(&mut self) -> Result<(), ExchangeError> {
        while let Some(candidate) = self.outbox.front() {
            let record = CandidateRecord::new(self.role, candidate.clone());
            match self.exchange.put(&self.room, Entry::Candidate(record)).await {
                Ok(len) => {
                    debug!("Published local candidate as entry #{} of room {}", len, self.room);
                    self.outbox.pop_front();
                }
                Err(e) if e.is_transient() => return Err(e),
                Err(e) => {
                    self.outbox.pop_front();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Feeds the peer's new candidates to `transport` in sequence order.
    /// Returns how many were accepted.
    pub async fn poll_for_remote_candidates(
        &mut self,
        transport: &dyn Transport,
    ) -> Result<usize, ExchangeError> {
        let batch = self
            .exchange
            .candidates_since(&self.room, self.cursor)
            .await?;

        let mut accepted = 0;
        for record in batch {
            self.cursor += 1;
            if record.from == self.role {
                continue;
            }
            if !self.delivered.insert(record.candidate.clone()) {
                debug!("Candidate already delivered: {}", record.candidate.candidate);
                continue;
            }

            match transport.add_remote_candidate(&record.candidate).await {
                Ok(()) => {
                    debug!("Remote candidate applied: {}", record.candidate.candidate);
                    accepted += 1;
                }
                Err(e) => warn!("Skipping remote candidate {}: {}", record.candidate.candidate, e),
            }
        }

        Ok(accepted)
    }
}
