mod http_exchange;

pub use http_exchange::HttpExchange;

use crate::error::ExchangeError;
use async_trait::async_trait;
use pairlink_core::{CandidateRecord, Entry, RoomId, Slot, SlotValue};

/// The shared `(room, slot)` rendezvous surface both participants talk to.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Write-once for descriptions, append for candidates. Returns the slot length.
    async fn put(&self, room: &RoomId, entry: Entry) -> Result<usize, ExchangeError>;

    /// `Ok(None)` when the slot has not been written.
    async fn get(&self, room: &RoomId, slot: Slot) -> Result<Option<SlotValue>, ExchangeError>;

    /// Candidate entries from index `from` onward.
    async fn candidates_since(
        &self,
        room: &RoomId,
        from: usize,
    ) -> Result<Vec<CandidateRecord>, ExchangeError> {
        match self.get(room, Slot::Candidates).await? {
            Some(SlotValue::Candidates(all)) => Ok(all.into_iter().skip(from).collect()),
            Some(SlotValue::Description(_)) => Err(ExchangeError::Decode(
                "expected a candidate list".to_owned(),
            )),
            None => Err(ExchangeError::RoomNotFound),
        }
    }
}
