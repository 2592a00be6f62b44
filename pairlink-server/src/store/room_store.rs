use crate::store::{RoomRecord, StoreError};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use pairlink_core::{CandidateRecord, Entry, RoomId, SdpKind, Slot, SlotValue};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Shared `(room, slot)` store. Every put is atomic under the room's shard lock.
pub struct RoomStore {
    rooms: DashMap<RoomId, RoomRecord>,
    max_candidates: usize,
}

impl RoomStore {
    pub fn new(max_candidates: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            max_candidates,
        }
    }

    /// Writes `entry` into `slot`. Descriptions are write-once, candidates append.
    /// Returns the slot's length after the write.
    pub fn put(&self, room: &RoomId, slot: Slot, entry: Entry) -> Result<usize, StoreError> {
        if entry.slot() != slot {
            return Err(StoreError::KindMismatch(slot));
        }

        match entry {
            Entry::Description(desc) if desc.kind == SdpKind::Offer => {
                match self.rooms.entry(room.clone()) {
                    MapEntry::Occupied(_) => Err(StoreError::SlotTaken(Slot::Offer)),
                    MapEntry::Vacant(vacant) => {
                        vacant.insert(RoomRecord::new(desc));
                        info!("Room {} opened with an offer", room);
                        Ok(1)
                    }
                }
            }

            Entry::Description(desc) => {
                let mut record = self.rooms.get_mut(room).ok_or(StoreError::OfferMissing)?;
                if record.answer.is_some() {
                    return Err(StoreError::SlotTaken(Slot::Answer));
                }
                record.answer = Some(desc);
                record.touch();
                info!("Room {} received its answer", room);
                Ok(1)
            }

            Entry::Candidate(candidate) => {
                let mut record = self.rooms.get_mut(room).ok_or(StoreError::OfferMissing)?;
                if record.candidates.len() >= self.max_candidates {
                    return Err(StoreError::RoomFull(self.max_candidates));
                }
                record.candidates.push(candidate);
                record.touch();
                let len = record.candidates.len();
                debug!("Room {} candidate #{} appended", room, len);
                Ok(len)
            }
        }
    }

    /// Current value of a slot, or `None` when nothing has been written there.
    pub fn get(&self, room: &RoomId, slot: Slot) -> Option<SlotValue> {
        let mut record = self.rooms.get_mut(room)?;
        record.touch();

        match slot {
            Slot::Offer => Some(SlotValue::Description(record.offer.clone())),
            Slot::Answer => record.answer.clone().map(SlotValue::Description),
            Slot::Candidates => Some(SlotValue::Candidates(record.candidates.clone())),
        }
    }

    /// Candidate entries starting at index `from`; `None` if the room is unknown.
    pub fn candidates_since(&self, room: &RoomId, from: usize) -> Option<Vec<CandidateRecord>> {
        let mut record = self.rooms.get_mut(room)?;
        record.touch();
        Some(record.candidates.iter().skip(from).cloned().collect())
    }

    pub fn contains(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Drops rooms idle for longer than `ttl`. Returns how many were removed.
    pub fn expire_idle(&self, ttl: Duration) -> usize {
        match Instant::now().checked_sub(ttl) {
            Some(cutoff) => self.expire_before(cutoff),
            None => 0,
        }
    }

    fn expire_before(&self, cutoff: Instant) -> usize {
        let before = self.rooms.len();
        self.rooms.retain(|_, record| record.last_active >= cutoff);
        before.saturating_sub(self.rooms.len())
    }
}
