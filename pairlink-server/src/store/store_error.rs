use pairlink_core::Slot;
use thiserror::Error;

/// Protocol violations rejected by the room store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no offer has been published for this room")]
    OfferMissing,

    #[error("the {0} slot has already been written")]
    SlotTaken(Slot),

    #[error("entry does not belong in the {0} slot")]
    KindMismatch(Slot),

    #[error("room already holds the maximum of {0} candidates")]
    RoomFull(usize),
}
