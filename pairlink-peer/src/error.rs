use pairlink_core::Slot;
use thiserror::Error;

/// Failures of the exchange store surface as seen from a participant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("room not found")]
    RoomNotFound,

    #[error("the {0} slot is already taken")]
    SlotTaken(Slot),

    #[error("room is full")]
    RoomFull,

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("exchange store unavailable: {0}")]
    Unavailable(String),

    #[error("unreadable reply from exchange store: {0}")]
    Decode(String),
}

impl ExchangeError {
    /// Worth retrying on the next poll tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, ExchangeError::Unavailable(_))
    }
}

/// Failures reported by a transport capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("session description rejected: {0}")]
    MalformedDescription(String),

    #[error("candidate rejected: {0}")]
    MalformedCandidate(String),

    #[error("data channel is not open")]
    ChannelUnavailable,

    #[error("transport setup failed: {0}")]
    Setup(String),

    #[error("transport is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("room not found")]
    RoomNotFound,

    #[error("room already has two participants")]
    RoomFull,

    #[error("malformed session description: {0}")]
    MalformedDescription(String),

    #[error("malformed candidate: {0}")]
    MalformedCandidate(String),

    #[error("data channel is not open")]
    ChannelUnavailable,

    #[error("timed out")]
    Timeout,

    #[error("session is closed")]
    SessionClosed,

    #[error(transparent)]
    Exchange(ExchangeError),

    #[error(transparent)]
    Transport(TransportError),
}

impl From<ExchangeError> for PeerError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::RoomNotFound => PeerError::RoomNotFound,
            other => PeerError::Exchange(other),
        }
    }
}

impl From<TransportError> for PeerError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::MalformedDescription(msg) => PeerError::MalformedDescription(msg),
            TransportError::MalformedCandidate(msg) => PeerError::MalformedCandidate(msg),
            TransportError::ChannelUnavailable => PeerError::ChannelUnavailable,
            other => PeerError::Transport(other),
        }
    }
}

pub type Result<T, E = PeerError> = std::result::Result<T, E>;
