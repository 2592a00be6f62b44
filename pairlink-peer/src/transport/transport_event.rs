use bytes::Bytes;
use pairlink_core::Candidate;

/// Notifications a transport pushes to the session runner.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A local ICE candidate was gathered and should be published.
    LocalCandidate(Candidate),

    ChannelOpen,

    /// Raw payload received on the data channel.
    Message(Bytes),

    ChannelClosed,

    /// The connection failed and will not recover.
    Failed(String),
}
