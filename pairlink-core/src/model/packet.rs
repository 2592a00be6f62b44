use serde::{Deserialize, Serialize};

pub type PacketError = postcard::Error;

/// Payload framing on the data channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Packet {
    Chat { text: String },
    /// Sent by a participant that is closing the session.
    Leave,
}

impl Packet {
    pub fn chat(text: impl Into<String>) -> Self {
        Packet::Chat { text: text.into() }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        postcard::to_allocvec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        postcard::from_bytes(bytes)
    }
}
