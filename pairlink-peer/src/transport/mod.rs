mod rtc_transport;
mod transport_config;
mod transport_event;

pub use rtc_transport::{RtcTransport, RtcTransportFactory};
pub use transport_config::TransportConfig;
pub use transport_event::TransportEvent;

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use pairlink_core::{Candidate, Role, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Peer-to-peer connection capability used by a session.
///
/// `create_offer` and `create_answer` also install the result as the local
/// description. Everything the connection reports on its own (local
/// candidates, channel lifecycle, incoming data) arrives as [`TransportEvent`]s
/// on the channel the transport was created with.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    async fn set_remote_description(&self, desc: &SessionDescription)
    -> Result<(), TransportError>;

    async fn add_remote_candidate(&self, candidate: &Candidate) -> Result<(), TransportError>;

    /// Fails with [`TransportError::ChannelUnavailable`] unless the data channel is open.
    async fn send(&self, data: Bytes) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        role: Role,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn Transport>, TransportError>;
}
