use crate::error::TransportError;
use crate::transport::{Transport, TransportConfig, TransportEvent, TransportFactory};
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use pairlink_core::{Candidate, Role, SdpKind, SessionDescription};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Label of the single data channel a session uses.
pub const CHAT_CHANNEL_LABEL: &str = "chat";

/// Upper bound on how long `close` waits for queued data to be acknowledged.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

type ChannelSlot = Arc<Mutex<Option<Arc<RTCDataChannel>>>>;

/// [`Transport`] over a `webrtc` peer connection.
///
/// The initiator opens the `chat` data channel before its offer is created so
/// the offer carries an application section; the joiner picks the channel up
/// through `on_data_channel`.
pub struct RtcTransport {
    role: Role,
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: ChannelSlot,
    closed: AtomicBool,
}

impl RtcTransport {
    pub async fn new(
        role: Role,
        config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        let peer_connection = Arc::new(
            build_peer_connection(config)
                .await
                .map_err(|e| TransportError::Setup(format!("{e:#}")))?,
        );
        let data_channel: ChannelSlot = Arc::new(Mutex::new(None));

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("Peer connection state changed ({}): {:?}", role, s);
                    if let Some(event) = connection_state_event(s) {
                        let _ = tx.send(event).await;
                    }
                })
            },
        ));

        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Dropping unserializable local candidate: {}", e);
                        return;
                    }
                };
                debug!("Local candidate gathered: {}", init.candidate);
                let _ = tx
                    .send(TransportEvent::LocalCandidate(from_init(init)))
                    .await;
            })
        }));

        match role {
            Role::Initiator => {
                let dc = peer_connection
                    .create_data_channel(CHAT_CHANNEL_LABEL, None)
                    .await
                    .map_err(|e| TransportError::Setup(format!("data channel: {e}")))?;
                wire_channel(&dc, event_tx);
                *data_channel.lock().await = Some(dc);
            }
            Role::Joiner => {
                let slot = data_channel.clone();
                peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
                    let slot = slot.clone();
                    let tx = event_tx.clone();
                    Box::pin(async move {
                        debug!("Remote data channel '{}' announced", dc.label());
                        wire_channel(&dc, tx);
                        *slot.lock().await = Some(dc);
                    })
                }));
            }
        }

        Ok(Self {
            role,
            peer_connection,
            data_channel,
            closed: AtomicBool::new(false),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    fn ensure_live(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        Ok(())
    }

    async fn apply_local(&self, desc: RTCSessionDescription) -> Result<(), TransportError> {
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(|e| TransportError::Setup(format!("local description: {e}")))
    }
}

#[async_trait]
impl Transport for RtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        self.ensure_live()?;
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| TransportError::Setup(format!("create offer: {e}")))?;
        self.apply_local(offer.clone()).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        self.ensure_live()?;
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| TransportError::Setup(format!("create answer: {e}")))?;
        self.apply_local(answer.clone()).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_remote_description(
        &self,
        desc: &SessionDescription,
    ) -> Result<(), TransportError> {
        self.ensure_live()?;
        let parsed = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp.clone()),
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp.clone()),
        }
        .map_err(|e| TransportError::MalformedDescription(e.to_string()))?;

        self.peer_connection
            .set_remote_description(parsed)
            .await
            .map_err(|e| TransportError::MalformedDescription(e.to_string()))
    }

    async fn add_remote_candidate(&self, candidate: &Candidate) -> Result<(), TransportError> {
        self.ensure_live()?;
        self.peer_connection
            .add_ice_candidate(to_init(candidate))
            .await
            .map_err(|e| TransportError::MalformedCandidate(e.to_string()))
    }

    async fn send(&self, data: Bytes) -> Result<(), TransportError> {
        self.ensure_live()?;
        let dc = self
            .data_channel
            .lock()
            .await
            .clone()
            .ok_or(TransportError::ChannelUnavailable)?;

        if dc.ready_state() != RTCDataChannelState::Open {
            return Err(TransportError::ChannelUnavailable);
        }
        dc.send(&data).await.map_err(|e| {
            warn!("Data channel send failed: {}", e);
            TransportError::ChannelUnavailable
        })?;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        info!("Closing {} transport", self.role);

        let dc = self.data_channel.lock().await.clone();
        if let Some(dc) = dc.filter(|dc| dc.ready_state() == RTCDataChannelState::Open) {
            if !drain(|| dc.buffered_amount(), DRAIN_TIMEOUT).await {
                warn!("Closing {} transport with unsent data", self.role);
            }
        }

        self.peer_connection
            .close()
            .await
            .map_err(|e| TransportError::Setup(format!("close: {e}")))
    }
}

/// Builds [`RtcTransport`]s sharing one [`TransportConfig`].
#[derive(Debug, Clone, Default)]
pub struct RtcTransportFactory {
    config: TransportConfig,
}

impl RtcTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        role: Role,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        let transport = RtcTransport::new(role, &self.config, events).await?;
        Ok(Arc::new(transport))
    }
}

async fn build_peer_connection(config: &TransportConfig) -> anyhow::Result<RTCPeerConnection> {
    let mut m = MediaEngine::default();
    m.register_default_codecs()
        .context("Failed to register codecs")?;
    let registry = register_default_interceptors(Registry::new(), &mut m)
        .context("Failed to register interceptors")?;

    let api = APIBuilder::new()
        .with_media_engine(m)
        .with_interceptor_registry(registry)
        .build();

    let rtc_config = RTCConfiguration {
        ice_servers: config
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    api.new_peer_connection(rtc_config)
        .await
        .context("Failed to create peer connection")
}

fn wire_channel(dc: &Arc<RTCDataChannel>, event_tx: mpsc::Sender<TransportEvent>) {
    let open_tx = event_tx.clone();
    let label = dc.label().to_owned();
    dc.on_open(Box::new(move || {
        let tx = open_tx.clone();
        let label = label.clone();
        Box::pin(async move {
            info!("Data channel '{}' open", label);
            let _ = tx.send(TransportEvent::ChannelOpen).await;
        })
    }));

    let msg_tx = event_tx.clone();
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = msg_tx.clone();
        Box::pin(async move {
            let _ = tx.send(TransportEvent::Message(msg.data)).await;
        })
    }));

    dc.on_close(Box::new(move || {
        let tx = event_tx.clone();
        Box::pin(async move {
            debug!("Data channel closed");
            let _ = tx.send(TransportEvent::ChannelClosed).await;
        })
    }));
}

/// Event a peer connection state change maps to. `Disconnected` is transient
/// and may return to `Connected`, so only `Failed` and `Closed` end a session.
fn connection_state_event(state: RTCPeerConnectionState) -> Option<TransportEvent> {
    match state {
        RTCPeerConnectionState::Failed => {
            Some(TransportEvent::Failed("peer connection failed".into()))
        }
        RTCPeerConnectionState::Closed => Some(TransportEvent::ChannelClosed),
        _ => None,
    }
}

/// Polls `buffered` until it reports nothing queued. Returns `false` if data
/// is still queued after `timeout`.
async fn drain<F, Fut>(mut buffered: F, timeout: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = usize>,
{
    let wait = async {
        loop {
            let queued = buffered().await;
            if queued == 0 {
                return;
            }
            debug!("Waiting for {} buffered bytes", queued);
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(timeout, wait).await.is_ok()
}

fn from_init(init: RTCIceCandidateInit) -> Candidate {
    Candidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_mline_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}

fn to_init(candidate: &Candidate) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate.clone(),
        sdp_mid: candidate.sdp_mid.clone(),
        sdp_mline_index: candidate.sdp_mline_index,
        username_fragment: candidate.username_fragment.clone(),
    }
}
