use crate::transport::TransportConfig;
use std::time::Duration;

/// Participant-side settings.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub answer_poll_interval: Duration,
    pub candidate_poll_interval: Duration,
    /// Fresh room IDs to try when a generated one is already taken.
    pub room_id_attempts: usize,
    pub transport: TransportConfig,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            answer_poll_interval: Duration::from_secs(1),
            candidate_poll_interval: Duration::from_secs(1),
            room_id_attempts: 5,
            transport: TransportConfig::default(),
        }
    }
}
