use std::net::SocketAddr;
use std::time::Duration;

/// Settings for the exchange store service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Rooms untouched for this long are dropped by the sweeper.
    pub room_ttl: Duration,
    pub sweep_interval: Duration,
    pub max_candidates_per_room: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            room_ttl: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(60),
            max_candidates_per_room: 256,
            max_body_bytes: 64 * 1024,
        }
    }
}
