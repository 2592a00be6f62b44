use crate::config::ServerConfig;
use crate::store::RoomStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

struct SignalingInner {
    store: RoomStore,
    config: ServerConfig,
}

/// Shared state behind the HTTP handlers.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                store: RoomStore::new(config.max_candidates_per_room),
                config,
            }),
        }
    }

    pub fn store(&self) -> &RoomStore {
        &self.inner.store
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Periodically drops idle rooms until the handle is aborted.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let service = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(service.config().sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let removed = service.store().expire_idle(service.config().room_ttl);
                if removed > 0 {
                    info!(
                        "Expired {} idle room(s), {} remaining",
                        removed,
                        service.store().len()
                    );
                }
            }
        })
    }
}
