//! # Stats Broadcaster
//!
//! Background task that keeps the "TOTAL COLLECTED" banners in sync.
//!
//! ```text
//! StatsBroadcaster (background task)
//!              │
//!              └── Every STATS_BROADCAST_INTERVAL: read totals
//!                         │
//!                         └── anyone on /ws/all? → total_collected
//! ```
//!
//! Donations also push a fresh total as they are recorded; the ticker
//! covers clients that connected in between.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, error, info};

use super::donations::DonationService;
use super::ServiceError;
use crate::websocket::{WsRegistry, ALL_CHANNEL};

#[derive(Clone)]
pub struct StatsBroadcaster {
    donations: DonationService,
    ws_registry: WsRegistry,
    interval_secs: u64,
}

impl StatsBroadcaster {
    pub fn new(donations: DonationService, ws_registry: WsRegistry, interval_secs: u64) -> Self {
        Self {
            donations,
            ws_registry,
            interval_secs: interval_secs.max(1),
        }
    }

    /// Run until `shutdown` flips to `true`.
    ///
    /// ```rust,ignore
    /// let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    /// tokio::spawn(async move { broadcaster.start(shutdown_rx).await });
    /// ```
    pub async fn start(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "📡 Starting stats broadcaster (every {}s)",
            self.interval_secs
        );

        let mut ticker = interval(Duration::from_secs(self.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        error!("Stats broadcast failed: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Stats broadcaster stopped");
                        break;
                    }
                }
            }
        }
    }

    /// One broadcast. Skips the store read when nobody listens.
    /// Returns the number of connections reached.
    pub async fn tick(&self) -> Result<usize, ServiceError> {
        if self.ws_registry.connection_count(ALL_CHANNEL).await == 0 {
            debug!("No live counter listeners, skipping broadcast");
            return Ok(0);
        }

        let stats = self.donations.stats().await?;
        let sent = self
            .ws_registry
            .publish_total(&stats)
            .await
            .map_err(ServiceError::Broadcast)?;

        debug!("Broadcast total {} to {} connections", stats.formatted_total, sent);
        Ok(sent)
    }
}
