//! Periodic purge of expired URL records.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::application::services::UrlService;

/// Runs [`UrlService::run_cleanup_once`] every `interval`, forever.
///
/// The first purge happens one full interval after start. Failures are logged
/// and the next tick tries again; the loop never returns on its own and is
/// stopped by aborting its task.
pub async fn run_cleanup_worker(service: Arc<UrlService>, interval: Duration) {
    let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match service.run_cleanup_once().await {
            Ok(0) => info!("Cleanup finished, nothing expired"),
            Ok(deleted) => info!(deleted, "Cleanup removed expired URLs"),
            Err(e) => error!("Cleanup failed: {}", e),
        }
    }
}
