//! Heartbeat service: keeps the travel polling lease alive.
//!
//! The lease goes stale after `ownership_stale_ms`; the heartbeat interval
//! is normalized to be shorter, so a live owner never loses it to a
//! takeover. A process whose travel panel is hidden releases the lease on
//! its next beat.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::SharedApp;

/// Spawn the heartbeat on the current `LocalSet`. Returns a handle for shutdown.
pub fn spawn_heartbeat(app: SharedApp, every: Duration) -> JoinHandle<()> {
    tokio::task::spawn_local(async move {
        let mut interval = tokio::time::interval(every);
        let mut owned = false;
        loop {
            interval.tick().await;
            let now_owned = app.borrow().heartbeat();
            if now_owned != owned {
                debug!(owned = now_owned, "polling ownership changed");
                owned = now_owned;
            }
        }
    })
}

#[cfg(test)]
#[path = "heartbeat_test.rs"]
mod tests;
