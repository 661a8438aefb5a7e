//! Ticker service: one timer for debounced resizes and every poll job.
//!
//! DESIGN
//! ======
//! A local task wakes every `tick_ms`, flushes due resize commits, and
//! starts whatever polls are due. Each tick's polls finish in their own
//! task, so a slow request never holds back the next resize flush. The
//! cache marks a started fetch as in flight, so later ticks do not repeat it.

use std::time::Duration;

use deck::schedule::JobReport;
use futures::future::LocalBoxFuture;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use crate::app::SharedApp;

/// Spawn the ticker on the current `LocalSet`. Returns a handle for shutdown.
pub fn spawn_ticker(app: SharedApp, every: Duration) -> JoinHandle<()> {
    tokio::task::spawn_local(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let polls = app.borrow_mut().tick();
            tokio::task::spawn_local(report_polls(polls));
        }
    })
}

/// Wait for one tick's polls and log failures. Returns how many ran.
pub async fn report_polls(polls: LocalBoxFuture<'static, Vec<JobReport>>) -> usize {
    let reports = polls.await;
    for report in &reports {
        if let Err(e) = &report.outcome {
            warn!(key = %report.key, error = %e, "poll failed");
        }
    }
    reports.len()
}

#[cfg(test)]
#[path = "ticker_test.rs"]
mod tests;
