//! Travel tracker: live trip status from the travel API.
//!
//! SYSTEM CONTEXT
//! ==============
//! While the panel is shown, one [`PollJob`] keyed by the trip id sits in the
//! shared [`PollScheduler`]. The job is gated on the `travel` ownership
//! lease, so when several sidebar processes share a store only one of them
//! calls the API. Hiding the panel drops the job and releases the lease.
//!
//! ERROR HANDLING
//! ==============
//! A failed poll never blanks the panel: the last good status stays on
//! screen. Once the fast retries are spent, the panel shows an "unavailable"
//! message until a later poll succeeds. The scheduler tries again one TTL
//! after each failure, or at once after `refresh`.

use std::cell::RefCell;
use std::rc::Rc;

use deck::bounds::Rect;
use deck::clock::Millis;
use deck::ownership::{OwnerId, TabOwnership};
use deck::poll::{FetchResult, Fetcher, PollingCache};
use deck::schedule::{PollJob, PollScheduler, ResultHandler};
use deck::surface::{PanelSurface, PanelWidget};
use tracing::{info, warn};

use crate::api::TripStatus;
use crate::terminal::TerminalSurface;

/// Ownership scope for the travel poller.
pub const OWNERSHIP_SCOPE: &str = "travel";

/// What the panel currently displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravelView {
    pub last: Option<TripStatus>,
    pub message: Option<String>,
}

impl TravelView {
    #[must_use]
    pub fn summary(&self) -> String {
        let status = match &self.last {
            Some(s) => match s.eta_minutes {
                Some(eta) => format!("{} to {}: {} (eta {eta} min)", s.trip, s.destination, s.status),
                None => format!("{} to {}: {}", s.trip, s.destination, s.status),
            },
            None => "waiting for data".to_owned(),
        };
        match &self.message {
            Some(message) => format!("{status} [{message}]"),
            None => status,
        }
    }
}

/// Cloning shares the view, cache, and scheduler.
#[derive(Clone)]
pub struct TravelTracker {
    trip: String,
    ttl_ms: Millis,
    max_attempts: u32,
    cache: PollingCache<TripStatus>,
    fetch: Option<Fetcher<TripStatus>>,
    scheduler: Rc<RefCell<PollScheduler>>,
    ownership: TabOwnership,
    owner: OwnerId,
    view: Rc<RefCell<TravelView>>,
}

impl TravelTracker {
    /// `fetch` is `None` when no API credential is configured; the panel then only shows a notice.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trip: impl Into<String>,
        ttl_ms: Millis,
        max_attempts: u32,
        cache: PollingCache<TripStatus>,
        fetch: Option<Fetcher<TripStatus>>,
        scheduler: Rc<RefCell<PollScheduler>>,
        ownership: TabOwnership,
        owner: OwnerId,
    ) -> Self {
        let message = fetch.is_none().then(|| "no API key configured".to_owned());
        Self {
            trip: trip.into(),
            ttl_ms,
            max_attempts,
            cache,
            fetch,
            scheduler,
            ownership,
            owner,
            view: Rc::new(RefCell::new(TravelView { last: None, message })),
        }
    }

    #[must_use]
    pub fn view(&self) -> TravelView {
        self.view.borrow().clone()
    }

    /// Force the next scheduler tick to refetch and retry from scratch.
    pub fn refresh(&self) {
        self.cache.invalidate(&self.trip);
        info!(trip = %self.trip, "travel refresh requested");
    }

    fn result_handler(&self) -> ResultHandler<TripStatus> {
        let view = Rc::clone(&self.view);
        let cache = self.cache.clone();
        let trip = self.trip.clone();
        let max_attempts = self.max_attempts;
        Rc::new(move |result: &FetchResult<TripStatus>| {
            let mut view = view.borrow_mut();
            match result {
                Ok(status) => {
                    view.last = Some(status.clone());
                    view.message = None;
                }
                Err(e) => {
                    let failures = cache.status(&trip).map_or(0, |s| s.failures);
                    if failures >= max_attempts {
                        warn!(%trip, failures, error = %e, "travel retries exhausted; next poll after ttl");
                        view.message = Some(format!("travel data unavailable: {e}"));
                    }
                }
            }
            info!(%trip, summary = %view.summary(), "travel");
        })
    }
}

impl PanelWidget for TravelTracker {
    fn render(&mut self, id: &str, rect: Rect, pinned: bool) -> Box<dyn PanelSurface> {
        if let Some(last) = self.cache.peek(&self.trip) {
            self.view.borrow_mut().last = Some(last);
        }
        Box::new(TerminalSurface::new(id, format!("Trip {}", self.trip), rect, pinned))
    }

    fn on_show(&mut self, id: &str) {
        let Some(fetch) = &self.fetch else {
            warn!(panel_id = %id, "travel panel shown without an API key; not polling");
            return;
        };
        let job = PollJob::new(self.trip.clone(), self.ttl_ms, self.cache.clone(), Rc::clone(fetch))
            .on_result(self.result_handler())
            .owned_by(self.ownership.clone(), self.owner.clone())
            .for_panel(id);
        self.scheduler.borrow_mut().register(job);
        info!(panel_id = %id, trip = %self.trip, ttl_ms = self.ttl_ms, "travel polling registered");
    }

    fn on_hide(&mut self, id: &str) {
        let dropped = self.scheduler.borrow_mut().unregister_panel(id);
        let released = self.ownership.release(&self.owner);
        info!(panel_id = %id, dropped, released, "travel polling stopped");
    }
}

#[cfg(test)]
#[path = "travel_test.rs"]
mod tests;
