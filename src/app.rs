//! Composition root: one sidebar process.
//!
//! DESIGN
//! ======
//! `App` owns the [`PanelManager`], the shared [`PollScheduler`], and the
//! widgets registered with it. Everything runs on one thread; the console,
//! the ticker, and the heartbeat share the app through [`SharedApp`] and
//! never hold the borrow across an await point.
//!
//! SYSTEM CONTEXT
//! ==============
//! Several sidebar processes may point at the same store file. Layout and
//! notes are last-writer-wins; travel polling is gated on the ownership
//! lease so only one process talks to the API at a time.

use std::cell::RefCell;
use std::rc::Rc;

use deck::bounds::{Limits, Rect};
use deck::clock::Clock;
use deck::config::DeckConfig;
use deck::layout::PanelDefaults;
use deck::manager::{PanelError, PanelEvent, PanelManager};
use deck::ownership::{OwnerId, TabOwnership};
use deck::poll::{Fetcher, PollingCache};
use deck::schedule::{JobReport, PollScheduler};
use deck::store::KeyValueStore;
use futures::future::LocalBoxFuture;
use tracing::{debug, info, warn};

use crate::api::TripStatus;
use crate::config::AppConfig;
use crate::widgets::notepad::Notepad;
use crate::widgets::travel::{OWNERSHIP_SCOPE, TravelTracker};

pub const NOTES_PANEL: &str = "notes";
pub const TRAVEL_PANEL: &str = "travel";

const PANEL_LIMITS: Limits = Limits { min_w: 160.0, min_h: 80.0, max_w: 320.0, max_h: 600.0 };

pub type SharedApp = Rc<RefCell<App>>;

/// First-show geometry for the built-in panels.
#[must_use]
pub fn panel_defaults(id: &str) -> Option<PanelDefaults> {
    let rect = match id {
        NOTES_PANEL => Rect::new(10.0, 10.0, 280.0, 150.0),
        TRAVEL_PANEL => Rect::new(10.0, 180.0, 280.0, 160.0),
        _ => return None,
    };
    Some(PanelDefaults::new(rect, PANEL_LIMITS))
}

pub struct App {
    store: KeyValueStore,
    manager: PanelManager,
    scheduler: Rc<RefCell<PollScheduler>>,
    notepad: Notepad,
    travel: TravelTracker,
    ownership: TabOwnership,
    owner: OwnerId,
}

impl App {
    /// Wire the manager, scheduler, and widgets over `store`.
    ///
    /// `fetch` is `None` when no API key is configured.
    #[must_use]
    pub fn build(
        config: &AppConfig,
        store: KeyValueStore,
        clock: Rc<dyn Clock>,
        fetch: Option<Fetcher<TripStatus>>,
    ) -> Self {
        let deck_config = DeckConfig::from_store(&store);
        let owner = OwnerId::generate();
        let ownership =
            TabOwnership::new(store.clone(), OWNERSHIP_SCOPE, deck_config.ownership_stale_ms, Rc::clone(&clock));
        let scheduler = Rc::new(RefCell::new(PollScheduler::new(deck_config.poll_max_attempts)));
        let cache = PollingCache::new(Rc::clone(&clock), deck_config.backoff());

        let notepad = Notepad::new(store.clone());
        let travel = TravelTracker::new(
            config.trip.clone(),
            config.poll_ttl_ms,
            deck_config.poll_max_attempts,
            cache,
            fetch,
            Rc::clone(&scheduler),
            ownership.clone(),
            owner.clone(),
        );

        let mut manager = PanelManager::new(store.clone(), deck_config, clock, config.container);
        manager.register(NOTES_PANEL, Box::new(notepad.clone()));
        manager.register(TRAVEL_PANEL, Box::new(travel.clone()));
        info!(owner = %owner, namespace = %config.namespace, "sidebar built");

        Self { store, manager, scheduler, notepad, travel, ownership, owner }
    }

    /// Reopen what was open last time; on a first run, open every panel.
    pub fn start(&mut self) -> usize {
        let first_run = !self.store.keys_with_prefix("panel:").iter().any(|key| key.ends_with(":open"));
        if !first_run {
            return self.manager.restore();
        }
        let mut shown = 0;
        for id in [NOTES_PANEL, TRAVEL_PANEL] {
            if matches!(self.show(id), Ok(true)) {
                shown += 1;
            }
        }
        shown
    }

    /// Show a built-in panel at its stored or default geometry.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Unregistered`] for ids the app does not know.
    pub fn show(&mut self, id: &str) -> Result<bool, PanelError> {
        let defaults = panel_defaults(id).ok_or_else(|| PanelError::Unregistered(id.to_owned()))?;
        self.manager.show(id, defaults)
    }

    /// Flush due resize commits, then start due polls.
    ///
    /// The returned future holds no borrow of the app.
    pub fn tick(&mut self) -> LocalBoxFuture<'static, Vec<JobReport>> {
        for event in self.manager.tick() {
            if let PanelEvent::Committed { id, rect } = event {
                debug!(panel_id = %id, ?rect, "debounced resize flushed");
            }
        }
        self.scheduler.borrow().tick()
    }

    /// Keep the polling lease alive while the travel panel is shown.
    ///
    /// Returns whether this process owns polling afterwards.
    pub fn heartbeat(&self) -> bool {
        if self.manager.is_shown(TRAVEL_PANEL) {
            self.ownership.claim(&self.owner)
        } else {
            self.ownership.release(&self.owner);
            false
        }
    }

    pub fn shutdown(&mut self) {
        if let Some(due_at) = self.manager.next_deadline() {
            warn!(due_at, "exiting with a resize commit still debouncing");
        }
        let released = self.ownership.release(&self.owner);
        info!(owner = %self.owner, released, "sidebar shutting down");
    }

    #[must_use]
    pub fn manager(&self) -> &PanelManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut PanelManager {
        &mut self.manager
    }

    #[must_use]
    pub fn notepad(&self) -> &Notepad {
        &self.notepad
    }

    #[must_use]
    pub fn travel(&self) -> &TravelTracker {
        &self.travel
    }

    #[must_use]
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
