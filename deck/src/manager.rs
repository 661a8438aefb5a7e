//! Panel manager: shows, hides, and routes input to named panels.
//!
//! DESIGN
//! ======
//! The manager owns one [`PanelEntry`] per registered widget. Showing a panel
//! loads its [`PanelLayout`], asks the widget to render a [`PanelSurface`],
//! and attaches a fresh drag and resize controller. Pointer events arrive as
//! plain points; the manager hit-tests the topmost panel, runs the matching
//! controller, and returns [`PanelEvent`]s describing what happened. The
//! surface receives live rects during gestures, the layout receives commits
//! only when a controller decides the change is significant.
//!
//! Timers are not owned here. The host calls [`PanelManager::tick`] from its
//! single scheduler loop; due resize commits flush there.
//! [`PanelManager::next_deadline`] tells the host when that next matters.
//!
//! PERSISTENCE
//! ===========
//! Per panel: `panel:<id>:layout` (see [`crate::layout`]), `panel:<id>:open`
//! and `panel:<id>:defaults`. The last two let [`PanelManager::restore`]
//! reopen whatever was visible on the previous load.
//!
//! TRADE-OFFS
//! ==========
//! Container resizes re-clamp layouts in memory only. Writing on every host
//! resize would persist transient window sizes; the next real commit carries
//! the clamped values instead.

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::bounds::{self, Point, Rect, Size};
use crate::clock::{Clock, Millis};
use crate::config::DeckConfig;
use crate::drag::{DragController, DragOutcome};
use crate::hit::{self, HitPart};
use crate::input::{Button, Gesture};
use crate::layout::{LayoutUpdate, PanelDefaults, PanelId, PanelLayout, layout_key};
use crate::resize::{ResizeController, ResizeOutcome};
use crate::store::KeyValueStore;
use crate::surface::{PanelSurface, PanelWidget};

/// Storage key for a panel's open flag.
#[must_use]
pub fn open_key(id: &str) -> String {
    format!("panel:{id}:open")
}

/// Storage key for the defaults a panel was last shown with.
#[must_use]
pub fn defaults_key(id: &str) -> String {
    format!("panel:{id}:defaults")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("no widget registered for panel {0:?}")]
    Unregistered(PanelId),
}

/// Events returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// Live feedback during a gesture or container change. Nothing persisted.
    Moved { id: PanelId, rect: Rect },
    /// A layout change was written to the store.
    Committed { id: PanelId, rect: Rect },
    /// A gesture ended below its threshold; the panel snapped back.
    Discarded { id: PanelId },
    /// A resize commit is waiting for its debounce delay.
    ResizeScheduled { id: PanelId, size: Size, due_at: Millis },
    /// The panel moved to the top of the stack.
    Raised { id: PanelId },
}

struct LivePanel {
    layout: PanelLayout,
    surface: Box<dyn PanelSurface>,
    /// What the surface currently shows. Differs from the layout mid-gesture.
    live: Rect,
    drag: DragController,
    resize: ResizeController,
}

impl LivePanel {
    /// Persisted rect, with any size still waiting on the debounce.
    fn settled_rect(&self) -> Rect {
        let rect = self.layout.rect();
        match self.resize.pending() {
            Some(pending) => Rect::new(rect.x, rect.y, pending.size.w, pending.size.h),
            None => rect,
        }
    }

    fn show_rect(&mut self, rect: Rect) {
        self.live = rect;
        self.surface.apply_rect(rect);
    }

    fn is_gesturing(&self) -> bool {
        self.drag.is_active() || self.resize.is_active()
    }
}

struct PanelEntry {
    widget: Box<dyn PanelWidget>,
    shown: Option<LivePanel>,
}

pub struct PanelManager {
    store: KeyValueStore,
    config: DeckConfig,
    clock: Rc<dyn Clock>,
    container: Size,
    panels: HashMap<PanelId, PanelEntry>,
    /// Shown panels, bottom to top.
    z_order: Vec<PanelId>,
    gesture: Gesture,
}

impl PanelManager {
    #[must_use]
    pub fn new(store: KeyValueStore, config: DeckConfig, clock: Rc<dyn Clock>, container: Size) -> Self {
        Self {
            store,
            config,
            clock,
            container,
            panels: HashMap::new(),
            z_order: Vec::new(),
            gesture: Gesture::Idle,
        }
    }

    // --- Lifecycle ---

    /// Register `widget` under `id`. Replacing a shown panel hides it first.
    pub fn register(&mut self, id: impl Into<PanelId>, widget: Box<dyn PanelWidget>) {
        let id = id.into();
        if self.hide(&id) {
            debug!(panel_id = %id, "re-registered shown panel; hidden");
        }
        self.panels.insert(id, PanelEntry { widget, shown: None });
    }

    #[must_use]
    pub fn is_registered(&self, id: &str) -> bool {
        self.panels.contains_key(id)
    }

    /// Show panel `id`. Returns `Ok(false)` when it is already shown.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Unregistered`] when no widget is registered for `id`.
    pub fn show(&mut self, id: &str, defaults: PanelDefaults) -> Result<bool, PanelError> {
        let now = self.clock.now_ms();
        let entry = self.panels.get_mut(id).ok_or_else(|| PanelError::Unregistered(id.to_owned()))?;
        if entry.shown.is_some() {
            return Ok(false);
        }

        let layout = PanelLayout::load(&self.store, id, self.container, &defaults, now);
        let rect = layout.rect();
        let surface = entry.widget.render(id, rect, layout.pinned());
        entry.shown = Some(LivePanel {
            layout,
            surface,
            live: rect,
            drag: DragController::new(self.config.drag_threshold_px),
            resize: ResizeController::new(
                self.config.resize_threshold_px,
                self.config.resize_debounce_ms,
                self.config.resize_hotzone_px,
            ),
        });
        entry.widget.on_show(id);

        self.store.set(&open_key(id), &true);
        self.store.set(&defaults_key(id), &defaults);
        self.z_order.push(id.to_owned());
        self.restack();
        info!(panel_id = %id, ?rect, "panel shown");
        Ok(true)
    }

    /// Hide panel `id`, dropping its controllers and any pending resize commit.
    pub fn hide(&mut self, id: &str) -> bool {
        let Some(entry) = self.panels.get_mut(id) else {
            return false;
        };
        let Some(mut live) = entry.shown.take() else {
            return false;
        };
        if let Some(pending) = live.resize.pending() {
            debug!(panel_id = %id, size = ?pending.size, "dropping pending resize commit");
        }
        live.drag.cancel();
        live.resize.cancel();
        live.surface.remove();
        entry.widget.on_hide(id);

        self.z_order.retain(|shown| shown != id);
        if self.gesture.panel_id() == Some(id) {
            self.gesture = Gesture::Idle;
        }
        self.store.set(&open_key(id), &false);
        self.restack();
        info!(panel_id = %id, "panel hidden");
        true
    }

    #[must_use]
    pub fn is_shown(&self, id: &str) -> bool {
        self.panels.get(id).is_some_and(|entry| entry.shown.is_some())
    }

    /// Hide `id` if shown and forget everything persisted for it. Returns whether a layout existed.
    pub fn delete(&mut self, id: &str) -> bool {
        self.hide(id);
        let existed = self.store.contains(&layout_key(id));
        PanelLayout::delete(&self.store, id);
        self.store.remove(&open_key(id));
        self.store.remove(&defaults_key(id));
        info!(panel_id = %id, existed, "panel deleted");
        existed
    }

    /// Show every registered panel whose open flag is set. Returns how many were shown.
    pub fn restore(&mut self) -> usize {
        let ids: Vec<PanelId> = self
            .store
            .keys_with_prefix("panel:")
            .iter()
            .filter_map(|key| key.strip_prefix("panel:").and_then(|rest| rest.strip_suffix(":open")))
            .map(str::to_owned)
            .collect();

        let mut restored = 0;
        for id in ids {
            if !self.store.get(&open_key(&id), false) {
                continue;
            }
            let Some(defaults) = self.store.get_opt::<PanelDefaults>(&defaults_key(&id)) else {
                warn!(panel_id = %id, "open panel has no stored defaults; skipping");
                continue;
            };
            match self.show(&id, defaults) {
                Ok(true) => restored += 1,
                Ok(false) => {}
                Err(e) => debug!(panel_id = %id, error = %e, "skipping restore"),
            }
        }
        info!(restored, "restored open panels");
        restored
    }

    // --- Layout ---

    /// Pin or unpin `id`. A pending resize is flushed before pinning. Returns whether anything changed.
    pub fn set_pinned(&mut self, id: &str, pinned: bool) -> bool {
        let now = self.clock.now_ms();
        let Some(live) = self.live_mut(id) else {
            return false;
        };
        if pinned {
            if let Some(pending) = live.resize.pending() {
                live.layout.commit(LayoutUpdate::size(pending.size), now);
            }
            live.drag.cancel();
            live.resize.cancel();
        }
        if !live.layout.commit(LayoutUpdate::pinned(pinned), now) {
            return false;
        }
        live.surface.set_pinned(pinned);
        let rect = live.settled_rect();
        live.show_rect(rect);
        if pinned && self.gesture.panel_id() == Some(id) {
            self.gesture = Gesture::Idle;
        }
        info!(panel_id = %id, pinned, "pin changed");
        true
    }

    /// Flip the pinned flag. Returns the new state, or `None` when `id` is not shown.
    pub fn toggle_pin(&mut self, id: &str) -> Option<bool> {
        let pinned = !self.layout(id)?.pinned();
        self.set_pinned(id, pinned);
        Some(pinned)
    }

    /// Re-clamp every shown panel against a new container size.
    pub fn set_container(&mut self, container: Size) -> Vec<PanelEvent> {
        self.container = container;
        let mut events = Vec::new();
        for id in &self.z_order {
            let Some(live) = self.panels.get_mut(id).and_then(|entry| entry.shown.as_mut()) else {
                continue;
            };
            live.layout.reclamp(container);
            let rect = bounds::clamp(live.live, container, live.layout.limits());
            if rect != live.live {
                live.show_rect(rect);
                events.push(PanelEvent::Moved { id: id.clone(), rect });
            }
        }
        debug!(width = container.w, height = container.h, moved = events.len(), "container resized");
        events
    }

    // --- Input ---

    /// Start a drag or resize on the topmost panel under `point`.
    pub fn pointer_down(&mut self, point: Point, button: Button) -> Vec<PanelEvent> {
        if button != Button::Primary || !self.gesture.is_idle() {
            return Vec::new();
        }
        let Some(id) = self.topmost_at(point).map(str::to_owned) else {
            return Vec::new();
        };
        let mut events = Vec::new();
        if self.raise(&id) {
            events.push(PanelEvent::Raised { id: id.clone() });
        }

        let hotzone = self.config.resize_hotzone_px;
        let Some(live) = self.live_mut(&id) else {
            return events;
        };
        let rect = live.live;
        let pinned = live.layout.pinned();
        let part = hit::hit_test(rect, point, hotzone, |local| live.surface.header_contains(local));
        let gesture = match part {
            Some(HitPart::ResizeHotzone) if live.resize.pointer_down(point, rect, pinned) => {
                Gesture::Resizing { panel_id: id }
            }
            Some(HitPart::Header) if live.drag.pointer_down(point, rect, pinned) => Gesture::Dragging { panel_id: id },
            _ => Gesture::Idle,
        };
        if !gesture.is_idle() {
            debug!(?gesture, "gesture started");
        }
        self.gesture = gesture;
        events
    }

    /// Feed a pointer position to the active gesture.
    pub fn pointer_move(&mut self, point: Point) -> Vec<PanelEvent> {
        let container = self.container;
        let (id, dragging) = match &self.gesture {
            Gesture::Idle => return Vec::new(),
            Gesture::Dragging { panel_id } => (panel_id.clone(), true),
            Gesture::Resizing { panel_id } => (panel_id.clone(), false),
        };
        let Some(live) = self.live_mut(&id) else {
            return Vec::new();
        };
        let current = live.live;
        let next = if dragging {
            live.drag
                .pointer_move(point, current.size(), container)
                .map(|origin| Rect::new(origin.x, origin.y, current.w, current.h))
        } else {
            live.resize
                .pointer_move(point, live.layout.limits())
                .map(|size| Rect::new(current.x, current.y, size.w, size.h))
        };
        match next {
            Some(rect) if rect != current => {
                live.show_rect(rect);
                vec![PanelEvent::Moved { id, rect }]
            }
            _ => Vec::new(),
        }
    }

    /// End the active gesture at `point` and commit, schedule, or discard it.
    pub fn pointer_up(&mut self, point: Point, button: Button) -> Vec<PanelEvent> {
        if button != Button::Primary {
            return Vec::new();
        }
        let mut events = self.pointer_move(point);
        let gesture = std::mem::take(&mut self.gesture);
        let Some(id) = gesture.panel_id().map(str::to_owned) else {
            return events;
        };
        let now = self.clock.now_ms();
        let Some(live) = self.live_mut(&id) else {
            return events;
        };

        let settle = match gesture {
            Gesture::Dragging { .. } => match live.drag.pointer_up() {
                DragOutcome::Commit { x, y } => Some(live.layout.commit(LayoutUpdate::position(x, y), now)),
                DragOutcome::Discard => Some(false),
                DragOutcome::Ignored => None,
            },
            Gesture::Resizing { .. } => match live.resize.pointer_up(now) {
                ResizeOutcome::Scheduled { size, due_at } => {
                    debug!(panel_id = %id, ?size, due_at, "resize commit scheduled");
                    events.push(PanelEvent::ResizeScheduled { id: id.clone(), size, due_at });
                    None
                }
                ResizeOutcome::Discard => Some(false),
                ResizeOutcome::Ignored => None,
            },
            Gesture::Idle => None,
        };

        let Some(committed) = settle else {
            return events;
        };
        let rect = live.settled_rect();
        live.show_rect(rect);
        if committed {
            info!(panel_id = %id, ?rect, "drag committed");
            events.push(PanelEvent::Committed { id, rect: live.layout.rect() });
        } else {
            debug!(panel_id = %id, "gesture below threshold; discarded");
            events.push(PanelEvent::Discarded { id });
        }
        events
    }

    /// Feed a size reported by the host's native resize handle for `id`.
    pub fn native_resize(&mut self, id: &str, size: Size) -> Vec<PanelEvent> {
        let now = self.clock.now_ms();
        let Some(live) = self.live_mut(id) else {
            return Vec::new();
        };
        if live.layout.pinned() {
            let rect = live.layout.rect();
            live.show_rect(rect);
            return vec![PanelEvent::Discarded { id: id.to_owned() }];
        }
        let limits = live.layout.limits();
        let outcome = live.resize.observe_native_size(size, live.layout.rect().size(), limits, now);
        let size = bounds::clamp_size(size, limits);
        let rect = Rect::new(live.live.x, live.live.y, size.w, size.h);
        if rect != live.live {
            live.show_rect(rect);
        }
        match outcome {
            ResizeOutcome::Scheduled { size, due_at } => {
                vec![PanelEvent::ResizeScheduled { id: id.to_owned(), size, due_at }]
            }
            ResizeOutcome::Discard | ResizeOutcome::Ignored => Vec::new(),
        }
    }

    /// Flush resize commits whose debounce delay has elapsed.
    pub fn tick(&mut self) -> Vec<PanelEvent> {
        let now = self.clock.now_ms();
        let mut events = Vec::new();
        for id in &self.z_order {
            let Some(live) = self.panels.get_mut(id).and_then(|entry| entry.shown.as_mut()) else {
                continue;
            };
            let Some(size) = live.resize.take_due(now) else {
                continue;
            };
            let committed = live.layout.commit(LayoutUpdate::size(size), now);
            let rect = live.layout.rect();
            if !live.is_gesturing() {
                live.show_rect(rect);
            }
            if committed {
                info!(panel_id = %id, ?rect, "resize committed");
                events.push(PanelEvent::Committed { id: id.clone(), rect });
            }
        }
        events
    }

    /// Earliest pending resize commit across shown panels.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.panels
            .values()
            .filter_map(|entry| entry.shown.as_ref())
            .filter_map(|live| live.resize.pending())
            .map(|pending| pending.due_at)
            .min()
    }

    // --- Queries ---

    #[must_use]
    pub fn layout(&self, id: &str) -> Option<&PanelLayout> {
        self.panels.get(id).and_then(|entry| entry.shown.as_ref()).map(|live| &live.layout)
    }

    /// The rect currently on screen, which may differ from the layout mid-gesture.
    #[must_use]
    pub fn live_rect(&self, id: &str) -> Option<Rect> {
        self.panels.get(id).and_then(|entry| entry.shown.as_ref()).map(|live| live.live)
    }

    /// Shown panels, bottom to top.
    #[must_use]
    pub fn shown_ids(&self) -> &[PanelId] {
        &self.z_order
    }

    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    #[must_use]
    pub fn container(&self) -> Size {
        self.container
    }

    #[must_use]
    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    /// The topmost shown panel whose on-screen rect contains `point`.
    #[must_use]
    pub fn topmost_at(&self, point: Point) -> Option<&str> {
        self.z_order
            .iter()
            .rev()
            .find(|id| {
                self.panels
                    .get(id.as_str())
                    .and_then(|entry| entry.shown.as_ref())
                    .is_some_and(|live| live.live.contains(point))
            })
            .map(String::as_str)
    }

    // --- Internals ---

    fn live_mut(&mut self, id: &str) -> Option<&mut LivePanel> {
        self.panels.get_mut(id).and_then(|entry| entry.shown.as_mut())
    }

    fn raise(&mut self, id: &str) -> bool {
        let Some(pos) = self.z_order.iter().position(|shown| shown == id) else {
            return false;
        };
        if pos + 1 == self.z_order.len() {
            return false;
        }
        let id = self.z_order.remove(pos);
        self.z_order.push(id);
        self.restack();
        true
    }

    fn restack(&mut self) {
        for (z, id) in self.z_order.iter().enumerate() {
            if let Some(live) = self.panels.get_mut(id).and_then(|entry| entry.shown.as_mut()) {
                live.surface.set_z_index(z);
            }
        }
    }
}
