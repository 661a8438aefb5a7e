//! Per-panel layout record: position, size, pinned flag.
//!
//! A [`PanelLayout`] is loaded from the [`KeyValueStore`] every time its panel
//! is shown, clamped against the current container, and written back only on
//! [`PanelLayout::commit`]. Controllers decide when a change is significant
//! enough to commit; this module only guarantees that whatever is committed is
//! clamped and that identical commits do not rewrite storage.
//!
//! Stored layouts from a previously larger window are healed on load: if
//! clamping changes them, the corrected values are persisted immediately.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bounds::{self, Limits, Rect, Size};
use crate::clock::Millis;
use crate::store::KeyValueStore;

/// Identifier for a panel. Chosen by the composition root, stable across reloads.
pub type PanelId = String;

/// Storage key for a panel's layout record.
#[must_use]
pub fn layout_key(id: &str) -> String {
    format!("panel:{id}:layout")
}

/// Initial rect and size limits for a panel that has never been saved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelDefaults {
    pub rect: Rect,
    #[serde(default)]
    pub limits: Limits,
}

impl PanelDefaults {
    #[must_use]
    pub fn new(rect: Rect, limits: Limits) -> Self {
        Self { rect, limits }
    }
}

/// On-disk shape of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutRecord {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    pinned: bool,
    #[serde(default)]
    modified_at: Millis,
}

impl LayoutRecord {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Sparse layout change. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub pinned: Option<bool>,
}

impl LayoutUpdate {
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    #[must_use]
    pub fn size(size: Size) -> Self {
        Self { width: Some(size.w), height: Some(size.h), ..Self::default() }
    }

    #[must_use]
    pub fn pinned(pinned: bool) -> Self {
        Self { pinned: Some(pinned), ..Self::default() }
    }

    fn touches_geometry(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.width.is_some() || self.height.is_some()
    }
}

/// Live layout of one shown panel.
#[derive(Clone)]
pub struct PanelLayout {
    id: PanelId,
    store: KeyValueStore,
    rect: Rect,
    pinned: bool,
    modified_at: Millis,
    limits: Limits,
    container: Size,
}

impl std::fmt::Debug for PanelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelLayout")
            .field("id", &self.id)
            .field("rect", &self.rect)
            .field("pinned", &self.pinned)
            .field("modified_at", &self.modified_at)
            .finish_non_exhaustive()
    }
}

impl PanelLayout {
    /// Load the layout for `id`, falling back to `defaults`, clamped to `container`.
    pub fn load(store: &KeyValueStore, id: &str, container: Size, defaults: &PanelDefaults, now: Millis) -> Self {
        let stored: Option<LayoutRecord> = store.get_opt(&layout_key(id));
        let (raw, pinned, modified_at) = match stored {
            Some(record) => (record.rect(), record.pinned, record.modified_at),
            None => (defaults.rect, false, now),
        };
        let rect = bounds::clamp(raw, container, defaults.limits);
        let layout = Self {
            id: id.to_owned(),
            store: store.clone(),
            rect,
            pinned,
            modified_at,
            limits: defaults.limits,
            container,
        };
        if stored.is_some() && rect != raw {
            info!(panel_id = %id, ?raw, ?rect, "stored layout out of bounds; persisting clamped values");
            layout.persist();
        }
        layout
    }

    /// Merge `update`, re-clamp, and persist. Returns `false` when nothing changed.
    ///
    /// While the panel is pinned the rect is frozen: geometry fields are ignored
    /// unless the same update also unpins.
    pub fn commit(&mut self, update: LayoutUpdate, now: Millis) -> bool {
        let pinned = update.pinned.unwrap_or(self.pinned);
        let mut next = self.rect;
        if self.pinned && pinned {
            if update.touches_geometry() {
                debug!(panel_id = %self.id, "ignoring geometry change on pinned panel");
            }
        } else {
            if let Some(x) = update.x {
                next.x = x;
            }
            if let Some(y) = update.y {
                next.y = y;
            }
            if let Some(w) = update.width {
                next.w = w;
            }
            if let Some(h) = update.height {
                next.h = h;
            }
        }
        let next = bounds::clamp(next, self.container, self.limits);
        if next == self.rect && pinned == self.pinned {
            return false;
        }
        self.rect = next;
        self.pinned = pinned;
        self.modified_at = now;
        self.persist();
        true
    }

    /// Re-clamp against a new container size. In memory only; the next commit persists it.
    pub fn reclamp(&mut self, container: Size) -> bool {
        self.container = container;
        let next = bounds::clamp(self.rect, container, self.limits);
        if next == self.rect {
            return false;
        }
        self.rect = next;
        true
    }

    /// Delete the stored layout for `id`.
    pub fn delete(store: &KeyValueStore, id: &str) -> bool {
        store.remove(&layout_key(id))
    }

    fn persist(&self) -> bool {
        let record = LayoutRecord {
            x: self.rect.x,
            y: self.rect.y,
            width: self.rect.w,
            height: self.rect.h,
            pinned: self.pinned,
            modified_at: self.modified_at,
        };
        self.store.set(&layout_key(&self.id), &record)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[must_use]
    pub fn pinned(&self) -> bool {
        self.pinned
    }

    #[must_use]
    pub fn modified_at(&self) -> Millis {
        self.modified_at
    }

    #[must_use]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    #[must_use]
    pub fn container(&self) -> Size {
        self.container
    }
}
