//! Terminal stand-in for panel chrome.
//!
//! There is no DOM in the native binary, so a panel's "rendering" is a log
//! line per visible change. The header band at the top of each panel is the
//! drag handle, the same as the browser chrome.

use deck::bounds::{Point, Rect};
use deck::surface::PanelSurface;
use tracing::{debug, info};

/// Height of the drag handle at the top of every panel.
pub const HEADER_HEIGHT_PX: f64 = 24.0;

#[derive(Debug)]
pub struct TerminalSurface {
    id: String,
    title: String,
    rect: Rect,
    pinned: bool,
}

impl TerminalSurface {
    #[must_use]
    pub fn new(id: &str, title: impl Into<String>, rect: Rect, pinned: bool) -> Self {
        let title = title.into();
        info!(panel_id = %id, %title, x = rect.x, y = rect.y, w = rect.w, h = rect.h, pinned, "render");
        Self { id: id.to_owned(), title, rect, pinned }
    }
}

impl PanelSurface for TerminalSurface {
    fn header_contains(&self, local: Point) -> bool {
        local.y >= 0.0 && local.y < HEADER_HEIGHT_PX
    }

    fn apply_rect(&mut self, rect: Rect) {
        if rect != self.rect {
            info!(panel_id = %self.id, x = rect.x, y = rect.y, w = rect.w, h = rect.h, "rect");
            self.rect = rect;
        }
    }

    fn set_pinned(&mut self, pinned: bool) {
        if pinned != self.pinned {
            info!(panel_id = %self.id, pinned, "pin");
            self.pinned = pinned;
        }
    }

    fn set_z_index(&mut self, z: usize) {
        debug!(panel_id = %self.id, z, "stack");
    }

    fn remove(&mut self) {
        info!(panel_id = %self.id, title = %self.title, "removed");
    }
}
