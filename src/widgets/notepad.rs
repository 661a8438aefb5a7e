//! Notepad: free text persisted per panel.

use deck::bounds::Rect;
use deck::store::KeyValueStore;
use deck::surface::{PanelSurface, PanelWidget};
use tracing::{debug, info};

use super::content_key;
use crate::terminal::TerminalSurface;

/// Cloning shares the store, so the console and the manager see the same text.
#[derive(Clone)]
pub struct Notepad {
    store: KeyValueStore,
}

impl Notepad {
    #[must_use]
    pub fn new(store: KeyValueStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn text(&self, id: &str) -> String {
        self.store.get(&content_key(id), String::new())
    }

    /// Replace the note for panel `id`. Returns whether the write landed.
    pub fn set_text(&self, id: &str, text: &str) -> bool {
        let saved = self.store.set(&content_key(id), text);
        info!(panel_id = %id, chars = text.chars().count(), saved, "note updated");
        saved
    }
}

impl PanelWidget for Notepad {
    fn render(&mut self, id: &str, rect: Rect, pinned: bool) -> Box<dyn PanelSurface> {
        Box::new(TerminalSurface::new(id, "Notes", rect, pinned))
    }

    fn on_show(&mut self, id: &str) {
        let text = self.text(id);
        info!(panel_id = %id, note = %text, "note loaded");
    }

    fn on_hide(&mut self, id: &str) {
        debug!(panel_id = %id, "notepad hidden");
    }
}

#[cfg(test)]
#[path = "notepad_test.rs"]
mod tests;
