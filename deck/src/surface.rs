//! Rendering seam between the manager and concrete widgets.
//!
//! The manager never touches markup. A [`PanelWidget`] renders its chrome
//! into whatever the host uses (DOM nodes, a terminal, a test log) and hands
//! back a [`PanelSurface`]. The manager drives the surface with plain data:
//! rects to apply, pinned state, stacking order, removal.

use crate::bounds::{Point, Rect};

/// A rendered panel as seen by the manager.
pub trait PanelSurface {
    /// Whether the panel-local point lies on the drag handle.
    fn header_contains(&self, local: Point) -> bool;

    /// Move and size the rendered panel. Called for live feedback and after commits.
    fn apply_rect(&mut self, rect: Rect);

    fn set_pinned(&mut self, pinned: bool);

    /// Stacking position among shown panels; higher is on top.
    fn set_z_index(&mut self, z: usize);

    /// Tear down the rendered output. The surface is dropped afterwards.
    fn remove(&mut self);
}

/// Lifecycle hooks for one kind of panel.
pub trait PanelWidget {
    /// Render chrome for panel `id` at `rect`.
    fn render(&mut self, id: &str, rect: Rect, pinned: bool) -> Box<dyn PanelSurface>;

    /// Called after the panel is shown and its surface is in place.
    fn on_show(&mut self, _id: &str) {}

    /// Called after the panel's surface has been removed.
    fn on_hide(&mut self, _id: &str) {}
}
