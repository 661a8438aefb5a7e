//! Header drag gesture: `Idle -> Dragging -> Idle`.
//!
//! During a drag the controller reports clamped live positions for immediate
//! visual feedback but never persists. On release it compares the final
//! position with the one at drag start; moves below the noise threshold on
//! both axes are discarded. Browsers fire pixel-level moves on plain clicks,
//! and persisting those makes panels creep across reloads.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::bounds::{self, Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Pointer position relative to the panel's top-left at pointer-down.
        offset: Point,
        /// Panel origin when the drag started.
        start: Point,
        /// Latest clamped origin.
        current: Point,
    },
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// Displacement reached the threshold: persist this origin.
    Commit { x: f64, y: f64 },
    /// Displacement stayed below the threshold on both axes.
    Discard,
    /// No drag was in progress.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    threshold: f64,
}

impl DragController {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { state: DragState::Idle, threshold }
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Begin dragging a panel at `rect`. Returns `false` when pinned or already dragging.
    pub fn pointer_down(&mut self, pointer: Point, rect: Rect, pinned: bool) -> bool {
        if pinned || self.is_active() {
            return false;
        }
        self.state = DragState::Dragging {
            offset: rect.to_local(pointer),
            start: rect.origin(),
            current: rect.origin(),
        };
        true
    }

    /// Track the pointer. Returns the new clamped origin, or `None` when idle.
    pub fn pointer_move(&mut self, pointer: Point, size: Size, container: Size) -> Option<Point> {
        let DragState::Dragging { offset, current, .. } = &mut self.state else {
            return None;
        };
        let desired = Rect::new(pointer.x - offset.x, pointer.y - offset.y, size.w, size.h);
        *current = bounds::clamp_position(desired, container).origin();
        Some(*current)
    }

    /// Finish the drag and decide whether it is worth persisting.
    pub fn pointer_up(&mut self) -> DragOutcome {
        let DragState::Dragging { start, current, .. } = std::mem::take(&mut self.state) else {
            return DragOutcome::Ignored;
        };
        let dx = (current.x - start.x).abs();
        let dy = (current.y - start.y).abs();
        if dx >= self.threshold || dy >= self.threshold {
            DragOutcome::Commit { x: current.x, y: current.y }
        } else {
            DragOutcome::Discard
        }
    }

    /// Abandon any drag in progress without an outcome.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
