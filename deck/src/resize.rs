//! Corner resize gesture: `Idle -> Resizing -> Idle`, plus a debounced commit.
//!
//! A resize starts only from the bottom-right hotzone of an unpinned panel.
//! Live sizes follow the pointer within the panel's own limits; position is
//! left alone. On release a change of at least the threshold on either axis
//! arms a commit that becomes due after the debounce delay. Further
//! resize-ends before it fires replace the pending size and re-arm the
//! delay, so a burst of small final adjustments ends in one write.
//!
//! Native resizes (a CSS `resize` handle observed by the host) feed the same
//! threshold and debounce path through [`ResizeController::observe_native_size`].

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use crate::bounds::{self, Limits, Point, Rect, Size};
use crate::clock::Millis;
use crate::hit;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ResizeState {
    #[default]
    Idle,
    Resizing {
        /// Pointer position at pointer-down.
        pointer_start: Point,
        /// Panel size when the resize started.
        start: Size,
        /// Latest clamped size.
        current: Size,
    },
}

/// A size waiting for its debounce delay to elapse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingCommit {
    pub size: Size,
    pub due_at: Millis,
}

/// Result of releasing the pointer or observing a native resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    /// A commit of `size` is pending until `due_at`.
    Scheduled { size: Size, due_at: Millis },
    /// The change stayed below the threshold and nothing is pending.
    Discard,
    /// No resize was in progress.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ResizeController {
    state: ResizeState,
    pending: Option<PendingCommit>,
    threshold: f64,
    debounce_ms: Millis,
    hotzone: f64,
}

impl ResizeController {
    #[must_use]
    pub fn new(threshold: f64, debounce_ms: Millis, hotzone: f64) -> Self {
        Self { state: ResizeState::Idle, pending: None, threshold, debounce_ms, hotzone }
    }

    #[must_use]
    pub fn state(&self) -> ResizeState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, ResizeState::Resizing { .. })
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingCommit> {
        self.pending
    }

    /// Begin resizing if `pointer` is in the corner hotzone of an unpinned panel.
    pub fn pointer_down(&mut self, pointer: Point, rect: Rect, pinned: bool) -> bool {
        if pinned || self.is_active() || !hit::in_resize_hotzone(rect, pointer, self.hotzone) {
            return false;
        }
        self.state = ResizeState::Resizing { pointer_start: pointer, start: rect.size(), current: rect.size() };
        true
    }

    /// Track the pointer. Returns the new size clamped to `limits`, or `None` when idle.
    pub fn pointer_move(&mut self, pointer: Point, limits: Limits) -> Option<Size> {
        let ResizeState::Resizing { pointer_start, start, current } = &mut self.state else {
            return None;
        };
        let desired = Size::new(start.w + pointer.x - pointer_start.x, start.h + pointer.y - pointer_start.y);
        *current = bounds::clamp_size(desired, limits);
        Some(*current)
    }

    /// Finish the resize; arm or re-arm the debounced commit when significant.
    pub fn pointer_up(&mut self, now: Millis) -> ResizeOutcome {
        let ResizeState::Resizing { start, current, .. } = std::mem::take(&mut self.state) else {
            return ResizeOutcome::Ignored;
        };
        self.settle(start, current, now)
    }

    /// Feed a size reported by a native resize handle. `persisted` is the last committed size.
    pub fn observe_native_size(&mut self, size: Size, persisted: Size, limits: Limits, now: Millis) -> ResizeOutcome {
        self.settle(persisted, bounds::clamp_size(size, limits), now)
    }

    fn settle(&mut self, baseline: Size, size: Size, now: Millis) -> ResizeOutcome {
        let significant =
            (size.w - baseline.w).abs() >= self.threshold || (size.h - baseline.h).abs() >= self.threshold;
        if significant || self.pending.is_some() {
            let due_at = now.saturating_add(self.debounce_ms);
            self.pending = Some(PendingCommit { size, due_at });
            ResizeOutcome::Scheduled { size, due_at }
        } else {
            ResizeOutcome::Discard
        }
    }

    /// Hand out the pending size once its delay has elapsed.
    pub fn take_due(&mut self, now: Millis) -> Option<Size> {
        match self.pending {
            Some(p) if p.due_at <= now => {
                self.pending = None;
                Some(p.size)
            }
            _ => None,
        }
    }

    /// Abandon the gesture and drop any pending commit.
    pub fn cancel(&mut self) {
        self.state = ResizeState::Idle;
        self.pending = None;
    }
}
