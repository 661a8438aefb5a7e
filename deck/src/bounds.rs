//! Geometry primitives and rectangle clamping.
//!
//! All coordinates are CSS pixels relative to the container's content box.
//! The clamp functions are pure and total: non-finite inputs and containers
//! smaller than a panel's minimum size still yield a usable rectangle.
//!
//! EDGE CASE
//! =========
//! When the container is narrower than `min_w`, width saturates at the
//! container width, which is below `min_w`. Fitting the container wins over
//! honoring the minimum. The same holds for height.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH};

/// A point in container space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a container or panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    #[must_use]
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }
}

/// Axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Convert a container-space point into coordinates relative to this rect's corner.
    #[must_use]
    pub fn to_local(&self, p: Point) -> Point {
        Point::new(p.x - self.x, p.y - self.y)
    }
}

/// Panel-defined size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub min_w: f64,
    pub min_h: f64,
    pub max_w: f64,
    pub max_h: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_w: DEFAULT_MIN_WIDTH,
            min_h: DEFAULT_MIN_HEIGHT,
            max_w: DEFAULT_MAX_WIDTH,
            max_h: DEFAULT_MAX_HEIGHT,
        }
    }
}

/// Clamp `rect` into `container`, respecting `limits`.
///
/// Size is clamped first to `[min, min(max, container)]`, then position to
/// `[0, max(0, container - size)]` on each axis.
#[must_use]
pub fn clamp(rect: Rect, container: Size, limits: Limits) -> Rect {
    let container = sanitize_container(container);
    let w = clamp_len(rect.w, limits.min_w, limits.max_w.min(container.w));
    let h = clamp_len(rect.h, limits.min_h, limits.max_h.min(container.h));
    clamp_position(Rect::new(rect.x, rect.y, w, h), container)
}

/// Clamp only the position of `rect`, keeping its size as given.
///
/// Used while dragging: moving a panel never resizes it.
#[must_use]
pub fn clamp_position(rect: Rect, container: Size) -> Rect {
    let container = sanitize_container(container);
    let max_x = (container.w - rect.w).max(0.0);
    let max_y = (container.h - rect.h).max(0.0);
    Rect::new(clamp_coord(rect.x, max_x), clamp_coord(rect.y, max_y), rect.w, rect.h)
}

/// Clamp a size to the panel's own limits, ignoring the container.
///
/// Used while resizing: the live size follows the pointer within `limits`;
/// fitting into the container happens when the size is committed.
#[must_use]
pub fn clamp_size(size: Size, limits: Limits) -> Size {
    Size::new(clamp_len(size.w, limits.min_w, limits.max_w), clamp_len(size.h, limits.min_h, limits.max_h))
}

// `f64::max`/`f64::min` return the non-NaN operand, which is what keeps
// these helpers total for NaN and infinite inputs.

fn sanitize_container(container: Size) -> Size {
    Size::new(container.w.max(0.0), container.h.max(0.0))
}

fn clamp_len(len: f64, min: f64, upper: f64) -> f64 {
    let upper = upper.max(0.0);
    len.max(min).min(upper)
}

fn clamp_coord(v: f64, max: f64) -> f64 {
    v.max(0.0).min(max)
}
