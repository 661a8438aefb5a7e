//! Hit-testing a pointer against a panel's regions.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::bounds::{Point, Rect};

/// Which part of a panel was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// The square hotzone at the bottom-right corner that starts a resize.
    ResizeHotzone,
    /// The drag handle, as reported by the panel's surface.
    Header,
    /// Anywhere else inside the panel.
    Body,
}

/// Whether `p` lies inside the `hotzone`-sized square at `rect`'s bottom-right corner.
#[must_use]
pub fn in_resize_hotzone(rect: Rect, p: Point, hotzone: f64) -> bool {
    rect.contains(p) && p.x >= rect.right() - hotzone && p.y >= rect.bottom() - hotzone
}

/// Classify `p` against a panel at `rect`.
///
/// The resize hotzone wins over the header so a short panel can still be
/// resized. `header_contains` receives panel-local coordinates.
#[must_use]
pub fn hit_test(rect: Rect, p: Point, hotzone: f64, header_contains: impl Fn(Point) -> bool) -> Option<HitPart> {
    if !rect.contains(p) {
        return None;
    }
    if in_resize_hotzone(rect, p, hotzone) {
        return Some(HitPart::ResizeHotzone);
    }
    if header_contains(rect.to_local(p)) {
        return Some(HitPart::Header);
    }
    Some(HitPart::Body)
}
