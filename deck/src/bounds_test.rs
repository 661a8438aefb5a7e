#![allow(clippy::float_cmp)]

use super::*;

fn limits(min_w: f64, min_h: f64, max_w: f64, max_h: f64) -> Limits {
    Limits { min_w, min_h, max_w, max_h }
}

fn sample_rects() -> Vec<Rect> {
    vec![
        Rect::new(10.0, 10.0, 280.0, 150.0),
        Rect::new(-50.0, -20.0, 100.0, 90.0),
        Rect::new(900.0, 900.0, 2000.0, 2000.0),
        Rect::new(480.0, 10.0, 280.0, 150.0),
        Rect::new(0.0, 0.0, 0.0, 0.0),
        Rect::new(f64::NAN, f64::INFINITY, f64::NAN, f64::NEG_INFINITY),
    ]
}

fn sample_containers() -> Vec<Size> {
    vec![
        Size::new(500.0, 600.0),
        Size::new(200.0, 200.0),
        Size::new(100.0, 50.0),
        Size::new(0.0, 0.0),
        Size::new(-10.0, f64::NAN),
    ]
}

// =============================================================
// Rect helpers
// =============================================================

#[test]
fn rect_contains_is_half_open() {
    let r = Rect::new(10.0, 10.0, 100.0, 50.0);
    assert!(r.contains(Point::new(10.0, 10.0)));
    assert!(r.contains(Point::new(109.9, 59.9)));
    assert!(!r.contains(Point::new(110.0, 20.0)));
    assert!(!r.contains(Point::new(20.0, 60.0)));
    assert!(!r.contains(Point::new(9.9, 20.0)));
}

#[test]
fn rect_to_local_offsets_by_origin() {
    let r = Rect::new(10.0, 20.0, 100.0, 50.0);
    assert_eq!(r.to_local(Point::new(15.0, 27.0)), Point::new(5.0, 7.0));
}

#[test]
fn rect_edges() {
    let r = Rect::new(10.0, 20.0, 100.0, 50.0);
    assert_eq!(r.right(), 110.0);
    assert_eq!(r.bottom(), 70.0);
    assert_eq!(r.size(), Size::new(100.0, 50.0));
    assert_eq!(r.origin(), Point::new(10.0, 20.0));
}

// =============================================================
// clamp
// =============================================================

#[test]
fn clamp_leaves_valid_rect_untouched() {
    let r = Rect::new(10.0, 10.0, 280.0, 150.0);
    let out = clamp(r, Size::new(500.0, 600.0), limits(150.0, 100.0, 400.0, 500.0));
    assert_eq!(out, r);
}

#[test]
fn clamp_caps_size_at_max() {
    let out = clamp(
        Rect::new(0.0, 0.0, 600.0, 800.0),
        Size::new(1000.0, 1000.0),
        limits(150.0, 100.0, 400.0, 500.0),
    );
    assert_eq!(out.w, 400.0);
    assert_eq!(out.h, 500.0);
}

#[test]
fn clamp_raises_size_to_min() {
    let out = clamp(Rect::new(0.0, 0.0, 20.0, 20.0), Size::new(500.0, 600.0), limits(150.0, 100.0, 400.0, 500.0));
    assert_eq!(out.w, 150.0);
    assert_eq!(out.h, 100.0);
}

#[test]
fn clamp_caps_size_at_container_before_position() {
    let out = clamp(
        Rect::new(10.0, 10.0, 280.0, 150.0),
        Size::new(200.0, 200.0),
        limits(150.0, 100.0, 400.0, 500.0),
    );
    assert_eq!(out, Rect::new(0.0, 10.0, 200.0, 150.0));
}

#[test]
fn clamp_pulls_overflowing_position_back_inside() {
    let out = clamp(
        Rect::new(480.0, 590.0, 280.0, 150.0),
        Size::new(500.0, 600.0),
        limits(150.0, 100.0, 400.0, 500.0),
    );
    assert_eq!(out, Rect::new(220.0, 450.0, 280.0, 150.0));
}

#[test]
fn clamp_negative_position_goes_to_zero() {
    let out = clamp(Rect::new(-40.0, -1.0, 200.0, 120.0), Size::new(500.0, 600.0), Limits::default());
    assert_eq!(out.x, 0.0);
    assert_eq!(out.y, 0.0);
}

#[test]
fn clamp_degenerate_container_saturates_below_min() {
    let out = clamp(Rect::new(30.0, 30.0, 280.0, 150.0), Size::new(100.0, 50.0), limits(150.0, 100.0, 400.0, 500.0));
    assert_eq!(out, Rect::new(0.0, 0.0, 100.0, 50.0));
}

#[test]
fn clamp_zero_container_yields_zero_rect() {
    let out = clamp(Rect::new(30.0, 30.0, 280.0, 150.0), Size::new(0.0, 0.0), Limits::default());
    assert_eq!(out, Rect::new(0.0, 0.0, 0.0, 0.0));
}

#[test]
fn clamp_non_finite_inputs_stay_finite() {
    let out = clamp(
        Rect::new(f64::NAN, f64::INFINITY, f64::NAN, f64::INFINITY),
        Size::new(500.0, 600.0),
        limits(150.0, 100.0, 400.0, 500.0),
    );
    assert_eq!(out, Rect::new(0.0, 100.0, 150.0, 500.0));
}

#[test]
fn clamp_is_idempotent() {
    let lim = limits(150.0, 100.0, 400.0, 500.0);
    for r in sample_rects() {
        for c in sample_containers() {
            let once = clamp(r, c, lim);
            let twice = clamp(once, c, lim);
            assert_eq!(once, twice, "rect {r:?} container {c:?}");
        }
    }
}

#[test]
fn clamp_contains_rect_in_non_degenerate_container() {
    let lim = limits(150.0, 100.0, 400.0, 500.0);
    let containers = [Size::new(500.0, 600.0), Size::new(150.0, 100.0), Size::new(1920.0, 1080.0)];
    for r in sample_rects() {
        for c in containers {
            let out = clamp(r, c, lim);
            assert!(out.x >= 0.0 && out.y >= 0.0, "{out:?}");
            assert!(out.right() <= c.w, "{out:?} in {c:?}");
            assert!(out.bottom() <= c.h, "{out:?} in {c:?}");
            assert!(out.w >= lim.min_w && out.h >= lim.min_h, "{out:?}");
        }
    }
}

// =============================================================
// clamp_position / clamp_size
// =============================================================

#[test]
fn clamp_position_never_changes_size() {
    let out = clamp_position(Rect::new(450.0, -5.0, 280.0, 150.0), Size::new(500.0, 600.0));
    assert_eq!(out, Rect::new(220.0, 0.0, 280.0, 150.0));
}

#[test]
fn clamp_position_wider_than_container_pins_to_left() {
    let out = clamp_position(Rect::new(50.0, 50.0, 800.0, 150.0), Size::new(500.0, 600.0));
    assert_eq!(out.x, 0.0);
    assert_eq!(out.w, 800.0);
}

#[test]
fn clamp_size_ignores_container() {
    let out = clamp_size(Size::new(600.0, 800.0), limits(150.0, 100.0, 400.0, 500.0));
    assert_eq!(out, Size::new(400.0, 500.0));
    let out = clamp_size(Size::new(10.0, 10.0), limits(150.0, 100.0, 400.0, 500.0));
    assert_eq!(out, Size::new(150.0, 100.0));
}

#[test]
fn limits_default_is_finite_and_ordered() {
    let l = Limits::default();
    assert!(l.min_w <= l.max_w && l.min_h <= l.max_h);
    assert!(l.max_w.is_finite() && l.max_h.is_finite());
}
