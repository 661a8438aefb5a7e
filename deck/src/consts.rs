//! Shared numeric defaults for the deck crate.
//!
//! These are empirically tuned against observed drift, not derived. Every one
//! of them can be overridden through [`crate::config::DeckConfig`].

// ── Gestures ────────────────────────────────────────────────────

/// Minimum drag displacement (either axis) in pixels before a move is persisted.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// Minimum resize delta (either axis) in pixels before a size change is persisted.
pub const RESIZE_THRESHOLD_PX: f64 = 10.0;

/// Delay between the last resize-end and the persisted write.
pub const RESIZE_DEBOUNCE_MS: u64 = 200;

/// Edge length of the square resize hotzone at a panel's bottom-right corner.
pub const RESIZE_HOTZONE_PX: f64 = 16.0;

// ── Panel limits ────────────────────────────────────────────────

pub const DEFAULT_MIN_WIDTH: f64 = 150.0;
pub const DEFAULT_MIN_HEIGHT: f64 = 100.0;
pub const DEFAULT_MAX_WIDTH: f64 = 1200.0;
pub const DEFAULT_MAX_HEIGHT: f64 = 1200.0;

// ── Tab ownership ───────────────────────────────────────────────

/// Age after which an ownership heartbeat is considered abandoned.
pub const OWNERSHIP_STALE_MS: u64 = 5_000;

/// How often an owner renews its heartbeat. Must stay below [`OWNERSHIP_STALE_MS`].
pub const HEARTBEAT_INTERVAL_MS: u64 = 2_000;

// ── Polling ─────────────────────────────────────────────────────

/// Consecutive failures after which automatic polling of a key stops.
pub const POLL_MAX_ATTEMPTS: u32 = 3;

/// First retry delay after a failed fetch; doubles per consecutive failure.
pub const POLL_BACKOFF_BASE_MS: u64 = 1_000;

/// Upper bound on the retry delay.
pub const POLL_BACKOFF_CAP_MS: u64 = 30_000;
