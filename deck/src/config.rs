//! Tunable thresholds and timings for the deck.
//!
//! Every field defaults to the constant of the same name in [`crate::consts`].
//! A host can persist a partial JSON object under [`DeckConfig::STORE_KEY`];
//! missing fields keep their defaults.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::Millis;
use crate::consts::{
    DRAG_THRESHOLD_PX, HEARTBEAT_INTERVAL_MS, OWNERSHIP_STALE_MS, POLL_BACKOFF_BASE_MS, POLL_BACKOFF_CAP_MS,
    POLL_MAX_ATTEMPTS, RESIZE_DEBOUNCE_MS, RESIZE_HOTZONE_PX, RESIZE_THRESHOLD_PX,
};
use crate::poll::Backoff;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeckConfig {
    pub drag_threshold_px: f64,
    pub resize_threshold_px: f64,
    pub resize_debounce_ms: Millis,
    pub resize_hotzone_px: f64,
    pub ownership_stale_ms: Millis,
    pub heartbeat_interval_ms: Millis,
    pub poll_max_attempts: u32,
    pub poll_backoff_base_ms: Millis,
    pub poll_backoff_cap_ms: Millis,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: DRAG_THRESHOLD_PX,
            resize_threshold_px: RESIZE_THRESHOLD_PX,
            resize_debounce_ms: RESIZE_DEBOUNCE_MS,
            resize_hotzone_px: RESIZE_HOTZONE_PX,
            ownership_stale_ms: OWNERSHIP_STALE_MS,
            heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS,
            poll_max_attempts: POLL_MAX_ATTEMPTS,
            poll_backoff_base_ms: POLL_BACKOFF_BASE_MS,
            poll_backoff_cap_ms: POLL_BACKOFF_CAP_MS,
        }
    }
}

impl DeckConfig {
    pub const STORE_KEY: &'static str = "config";

    /// Load overrides from `store`, then normalize.
    #[must_use]
    pub fn from_store(store: &KeyValueStore) -> Self {
        store.get(Self::STORE_KEY, Self::default()).normalized()
    }

    #[must_use]
    pub fn backoff(&self) -> Backoff {
        Backoff { base_ms: self.poll_backoff_base_ms, cap_ms: self.poll_backoff_cap_ms }
    }

    /// Repair values that would break invariants between fields.
    ///
    /// Thresholds must be finite and non-negative, the heartbeat must fire
    /// before the staleness window closes, the backoff cap cannot undercut
    /// its base, and at least one poll attempt is always allowed.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        self.drag_threshold_px = non_negative_or(self.drag_threshold_px, defaults.drag_threshold_px);
        self.resize_threshold_px = non_negative_or(self.resize_threshold_px, defaults.resize_threshold_px);
        self.resize_hotzone_px = non_negative_or(self.resize_hotzone_px, defaults.resize_hotzone_px);
        if self.ownership_stale_ms == 0 {
            self.ownership_stale_ms = defaults.ownership_stale_ms;
        }
        if self.heartbeat_interval_ms == 0 || self.heartbeat_interval_ms >= self.ownership_stale_ms {
            let fixed = (self.ownership_stale_ms / 2).max(1);
            warn!(
                heartbeat_interval_ms = self.heartbeat_interval_ms,
                ownership_stale_ms = self.ownership_stale_ms,
                fixed,
                "heartbeat interval must be shorter than the staleness window"
            );
            self.heartbeat_interval_ms = fixed;
        }
        self.poll_max_attempts = self.poll_max_attempts.max(1);
        self.poll_backoff_cap_ms = self.poll_backoff_cap_ms.max(self.poll_backoff_base_ms);
        self
    }
}

fn non_negative_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value >= 0.0 { value } else { default }
}
