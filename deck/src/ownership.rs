//! Cross-tab single-owner election through a heartbeat token in storage.
//!
//! DESIGN
//! ======
//! One [`OwnershipToken`] per scope lives in the shared [`KeyValueStore`]. A
//! tab owns the scope if no token exists, the token names it, or the token's
//! heartbeat is older than the staleness window. Owners renew on an interval
//! shorter than that window; a tab that stops renewing loses the scope once
//! its heartbeat goes stale.
//!
//! TRADE-OFFS
//! ==========
//! This is advisory locking, not consensus. Two tabs reading the same stale
//! token at the same instant can both claim it. The cost is duplicate UI for a
//! heartbeat or two, never corrupted data, and the later write wins.

#[cfg(test)]
#[path = "ownership_test.rs"]
mod ownership_test;

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::{Clock, Millis};
use crate::store::KeyValueStore;

/// Opaque identifier for one tab (or process) taking part in an election.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// A fresh random identifier for this tab.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipToken {
    pub owner_id: OwnerId,
    pub heartbeat_at: Millis,
}

/// Storage key for a scope's token.
#[must_use]
pub fn token_key(scope: &str) -> String {
    format!("owner:{scope}")
}

/// Election for one named scope (e.g. `"travel"`).
#[derive(Clone)]
pub struct TabOwnership {
    store: KeyValueStore,
    key: String,
    stale_ms: Millis,
    clock: Rc<dyn Clock>,
}

impl TabOwnership {
    #[must_use]
    pub fn new(store: KeyValueStore, scope: &str, stale_ms: Millis, clock: Rc<dyn Clock>) -> Self {
        Self { store, key: token_key(scope), stale_ms, clock }
    }

    /// The token currently in storage, if any.
    #[must_use]
    pub fn token(&self) -> Option<OwnershipToken> {
        self.store.get_opt(&self.key)
    }

    /// The id holding a live (non-stale) lease, if any.
    #[must_use]
    pub fn current_owner(&self) -> Option<OwnerId> {
        let now = self.clock.now_ms();
        self.token().filter(|t| !self.is_stale(t, now)).map(|t| t.owner_id)
    }

    fn is_stale(&self, token: &OwnershipToken, now: Millis) -> bool {
        now.saturating_sub(token.heartbeat_at) > self.stale_ms
    }

    /// Whether `id` may act as owner right now.
    ///
    /// True when no token exists, the token is `id`'s, or the token is stale.
    /// In the stale case the caller should [`claim`](Self::claim) immediately.
    #[must_use]
    pub fn is_owner(&self, id: &OwnerId) -> bool {
        match self.token() {
            None => true,
            Some(token) => token.owner_id == *id || self.is_stale(&token, self.clock.now_ms()),
        }
    }

    /// Take or refresh the lease for `id`.
    ///
    /// Refuses (returns `false`) while another id holds a live lease; a stale
    /// lease is taken over. This is the only sanctioned automatic takeover.
    pub fn claim(&self, id: &OwnerId) -> bool {
        let now = self.clock.now_ms();
        if let Some(token) = self.token() {
            if token.owner_id != *id {
                if !self.is_stale(&token, now) {
                    debug!(scope = %self.key, owner = %token.owner_id, claimant = %id, "ownership held by live tab");
                    return false;
                }
                info!(
                    scope = %self.key,
                    previous = %token.owner_id,
                    claimant = %id,
                    age_ms = now.saturating_sub(token.heartbeat_at),
                    "taking over stale ownership"
                );
            }
        }
        self.write(id, now)
    }

    /// Refresh the heartbeat. Fails if `id` no longer holds the token.
    pub fn renew(&self, id: &OwnerId) -> bool {
        match self.token() {
            Some(token) if token.owner_id == *id => self.write(id, self.clock.now_ms()),
            Some(token) => {
                debug!(scope = %self.key, owner = %token.owner_id, renewer = %id, "renew refused; lease lost");
                false
            }
            None => false,
        }
    }

    /// Give up the lease if `id` holds it.
    pub fn release(&self, id: &OwnerId) -> bool {
        match self.token() {
            Some(token) if token.owner_id == *id => {
                info!(scope = %self.key, owner = %id, "ownership released");
                self.store.remove(&self.key)
            }
            _ => false,
        }
    }

    fn write(&self, id: &OwnerId, now: Millis) -> bool {
        self.store.set(&self.key, &OwnershipToken { owner_id: id.clone(), heartbeat_at: now })
    }
}
