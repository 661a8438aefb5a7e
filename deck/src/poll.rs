//! TTL cache around asynchronous fetches, with in-flight de-duplication and backoff.
//!
//! DESIGN
//! ======
//! One [`CacheEntry`] per key. A `get` inside the TTL resolves from memory; a
//! `get` while a fetch for the key is pending joins that fetch through a
//! [`Shared`] future; anything else starts a new fetch. Bookkeeping runs
//! inside the shared future, so whichever waiter drives it to completion
//! records the result exactly once.
//!
//! ERROR HANDLING
//! ==============
//! Failures are never cached as values. They bump the entry's failure count
//! and push its next automatic retry out by capped exponential backoff. When
//! a fetch fails but a previously fetched value is still within its TTL
//! (possible after `invalidate`), that value is returned instead of the
//! error. Otherwise the error is returned to every waiter unchanged.

#[cfg(test)]
#[path = "poll_test.rs"]
mod poll_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture, Shared};
use tracing::{debug, warn};

use crate::clock::{Clock, Millis};

/// Error produced by a fetch function.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("http status {status}")]
    Http { status: u16 },
    /// The request never produced a response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),
    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// The API reported an application-level error in its body.
    #[error("api error: {0}")]
    Api(String),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Boxed, single-threaded fetch future.
pub type FetchFuture<T> = LocalBoxFuture<'static, FetchResult<T>>;

/// Caller-supplied fetch function, called with the cache key.
pub type Fetcher<T> = Rc<dyn Fn(&str) -> FetchFuture<T>>;

/// Capped exponential backoff: `base * 2^(failures - 1)`, at most `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base_ms: Millis,
    pub cap_ms: Millis,
}

impl Backoff {
    #[must_use]
    pub fn delay(self, failures: u32) -> Millis {
        let shift = failures.saturating_sub(1).min(32);
        self.base_ms.saturating_mul(1_u64 << shift).min(self.cap_ms)
    }
}

struct CacheEntry<T: Clone + 'static> {
    value: Option<T>,
    fetched_at: Millis,
    ttl_ms: Millis,
    in_flight: Option<Shared<FetchFuture<T>>>,
    failures: u32,
    retry_at: Option<Millis>,
    failed_at: Millis,
    /// Set by `invalidate`; the next `get` refetches regardless of TTL.
    forced: bool,
    /// Bumped by `invalidate` so a fetch started earlier does not clear `forced`.
    generation: u64,
}

impl<T: Clone + 'static> CacheEntry<T> {
    fn new(ttl_ms: Millis) -> Self {
        Self {
            value: None,
            fetched_at: 0,
            ttl_ms,
            in_flight: None,
            failures: 0,
            retry_at: None,
            failed_at: 0,
            forced: false,
            generation: 0,
        }
    }

    fn within_ttl(&self, now: Millis) -> Option<T> {
        if now.saturating_sub(self.fetched_at) < self.ttl_ms { self.value.clone() } else { None }
    }

    fn fresh(&self, now: Millis) -> Option<T> {
        if self.forced { None } else { self.within_ttl(now) }
    }
}

/// Read-only snapshot of one key's cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    pub has_value: bool,
    pub fetched_at: Millis,
    pub failures: u32,
    pub retry_at: Option<Millis>,
    pub in_flight: bool,
    pub forced: bool,
}

/// Shared TTL cache. Clones share entries.
pub struct PollingCache<T: Clone + 'static> {
    entries: Rc<RefCell<HashMap<String, CacheEntry<T>>>>,
    clock: Rc<dyn Clock>,
    backoff: Backoff,
}

impl<T: Clone + 'static> Clone for PollingCache<T> {
    fn clone(&self) -> Self {
        Self { entries: Rc::clone(&self.entries), clock: Rc::clone(&self.clock), backoff: self.backoff }
    }
}

impl<T: Clone + 'static> PollingCache<T> {
    #[must_use]
    pub fn new(clock: Rc<dyn Clock>, backoff: Backoff) -> Self {
        Self { entries: Rc::new(RefCell::new(HashMap::new())), clock, backoff }
    }

    /// Resolve `key`: from cache inside `ttl_ms`, by joining a pending fetch, or by calling `fetch`.
    pub fn get<F>(&self, key: &str, fetch: F, ttl_ms: Millis) -> FetchFuture<T>
    where
        F: FnOnce(&str) -> FetchFuture<T>,
    {
        let now = self.clock.now_ms();
        let generation = {
            let mut entries = self.entries.borrow_mut();
            let entry = entries.entry(key.to_owned()).or_insert_with(|| CacheEntry::new(ttl_ms));
            entry.ttl_ms = ttl_ms;
            if let Some(value) = entry.fresh(now) {
                return future::ready(Ok(value)).boxed_local();
            }
            if let Some(pending) = &entry.in_flight {
                debug!(key, "joining in-flight fetch");
                return pending.clone().boxed_local();
            }
            entry.generation
        };

        debug!(key, "fetching");
        let request = fetch(key);
        let entries = Rc::clone(&self.entries);
        let clock = Rc::clone(&self.clock);
        let backoff = self.backoff;
        let owned_key = key.to_owned();
        let shared = async move {
            let result = request.await;
            record(&entries, &owned_key, result, clock.now_ms(), generation, backoff)
        }
        .boxed_local()
        .shared();

        if let Some(entry) = self.entries.borrow_mut().get_mut(key) {
            entry.in_flight = Some(shared.clone());
        }
        shared.boxed_local()
    }

    /// Force the next `get` for `key` to fetch regardless of TTL, and reset its backoff.
    pub fn invalidate(&self, key: &str) {
        if let Some(entry) = self.entries.borrow_mut().get_mut(key) {
            entry.forced = true;
            entry.generation = entry.generation.wrapping_add(1);
            entry.failures = 0;
            entry.retry_at = None;
        }
    }

    /// Last successfully fetched value, however old. For stale-while-revalidate rendering.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<T> {
        self.entries.borrow().get(key).and_then(|e| e.value.clone())
    }

    #[must_use]
    pub fn status(&self, key: &str) -> Option<CacheStatus> {
        self.entries.borrow().get(key).map(|e| CacheStatus {
            has_value: e.value.is_some(),
            fetched_at: e.fetched_at,
            failures: e.failures,
            retry_at: e.retry_at,
            in_flight: e.in_flight.is_some(),
            forced: e.forced,
        })
    }

    /// Whether an automatic poll of `key` should run now.
    ///
    /// Not due while fresh, while a fetch is pending, or before the backoff
    /// delay has passed. Once `max_attempts` consecutive failures have
    /// accumulated, backoff retries stop and the key is due again one TTL
    /// after the latest failure.
    #[must_use]
    pub fn is_due(&self, key: &str, max_attempts: u32) -> bool {
        let now = self.clock.now_ms();
        let entries = self.entries.borrow();
        let Some(entry) = entries.get(key) else {
            return true;
        };
        if entry.in_flight.is_some() || entry.fresh(now).is_some() {
            return false;
        }
        if entry.failures >= max_attempts {
            return now >= entry.failed_at.saturating_add(entry.ttl_ms);
        }
        entry.retry_at.is_none_or(|at| at <= now)
    }

    #[must_use]
    pub fn now_ms(&self) -> Millis {
        self.clock.now_ms()
    }
}

fn record<T: Clone + 'static>(
    entries: &RefCell<HashMap<String, CacheEntry<T>>>,
    key: &str,
    result: FetchResult<T>,
    now: Millis,
    generation: u64,
    backoff: Backoff,
) -> FetchResult<T> {
    let mut entries = entries.borrow_mut();
    let Some(entry) = entries.get_mut(key) else {
        return result;
    };
    entry.in_flight = None;
    match result {
        Ok(value) => {
            entry.value = Some(value.clone());
            entry.fetched_at = now;
            entry.failures = 0;
            entry.retry_at = None;
            if entry.generation == generation {
                entry.forced = false;
            }
            Ok(value)
        }
        Err(err) => {
            entry.failures = entry.failures.saturating_add(1);
            let delay = backoff.delay(entry.failures);
            entry.retry_at = Some(now.saturating_add(delay));
            entry.failed_at = now;
            warn!(key, error = %err, failures = entry.failures, retry_in_ms = delay, "fetch failed");
            if let Some(value) = entry.within_ttl(now) {
                debug!(key, "serving last good value instead of error");
                return Ok(value);
            }
            Err(err)
        }
    }
}
