//! One scheduler for every polled data source.
//!
//! Widgets register a [`PollJob`] instead of running their own interval.
//! The host calls [`PollScheduler::tick`] on a single timer; each tick runs
//! every job whose cache entry is due, concurrently, and reports the
//! results. Jobs tied to a panel are dropped when the panel hides, so nothing
//! keeps polling for a removed panel.
//!
//! Jobs gated on [`TabOwnership`] run only in the owning tab. The gate uses
//! `claim`, which both checks and refreshes the lease, so a tab that polls
//! also keeps its ownership alive.

#[cfg(test)]
#[path = "schedule_test.rs"]
mod schedule_test;

use std::collections::BTreeMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use tracing::debug;

use crate::clock::Millis;
use crate::ownership::{OwnerId, TabOwnership};
use crate::poll::{FetchError, FetchResult, Fetcher, PollingCache};

/// Outcome of one job run during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub key: String,
    pub outcome: Result<(), FetchError>,
}

/// Callback receiving each fetch result for a job.
pub type ResultHandler<T> = Rc<dyn Fn(&FetchResult<T>)>;

/// A type-erased job the scheduler can drive.
pub trait ScheduledJob {
    fn key(&self) -> &str;
    fn panel_id(&self) -> Option<&str>;
    fn is_due(&self, max_attempts: u32) -> bool;
    /// Ownership gate. Ungated jobs always pass.
    fn may_run(&self) -> bool;
    fn run(&self) -> LocalBoxFuture<'static, JobReport>;
}

/// Polls `key` through a [`PollingCache`] every `ttl_ms`.
pub struct PollJob<T: Clone + 'static> {
    key: String,
    ttl_ms: Millis,
    cache: PollingCache<T>,
    fetch: Fetcher<T>,
    on_result: Option<ResultHandler<T>>,
    gate: Option<(TabOwnership, OwnerId)>,
    panel_id: Option<String>,
}

impl<T: Clone + 'static> PollJob<T> {
    #[must_use]
    pub fn new(key: impl Into<String>, ttl_ms: Millis, cache: PollingCache<T>, fetch: Fetcher<T>) -> Self {
        Self { key: key.into(), ttl_ms, cache, fetch, on_result: None, gate: None, panel_id: None }
    }

    /// Deliver every result (success or failure) to `handler`.
    #[must_use]
    pub fn on_result(mut self, handler: ResultHandler<T>) -> Self {
        self.on_result = Some(handler);
        self
    }

    /// Run only while `owner` holds `ownership`.
    #[must_use]
    pub fn owned_by(mut self, ownership: TabOwnership, owner: OwnerId) -> Self {
        self.gate = Some((ownership, owner));
        self
    }

    /// Unregister automatically when panel `id` hides.
    #[must_use]
    pub fn for_panel(mut self, id: impl Into<String>) -> Self {
        self.panel_id = Some(id.into());
        self
    }
}

impl<T: Clone + 'static> ScheduledJob for PollJob<T> {
    fn key(&self) -> &str {
        &self.key
    }

    fn panel_id(&self) -> Option<&str> {
        self.panel_id.as_deref()
    }

    fn is_due(&self, max_attempts: u32) -> bool {
        self.cache.is_due(&self.key, max_attempts)
    }

    fn may_run(&self) -> bool {
        match &self.gate {
            None => true,
            Some((ownership, owner)) => ownership.claim(owner),
        }
    }

    fn run(&self) -> LocalBoxFuture<'static, JobReport> {
        let request = self.cache.get(&self.key, |k| (self.fetch)(k), self.ttl_ms);
        let handler = self.on_result.clone();
        let key = self.key.clone();
        async move {
            let result = request.await;
            if let Some(handler) = handler {
                handler(&result);
            }
            JobReport { key, outcome: result.map(|_| ()) }
        }
        .boxed_local()
    }
}

/// Registry of poll jobs driven by one timer.
pub struct PollScheduler {
    jobs: BTreeMap<String, Box<dyn ScheduledJob>>,
    max_attempts: u32,
}

impl PollScheduler {
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self { jobs: BTreeMap::new(), max_attempts }
    }

    /// Add `job`, replacing any job with the same key.
    pub fn register(&mut self, job: impl ScheduledJob + 'static) {
        self.jobs.insert(job.key().to_owned(), Box::new(job));
    }

    pub fn unregister(&mut self, key: &str) -> bool {
        self.jobs.remove(key).is_some()
    }

    /// Drop every job tied to panel `id`. Returns how many were removed.
    pub fn unregister_panel(&mut self, id: &str) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|_, job| job.panel_id() != Some(id));
        before - self.jobs.len()
    }

    #[must_use]
    pub fn is_registered(&self, key: &str) -> bool {
        self.jobs.contains_key(key)
    }

    /// Start every due job that passes its ownership gate; resolve when all finish.
    ///
    /// Fetches start before this returns, so a later tick skips them even if
    /// the returned future has not been polled yet.
    pub fn tick(&self) -> LocalBoxFuture<'static, Vec<JobReport>> {
        let runs: Vec<_> = self
            .jobs
            .values()
            .filter(|job| job.is_due(self.max_attempts))
            .filter(|job| {
                let allowed = job.may_run();
                if !allowed {
                    debug!(key = job.key(), "skipping poll; another tab owns it");
                }
                allowed
            })
            .map(|job| job.run())
            .collect();
        future::join_all(runs).boxed_local()
    }
}
