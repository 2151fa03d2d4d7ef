//! Summary cache-and-generation coordinator.
//!
//! Decides whether a project's cached summary is still valid, runs at most
//! one generation per project at a time, coalesces bursts of edits behind a
//! debounce timer, and paces whole-catalog warm-up passes.
//!
//! All bookkeeping lives in one [`CoordinatorState`] behind a mutex that is
//! never held across an `.await`. Backend failures are logged and reported
//! as "no summary"; store failures are returned to the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use forms_core::{content_fingerprint, EntryForSummary, SummaryRecord, SummaryStatus};
use forms_store::{JournalStore, StoreError};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::Summarizer;
use crate::config::CoordinatorConfig;

type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of one [`SummaryCoordinator::warm_all`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmReport {
    /// Another pass was already running; nothing was done.
    pub skipped: bool,
    /// Projects that needed a summary and got a generation attempt.
    pub scheduled: usize,
    /// Attempts that produced a summary.
    pub generated: usize,
}

struct PendingTimer {
    ticket: u64,
    cancel: CancellationToken,
}

/// In-memory, per-process coordination state. Never persisted.
#[derive(Default)]
struct CoordinatorState {
    /// Single-flight lock: project id → ticket of the generation holding it.
    in_flight: HashMap<String, u64>,
    pending_timers: HashMap<String, PendingTimer>,
    bulk_running: bool,
}

struct Inner {
    store: Arc<dyn JournalStore>,
    summarizer: Arc<dyn Summarizer>,
    config: CoordinatorConfig,
    state: Mutex<CoordinatorState>,
    tickets: AtomicU64,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::Relaxed)
    }
}

/// Releases an in-flight claim on drop, unless the claim was cancelled and
/// re-taken by a newer generation in the meantime.
struct InFlightGuard {
    inner: Arc<Inner>,
    project_id: String,
    ticket: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut state = self.inner.state();
        if state.in_flight.get(&self.project_id) == Some(&self.ticket) {
            state.in_flight.remove(&self.project_id);
        }
    }
}

struct BulkGuard {
    inner: Arc<Inner>,
}

impl Drop for BulkGuard {
    fn drop(&mut self) {
        self.inner.state().bulk_running = false;
    }
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SummaryCoordinator {
    inner: Arc<Inner>,
}

impl SummaryCoordinator {
    pub fn new(
        store: Arc<dyn JournalStore>,
        summarizer: Arc<dyn Summarizer>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                summarizer,
                config,
                state: Mutex::new(CoordinatorState::default()),
                tickets: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    // ── Cache lookup ──

    /// Cached summary if it matches the project's current fingerprint.
    /// Never triggers generation.
    pub fn lookup(&self, project_id: &str) -> Result<Option<String>> {
        let Some(record) = self.inner.store.summary(project_id)? else {
            debug!(project_id, "no cached summary");
            return Ok(None);
        };
        let current = self.inner.store.fingerprint(project_id)?;
        if !record.is_valid_for(&current) {
            debug!(project_id, "cached summary is stale");
            return Ok(None);
        }
        Ok(Some(record.summary))
    }

    // ── Immediate generation ──

    /// Generate now, bypassing the debounce.
    ///
    /// Returns `Ok(None)` when the project is missing, has no entries, is
    /// already generating, or the backend failed.
    pub async fn generate_now(&self, project_id: &str) -> Result<Option<String>> {
        if self.is_generating(project_id) {
            debug!(project_id, "generation already in flight, skipping");
            return Ok(None);
        }

        let store = &self.inner.store;
        let Some(project) = store.project(project_id)? else {
            warn!(project_id, "project not found");
            return Ok(None);
        };
        let entries = store.entries(project_id)?;
        if entries.is_empty() {
            debug!(project_id, "no entries to summarize");
            return Ok(None);
        }

        // Check-and-claim must happen without an await in between.
        let _guard = {
            let mut state = self.inner.state();
            if state.in_flight.contains_key(project_id) {
                debug!(project_id, "generation already in flight, skipping");
                return Ok(None);
            }
            let ticket = self.inner.next_ticket();
            state.in_flight.insert(project_id.to_string(), ticket);
            InFlightGuard {
                inner: Arc::clone(&self.inner),
                project_id: project_id.to_string(),
                ticket,
            }
        };

        // Same entries that go to the backend, so a concurrent edit reads as stale.
        let fingerprint = content_fingerprint(&entries);
        if let Some(existing) = store.summary(project_id)? {
            if existing.is_valid_for(&fingerprint) {
                debug!(project_id, "summary already current");
                return Ok(Some(existing.summary));
            }
        }

        let for_summary: Vec<EntryForSummary> = entries.iter().map(EntryForSummary::from).collect();
        info!(project_id, entries = for_summary.len(), "generating summary");
        let summary = match self
            .inner
            .summarizer
            .summarize(&project.name, &for_summary)
            .await
        {
            Ok(s) => s,
            Err(e) => {
                warn!(project_id, error = %e, "summary generation failed");
                return Ok(None);
            }
        };

        store.save_summary(&SummaryRecord::new(project_id, &summary, &fingerprint))?;
        debug!(project_id, "summary cached");
        Ok(Some(summary))
    }

    // ── Debounced generation ──

    /// Generate after a quiet period, restarting the wait on every call.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule_generate(&self, project_id: &str) {
        let ticket = self.inner.next_ticket();
        let cancel = CancellationToken::new();
        {
            let mut state = self.inner.state();
            let previous = state.pending_timers.insert(
                project_id.to_string(),
                PendingTimer {
                    ticket,
                    cancel: cancel.clone(),
                },
            );
            if let Some(previous) = previous {
                previous.cancel.cancel();
            }
        }

        let this = self.clone();
        let project_id = project_id.to_string();
        let delay = self.inner.config.debounce();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            if let Err(e) = this.generate_now(&project_id).await {
                warn!(project_id = %project_id, error = %e, "debounced generation failed");
            }
            let mut state = this.inner.state();
            if state
                .pending_timers
                .get(&project_id)
                .is_some_and(|t| t.ticket == ticket)
            {
                state.pending_timers.remove(&project_id);
            }
        });
    }

    // ── Cancellation ──

    /// Drop any pending timer and the in-flight marker for `project_id`.
    /// A backend call already under way still finishes and its result is kept.
    pub fn cancel(&self, project_id: &str) {
        let mut state = self.inner.state();
        if let Some(timer) = state.pending_timers.remove(project_id) {
            timer.cancel.cancel();
        }
        state.in_flight.remove(project_id);
    }

    // ── Bulk pre-generation ──

    /// Generate summaries for every project that has entries but no valid
    /// summary. Starts are staggered; one project's failure never stops the
    /// others. A second call while a pass is running returns immediately.
    pub async fn warm_all(&self) -> Result<WarmReport> {
        let _bulk = {
            let mut state = self.inner.state();
            if state.bulk_running {
                info!("warm-up already running, skipping");
                return Ok(WarmReport {
                    skipped: true,
                    ..WarmReport::default()
                });
            }
            state.bulk_running = true;
            BulkGuard {
                inner: Arc::clone(&self.inner),
            }
        };

        let projects = self.inner.store.projects()?;
        let mut pending = Vec::new();
        for project in projects {
            match self.needs_summary(&project.id) {
                Ok(true) => pending.push(project),
                Ok(false) => {}
                Err(e) => warn!(project_id = %project.id, error = %e, "skipping project in warm-up"),
            }
        }
        info!(projects = pending.len(), "warming summaries");

        let stagger = self.inner.config.stagger();
        let mut units = JoinSet::new();
        for (index, project) in pending.iter().enumerate() {
            let this = self.clone();
            let project_id = project.id.clone();
            let delay = stagger * index as u32;
            units.spawn(async move {
                tokio::time::sleep(delay).await;
                match this.generate_now(&project_id).await {
                    Ok(summary) => summary.is_some(),
                    Err(e) => {
                        warn!(project_id = %project_id, error = %e, "warm-up generation failed");
                        false
                    }
                }
            });
        }

        let mut report = WarmReport {
            scheduled: pending.len(),
            ..WarmReport::default()
        };
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(true) => report.generated += 1,
                Ok(false) => {}
                Err(e) => warn!(error = %e, "warm-up unit aborted"),
            }
        }
        info!(
            scheduled = report.scheduled,
            generated = report.generated,
            "warm-up finished"
        );
        Ok(report)
    }

    fn needs_summary(&self, project_id: &str) -> Result<bool> {
        if self.inner.store.entries(project_id)?.is_empty() {
            return Ok(false);
        }
        Ok(self.lookup(project_id)?.is_none())
    }

    // ── Introspection ──

    pub fn is_generating(&self, project_id: &str) -> bool {
        self.inner.state().in_flight.contains_key(project_id)
    }

    pub fn is_debouncing(&self, project_id: &str) -> bool {
        self.inner.state().pending_timers.contains_key(project_id)
    }

    pub fn status(&self, project_id: &str) -> Result<SummaryStatus> {
        Ok(SummaryStatus {
            has_cached: self.lookup(project_id)?.is_some(),
            is_generating: self.is_generating(project_id),
            is_debouncing: self.is_debouncing(project_id),
        })
    }

    // ── Cache maintenance ──

    pub fn clear_cache(&self, project_id: &str) -> Result<bool> {
        self.inner.store.delete_summary(project_id)
    }

    /// Delete every stored summary; returns how many were removed.
    pub fn clear_all_caches(&self) -> Result<usize> {
        let mut removed = 0;
        for record in self.inner.store.summaries()? {
            if self.inner.store.delete_summary(&record.project_id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    // ── Consumer helpers ──

    /// Poll the cache while a generation is in flight.
    ///
    /// Returns the summary once it is valid, or `None` when the project stops
    /// generating without one or the poll timeout elapses.
    pub async fn await_summary(&self, project_id: &str) -> Result<Option<String>> {
        let interval = self.inner.config.poll_interval();
        let deadline = Instant::now() + self.inner.config.poll_timeout();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(interval.min(remaining)).await;

            if let Some(summary) = self.lookup(project_id)? {
                return Ok(Some(summary));
            }
            if !self.is_generating(project_id) || Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }

    /// Cached summary, else wait for a running generation, else generate.
    pub async fn get_or_generate(&self, project_id: &str) -> Result<Option<String>> {
        if let Some(summary) = self.lookup(project_id)? {
            return Ok(Some(summary));
        }
        if self.is_generating(project_id) {
            return self.await_summary(project_id).await;
        }
        self.generate_now(project_id).await
    }
}
