//! Deduplicating enrichment work queue
//!
//! Shared between the paginator (which enqueues) and one background worker
//! task (which drains). All queue state lives behind a single mutex; the
//! worker is a real `tokio` task whose handle the engine awaits, not a polled
//! flag.
//!
//! Invariants:
//! - an organization present in the cache is never re-enqueued
//! - the same reference enqueued N times before being fetched is fetched once
//! - a worker is running iff the pending set was non-empty when checked

use crate::enrich::fetcher::OrgFetcher;
use crate::model::OrgDetails;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

struct QueueState {
    pending: HashSet<String>,
    cache: HashMap<String, OrgDetails>,
    worker: Option<JoinHandle<()>>,
}

struct QueueInner {
    fetcher: Arc<dyn OrgFetcher>,
    state: Mutex<QueueState>,
}

/// Work queue plus result cache for organization enrichment.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct EnrichmentQueue {
    inner: Arc<QueueInner>,
}

impl EnrichmentQueue {
    pub fn new(fetcher: Arc<dyn OrgFetcher>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                fetcher,
                state: Mutex::new(QueueState {
                    pending: HashSet::new(),
                    cache: HashMap::new(),
                    worker: None,
                }),
            }),
        }
    }

    /// Queues an organization for enrichment.
    ///
    /// Idempotent: references already cached or already pending are ignored.
    /// Never blocks and never starts the worker.
    pub fn enqueue(&self, org_ref: &str) {
        let mut state = self.inner.state.lock().unwrap();
        if state.cache.contains_key(org_ref) {
            return;
        }
        if state.pending.insert(org_ref.to_string()) {
            tracing::debug!(
                "Queued organization for enrichment: {} ({} pending)",
                org_ref,
                state.pending.len()
            );
        }
    }

    /// Starts the background worker unless one is already running.
    ///
    /// Never blocks the caller; with an empty pending set this is a no-op.
    pub fn ensure_worker_running(&self) {
        let mut state = self.inner.state.lock().unwrap();

        let running = state
            .worker
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false);
        if running || state.pending.is_empty() {
            return;
        }

        let inner = Arc::clone(&self.inner);
        state.worker = Some(tokio::spawn(async move {
            drain(inner).await;
        }));
        tracing::debug!("Enrichment worker started");
    }

    /// Blocks until the worker has stopped and the pending set is empty.
    ///
    /// Awaits the worker's task handle directly; if references were enqueued
    /// after the previous worker exited, a fresh worker is started so every
    /// enqueued reference ends up cached.
    pub async fn await_drain(&self) {
        loop {
            let handle = { self.inner.state.lock().unwrap().worker.take() };

            match handle {
                Some(handle) => {
                    if let Err(e) = handle.await {
                        tracing::warn!("Enrichment worker task failed: {}", e);
                    }
                }
                None => {
                    let idle = { self.inner.state.lock().unwrap().pending.is_empty() };
                    if idle {
                        return;
                    }
                    self.ensure_worker_running();
                }
            }
        }
    }

    /// Cached details for an organization, if its fetch has completed.
    pub fn cached_details(&self, org_ref: &str) -> Option<OrgDetails> {
        self.inner.state.lock().unwrap().cache.get(org_ref).cloned()
    }

    /// Number of references awaiting processing
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().unwrap().pending.len()
    }

    /// Number of cached results
    pub fn cache_len(&self) -> usize {
        self.inner.state.lock().unwrap().cache.len()
    }
}

/// Worker loop: pop one pending reference at a time until none remain.
async fn drain(inner: Arc<QueueInner>) {
    loop {
        let next = {
            let mut state = inner.state.lock().unwrap();
            let next = state.pending.iter().next().cloned();
            if let Some(org_ref) = &next {
                state.pending.remove(org_ref);
            }
            next
        };

        let Some(org_ref) = next else {
            tracing::debug!("Enrichment worker drained");
            return;
        };

        // A duplicate enqueue may have raced an earlier fetch of the same ref
        let already_cached = {
            inner
                .state
                .lock()
                .unwrap()
                .cache
                .contains_key(&org_ref)
        };
        if already_cached {
            continue;
        }

        let details = match inner.fetcher.fetch(&org_ref).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!("Organization fetch failed for {}: {}", org_ref, e);
                OrgDetails::default()
            }
        };

        inner
            .state
            .lock()
            .unwrap()
            .cache
            .insert(org_ref, details);
    }
}
