//! Debounced student search feeding the identity autofill.
//!
//! Every call to [`StudentLookup::search`] starts a new generation. A
//! search waits out the debounce delay first and gives up if a newer one
//! has started in the meantime; a response that arrives after a newer
//! search began is dropped, so a slow early reply can never overwrite a
//! fast later one.
//!
//! Failures never reach the caller as errors. They clear the candidate
//! list and are logged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use counsel_client::{ClientConfig, RecordApi};
use counsel_core::identity::StudentCandidate;

/// How a single search call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Query below the minimum length; no request was made.
    TooShort,
    /// A newer search started before this one could publish.
    Superseded,
    /// Candidates were published (possibly zero).
    Delivered(usize),
    /// The request failed and the candidate list was cleared.
    Failed,
    /// The lookup was shut down.
    Cancelled,
}

struct LookupShared {
    api: Arc<dyn RecordApi>,
    generation: AtomicU64,
    candidates: watch::Sender<Vec<StudentCandidate>>,
}

impl LookupShared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn clear(&self) {
        self.candidates.send_if_modified(|list| {
            let changed = !list.is_empty();
            list.clear();
            changed
        });
    }
}

/// Student search for one form.
#[derive(Clone)]
pub struct StudentLookup {
    shared: Arc<LookupShared>,
    debounce: Duration,
    min_chars: usize,
    cancel: CancellationToken,
}

impl StudentLookup {
    pub fn new(api: Arc<dyn RecordApi>, debounce: Duration, min_chars: usize) -> Self {
        Self {
            shared: Arc::new(LookupShared {
                api,
                generation: AtomicU64::new(0),
                candidates: watch::Sender::new(Vec::new()),
            }),
            debounce,
            min_chars,
            cancel: CancellationToken::new(),
        }
    }

    /// Debounce and minimum length taken from the client configuration.
    pub fn from_config(api: Arc<dyn RecordApi>, config: &ClientConfig) -> Self {
        Self::new(api, config.lookup_debounce, config.lookup_min_chars)
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<StudentCandidate>> {
        self.shared.candidates.subscribe()
    }

    pub fn candidates(&self) -> Vec<StudentCandidate> {
        self.shared.candidates.borrow().clone()
    }

    /// Search for students matching `query`.
    ///
    /// Returns immediately; the handle resolves once this search has
    /// published, been superseded, or failed. Queries shorter than the
    /// minimum length (in characters, after trimming) clear the list
    /// without a request.
    pub fn search(&self, query: &str) -> JoinHandle<LookupOutcome> {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim().to_string();

        if query.chars().count() < self.min_chars {
            self.shared.clear();
            return tokio::spawn(async { LookupOutcome::TooShort });
        }

        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return LookupOutcome::Cancelled,
                _ = tokio::time::sleep(debounce) => {}
            }
            if !shared.is_current(generation) {
                tracing::debug!(%query, "Lookup superseded before dispatch");
                return LookupOutcome::Superseded;
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => return LookupOutcome::Cancelled,
                result = shared.api.search_students(&query) => result,
            };

            if !shared.is_current(generation) {
                tracing::debug!(%query, "Discarding stale lookup response");
                return LookupOutcome::Superseded;
            }

            match result {
                Ok(found) => {
                    let count = found.len();
                    tracing::debug!(%query, count, "Lookup delivered candidates");
                    shared.candidates.send_replace(found);
                    LookupOutcome::Delivered(count)
                }
                Err(e) => {
                    tracing::warn!(%query, error = %e, "Student lookup failed");
                    shared.clear();
                    LookupOutcome::Failed
                }
            }
        })
    }

    /// Drop the current candidates and abandon any pending search.
    pub fn clear(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.clear();
    }

    /// Cancel pending searches. Later searches resolve as cancelled.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

