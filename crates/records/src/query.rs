//! Keyed, shared list cache for entity records.
//!
//! [`QueryClient`] keeps one cache entry per entity key. The first
//! [`EntityQuery`] observing a key creates the entry and starts the
//! initial fetch; later observers share it. Invalidation serves the
//! previous list while a background refetch runs (stale-while-revalidate),
//! and at most one request per key is ever in flight. An invalidation that
//! lands while a request is in flight queues exactly one follow-up fetch,
//! since the in-flight response may predate the change.
//!
//! Entries are reference-counted: dropping the last observer of a key
//! tears its entry down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::watch;

use counsel_client::RecordApi;
use counsel_core::record::Record;
use counsel_core::schema::EntitySchema;
use counsel_core::types::Timestamp;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Lifecycle of a cache entry's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Nothing requested yet.
    Idle,
    /// First fetch in flight, no data yet.
    Loading,
    /// Data from the last successful fetch.
    Success,
    /// The last fetch attempt failed.
    Error,
}

/// Point-in-time view of one cache entry.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub data: Arc<Vec<Record>>,
    pub status: QueryStatus,
    /// A request for this key is in flight (first load or refetch).
    pub is_fetching: bool,
    /// Invalidated and not yet refreshed.
    pub is_stale: bool,
    pub error: Option<String>,
    pub updated_at: Option<Timestamp>,
}

impl QuerySnapshot {
    fn idle() -> Self {
        Self {
            data: Arc::new(Vec::new()),
            status: QueryStatus::Idle,
            is_fetching: false,
            is_stale: false,
            error: None,
            updated_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    fn has_data(&self) -> bool {
        self.updated_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

struct QueryEntry {
    key: &'static str,
    endpoint: &'static str,
    state: watch::Sender<QuerySnapshot>,
    /// Number of live [`EntityQuery`] handles. Only changed under the
    /// client's entry-map lock.
    observers: AtomicU64,
    /// Requests issued over the entry's lifetime.
    fetches: AtomicU64,
    /// Invalidated after the in-flight request started. Only read or
    /// written while holding the watch channel's lock.
    follow_up: AtomicBool,
}

struct QueryClientInner {
    api: Arc<dyn RecordApi>,
    entries: Mutex<HashMap<&'static str, Arc<QueryEntry>>>,
}

/// Shared cache of entity lists, one entry per schema key.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<QueryClientInner>,
}

impl QueryClient {
    pub fn new(api: Arc<dyn RecordApi>) -> Self {
        Self {
            inner: Arc::new(QueryClientInner {
                api,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Start observing the list for `schema`.
    ///
    /// Creates the entry and starts the initial fetch on first
    /// observation; otherwise joins the existing entry without a new
    /// request.
    pub fn observe(&self, schema: &'static EntitySchema) -> EntityQuery {
        let (entry, created) = {
            let mut entries = self.lock_entries();
            let mut created = false;
            let entry = entries
                .entry(schema.key)
                .or_insert_with(|| {
                    created = true;
                    Arc::new(QueryEntry {
                        key: schema.key,
                        endpoint: schema.endpoint,
                        state: watch::Sender::new(QuerySnapshot::idle()),
                        observers: AtomicU64::new(0),
                        fetches: AtomicU64::new(0),
                        follow_up: AtomicBool::new(false),
                    })
                })
                .clone();
            entry.observers.fetch_add(1, Ordering::SeqCst);
            (entry, created)
        };

        if created {
            tracing::debug!(key = schema.key, "Created query cache entry");
            self.start_fetch(&entry, false);
        }

        let rx = entry.state.subscribe();
        EntityQuery {
            client: self.clone(),
            entry,
            rx,
        }
    }

    /// Mark `key` stale and refetch it in the background.
    ///
    /// Observers keep seeing the previous data until the refetch resolves.
    /// If a fetch for the key is already in flight, no second request is
    /// issued alongside it; instead one follow-up fetch is queued to run
    /// when it completes, and the entry stays stale until then. Any number
    /// of invalidations during one request queue a single follow-up.
    /// Unobserved keys are ignored.
    pub fn invalidate(&self, key: &str) {
        let Some(entry) = self.entry(key) else {
            tracing::debug!(key, "Invalidate for unobserved key ignored");
            return;
        };
        tracing::debug!(key, "Invalidated query");
        self.start_fetch(&entry, true);
    }

    /// Fetch `key` again, clearing a previous error. Joins a fetch that
    /// is already in flight.
    pub fn refetch(&self, key: &str) {
        match self.entry(key) {
            Some(entry) => self.start_fetch(&entry, false),
            None => tracing::debug!(key, "Refetch for unobserved key ignored"),
        }
    }

    /// Current snapshot of `key`, if it is cached.
    pub fn snapshot(&self, key: &str) -> Option<QuerySnapshot> {
        self.entry(key).map(|e| e.state.borrow().clone())
    }

    /// Number of live observers of `key` (0 when not cached).
    pub fn observer_count(&self, key: &str) -> u64 {
        self.entry(key)
            .map(|e| e.observers.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Requests issued for `key` since its entry was created.
    pub fn fetch_count(&self, key: &str) -> u64 {
        self.entry(key)
            .map(|e| e.fetches.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    // ---- private helpers ----

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<&'static str, Arc<QueryEntry>>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn entry(&self, key: &str) -> Option<Arc<QueryEntry>> {
        self.lock_entries().get(key).cloned()
    }

    /// Begin a fetch unless one is already in flight for this entry.
    ///
    /// The in-flight check and the flag flip happen atomically inside the
    /// watch channel, so concurrent callers cannot both start a request.
    /// With `invalidated`, the entry is marked stale in the same step and a
    /// caller that finds a request in flight queues a follow-up instead.
    fn start_fetch(&self, entry: &Arc<QueryEntry>, invalidated: bool) {
        let mut started = false;
        entry.state.send_if_modified(|s| {
            if invalidated {
                s.is_stale = true;
            }
            if s.is_fetching {
                if invalidated {
                    entry.follow_up.store(true, Ordering::SeqCst);
                }
                return invalidated;
            }
            begin_fetch(s);
            started = true;
            true
        });

        if !started {
            tracing::debug!(key = entry.key, queued = invalidated, "Joined in-flight fetch");
            return;
        }

        let api = Arc::clone(&self.inner.api);
        let entry = Arc::clone(entry);
        tokio::spawn(async move {
            loop {
                let attempt = entry.fetches.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::debug!(key = entry.key, attempt, "Fetching records");

                let result = api.list(entry.endpoint).await;

                let mut again = false;
                entry.state.send_modify(|s| {
                    again = entry.follow_up.swap(false, Ordering::SeqCst);
                    match result {
                        Ok(records) => {
                            tracing::info!(key = entry.key, count = records.len(), "Fetched records");
                            s.data = Arc::new(records);
                            s.status = QueryStatus::Success;
                            s.is_stale = again;
                            s.error = None;
                            s.updated_at = Some(Utc::now());
                        }
                        Err(e) => {
                            tracing::warn!(key = entry.key, error = %e, "Failed to fetch records");
                            s.status = QueryStatus::Error;
                            s.error = Some(e.user_message());
                        }
                    }
                    if again {
                        begin_fetch(s);
                    } else {
                        s.is_fetching = false;
                    }
                });

                if !again {
                    break;
                }
                tracing::debug!(key = entry.key, "Invalidated mid-fetch, fetching again");
            }
        });
    }

    fn release(&self, entry: &Arc<QueryEntry>) {
        let mut entries = self.lock_entries();
        let remaining = entry.observers.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining == 0 {
            let same = entries
                .get(entry.key)
                .is_some_and(|current| Arc::ptr_eq(current, entry));
            if same {
                entries.remove(entry.key);
                tracing::debug!(key = entry.key, "Dropped query cache entry");
            }
        }
    }
}

/// Flip a snapshot into the in-flight state.
fn begin_fetch(s: &mut QuerySnapshot) {
    s.is_fetching = true;
    s.error = None;
    s.status = if s.has_data() {
        QueryStatus::Success
    } else {
        QueryStatus::Loading
    };
}

// ---------------------------------------------------------------------------
// Observer handle
// ---------------------------------------------------------------------------

/// A live subscription to one entity list.
///
/// Dropping the last handle for a key removes its cache entry.
pub struct EntityQuery {
    client: QueryClient,
    entry: Arc<QueryEntry>,
    rx: watch::Receiver<QuerySnapshot>,
}

impl EntityQuery {
    pub fn key(&self) -> &'static str {
        self.entry.key
    }

    pub fn snapshot(&self) -> QuerySnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next update. Returns `false` if the entry is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until no fetch is in flight and return that snapshot.
    pub async fn settled(&mut self) -> QuerySnapshot {
        if let Ok(snapshot) = self.rx.wait_for(|s| !s.is_fetching).await {
            return snapshot.clone();
        }
        self.snapshot()
    }

    pub fn invalidate(&self) {
        self.client.invalidate(self.entry.key);
    }

    pub fn refetch(&self) {
        self.client.refetch(self.entry.key);
    }
}

impl Drop for EntityQuery {
    fn drop(&mut self) {
        self.client.release(&self.entry);
    }
}
