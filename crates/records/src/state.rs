use std::sync::Arc;

use counsel_client::RecordApi;

use crate::notify::Notifier;
use crate::query::QueryClient;

/// Shared context handed to every table, form and dashboard.
///
/// Cheaply cloneable (everything inside is behind an `Arc`).
#[derive(Clone)]
pub struct AppContext {
    /// Backend access; the real [`counsel_client::HttpClient`] in production.
    pub api: Arc<dyn RecordApi>,
    /// Per-entity list cache.
    pub queries: QueryClient,
    /// Toast channel for user-facing outcomes.
    pub notifier: Arc<Notifier>,
}

impl AppContext {
    pub fn new(api: Arc<dyn RecordApi>) -> Self {
        Self {
            queries: QueryClient::new(Arc::clone(&api)),
            api,
            notifier: Arc::new(Notifier::default()),
        }
    }
}
