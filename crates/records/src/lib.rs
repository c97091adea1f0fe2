//! Generic record management for the counseling records client.
//!
//! One schema-driven implementation of the list + lookup + form + cache
//! invalidation pattern that every form/table pair in the application
//! follows, plus the analytics dashboard:
//!
//! - [`query`]: keyed, shared, stale-while-revalidate list cache.
//! - [`lookup`]: debounced student search with stale-response discarding.
//! - [`form`]: schema-driven create/update form with wizard paging.
//! - [`table`]: data grid with edit and confirmed delete.
//! - [`dashboard`]: per-category analytics aggregation.
//! - [`notify`]: toast-style notices for user-facing outcomes.

pub mod dashboard;
pub mod form;
pub mod lookup;
pub mod notify;
pub mod query;
pub mod state;
pub mod table;

pub use state::AppContext;
