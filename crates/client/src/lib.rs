//! HTTP plumbing for the counseling records backend.
//!
//! [`HttpClient`] wraps a timeout-configured [`reqwest::Client`] and
//! attaches the session token to every call. [`RecordApi`] is the seam the
//! record-management layer talks to, so it can be driven by the real
//! client or by an in-memory backend in tests.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;

pub use api::RecordApi;
pub use config::ClientConfig;
pub use error::HttpError;
pub use http::HttpClient;
pub use reqwest::Method;
pub use session::{Session, SessionStore};
