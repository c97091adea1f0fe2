//! REST client for the counseling records backend.
//!
//! Wraps the backend's HTTP API using [`reqwest`]. Every call reads the
//! session token at dispatch time, so a sign-in that happens after the
//! client was built is still honored.

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{extract_message, HttpError};
use crate::session::SessionStore;

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client bound to one backend and one session.
///
/// Cheap to clone; clones share the connection pool and the session.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    api_url: String,
    session: SessionStore,
}

impl HttpClient {
    /// Build a client with the configured timeout.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(HttpError::from_reqwest)?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Issue one request and decode the JSON response.
    ///
    /// Empty success bodies (e.g. `204 No Content`) decode to
    /// [`Value::Null`]. Non-2xx responses become [`HttpError::Status`]
    /// carrying the server's message. No retries.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, HttpError> {
        let url = self.url(path);
        let request_id = uuid::Uuid::new_v4().to_string();

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(REQUEST_ID_HEADER, &request_id);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(token) = self.session.token().await {
            builder = builder.header(AUTHORIZATION, format!("Token {token}"));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(%method, url = %url, request_id = %request_id, "Sending request");

        let response = builder.send().await.map_err(|e| {
            let err = HttpError::from_reqwest(e);
            tracing::warn!(%method, url = %url, request_id = %request_id, error = %err, "Request failed");
            err
        })?;

        let status = response.status();
        let text = response.text().await.map_err(HttpError::from_reqwest)?;

        if !status.is_success() {
            let message = extract_message(&text, status.as_u16());
            tracing::warn!(
                %method,
                url = %url,
                request_id = %request_id,
                status = status.as_u16(),
                message = %message,
                "Server returned an error",
            );
            return Err(HttpError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, HttpError> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, HttpError> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, HttpError> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, HttpError> {
        self.request(Method::DELETE, path, &[], None).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}
