//! Entity-level operations over the REST API.
//!
//! [`RecordApi`] has a single required method, [`RecordApi::request`];
//! every entity operation is a provided method built on top of it, so an
//! implementation only decides how a request reaches the backend.

use async_trait::async_trait;
use counsel_core::identity::StudentCandidate;
use counsel_core::record::Record;
use counsel_core::types::RecordId;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::HttpError;
use crate::http::HttpClient;

/// Student lookup endpoint.
pub const SEARCH_STUDENT_PATH: &str = "/search-student/";

/// `/{endpoint}/`
pub fn collection_path(endpoint: &str) -> String {
    format!("/{endpoint}/")
}

/// `/{endpoint}/{id}/`
pub fn member_path(endpoint: &str, id: RecordId) -> String {
    format!("/{endpoint}/{id}/")
}

/// Decode a list response.
///
/// Accepts a bare JSON array, a `{"results": [...]}` page or a
/// `{"data": [...]}` envelope. `null` decodes to an empty list.
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, HttpError> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => return Err(HttpError::Decode("expected a list of records".into())),
        },
        _ => return Err(HttpError::Decode("expected a list of records".into())),
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(HttpError::from))
        .collect()
}

/// Decode the body of a create/update response, falling back to the
/// record that was sent when the server answers without a body.
fn decode_saved(value: Value, sent: &Record) -> Result<Record, HttpError> {
    match value {
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        Value::Null => Ok(sent.clone()),
        _ => Err(HttpError::Decode("expected a record object".into())),
    }
}

/// Operations the record-management layer needs from the backend.
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Issue one request and return the decoded JSON body.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, HttpError>;

    /// `GET /{endpoint}/`
    async fn list(&self, endpoint: &str) -> Result<Vec<Record>, HttpError> {
        let value = self
            .request(Method::GET, &collection_path(endpoint), &[], None)
            .await?;
        decode_list(value)
    }

    /// `POST /{endpoint}/`; returns the server's copy with its id.
    async fn create(&self, endpoint: &str, record: &Record) -> Result<Record, HttpError> {
        let body = serde_json::to_value(record)?;
        let value = self
            .request(Method::POST, &collection_path(endpoint), &[], Some(&body))
            .await?;
        decode_saved(value, record)
    }

    /// `PUT /{endpoint}/{id}/`
    async fn update(
        &self,
        endpoint: &str,
        id: RecordId,
        record: &Record,
    ) -> Result<Record, HttpError> {
        let body = serde_json::to_value(record)?;
        let value = self
            .request(Method::PUT, &member_path(endpoint, id), &[], Some(&body))
            .await?;
        decode_saved(value, record)
    }

    /// `DELETE /{endpoint}/{id}/`
    async fn delete(&self, endpoint: &str, id: RecordId) -> Result<(), HttpError> {
        self.request(Method::DELETE, &member_path(endpoint, id), &[], None)
            .await?;
        Ok(())
    }

    /// `GET /search-student/?query=...`
    async fn search_students(&self, query: &str) -> Result<Vec<StudentCandidate>, HttpError> {
        let params = [("query".to_string(), query.to_string())];
        let value = self
            .request(Method::GET, SEARCH_STUDENT_PATH, &params, None)
            .await?;
        decode_list(value)
    }

    /// `GET /{endpoint}/?grade=&start_date=&end_date=`, undecoded.
    async fn analytics(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<Value, HttpError> {
        self.request(Method::GET, &collection_path(endpoint), query, None)
            .await
    }
}

#[async_trait]
impl RecordApi for HttpClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, HttpError> {
        HttpClient::request(self, method, path, query, body).await
    }
}
