use serde_json::Value;

/// Errors from a single HTTP call.
///
/// Every variant is local to the call that produced it; nothing here is
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request did not complete within the client-wide timeout.
    #[error("Request timed out")]
    Timeout,

    /// Transport failure (connection refused, DNS, TLS, ...).
    #[error("HTTP request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Server error ({status}): {message}")]
    Status {
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl HttpError {
    /// Classify a transport-level [`reqwest::Error`].
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err)
        }
    }

    /// HTTP status for [`HttpError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout => "The server took too long to respond".to_string(),
            Self::Network(_) => "Could not reach the server".to_string(),
            Self::Status { message, .. } => message.clone(),
            Self::Decode(_) => "The server sent an unexpected response".to_string(),
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Looks for `detail`, `error` or `message` string fields, then for the
/// first field-level error list (`{"sr_code": ["This field is required."]}`),
/// and finally falls back to the raw body text or the bare status.
pub fn extract_message(body: &str, status: u16) -> String {
    let trimmed = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["detail", "error", "message"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
        for (field, value) in &map {
            let first = match value {
                Value::Array(items) => items.iter().find_map(Value::as_str),
                Value::String(s) => Some(s.as_str()),
                _ => None,
            };
            if let Some(msg) = first {
                return format!("{field}: {msg}");
            }
        }
    }

    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}
