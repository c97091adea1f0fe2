use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Client-wide request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Where the session token and role are persisted between runs.
pub const DEFAULT_SESSION_FILE: &str = ".counsel/session.json";

/// Delay between the last keystroke and the lookup request.
pub const DEFAULT_LOOKUP_DEBOUNCE_MS: u64 = 250;

/// Lookup queries shorter than this never reach the backend.
pub const DEFAULT_LOOKUP_MIN_CHARS: usize = 2;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to.
    pub api_url: String,
    /// Fixed timeout applied to every request.
    pub timeout: Duration,
    /// Persisted session file. `None` keeps the session in memory only.
    pub session_file: Option<PathBuf>,
    pub lookup_debounce: Duration,
    pub lookup_min_chars: usize,
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("COUNSEL_API_URL must be an http(s) URL, got '{0}'")]
    InvalidApiUrl(String),
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_file: Some(PathBuf::from(DEFAULT_SESSION_FILE)),
            lookup_debounce: Duration::from_millis(DEFAULT_LOOKUP_DEBOUNCE_MS),
            lookup_min_chars: DEFAULT_LOOKUP_MIN_CHARS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                     |
    /// |------------------------------|-----------------------------|
    /// | `COUNSEL_API_URL`            | `http://localhost:8000/api` |
    /// | `COUNSEL_TIMEOUT_SECS`       | `5`                         |
    /// | `COUNSEL_SESSION_FILE`       | `.counsel/session.json`     |
    /// | `COUNSEL_LOOKUP_DEBOUNCE_MS` | `250`                       |
    /// | `COUNSEL_LOOKUP_MIN_CHARS`   | `2`                         |
    ///
    /// An empty `COUNSEL_SESSION_FILE` disables persistence.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from an arbitrary
    /// key/value source.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = get("COUNSEL_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        let timeout_secs: u64 = parse_or(&get, "COUNSEL_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let debounce_ms: u64 =
            parse_or(&get, "COUNSEL_LOOKUP_DEBOUNCE_MS", DEFAULT_LOOKUP_DEBOUNCE_MS);
        let lookup_min_chars: usize =
            parse_or(&get, "COUNSEL_LOOKUP_MIN_CHARS", DEFAULT_LOOKUP_MIN_CHARS);

        let session_file = match get("COUNSEL_SESSION_FILE") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(PathBuf::from(v.trim())),
            None => Some(PathBuf::from(DEFAULT_SESSION_FILE)),
        };

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            session_file,
            lookup_debounce: Duration::from_millis(debounce_ms),
            lookup_min_chars,
        })
    }
}

/// Parse an optional value, falling back to `default` (with a warning)
/// when it is present but malformed.
fn parse_or<T: FromStr + Copy + std::fmt::Display>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "Ignoring malformed config value");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ClientConfig::from_source(source(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.lookup_min_chars, 2);
        assert_eq!(config.lookup_debounce, Duration::from_millis(250));
        assert_eq!(config.session_file, Some(PathBuf::from(DEFAULT_SESSION_FILE)));
    }

    #[test]
    fn overrides_are_applied() {
        let config = ClientConfig::from_source(source(&[
            ("COUNSEL_API_URL", "https://guidance.example.edu/api/"),
            ("COUNSEL_TIMEOUT_SECS", "10"),
            ("COUNSEL_LOOKUP_DEBOUNCE_MS", "300"),
            ("COUNSEL_SESSION_FILE", ""),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://guidance.example.edu/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.lookup_debounce, Duration::from_millis(300));
        assert_eq!(config.session_file, None);
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let config =
            ClientConfig::from_source(source(&[("COUNSEL_TIMEOUT_SECS", "soon")])).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn non_http_url_rejected() {
        assert_matches!(
            ClientConfig::from_source(source(&[("COUNSEL_API_URL", "ftp://x")])),
            Err(ConfigError::InvalidApiUrl(_))
        );
    }
}
