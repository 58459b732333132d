//! Transport configuration.

use crate::error::{TransportError, TransportResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Environment variable holding the backend base URL.
pub const ENV_BASE_URL: &str = "CHATSTREAM_BASE_URL";
/// Environment variable holding the bearer token.
pub const ENV_TOKEN: &str = "CHATSTREAM_TOKEN";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "CHATSTREAM_TIMEOUT_SECS";

fn default_chat_path() -> String {
    "/chat".to_string()
}

/// Where and how to open chat streams.
///
/// Credentials are passed in explicitly; nothing here is read from
/// process-wide state unless the caller opts into [`from_env`](Self::from_env).
#[derive(Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Backend base URL.
    pub base_url: Url,
    /// Path of the streaming chat endpoint, appended to the base URL.
    #[serde(default = "default_chat_path")]
    pub chat_path: String,
    /// Bearer token sent as `Authorization`.
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,
    /// Whole-request timeout in milliseconds, body included.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Connection timeout in milliseconds.
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("base_url", &self.base_url.as_str())
            .field("chat_path", &self.chat_path)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TransportConfig {
    /// Create a config for a base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            chat_path: default_chat_path(),
            auth_token: None,
            timeout_ms: None,
            connect_timeout_ms: None,
            headers: BTreeMap::new(),
        }
    }

    /// Create a config by parsing a base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn parse(base_url: &str) -> TransportResult<Self> {
        Ok(Self::new(Url::parse(base_url)?))
    }

    /// Build a config from `CHATSTREAM_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or invalid, or the
    /// timeout is not a number.
    pub fn from_env() -> TransportResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a key lookup (the environment, a map, ...).
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TransportResult<Self> {
        let base_url = lookup(ENV_BASE_URL)
            .ok_or_else(|| TransportError::configuration(format!("{ENV_BASE_URL} is not set")))?;
        let mut config = Self::parse(&base_url)?;

        if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.is_empty()) {
            config.auth_token = Some(token);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                TransportError::configuration(format!("{ENV_TIMEOUT_SECS} is not a number: {raw}"))
            })?;
            config.timeout_ms = Some(secs.saturating_mul(1000));
        }

        Ok(config)
    }

    /// Set the bearer token.
    #[must_use]
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the chat endpoint path.
    #[must_use]
    pub fn chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = path.into();
        self
    }

    /// Set the whole-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(duration_to_millis(timeout));
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(duration_to_millis(timeout));
        self
    }

    /// Add an extra header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Full URL of the chat endpoint.
    ///
    /// The path is appended to the base URL verbatim, so a base of
    /// `https://host/api` and a path of `/chat` give `https://host/api/chat`.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined string is not a valid URL.
    pub fn endpoint(&self) -> TransportResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = self.chat_path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Whole-request timeout as a duration.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Connection timeout as a duration.
    #[must_use]
    pub fn connection_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    #[rstest]
    #[case("https://host", "/chat", "https://host/chat")]
    #[case("https://host/", "chat", "https://host/chat")]
    #[case("https://host/api", "/chat", "https://host/api/chat")]
    #[case("https://host/api/", "/v1/chat/stream", "https://host/api/v1/chat/stream")]
    fn test_endpoint_join(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let config = TransportConfig::parse(base).unwrap().chat_path(path);
        assert_eq!(config.endpoint().unwrap().as_str(), expected);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_BASE_URL, "http://localhost:8080"),
            (ENV_TOKEN, "secret"),
            (ENV_TIMEOUT_SECS, "30"),
        ]
        .into_iter()
        .collect();

        let config =
            TransportConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[rstest]
    #[case(Duration::from_millis(500))]
    #[case(Duration::from_millis(1500))]
    #[case(Duration::from_secs(30))]
    fn test_timeouts_keep_milliseconds(#[case] timeout: Duration) {
        let config = TransportConfig::parse("http://h")
            .unwrap()
            .timeout(timeout)
            .connect_timeout(timeout);
        assert_eq!(config.request_timeout(), Some(timeout));
        assert_eq!(config.connection_timeout(), Some(timeout));
    }

    #[test]
    fn test_from_lookup_requires_base_url() {
        let err = TransportConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, TransportError::Configuration(_)));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = TransportConfig::from_lookup(|key| match key {
            ENV_BASE_URL => Some("http://h".into()),
            ENV_TIMEOUT_SECS => Some("soon".into()),
            _ => None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_token_is_never_serialized_or_logged() {
        let config = TransportConfig::parse("http://h").unwrap().auth_token("hunter2");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: TransportConfig =
            serde_json::from_str(r#"{"base_url":"http://h","auth_token":"t"}"#).unwrap();
        assert_eq!(config.chat_path, "/chat");
        assert_eq!(config.auth_token.as_deref(), Some("t"));
        assert!(config.headers.is_empty());
    }
}
