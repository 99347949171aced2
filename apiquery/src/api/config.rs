//! Per-call request configuration
//!
//! The pipeline builds a base configuration (authorization) and merges the
//! caller's overrides onto it, override winning per key.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderName, InvalidHeaderValue};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("invalid header name: {0}")]
    Name(#[from] InvalidHeaderName),
    #[error("invalid header value: {0}")]
    Value(#[from] InvalidHeaderValue),
}

/// Headers, query parameters and timeout for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    pub headers: HeaderMap,
    pub query: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Like [`RequestConfig::header`] for names and values only known at
    /// runtime.
    pub fn try_header(self, name: &str, value: &str) -> Result<Self, HeaderError> {
        let name = HeaderName::from_bytes(name.trim().as_bytes())?;
        let value = HeaderValue::from_str(value.trim())?;
        Ok(self.header(name, value))
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Deep-merge `overrides` onto `self`.
    ///
    /// Headers and query parameters merge per key with the override winning;
    /// the timeout is replaced only when the override sets one.
    pub fn merge(mut self, overrides: RequestConfig) -> Self {
        // HeaderMap::extend replaces every value of a name present in overrides.
        self.headers.extend(overrides.headers);
        self.query.extend(overrides.query);
        if overrides.timeout.is_some() {
            self.timeout = overrides.timeout;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

    #[test]
    fn test_merge_override_wins_per_key() {
        let base = RequestConfig::new()
            .header(AUTHORIZATION, HeaderValue::from_static("Bearer t1"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .query_param("a", "1")
            .timeout(Duration::from_secs(30));
        let overrides = RequestConfig::new()
            .header(CONTENT_TYPE, HeaderValue::from_static("multipart/form-data"))
            .query_param("b", "2");

        let merged = base.merge(overrides);

        assert_eq!(merged.headers[AUTHORIZATION], "Bearer t1");
        assert_eq!(merged.headers[CONTENT_TYPE], "multipart/form-data");
        assert_eq!(merged.query.len(), 2);
        assert_eq!(merged.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_merge_replaces_timeout_when_set() {
        let merged = RequestConfig::new()
            .timeout(Duration::from_secs(30))
            .merge(RequestConfig::new().timeout(Duration::from_secs(5)));
        assert_eq!(merged.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_try_header_rejects_bad_names() {
        assert!(RequestConfig::new().try_header("X-Trace", "abc").is_ok());
        assert!(RequestConfig::new().try_header("bad name", "abc").is_err());
    }
}
