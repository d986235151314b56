//! Errors raised when a response status is not acceptable.

use reqwest::Method;
use reqwest::header::HeaderMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds the error raised for a status code registered as a custom error.
pub type ErrorFactory = Arc<dyn Fn() -> anyhow::Error + Send + Sync>;

/// Returns a factory constructing `E` with no arguments.
pub fn error_factory<E>() -> ErrorFactory
where
    E: std::error::Error + Default + Send + Sync + 'static,
{
    Arc::new(|| anyhow::Error::new(E::default()))
}

/// Status code outside the acceptable set with no custom error registered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedStatusError {
    pub status_code: u16,
    pub method: Method,
    pub url: String,
    /// Response headers serialized as a JSON object of `name -> [values]`.
    pub headers: String,
}

impl UnexpectedStatusError {
    pub fn new(
        status_code: u16,
        method: Method,
        url: impl Into<String>,
        headers: &HeaderMap,
    ) -> Self {
        Self {
            status_code,
            method,
            url: url.into(),
            headers: headers_to_json(headers),
        }
    }
}

impl std::fmt::Display for UnexpectedStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unexpected http status '{}' from [{}] '{}'. Headers are: {}",
            self.status_code, self.method, self.url, self.headers
        )
    }
}

impl std::error::Error for UnexpectedStatusError {}

/// Serializes headers as JSON, grouping repeated header names into one list.
pub fn headers_to_json(headers: &HeaderMap) -> String {
    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        grouped
            .entry(name.as_str())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    serde_json::to_string(&grouped).unwrap_or_else(|_| "{}".to_string())
}
