use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue},
};

use crate::http::HttpClient;

pub const DEFAULT_USER_AGENT: &str = "storage-http";

/// Raised by the probe commands for a 404 when `--not-found-error` is set.
#[derive(Debug, Default)]
pub struct NotFoundError;

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object not found")
    }
}

impl std::error::Error for NotFoundError {}

/// Settings shared by all probe commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub good_status_codes: Vec<u16>,
    /// Raw `Name: value` header lines sent with every request.
    pub headers: Vec<String>,
    pub user_agent: Option<String>,
    pub not_found_error: bool,
}

pub struct Config {
    pub client: HttpClient,
}

impl Config {
    pub fn new(settings: &Settings) -> Result<Self> {
        let headers = parse_headers(&settings.headers)?;
        let user_agent = settings.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

        let transport = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        let mut client = HttpClient::new(transport)
            .with_good_status_codes(settings.good_status_codes.iter().copied());
        if settings.not_found_error {
            client = client.with_custom_error::<NotFoundError>(404);
        }
        debug!("Acceptable status codes: {:?}", client.good_status_codes());

        Ok(Self { client })
    }
}

/// Parses `Name: value` lines. Values of credential-like headers are marked
/// sensitive so they never show up in debug output.
pub fn parse_headers(lines: &[String]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .with_context(|| format!("Invalid header '{}', expected 'Name: value'", line))?;

        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .with_context(|| format!("Invalid header name in '{}'", line))?;
        let mut value = HeaderValue::from_str(value.trim())
            .with_context(|| format!("Invalid header value in '{}'", line))?;

        let lower = name.as_str();
        if lower.contains("auth") || lower.contains("token") || lower.contains("key") {
            value.set_sensitive(true);
        }
        debug!("Sending header {} with every request", name);
        headers.append(name, value);
    }
    Ok(headers)
}
