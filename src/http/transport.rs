//! Transport seam between the status-classifying client and the HTTP stack.

use async_trait::async_trait;
use reqwest::{Client, Request, Response};

/// Executes a single transport-level request.
///
/// Implementations must return a response for every HTTP status; only
/// connection-level problems (refused, timeout, DNS, redirect loops) are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl Transport for Client {
    async fn execute(&self, request: Request) -> reqwest::Result<Response> {
        Client::execute(self, request).await
    }
}
