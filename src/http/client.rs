//! HTTP client that classifies responses by status code.

use anyhow::Result;
use futures_util::stream::{self, StreamExt};
use log::{debug, warn};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response};
use std::collections::{BTreeSet, HashMap};

use super::batch::{BatchOutcome, BatchResult, HttpFailure, TransportFailure};
use super::error::{ErrorFactory, UnexpectedStatusError, error_factory};
use super::request::{HttpRequest, reason_phrase};
use super::transport::Transport;

/// Maximum number of requests of a batch in flight at once.
pub const BATCH_CONCURRENCY: usize = 25;

/// Sends requests and maps their status codes to success or failure.
///
/// Configure it with the `with_*` methods before the first send; the
/// configuration is read-only afterwards.
#[derive(Clone)]
pub struct HttpClient<T: Transport = Client> {
    transport: T,
    good_status_codes: BTreeSet<u16>,
    custom_errors: HashMap<u16, ErrorFactory>,
}

impl Default for HttpClient<Client> {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl<T: Transport> HttpClient<T> {
    /// Creates a client with no acceptable status codes.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            good_status_codes: BTreeSet::new(),
            custom_errors: HashMap::new(),
        }
    }

    /// Replaces the set of status codes treated as success.
    pub fn with_good_status_codes<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.good_status_codes = codes.into_iter().collect();
        self
    }

    /// Replaces the status code to error mapping.
    pub fn with_custom_errors(mut self, custom_errors: HashMap<u16, ErrorFactory>) -> Self {
        self.custom_errors = custom_errors;
        self
    }

    /// Raises `E::default()` from `send` when `status_code` is not acceptable.
    pub fn with_custom_error<E>(mut self, status_code: u16) -> Self
    where
        E: std::error::Error + Default + Send + Sync + 'static,
    {
        self.custom_errors.insert(status_code, error_factory::<E>());
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn good_status_codes(&self) -> &BTreeSet<u16> {
        &self.good_status_codes
    }

    pub fn is_good_status(&self, status_code: u16) -> bool {
        self.good_status_codes.contains(&status_code)
    }

    /// Sends a single request and attaches the response to it.
    ///
    /// Returns `Ok(true)` for an acceptable status. Otherwise fails with the
    /// registered custom error for the status, or an [`UnexpectedStatusError`].
    /// Transport errors are returned as the underlying `reqwest::Error`.
    #[tracing::instrument(
        skip(self, request),
        fields(method = %request.method(), url = %request.url())
    )]
    pub async fn send(&self, request: &mut HttpRequest) -> Result<bool> {
        debug!("Sending [{}] {}...", request.method(), request.url());

        let response = self.transport.execute(request.transport_request()).await?;
        let status_code = response.status().as_u16();

        let failure = if self.is_good_status(status_code) {
            None
        } else {
            Some(self.status_error(
                status_code,
                request.method(),
                request.url().as_str(),
                response.headers(),
            ))
        };
        request.set_response(response);

        match failure {
            None => {
                debug!("Got acceptable status {} from {}", status_code, request.url());
                Ok(true)
            }
            Some(err) => {
                debug!("Got status {} from {}: {}", status_code, request.url(), err);
                Err(err)
            }
        }
    }

    /// Sends all requests concurrently and sorts the correlated objects into
    /// `ok` and `failed`, keeping input order. Never fails as a whole.
    ///
    /// # Panics
    ///
    /// Panics if `requests` and `objects` differ in length.
    pub async fn send_many<O>(&self, requests: &[HttpRequest], objects: Vec<O>) -> BatchResult<O> {
        self.outcomes(requests, objects).await.into_iter().collect()
    }

    /// Like [`send_many`](Self::send_many), but returns one outcome per request.
    ///
    /// # Panics
    ///
    /// Panics if `requests` and `objects` differ in length.
    #[tracing::instrument(skip(self, requests, objects), fields(count = requests.len()))]
    pub async fn outcomes<O>(
        &self,
        requests: &[HttpRequest],
        objects: Vec<O>,
    ) -> Vec<BatchOutcome<O>> {
        assert_eq!(
            requests.len(),
            objects.len(),
            "every request needs exactly one correlated object"
        );
        debug!("Sending batch of {} requests...", requests.len());

        let transport = &self.transport;
        let results: Vec<reqwest::Result<Response>> = stream::iter(
            requests
                .iter()
                .map(|request| transport.execute(request.transport_request())),
        )
        .buffered(BATCH_CONCURRENCY)
        .collect()
        .await;

        requests
            .iter()
            .zip(objects)
            .zip(results)
            .map(|((request, object), result)| self.classify(request, object, result))
            .collect()
    }

    fn classify<O>(
        &self,
        request: &HttpRequest,
        object: O,
        result: reqwest::Result<Response>,
    ) -> BatchOutcome<O> {
        let request_url = request.url().to_string();

        match result {
            Err(err) => {
                let status = err.status();
                let effective_url = err
                    .url()
                    .map(|url| url.to_string())
                    .unwrap_or_else(|| request_url.clone());
                let exception = format!("{:#}", anyhow::Error::from(err));
                warn!("Request to {} failed: {}", request_url, exception);

                BatchOutcome::TransportFailure(TransportFailure {
                    exception,
                    request_url,
                    effective_url,
                    object,
                    status_code: status.map(|s| s.as_u16()),
                    reason: status
                        .and_then(|s| s.canonical_reason())
                        .unwrap_or_default()
                        .to_string(),
                })
            }
            Ok(response) if self.is_good_status(response.status().as_u16()) => {
                BatchOutcome::Ok(object)
            }
            Ok(response) => {
                let status = response.status();
                debug!("Got status {} from {}", status.as_u16(), response.url());

                BatchOutcome::HttpFailure(HttpFailure {
                    request_url,
                    effective_url: response.url().to_string(),
                    object,
                    status_code: status.as_u16(),
                    reason: reason_phrase(&response),
                })
            }
        }
    }

    fn status_error(
        &self,
        status_code: u16,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
    ) -> anyhow::Error {
        if let Some(factory) = self.custom_errors.get(&status_code) {
            return factory();
        }

        anyhow::Error::new(UnexpectedStatusError::new(
            status_code,
            method.clone(),
            url,
            headers,
        ))
    }
}
