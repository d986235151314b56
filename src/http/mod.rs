//! Status-classifying HTTP client for object storage APIs.
//!
//! A [`HttpClient`] sends [`HttpRequest`]s through a [`Transport`] and decides
//! from the response status alone whether a request succeeded:
//!
//! - `send` fails with a registered custom error or an [`UnexpectedStatusError`]
//! - `send_many` never fails; it splits correlated objects into `ok` and `failed`

mod batch;
mod client;
mod error;
mod request;
mod transport;

pub use batch::{BatchFailure, BatchOutcome, BatchResult, HttpFailure, TransportFailure};
pub use client::{BATCH_CONCURRENCY, HttpClient};
pub use error::{ErrorFactory, UnexpectedStatusError, error_factory, headers_to_json};
pub use request::{HttpRequest, reason_phrase};
pub use transport::Transport;
