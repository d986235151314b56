//! Per-item outcomes of a batch send and their aggregated result.

use serde::{Serialize, Serializer};

/// What happened to one request of a batch, tied to the caller's object.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome<O> {
    /// Response status was in the acceptable set.
    Ok(O),
    /// A response was received but its status is not acceptable.
    HttpFailure(HttpFailure<O>),
    /// The transport failed (connection refused, timeout, DNS, redirect loop).
    TransportFailure(TransportFailure<O>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpFailure<O> {
    pub request_url: String,
    pub effective_url: String,
    pub object: O,
    pub status_code: u16,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportFailure<O> {
    pub exception: String,
    pub request_url: String,
    /// URL the transport was at when it failed, or the request URL if unknown.
    pub effective_url: String,
    pub object: O,
    /// `None` when no response was captured; serialized as `"0"`.
    #[serde(serialize_with = "serialize_captured_status")]
    pub status_code: Option<u16>,
    /// Empty when no response was captured.
    pub reason: String,
}

fn serialize_captured_status<S: Serializer>(
    status_code: &Option<u16>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match status_code {
        Some(code) => serializer.serialize_u16(*code),
        None => serializer.serialize_str("0"),
    }
}

/// A failed batch item. Serializes flat, with `exception` present only for
/// transport failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchFailure<O> {
    Transport(TransportFailure<O>),
    Http(HttpFailure<O>),
}

impl<O> BatchFailure<O> {
    pub fn object(&self) -> &O {
        match self {
            BatchFailure::Transport(f) => &f.object,
            BatchFailure::Http(f) => &f.object,
        }
    }

    /// Status code of the failure, 0 if the transport captured no response.
    pub fn status_code(&self) -> u16 {
        match self {
            BatchFailure::Transport(f) => f.status_code.unwrap_or(0),
            BatchFailure::Http(f) => f.status_code,
        }
    }

    pub fn request_url(&self) -> &str {
        match self {
            BatchFailure::Transport(f) => &f.request_url,
            BatchFailure::Http(f) => &f.request_url,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, BatchFailure::Transport(_))
    }
}

/// Objects whose requests succeeded, and failure records for the rest,
/// both in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult<O> {
    pub ok: Vec<O>,
    pub failed: Vec<BatchFailure<O>>,
}

impl<O> Default for BatchResult<O> {
    fn default() -> Self {
        Self {
            ok: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<O> BatchResult<O> {
    pub fn total(&self) -> usize {
        self.ok.len() + self.failed.len()
    }

    pub fn is_all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<O> FromIterator<BatchOutcome<O>> for BatchResult<O> {
    fn from_iter<I: IntoIterator<Item = BatchOutcome<O>>>(iter: I) -> Self {
        let mut result = BatchResult::default();
        for outcome in iter {
            match outcome {
                BatchOutcome::Ok(object) => result.ok.push(object),
                BatchOutcome::HttpFailure(f) => result.failed.push(BatchFailure::Http(f)),
                BatchOutcome::TransportFailure(f) => {
                    result.failed.push(BatchFailure::Transport(f))
                }
            }
        }
        result
    }
}
