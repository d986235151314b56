pub mod commands;
pub mod http;

pub use crate::http::{
    BatchFailure, BatchOutcome, BatchResult, HttpClient, HttpRequest, Transport,
    UnexpectedStatusError,
};
