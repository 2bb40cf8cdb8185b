//! HTTP transport for manifest and chunk retrieval.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpError};
