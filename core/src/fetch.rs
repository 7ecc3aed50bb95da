//! The I/O seam between request building and response classification.
//!
//! # Design
//! The executor never touches the network itself. It hands an `HttpRequest`
//! to a `Fetch` and classifies whatever `HttpResponse` comes back, so tests
//! can swap the transport for a recording stub.

mod reqwest_fetch;
#[cfg(test)]
mod stub;

pub use self::reqwest_fetch::ReqwestFetch;
#[cfg(test)]
pub use self::stub::StubFetch;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs exactly one HTTP round-trip per call.
///
/// Non-2xx statuses are responses, not errors. Only failures that leave no
/// response to classify are returned as `Err`.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError>;
}

