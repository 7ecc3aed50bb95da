//! Configuration-driven HTTP fetching with observable response state.
//!
//! # Overview
//! A `RequestConfig` describes one HTTP call. `RequestExecutor` turns it into
//! an `HttpRequest`, sends it through a `Fetch` implementation and classifies
//! the response into an `Outcome`. `ResponseController` wraps the executor
//! with a `ResponseState` that re-runs the request whenever its configuration
//! changes.
//!
//! # Design
//! - Building and classifying are pure; only `Fetch` performs I/O, so tests
//!   swap in a stub transport or run against the mock server.
//! - A GET with a body answers 412 without touching the network.
//! - Execution errors reach callers as a 500 state, never as `Err`.
//! - Response state moves only through `state::reduce`.

pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod http;
pub mod state;

pub use config::{
    CacheMode, Credentials, RedirectPolicy, ReferrerPolicy, RequestConfig, RequestMode,
    ResponseType, TransportOptions,
};
pub use controller::ResponseController;
pub use error::FetchError;
pub use executor::{Outcome, RequestExecutor};
pub use fetch::{Fetch, ReqwestFetch};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use state::{Action, Phase, ResponseState};
