//! Request building, dispatch and response classification.
//!
//! # Design
//! `RequestExecutor` splits one call into `build_request`, the `Fetch`
//! round-trip, and `classify_response`. Build and classify are pure, so both
//! sides of the I/O boundary can be tested without a network.

use log::debug;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::config::{RequestConfig, ResponseType};
use crate::error::FetchError;
use crate::fetch::Fetch;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Status reported when a GET request is configured with a body.
pub const PRECONDITION_FAILED: u16 = 412;

const NO_CONTENT: u16 = 204;

const GET_WITH_BODY_MESSAGE: &str = "a GET request cannot carry a body";

/// Status code and parsed payload of a finished call.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: u16,
    pub payload: Value,
}

impl Outcome {
    pub fn new(status: u16, payload: impl Into<Value>) -> Self {
        Self {
            status,
            payload: payload.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Produces the request body for one verb.
type BodyBuilder = fn(&RequestConfig) -> Result<Option<String>, FetchError>;

/// Per-verb request construction. GET never sends a body; every other verb
/// serializes the configured body as JSON.
fn body_builder(method: HttpMethod) -> BodyBuilder {
    match method {
        HttpMethod::Get => no_body,
        HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete | HttpMethod::Patch => json_body,
    }
}

fn no_body(_: &RequestConfig) -> Result<Option<String>, FetchError> {
    Ok(None)
}

fn json_body(config: &RequestConfig) -> Result<Option<String>, FetchError> {
    config
        .body
        .as_ref()
        .map(|body| serde_json::to_string(body).map_err(|e| FetchError::Serialize(e.to_string())))
        .transpose()
}

/// Executes fully resolved request configurations through a `Fetch`.
#[derive(Debug, Clone)]
pub struct RequestExecutor<F> {
    fetch: F,
}

impl<F: Fetch> RequestExecutor<F> {
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }

    pub fn fetch(&self) -> &F {
        &self.fetch
    }

    /// Reject configurations that must not reach the network.
    pub fn validate(&self, config: &RequestConfig) -> Option<Outcome> {
        (config.method() == HttpMethod::Get && config.has_body())
            .then(|| Outcome::new(PRECONDITION_FAILED, GET_WITH_BODY_MESSAGE))
    }

    pub fn build_request(&self, config: &RequestConfig) -> Result<HttpRequest, FetchError> {
        let method = config.method();
        let body = body_builder(method)(config)?;

        let headers = config
            .headers
            .iter()
            .flatten()
            .map(|(name, value)| (name.clone(), stringify(value)))
            .collect();

        let mut request = HttpRequest {
            method,
            url: resolve_url(&config.uri, config.params.as_ref()),
            headers,
            body,
            options: config.transport_options(),
        };

        if request.body.is_some() && request.header("content-type").is_none() {
            request
                .headers
                .push(("content-type".to_string(), "application/json".to_string()));
        }

        Ok(request)
    }

    /// Turn a response into an outcome. Success and failure statuses share
    /// one parse path; 204 and empty bodies yield a null payload.
    pub fn classify_response(
        &self,
        response: HttpResponse,
        response_type: ResponseType,
    ) -> Result<Outcome, FetchError> {
        let HttpResponse { status, body } = response;

        if status == NO_CONTENT || body.trim().is_empty() {
            return Ok(Outcome::new(status, Value::Null));
        }

        let payload = match response_type {
            ResponseType::Json => {
                serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?
            }
            ResponseType::Text => Value::String(body),
        };

        Ok(Outcome { status, payload })
    }

    /// Validate, build, send and classify one request.
    pub async fn execute(&self, config: &RequestConfig) -> Result<Outcome, FetchError> {
        if let Some(rejected) = self.validate(config) {
            debug!("rejected {} {}: {}", config.method(), config.uri, rejected.payload);
            return Ok(rejected);
        }

        let request = self.build_request(config)?;
        let response = self.fetch.fetch(&request).await?;

        self.classify_response(response, request.options.response_type)
    }
}

/// Append the query parameters to `uri` behind a `?` when there are any.
pub fn resolve_url(uri: &str, params: Option<&Map<String, Value>>) -> String {
    match params {
        Some(params) if !params.is_empty() => {
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (name, value) in params {
                query.append_pair(name, &stringify(value));
            }
            format!("{uri}?{}", query.finish())
        }
        _ => uri.to_string(),
    }
}

/// String form of a header or query value: strings verbatim, arrays
/// comma-joined, objects as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
