//! Request configuration and fetch transport options.
//!
//! # Design
//! `RequestConfig` is the single description of one HTTP call. A controller
//! holds two of them: static defaults fixed at construction and a dynamic one
//! replaced through the setter. `merged_over` resolves the pair field by field,
//! the dynamic side winning whenever it sets a value.
//!
//! Field names serialize in camelCase so configurations can be written as the
//! same JSON objects a browser `fetch` call would take.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::HttpMethod;

/// Cache mode of a fetch request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    #[default]
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

/// Request mode of a fetch request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    #[default]
    Cors,
    NoCors,
    SameOrigin,
    Navigate,
}

/// Credentials policy of a fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    Omit,
    SameOrigin,
    Include,
}

/// Redirect policy of a fetch request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedirectPolicy {
    #[default]
    Follow,
    Error,
    Manual,
}

/// Referrer policy of a fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferrerPolicy {
    #[serde(rename = "")]
    Unset,
    NoReferrer,
    NoReferrerWhenDowngrade,
    Origin,
    OriginWhenCrossOrigin,
    SameOrigin,
    StrictOrigin,
    StrictOriginWhenCrossOrigin,
    UnsafeUrl,
}

/// How the response body is turned into a payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    #[default]
    Json,
    Text,
}

/// Resolved transport options carried on an `HttpRequest`.
///
/// Cache and mode fall back to `default` and `cors`; the rest stay unset
/// unless configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    pub cache: CacheMode,
    pub mode: RequestMode,
    pub integrity: Option<String>,
    pub credentials: Option<Credentials>,
    pub referrer: Option<String>,
    pub referrer_policy: Option<ReferrerPolicy>,
    pub redirect: RedirectPolicy,
    pub keep_alive: Option<bool>,
    pub response_type: ResponseType,
}

/// Full set of parameters describing one HTTP call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestConfig {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// Header values may be strings, `null` or objects; they are stringified
    /// when the request is built.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RequestMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_policy: Option<ReferrerPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
}

impl RequestConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_cache(mut self, cache: CacheMode) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_integrity(mut self, integrity: impl Into<String>) -> Self {
        self.integrity = Some(integrity.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_redirect(mut self, redirect: RedirectPolicy) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_referrer_policy(mut self, referrer_policy: ReferrerPolicy) -> Self {
        self.referrer_policy = Some(referrer_policy);
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Whether the configuration names a URI to request.
    pub fn has_uri(&self) -> bool {
        !self.uri.is_empty()
    }

    pub fn method(&self) -> HttpMethod {
        self.method.unwrap_or_default()
    }

    /// Whether a body with actual content is configured. `null` and empty
    /// containers count as no body.
    pub fn has_body(&self) -> bool {
        match &self.body {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::String(text)) => !text.is_empty(),
            Some(_) => true,
        }
    }

    /// Resolve this configuration over `defaults`, preferring every field set
    /// here.
    pub fn merged_over(&self, defaults: &RequestConfig) -> RequestConfig {
        RequestConfig {
            uri: if self.has_uri() {
                self.uri.clone()
            } else {
                defaults.uri.clone()
            },
            method: self.method.or(defaults.method),
            headers: self.headers.clone().or_else(|| defaults.headers.clone()),
            body: self.body.clone().or_else(|| defaults.body.clone()),
            params: self.params.clone().or_else(|| defaults.params.clone()),
            cache: self.cache.or(defaults.cache),
            mode: self.mode.or(defaults.mode),
            integrity: self.integrity.clone().or_else(|| defaults.integrity.clone()),
            credentials: self.credentials.or(defaults.credentials),
            referrer: self.referrer.clone().or_else(|| defaults.referrer.clone()),
            referrer_policy: self.referrer_policy.or(defaults.referrer_policy),
            redirect: self.redirect.or(defaults.redirect),
            keep_alive: self.keep_alive.or(defaults.keep_alive),
            response_type: self.response_type.or(defaults.response_type),
        }
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            cache: self.cache.unwrap_or_default(),
            mode: self.mode.unwrap_or_default(),
            integrity: self.integrity.clone(),
            credentials: self.credentials,
            referrer: self.referrer.clone(),
            referrer_policy: self.referrer_policy,
            redirect: self.redirect.unwrap_or_default(),
            keep_alive: self.keep_alive,
            response_type: self.response_type.unwrap_or_default(),
        }
    }
}
