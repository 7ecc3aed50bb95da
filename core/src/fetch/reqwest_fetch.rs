use async_trait::async_trait;
use log::trace;
use reqwest::{redirect::Policy, Client, ClientBuilder, Method, RequestBuilder};

use super::Fetch;
use crate::config::{CacheMode, RedirectPolicy, ReferrerPolicy, TransportOptions};
use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// A `Fetch` backed by [`reqwest`].
///
/// Redirect handling is fixed per `reqwest::Client`, so one client is kept for
/// each redirect policy.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    follow: Client,
    manual: Client,
    error: Client,
}

impl ReqwestFetch {
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            follow: ClientBuilder::new().build()?,
            manual: ClientBuilder::new().redirect(Policy::none()).build()?,
            error: ClientBuilder::new()
                .redirect(Policy::custom(|attempt| {
                    attempt.error("redirect rejected by request policy")
                }))
                .build()?,
        })
    }

    fn client(&self, redirect: RedirectPolicy) -> &Client {
        match redirect {
            RedirectPolicy::Follow => &self.follow,
            RedirectPolicy::Manual => &self.manual,
            RedirectPolicy::Error => &self.error,
        }
    }
}

#[async_trait]
impl Fetch for ReqwestFetch {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        trace!("sending {} request to {}", request.method, request.url);

        let client = self.client(request.options.redirect);
        let mut builder = client.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = apply_options(builder, request);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = client.execute(builder.build()?).await?;
        let status = response.status().as_u16();

        trace!("got {status} response from {}", request.url);

        Ok(HttpResponse {
            status,
            body: response.text().await?,
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
    }
}

/// Express the fetch options that have an HTTP-level meaning as headers.
/// Headers set explicitly by the caller are left alone.
fn apply_options(mut builder: RequestBuilder, request: &HttpRequest) -> RequestBuilder {
    let TransportOptions {
        cache,
        referrer,
        referrer_policy,
        keep_alive,
        ..
    } = &request.options;

    let cache_control = match cache {
        CacheMode::NoStore => Some("no-store"),
        CacheMode::Reload | CacheMode::NoCache => Some("no-cache"),
        CacheMode::Default | CacheMode::ForceCache | CacheMode::OnlyIfCached => None,
    };
    if let Some(value) = cache_control {
        if request.header("cache-control").is_none() {
            builder = builder.header("cache-control", value);
        }
    }

    if let Some(referrer) = referrer.as_deref().filter(|referrer| !referrer.is_empty()) {
        if *referrer_policy != Some(ReferrerPolicy::NoReferrer) && request.header("referer").is_none()
        {
            builder = builder.header("referer", referrer);
        }
    }

    if *keep_alive == Some(false) && request.header("connection").is_none() {
        builder = builder.header("connection", "close");
    }

    builder
}
