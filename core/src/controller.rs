//! Stateful wrapper that re-runs a request whenever its inputs change.
//!
//! # Design
//! A controller owns two configurations: static defaults given at
//! construction and a dynamic one replaced through `set_request`. Each change
//! runs one effect pass: if the effective inputs differ from the previous pass
//! and a URI resolves, it dispatches `Loading`, executes the request and
//! dispatches `Done`. Execution errors become a 500 outcome carrying the error
//! text; they never reach the caller.
//!
//! State lives in a `tokio::sync::watch` channel so a render loop can
//! subscribe to every transition. In-flight requests are neither cancelled
//! nor de-duplicated: the last one to resolve wins.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use serde_json::Value;
use tokio::sync::watch;

use crate::config::RequestConfig;
use crate::executor::RequestExecutor;
use crate::fetch::Fetch;
use crate::state::{reduce, Action, Phase, ResponseState};

/// Status dispatched when execution fails without a response.
pub const EXECUTION_FAILED: u16 = 500;

#[derive(Debug, Default)]
struct Inputs {
    defaults: RequestConfig,
    dynamic: RequestConfig,
    /// Dynamic configuration and static URI seen by the previous effect pass.
    last: Option<(RequestConfig, String)>,
}

/// Holds the latest response state and drives requests from configuration.
#[derive(Debug)]
pub struct ResponseController<F> {
    executor: RequestExecutor<F>,
    inputs: Mutex<Inputs>,
    phase: watch::Sender<Phase>,
}

impl<F: Fetch> ResponseController<F> {
    /// Create a controller in the idle state. `defaults` supplies every field
    /// the dynamic configuration leaves unset.
    pub fn new(fetch: F, defaults: RequestConfig) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            executor: RequestExecutor::new(fetch),
            inputs: Mutex::new(Inputs {
                defaults,
                ..Inputs::default()
            }),
            phase,
        }
    }

    pub fn executor(&self) -> &RequestExecutor<F> {
        &self.executor
    }

    pub fn state(&self) -> ResponseState {
        self.phase.borrow().to_state()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Run the first effect pass. Requests the static URI if there is one.
    pub async fn mount(&self) {
        self.run_effect().await;
    }

    /// Replace the dynamic configuration.
    pub async fn set_request(&self, config: RequestConfig) {
        self.inputs().dynamic = config;
        self.run_effect().await;
    }

    /// Replace the static default URI.
    pub async fn set_default_uri(&self, uri: impl Into<String>) {
        self.inputs().defaults.uri = uri.into();
        self.run_effect().await;
    }

    async fn run_effect(&self) {
        let Some(config) = self.next_request() else {
            return;
        };

        self.dispatch(Action::Loading);

        let action = match self.executor.execute(&config).await {
            Ok(outcome) => {
                if !outcome.is_success() {
                    debug!("{} {} answered {}", config.method(), config.uri, outcome.status);
                }
                Action::Done {
                    status_code: outcome.status,
                    payload: outcome.payload,
                }
            }
            Err(error) => {
                warn!("{} {} failed: {error}", config.method(), config.uri);
                Action::Done {
                    status_code: EXECUTION_FAILED,
                    payload: Value::String(error.to_string()),
                }
            }
        };

        self.dispatch(action);
    }

    /// Resolve the configuration to request, or `None` when the inputs are
    /// unchanged or no URI is available.
    fn next_request(&self) -> Option<RequestConfig> {
        let mut inputs = self.inputs();

        let key = (inputs.dynamic.clone(), inputs.defaults.uri.clone());
        if inputs.last.as_ref() == Some(&key) {
            debug!("request inputs unchanged, skipping");
            return None;
        }
        inputs.last = Some(key);

        let config = inputs.dynamic.merged_over(&inputs.defaults);
        if !config.has_uri() {
            debug!("no uri to request");
            return None;
        }

        Some(config)
    }

    fn dispatch(&self, action: Action) {
        debug!("dispatching {action:?}");
        self.phase
            .send_modify(|phase| *phase = reduce(std::mem::take(phase), action));
    }

    fn inputs(&self) -> MutexGuard<'_, Inputs> {
        self.inputs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::executor::PRECONDITION_FAILED;
    use crate::fetch::StubFetch;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::sync::Notify;

    fn controller(
        results: Vec<Result<HttpResponse, FetchError>>,
        defaults: RequestConfig,
    ) -> ResponseController<StubFetch> {
        ResponseController::new(StubFetch::new(results), defaults)
    }

    fn requests(controller: &ResponseController<StubFetch>) -> Vec<HttpRequest> {
        controller.executor().fetch().requests()
    }

    #[tokio::test]
    async fn get_request_updates_state() {
        let controller = controller(
            vec![Ok(HttpResponse::new(200, r#"[{"name":"a"}]"#))],
            RequestConfig::default(),
        );

        controller.set_request(RequestConfig::new("https://x/all")).await;

        let requests = requests(&controller);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert!(requests[0].body.is_none());
        assert_eq!(
            controller.state(),
            ResponseState {
                status_code: Some(200),
                payload: json!([{"name": "a"}]),
                loading: false,
            }
        );
    }

    #[tokio::test]
    async fn post_request_sends_json_body() {
        let controller = controller(vec![Ok(HttpResponse::new(201, ""))], RequestConfig::default());

        controller
            .set_request(
                RequestConfig::new("https://x/items")
                    .with_method(HttpMethod::Post)
                    .with_body(json!({"a": 1})),
            )
            .await;

        let requests = requests(&controller);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"a":1}"#));
        let state = controller.state();
        assert_eq!(state.status_code, Some(201));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn transport_failure_becomes_server_error() {
        let controller = controller(
            vec![Err(FetchError::Transport("timeout".to_string()))],
            RequestConfig::default(),
        );

        controller.set_request(RequestConfig::new("https://x/all")).await;

        assert_eq!(
            controller.state(),
            ResponseState {
                status_code: Some(500),
                payload: json!("timeout"),
                loading: false,
            }
        );
    }

    #[tokio::test]
    async fn error_status_is_reported_unchanged() {
        let controller = controller(
            vec![Ok(HttpResponse::new(404, r#"{"error":"missing"}"#))],
            RequestConfig::default(),
        );

        controller.set_request(RequestConfig::new("https://x/items/9")).await;

        assert_eq!(
            controller.state(),
            ResponseState {
                status_code: Some(404),
                payload: json!({"error": "missing"}),
                loading: false,
            }
        );
    }

    #[tokio::test]
    async fn decode_failure_becomes_server_error() {
        let controller = controller(
            vec![Ok(HttpResponse::new(200, "<html>"))],
            RequestConfig::default(),
        );

        controller.set_request(RequestConfig::new("https://x/all")).await;

        let state = controller.state();
        assert_eq!(state.status_code, Some(EXECUTION_FAILED));
        assert!(state.payload.as_str().unwrap().starts_with("deserialization failed"));
    }

    #[tokio::test]
    async fn get_with_body_is_precondition_failed() {
        let controller = controller(vec![], RequestConfig::default());

        controller
            .set_request(RequestConfig::new("https://x/all").with_body(json!({"a": 1})))
            .await;

        assert!(requests(&controller).is_empty());
        assert_eq!(controller.state().status_code, Some(PRECONDITION_FAILED));
    }

    #[tokio::test]
    async fn same_configuration_is_requested_once() {
        let controller = controller(
            vec![Ok(HttpResponse::new(200, "[]"))],
            RequestConfig::default(),
        );
        let config = RequestConfig::new("https://x/all").with_param("page", 1);

        controller.set_request(config.clone()).await;
        controller.set_request(config).await;

        assert_eq!(requests(&controller).len(), 1);
    }

    #[tokio::test]
    async fn changed_configuration_is_requested_again() {
        let controller = controller(
            vec![
                Ok(HttpResponse::new(200, "[]")),
                Ok(HttpResponse::new(200, "[1]")),
            ],
            RequestConfig::default(),
        );

        controller
            .set_request(RequestConfig::new("https://x/all").with_param("page", 1))
            .await;
        controller
            .set_request(RequestConfig::new("https://x/all").with_param("page", 2))
            .await;

        let requests = requests(&controller);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url, "https://x/all?page=2");
        assert_eq!(controller.state().payload, json!([1]));
    }

    #[tokio::test]
    async fn nothing_happens_without_uri() {
        let controller = controller(vec![], RequestConfig::default());

        controller.mount().await;
        controller
            .set_request(RequestConfig::default().with_method(HttpMethod::Post))
            .await;

        assert!(requests(&controller).is_empty());
        assert_eq!(controller.state(), ResponseState::default());
    }

    #[tokio::test]
    async fn mount_requests_static_uri() {
        let controller = controller(
            vec![Ok(HttpResponse::new(200, r#"{"user":"me"}"#))],
            RequestConfig::new("https://x/account").with_header("authorization", "Bearer t"),
        );

        controller.mount().await;

        let requests = requests(&controller);
        assert_eq!(requests[0].url, "https://x/account");
        assert_eq!(requests[0].header("authorization"), Some("Bearer t"));
        assert_eq!(controller.state().payload, json!({"user": "me"}));
    }

    #[tokio::test]
    async fn dynamic_uri_takes_priority() {
        let controller = controller(
            vec![
                Ok(HttpResponse::new(200, "1")),
                Ok(HttpResponse::new(200, "2")),
            ],
            RequestConfig::new("https://x/static"),
        );

        controller.mount().await;
        controller.set_request(RequestConfig::new("https://x/dynamic")).await;

        let urls: Vec<_> = requests(&controller).into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["https://x/static", "https://x/dynamic"]);
    }

    #[tokio::test]
    async fn changing_default_uri_triggers_request() {
        let controller = controller(
            vec![Ok(HttpResponse::new(204, ""))],
            RequestConfig::default(),
        );

        controller.mount().await;
        controller.set_default_uri("https://x/late").await;

        let requests = requests(&controller);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://x/late");
        assert_eq!(controller.state().status_code, Some(204));
        assert_eq!(controller.state().payload, Value::Null);
    }

    /// Holds requests to URLs ending in `/slow` until released.
    #[derive(Default)]
    struct GatedFetch {
        gate: Notify,
    }

    #[async_trait]
    impl Fetch for GatedFetch {
        async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
            if request.url.ends_with("/slow") {
                self.gate.notified().await;
            }
            Ok(HttpResponse::new(200, format!("{:?}", request.url)))
        }
    }

    #[tokio::test]
    async fn subscribers_observe_loading() {
        let controller = ResponseController::new(GatedFetch::default(), RequestConfig::default());
        let mut receiver = controller.subscribe();

        tokio::join!(
            controller.set_request(RequestConfig::new("https://x/slow")),
            async {
                receiver.changed().await.unwrap();
                assert!(receiver.borrow_and_update().is_loading());
                controller.executor().fetch().gate.notify_one();
            }
        );

        assert_eq!(controller.state().payload, json!("https://x/slow"));
    }

    #[tokio::test]
    async fn last_resolved_response_wins() {
        let controller = ResponseController::new(GatedFetch::default(), RequestConfig::default());

        tokio::join!(
            controller.set_request(RequestConfig::new("https://x/slow")),
            async {
                controller.set_request(RequestConfig::new("https://x/fast")).await;
                controller.executor().fetch().gate.notify_one();
            }
        );

        assert_eq!(controller.state().payload, json!("https://x/slow"));
    }
}
