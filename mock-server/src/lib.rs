use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
}

/// What the server saw of an `/echo` request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recorded {
    pub method: String,
    pub path: String,
}

pub type Log = Arc<RwLock<Vec<Recorded>>>;

pub fn app() -> Router {
    let log: Log = Arc::default();
    Router::new()
        .route("/all", get(list_all))
        .route("/echo", any(echo))
        .route("/text", get(text))
        .route("/status/{code}", any(status))
        .route("/redirect", get(redirect))
        .layer(middleware::from_fn_with_state(log.clone(), record))
        .route("/requests", get(requests))
        .with_state(log)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn record(State(log): State<Log>, request: Request, next: Next) -> Response {
    log::debug!("{} {}", request.method(), request.uri());
    log.write().await.push(Recorded {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
    });
    next.run(request).await
}

async fn requests(State(log): State<Log>) -> Json<Vec<Recorded>> {
    Json(log.read().await.clone())
}

async fn list_all() -> Json<Vec<Item>> {
    Json(vec![Item {
        name: "a".to_string(),
    }])
}

async fn echo(
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Echo>, StatusCode> {
    let body = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?)
    };
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    Ok(Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body,
    }))
}

async fn text() -> &'static str {
    "hello"
}

async fn status(Path(code): Path<u16>) -> Result<Response, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    if status == StatusCode::NO_CONTENT {
        return Ok(status.into_response());
    }
    Ok((status, Json(json!({ "status": code }))).into_response())
}

async fn redirect() -> Redirect {
    Redirect::to("/all")
}
