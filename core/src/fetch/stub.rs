use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::Fetch;
use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};

/// Replays scripted results in order and records every request it sees.
#[derive(Debug, Default)]
pub struct StubFetch {
    results: Mutex<VecDeque<Result<HttpResponse, FetchError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubFetch {
    pub fn new(results: impl IntoIterator<Item = Result<HttpResponse, FetchError>>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().collect()),
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for StubFetch {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .expect("stub response")
    }
}
