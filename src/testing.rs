// Test support.
// Fetch-counting stub transport with canned replies keyed by method and URL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;

use crate::config::GistConfig;
use crate::error::{GistError, Result};
use crate::github::{ApiRequest, ApiResponse, GistClient, Transport};

pub const API_BASE: &str = "http://api.test";
pub const WEB_BASE: &str = "http://gist.test";

#[derive(Debug, Clone)]
enum Reply {
    Respond(ApiResponse),
    Fail(String),
    Binary(String),
}

/// Stub transport. Unrouted requests answer 404.
#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
    delay: Option<Duration>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, method: Method, url: &str, status: u16, body: &str) -> Self {
        self.route(method, url, status, body);
        self
    }

    /// Delay every reply, widening the window for concurrent callers.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add or replace a route on a live stub.
    pub fn route(&self, method: Method, url: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(
            (method, url.to_string()),
            Reply::Respond(ApiResponse::new(status, body)),
        );
    }

    /// Make a route fail at the transport level.
    pub fn fail(&self, method: Method, url: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, url.to_string()), Reply::Fail(url.to_string()));
    }

    /// Answer a route with a body that is not UTF-8.
    pub fn binary(&self, method: Method, url: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, url.to_string()), Reply::Binary(url.to_string()));
    }

    /// Number of requests sent to `url` with any method.
    pub fn calls_to(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Build a client over this stub, keeping a handle for assertions.
    pub fn client(self) -> GistClient {
        self.shared().1
    }

    pub fn shared(self) -> (Arc<StubTransport>, GistClient) {
        let stub = Arc::new(self);
        let config = GistConfig::default()
            .with_api_base(API_BASE)
            .with_web_base(WEB_BASE);
        let client = GistClient::with_transport(stub.clone(), config);
        (stub, client)
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let key = (request.method.clone(), request.url.clone());
        self.requests.lock().unwrap().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.routes.lock().unwrap().get(&key).cloned();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(url)) => Err(GistError::Other(format!("connection reset: {}", url))),
            Some(Reply::Binary(url)) => Err(GistError::NonUtf8Body(url)),
            None => Ok(ApiResponse::new(404, "Not Found")),
        }
    }
}
