//! Scripted in-memory transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

pub const BASE_URL: &str = "https://listsplit.example.com/";

type Reply = Result<HttpResponse, ApiError>;

#[derive(Default)]
struct Route {
    queued: VecDeque<Reply>,
    last: Option<Reply>,
}

/// Answers requests from per-route queues. Once a route's queue drains, its
/// last reply repeats so later refreshes keep getting it.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(HttpMethod, String), Route>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: HttpMethod, endpoint: &str, status: u16, body: &str) {
        self.push(
            method,
            endpoint,
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }),
        );
    }

    pub fn fail(&self, method: HttpMethod, endpoint: &str, cause: &str) {
        self.push(method, endpoint, Err(ApiError::Unknown(cause.to_string())));
    }

    fn push(&self, method: HttpMethod, endpoint: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, endpoint.to_string()))
            .or_default()
            .queued
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    /// `"METHOD endpoint"` for every request seen, in arrival order.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method.as_str(), endpoint_of(&r.path)))
            .collect()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }
}

fn endpoint_of(path: &str) -> String {
    path.splitn(4, '/').nth(3).unwrap_or_default().to_string()
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let key = (request.method, endpoint_of(&request.path));
        self.log.lock().unwrap().push(request);
        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .get_mut(&key)
            .ok_or_else(|| ApiError::Unknown(format!("no scripted reply for {} {}", key.0.as_str(), key.1)))?;
        if let Some(reply) = route.queued.pop_front() {
            route.last = Some(reply.clone());
            return reply;
        }
        route.last.clone().unwrap_or(Err(ApiError::RequestFailed))
    }
}

pub fn gateway(transport: &Arc<ScriptedTransport>) -> Gateway {
    Gateway::new(BASE_URL, transport.clone())
}
