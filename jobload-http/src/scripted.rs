//! In-memory client that replays scripted responses per route

use crate::client::HttpClient;
use crate::errors::HttpError;
use crate::types::{HttpMethod, HttpRequest, HttpResponse};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// One scripted reply
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    reply: Result<HttpResponse, String>,
    delay: Option<Duration>,
}

impl ScriptedResponse {
    pub fn status(status: u16) -> Self {
        Self::from(HttpResponse::new(status, Some("text/plain"), ""))
    }

    pub fn json(status: u16, body: JsonValue) -> Self {
        Self::from(HttpResponse::json(status, &body))
    }

    pub fn text(status: u16, content_type: &str, body: &str) -> Self {
        Self::from(HttpResponse::new(status, Some(content_type), body))
    }

    /// A connection-level failure instead of a response
    pub fn transport_error(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            delay: None,
        }
    }

    /// Hold the reply for `delay` before returning it
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl From<HttpResponse> for ScriptedResponse {
    fn from(response: HttpResponse) -> Self {
        Self {
            reply: Ok(response),
            delay: None,
        }
    }
}

/// A request observed by the scripted client
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<JsonValue>,
    pub started: Instant,
    pub finished: Instant,
}

type Handler = Arc<dyn Fn(&HttpRequest) -> ScriptedResponse + Send + Sync>;

#[derive(Default)]
struct State {
    routes: HashMap<(HttpMethod, String), VecDeque<ScriptedResponse>>,
    handlers: Vec<(HttpMethod, String, Handler)>,
    log: Vec<RequestRecord>,
}

/// Replays queued responses keyed by method and exact path. The last
/// queued response for a route repeats once the queue is drained. Requests
/// without a queue go to the first handler whose path prefix matches, and
/// anything else answers 404.
#[derive(Clone, Default)]
pub struct ScriptedClient {
    state: Arc<Mutex<State>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses for a route, appended after any already queued
    pub fn script(
        &self,
        method: HttpMethod,
        path: &str,
        responses: impl IntoIterator<Item = ScriptedResponse>,
    ) -> &Self {
        self.state
            .lock()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .extend(responses);
        self
    }

    /// Answer every request under `prefix` by calling `handler`
    pub fn respond_with<F>(&self, method: HttpMethod, prefix: &str, handler: F) -> &Self
    where
        F: Fn(&HttpRequest) -> ScriptedResponse + Send + Sync + 'static,
    {
        self.state
            .lock()
            .handlers
            .push((method, prefix.to_string(), Arc::new(handler)));
        self
    }

    /// Every request seen so far, in completion order
    pub fn requests(&self) -> Vec<RequestRecord> {
        self.state.lock().log.clone()
    }

    /// Requests seen for one path
    pub fn requests_to(&self, path: &str) -> Vec<RequestRecord> {
        self.state
            .lock()
            .log
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    fn next_reply(&self, request: &HttpRequest) -> ScriptedResponse {
        let handler = {
            let mut state = self.state.lock();
            if let Some(queue) = state
                .routes
                .get_mut(&(request.method, request.path.clone()))
            {
                return match queue.len() {
                    0 => not_found(),
                    1 => queue.front().cloned().unwrap_or_else(not_found),
                    _ => queue.pop_front().unwrap_or_else(not_found),
                };
            }
            state
                .handlers
                .iter()
                .find(|(method, prefix, _)| {
                    *method == request.method && request.path.starts_with(prefix.as_str())
                })
                .map(|(_, _, handler)| handler.clone())
        };

        match handler {
            Some(handler) => handler(request),
            None => not_found(),
        }
    }
}

fn not_found() -> ScriptedResponse {
    ScriptedResponse::status(404)
}

#[async_trait::async_trait]
impl HttpClient for ScriptedClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let started = Instant::now();
        let scripted = self.next_reply(&request);

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        self.state.lock().log.push(RequestRecord {
            method: request.method,
            path: request.path,
            body: request.body,
            started,
            finished: Instant::now(),
        });

        scripted.reply.map_err(HttpError::Connection)
    }
}
