//! Scripted transport shared by the unit tests of this crate.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use probehub_domain::error::ApiError;

use crate::api::ApiClient;
use crate::cache::ResourceCache;
use crate::ports::{ApiRequest, ApiResponse, Method, Navigator, Transport};

type Reply = Result<ApiResponse, ApiError>;

/// Answers requests from per-route queues. The last queued reply of a route
/// is repeated forever; unknown routes answer 404.
#[derive(Default)]
pub struct StubTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, method: Method, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    pub fn reply_json(&self, method: Method, path: &str, body: &serde_json::Value) {
        self.reply_raw(method, path, 200, &body.to_string());
    }

    pub fn reply_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.reply(
            method,
            path,
            Ok(ApiResponse {
                status,
                body: body.as_bytes().to_vec(),
            }),
        );
    }

    pub fn delay(&self, path: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(path.to_string(), delay);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|req| req.method == method && req.path == path)
            .count()
    }

    pub fn bodies(&self, method: Method, path: &str) -> Vec<serde_json::Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|req| req.method == method && req.path == path)
            .filter_map(|req| req.body.as_deref())
            .map(|body| serde_json::from_slice(body).unwrap())
            .collect()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Reply> + Send {
        let key = (request.method, request.path.clone());
        let delay = self.delays.lock().unwrap().get(&request.path).copied();
        self.requests.lock().unwrap().push(request);
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) if !queue.is_empty() => queue[0].clone(),
                _ => Ok(ApiResponse {
                    status: 404,
                    body: Vec::new(),
                }),
            }
        };
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            reply
        }
    }
}

pub fn cache(transport: &Arc<StubTransport>) -> ResourceCache<Arc<StubTransport>> {
    ResourceCache::new(ApiClient::new(Arc::clone(transport)))
}

/// Records every navigation.
#[derive(Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited.lock().unwrap().push(path.to_string());
    }
}

pub fn temperature_json() -> serde_json::Value {
    serde_json::json!({
        "temp_0": 63, "temp_1": 95, "temp_2": 74, "temp_3": 70,
        "temp_0_target": 71, "temp_1_target": 93, "temp_2_target": 74, "temp_3_target": 74
    })
}
