use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use shared::rpc::{RpcTransport, TransportError, TransportResponse};

pub type Reply = Result<TransportResponse, TransportError>;

type Handler = Box<dyn Fn(&str, &str, &[Value]) -> Reply + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub url: String,
    pub method: String,
    pub params: Vec<Value>,
}

/// In-memory [`RpcTransport`]. Replies queued for a URL are served first, in
/// order; after that the handler answers. Every request is recorded.
pub struct MockTransport {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    handler: Handler,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&str, &str, &[Value]) -> Reply + Send + Sync + 'static,
    ) -> Self {
        Self {
            queued: Mutex::default(),
            handler: Box::new(handler),
            calls: Mutex::default(),
        }
    }

    /// Every request that was not queued fails with a connection error.
    pub fn unreachable() -> Self {
        Self::new(|url, _, _| {
            Err(TransportError::Connection(format!("{url} unreachable")))
        })
    }

    pub fn ok(result: Value) -> Reply {
        Ok(TransportResponse {
            result,
            network: None,
        })
    }

    pub fn push(&self, url: &str, reply: Reply) -> &Self {
        self.queued
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn push_n(&self, url: &str, times: usize, reply: Reply) -> &Self {
        for _ in 0..times {
            self.push(url, reply.clone());
        }
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|call| call.url == url).count()
    }

    pub fn calls_of(&self, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn send(
        &self,
        url: &str,
        method: &str,
        params: &[Value],
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            method: method.to_string(),
            params: params.to_vec(),
        });

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);

        match queued {
            Some(reply) => reply,
            None => (self.handler)(url, method, params),
        }
    }
}
