//! Scripted transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use super::error::{TransportError, TransportErrorKind};
use super::transport::{ApiRequest, ApiResponse, Transport};

type Reply = Result<ApiResponse, TransportError>;

/// Replays queued replies in order, then repeats `otherwise` forever.
pub(crate) struct MockTransport {
    script: Mutex<VecDeque<Reply>>,
    otherwise: Mutex<Option<Reply>>,
    calls: Mutex<Vec<(ApiRequest, Instant)>>,
    latency: Option<Duration>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            otherwise: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// Every call fails to connect.
    pub(crate) fn unreachable() -> Self {
        let mock = Self::new();
        mock.always(Err(connect_refused()));
        mock
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub(crate) fn push(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    pub(crate) fn push_json(&self, status: u16, value: Value) -> &Self {
        self.push(Ok(ApiResponse::json(status, &value)))
    }

    pub(crate) fn push_connect_error(&self) -> &Self {
        self.push(Err(connect_refused()))
    }

    pub(crate) fn always(&self, reply: Reply) {
        *self.otherwise.lock().unwrap() = Some(reply);
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(req, _)| req.clone())
            .collect()
    }

    pub(crate) fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

pub(crate) fn connect_refused() -> TransportError {
    TransportError::new(TransportErrorKind::Connect, "connection refused")
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.clone(), Instant::now()));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(reply) => reply,
            None => self
                .otherwise
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(connect_refused())),
        }
    }
}
