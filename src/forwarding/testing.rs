//! Scripted transport for unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::StatusCode;

use crate::forwarding::transport::{OutboundRequest, OutboundResponse, Transport, TransportError};

/// Fails the first `failures` calls with a connection error, then answers
/// with a fixed status and body.
pub struct ScriptedTransport {
    failures: u32,
    status: StatusCode,
    body: &'static str,
    latency: Option<Duration>,
    calls: AtomicU32,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    pub fn always_ok(status: u16, body: &'static str) -> Self {
        Self::failing_first(0, status, body)
    }

    pub fn failing_first(failures: u32, status: u16, body: &'static str) -> Self {
        Self {
            failures,
            status: StatusCode::from_u16(status).unwrap(),
            body,
            latency: None,
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<OutboundRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'_, Result<OutboundResponse, TransportError>> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            if call < self.failures {
                return Err(TransportError::Connect("connection refused".into()));
            }
            Ok(OutboundResponse {
                status: self.status,
                body: self.body.as_bytes().to_vec(),
            })
        })
    }
}
