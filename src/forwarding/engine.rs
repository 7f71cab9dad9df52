//! Request forwarding with retry and per-attempt timeouts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::forwarding::transport::{decode_body, HttpTransport, OutboundRequest, Transport, TransportError};
use crate::observability::metrics;
use crate::registry::{ServiceConfig, ServiceRegistry};
use crate::resilience::timeouts::{attempt_timeout, bounded};
use crate::resilience::{RetryMachine, RetryPolicy, Sleeper, TokioSleeper};

/// Errors surfaced by [`ForwardingEngine::forward`].
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Service {0} not found")]
    ServiceNotFound(String),

    #[error("Service {0} is not active")]
    ServiceInactive(String),

    /// The request could not be built; never retried.
    #[error("Invalid forward request: {0}")]
    InvalidRequest(String),

    /// Every attempt failed at the network level.
    #[error("Service {service} failed after {attempts} attempt(s): {last}")]
    Exhausted {
        service: String,
        attempts: u32,
        #[source]
        last: TransportError,
    },
}

/// An HTTP-shaped call addressed to a logical service.
#[derive(Debug, Clone, Default)]
pub struct ForwardRequest {
    /// HTTP verb, case-insensitive. Empty means GET.
    pub method: String,
    /// Appended verbatim to the service's base URL.
    pub path: String,
    pub body: Option<Value>,
    /// Merged over `Content-Type: application/json`; caller values win.
    pub headers: HashMap<String, String>,
}

impl ForwardRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// The backend's answer, passed through whatever its status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardResponse {
    pub status: u16,
    pub body: Value,
    pub attempts: u32,
}

/// Resolves logical names against the registry and relays calls to them.
pub struct ForwardingEngine {
    registry: Arc<ServiceRegistry>,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
}

impl ForwardingEngine {
    /// Engine using a reqwest transport and real sleeps.
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            transport: Arc::new(HttpTransport::new()),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Forward `request` to the service registered as `service_name`.
    pub async fn forward(&self, service_name: &str, request: ForwardRequest) -> Result<ForwardResponse, ForwardError> {
        let start = Instant::now();
        let result = self.forward_inner(service_name, request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(ForwardError::ServiceNotFound(_)) => "not_found",
            Err(ForwardError::ServiceInactive(_)) => "inactive",
            Err(ForwardError::InvalidRequest(_)) => "invalid",
            Err(ForwardError::Exhausted { .. }) => "exhausted",
        };
        metrics::record_forward(service_name, outcome, start);

        result
    }

    async fn forward_inner(&self, service_name: &str, request: ForwardRequest) -> Result<ForwardResponse, ForwardError> {
        let service = self
            .registry
            .resolve_by_name(service_name)
            .ok_or_else(|| ForwardError::ServiceNotFound(service_name.to_string()))?;

        if !service.is_active {
            tracing::warn!(service = %service.name, "Refusing to forward to inactive service");
            return Err(ForwardError::ServiceInactive(service.name));
        }

        let outbound = build_outbound(&service, request)?;
        self.run_attempts(&service, outbound).await
    }

    async fn run_attempts(&self, service: &ServiceConfig, outbound: OutboundRequest) -> Result<ForwardResponse, ForwardError> {
        let limit = attempt_timeout(service.timeout_ms);
        let mut machine = RetryMachine::new(RetryPolicy::new(service.retry_attempts));
        let mut attempt = machine.start();

        loop {
            metrics::record_attempt(&service.name);
            tracing::debug!(
                service = %service.name,
                method = %outbound.method,
                url = %outbound.url,
                attempt = attempt,
                "Forwarding attempt"
            );

            let result = match bounded(limit, self.transport.send(outbound.clone())).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(service.timeout_ms)),
            };

            let err = match result {
                Ok(response) => {
                    machine.succeed();
                    if !response.status.is_success() {
                        tracing::warn!(
                            service = %service.name,
                            status = %response.status,
                            "Backend answered with non-success status, passing through"
                        );
                    }
                    return Ok(ForwardResponse {
                        status: response.status.as_u16(),
                        body: decode_body(&response.body),
                        attempts: machine.attempts(),
                    });
                }
                Err(err) => err,
            };

            match machine.fail() {
                Some(delay) => {
                    tracing::warn!(
                        service = %service.name,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Forwarding attempt failed, backing off"
                    );
                    metrics::record_retry(&service.name);
                    self.sleeper.sleep(delay).await;
                    attempt = machine.resume();
                }
                None => {
                    tracing::error!(
                        service = %service.name,
                        attempts = machine.attempts(),
                        error = %err,
                        "Forwarding failed, retries exhausted"
                    );
                    return Err(ForwardError::Exhausted {
                        service: service.name.clone(),
                        attempts: machine.attempts(),
                        last: err,
                    });
                }
            }
        }
    }
}

fn build_outbound(service: &ServiceConfig, request: ForwardRequest) -> Result<OutboundRequest, ForwardError> {
    let verb = request.method.trim();
    let method = if verb.is_empty() {
        Method::GET
    } else {
        Method::from_bytes(verb.to_ascii_uppercase().as_bytes())
            .map_err(|_| ForwardError::InvalidRequest(format!("unsupported method '{}'", verb)))?
    };

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ForwardError::InvalidRequest(format!("invalid header name '{}'", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ForwardError::InvalidRequest(format!("invalid value for header '{}'", name)))?;
        headers.insert(name, value);
    }

    Ok(OutboundRequest {
        method,
        url: service.endpoint(&request.path),
        headers,
        body: request.body,
    })
}
