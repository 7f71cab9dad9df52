//! On-demand health probing.
//!
//! # Responsibilities
//! - Resolve the service and GET its health endpoint once
//! - Reduce every outcome to a boolean

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::forwarding::{HttpTransport, OutboundRequest, Transport};
use crate::observability::metrics;
use crate::registry::ServiceRegistry;
use crate::resilience::timeouts::{attempt_timeout, bounded};

/// Raised only when the service is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    #[error("Service {0} not found")]
    ServiceNotFound(String),
}

/// Issues single bounded-timeout health checks against registered services.
pub struct HealthProbe {
    registry: Arc<ServiceRegistry>,
    transport: Arc<dyn Transport>,
}

impl HealthProbe {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self::with_transport(registry, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(registry: Arc<ServiceRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self { registry, transport }
    }

    /// `true` iff the health endpoint answered exactly 200 within the
    /// service's timeout.
    pub async fn check_health(&self, service_name: &str) -> Result<bool, HealthError> {
        let service = self
            .registry
            .resolve_by_name(service_name)
            .ok_or_else(|| HealthError::ServiceNotFound(service_name.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("crm-gateway-health-check"));
        let request = OutboundRequest {
            method: Method::GET,
            url: service.health_url(),
            headers,
            body: None,
        };

        let limit = attempt_timeout(service.timeout_ms);
        let healthy = match bounded(limit, self.transport.send(request)).await {
            Ok(Ok(response)) => {
                let ok = response.status == StatusCode::OK;
                if !ok {
                    tracing::warn!(service = %service.name, status = %response.status, "Health check failed: non-200 status");
                }
                ok
            }
            Ok(Err(e)) => {
                tracing::warn!(service = %service.name, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(service = %service.name, timeout_ms = service.timeout_ms, "Health check failed: timeout");
                false
            }
        };

        metrics::record_health(&service.name, healthy);
        Ok(healthy)
    }
}
