//! JSON-RPC dispatch onto the forwarding engine.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::Value;

use crate::config::RpcConfig;
use crate::forwarding::ForwardingEngine;
use crate::observability::metrics;
use crate::rpc::envelope::{RpcErrorCode, RpcRequest, RpcResponse};
use crate::rpc::methods;

/// A response envelope and the HTTP status it travels with.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcOutcome {
    pub status: StatusCode,
    pub response: RpcResponse,
}

impl RpcOutcome {
    fn ok(response: RpcResponse) -> Self {
        Self {
            status: StatusCode::OK,
            response,
        }
    }

    fn error(status: StatusCode, response: RpcResponse) -> Self {
        Self { status, response }
    }
}

/// Validates envelopes and routes methods to backend services.
pub struct RpcDispatcher {
    engine: Arc<ForwardingEngine>,
    targets: RpcConfig,
}

impl RpcDispatcher {
    pub fn new(engine: Arc<ForwardingEngine>, targets: RpcConfig) -> Self {
        Self { engine, targets }
    }

    /// Dispatch a raw request body.
    pub async fn dispatch_bytes(&self, body: &[u8]) -> RpcOutcome {
        match serde_json::from_slice::<Value>(body) {
            Ok(envelope) => self.dispatch(envelope).await,
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting unparseable JSON-RPC body");
                metrics::record_rpc(None, RpcErrorCode::ParseError.code());
                RpcOutcome::error(
                    StatusCode::BAD_REQUEST,
                    RpcResponse::failure(None, RpcErrorCode::ParseError),
                )
            }
        }
    }

    /// Dispatch a decoded request envelope.
    pub async fn dispatch(&self, envelope: Value) -> RpcOutcome {
        let Some(request) = RpcRequest::from_value(&envelope) else {
            metrics::record_rpc(None, RpcErrorCode::InvalidRequest.code());
            return RpcOutcome::error(
                StatusCode::BAD_REQUEST,
                RpcResponse::failure(None, RpcErrorCode::InvalidRequest),
            );
        };

        let known = methods::find(&request.method).map(|m| m.name);
        let outcome = self.route(request).await;
        let code = outcome.response.error.as_ref().map(|e| e.code).unwrap_or(0);
        metrics::record_rpc(known, code);
        outcome
    }

    async fn route(&self, request: RpcRequest) -> RpcOutcome {
        let RpcRequest { method, params, id } = request;

        let Some(spec) = methods::find(&method) else {
            tracing::debug!(method = %method, "Unknown JSON-RPC method");
            return RpcOutcome::error(
                StatusCode::BAD_REQUEST,
                RpcResponse::failure(Some(id), RpcErrorCode::MethodNotFound),
            );
        };

        let missing = spec.missing_params(&params);
        if !missing.is_empty() {
            tracing::debug!(method = %method, missing = ?missing, "JSON-RPC call missing params");
            return RpcOutcome::error(
                StatusCode::BAD_REQUEST,
                RpcResponse::failure(Some(id), RpcErrorCode::InvalidParams),
            );
        }

        let service = spec.target.service_name(&self.targets);
        match self.engine.forward(service, spec.build_request(&params)).await {
            Ok(forwarded) => {
                RpcOutcome::ok(RpcResponse::success(id, spec.shape_result(forwarded.body)))
            }
            Err(e) => {
                tracing::error!(method = %method, service = %service, error = %e, "JSON-RPC call failed");
                RpcOutcome::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RpcResponse::failure(Some(id), RpcErrorCode::Internal),
                )
            }
        }
    }

    /// Tool catalogue for every supported method.
    pub fn tools(&self) -> Value {
        methods::catalogue()
    }
}
