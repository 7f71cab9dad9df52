//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared application state from an opened registry
//! - Create the Axum router with all handlers
//! - Wire up middleware (request timeout, request ID, tracing)
//! - Serve until the shutdown signal fires, then drain

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::forwarding::ForwardingEngine;
use crate::health::HealthProbe;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::registry::ServiceRegistry;
use crate::rpc::RpcDispatcher;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
    pub engine: Arc<ForwardingEngine>,
    pub probe: Arc<HealthProbe>,
    pub dispatcher: Arc<RpcDispatcher>,
}

impl AppState {
    /// Wire every subsystem onto `registry` with production transports.
    pub fn new(config: &GatewayConfig, registry: Arc<ServiceRegistry>) -> Self {
        let engine = Arc::new(ForwardingEngine::new(registry.clone()));
        Self::from_engine(config, engine)
    }

    /// Build state around an existing engine, sharing its registry and
    /// transport with the health probe.
    pub fn from_engine(config: &GatewayConfig, engine: Arc<ForwardingEngine>) -> Self {
        let registry = engine.registry().clone();
        let probe = Arc::new(HealthProbe::with_transport(registry.clone(), engine.transport()));
        let dispatcher = Arc::new(RpcDispatcher::new(engine.clone(), config.rpc.clone()));
        Self {
            registry,
            engine,
            probe,
            dispatcher,
        }
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &GatewayConfig, registry: Arc<ServiceRegistry>) -> Self {
        let state = AppState::new(config, registry);
        Self::with_state(state, Duration::from_secs(config.timeouts.request_secs))
    }

    pub fn with_state(state: AppState, request_timeout: Duration) -> Self {
        Self {
            router: build_router(state, request_timeout),
        }
    }

    /// Clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
///
/// The request timeout covers only the registry and catalogue routes.
/// Forwarding routes are bounded by each service's own retry and timeout
/// policy, which can legitimately run longer.
#[allow(deprecated)]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let admin = Router::new()
        .route("/services", get(handlers::list_services).post(handlers::create_service))
        .route(
            "/services/{id}",
            get(handlers::get_service)
                .put(handlers::update_service)
                .delete(handlers::delete_service),
        )
        .route("/mcp/tools", get(handlers::rpc_tools))
        .route("/healthz", get(handlers::liveness))
        .layer(TimeoutLayer::new(request_timeout));

    let traffic = Router::new()
        .route("/health/{service_name}", get(handlers::check_health))
        .route("/forward/{service_name}", post(handlers::forward))
        .route("/mcp", post(handlers::rpc));

    admin
        .merge(traffic)
        .with_state(state)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forwarding::testing::ScriptedTransport;
    use crate::registry::ServiceInput;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// `contacts` with 12 retries at 500ms per attempt against a backend that
    /// never answers in time: 13 attempts and 78s of backoff, well past the
    /// 60s request timeout.
    async fn slow_gateway() -> (Router, Arc<ScriptedTransport>) {
        let registry = Arc::new(ServiceRegistry::in_memory());
        registry
            .create(ServiceInput {
                name: Some("contacts".into()),
                url: Some("http://localhost:3001".into()),
                retry_attempts: Some(12),
                timeout_ms: Some(500),
                ..Default::default()
            })
            .await
            .unwrap();

        let transport = Arc::new(ScriptedTransport::always_ok(200, "[]").with_latency(Duration::from_secs(5)));
        let engine = Arc::new(ForwardingEngine::new(registry).with_transport(transport.clone()));
        let config = GatewayConfig::default();
        let state = AppState::from_engine(&config, engine);
        let router = build_router(state, Duration::from_secs(config.timeouts.request_secs));
        (router, transport)
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_forward_runs_every_retry_past_request_timeout() {
        let (router, transport) = slow_gateway().await;

        let (status, body) = post_json(router, "/forward/contacts", json!({ "path": "/contacts" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            body["error"].as_str().unwrap().contains("13 attempt(s)"),
            "unexpected body {body}"
        );
        assert_eq!(transport.calls(), 13);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rpc_runs_every_retry_past_request_timeout() {
        let (router, transport) = slow_gateway().await;

        let (status, body) = post_json(
            router,
            "/mcp",
            json!({
                "jsonrpc": "2.0",
                "method": "getCustomerByEmail",
                "params": { "email": "ada@example.com" },
                "id": "slow-1"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], -32000);
        assert_eq!(body["id"], "slow-1");
        assert_eq!(transport.calls(), 13);
    }
}
