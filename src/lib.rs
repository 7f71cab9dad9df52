//! CRM gateway library.
//!
//! Keeps a durable registry of backend services and relays calls to them by
//! logical name, with per-service retry and timeout policy. A JSON-RPC
//! endpoint maps a fixed set of CRM methods onto those backends.

// Core subsystems
pub mod config;
pub mod http;
pub mod registry;

// Traffic
pub mod forwarding;
pub mod health;
pub mod rpc;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::GatewayConfig;
pub use forwarding::{ForwardError, ForwardRequest, ForwardResponse, ForwardingEngine};
pub use health::HealthProbe;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::{ServiceConfig, ServiceInput, ServiceRegistry};
pub use rpc::RpcDispatcher;
