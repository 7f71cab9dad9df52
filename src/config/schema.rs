//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::registry::ServiceInput;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Service registry persistence and startup seeding.
    pub registry: RegistryConfig,

    /// Logical service names targeted by the JSON-RPC method table.
    pub rpc: RpcConfig,

    /// Timeout configuration for inbound requests.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Service registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path of the JSON snapshot holding every registered service.
    pub path: String,

    /// Services registered at startup when the snapshot is empty.
    pub seed: Vec<SeedService>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: "data/service-configs.json".to_string(),
            seed: vec![
                SeedService::new("contacts", "http://localhost:3001"),
                SeedService::new("tickets", "http://localhost:3002"),
                SeedService::new("kb", "http://localhost:3003"),
                SeedService::new("ai", "http://localhost:3004"),
            ],
        }
    }
}

/// A service registered from configuration.
///
/// Unset fields fall back to the registry defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedService {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub health_check_endpoint: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub retry_attempts: Option<u32>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl SeedService {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            health_check_endpoint: None,
            is_active: None,
            retry_attempts: None,
            timeout_ms: None,
        }
    }
}

impl From<&SeedService> for ServiceInput {
    fn from(seed: &SeedService) -> Self {
        ServiceInput {
            name: Some(seed.name.clone()),
            url: Some(seed.url.clone()),
            health_check_endpoint: seed.health_check_endpoint.clone(),
            is_active: seed.is_active,
            retry_attempts: seed.retry_attempts.map(i64::from),
            timeout_ms: seed.timeout_ms.map(|ms| i64::try_from(ms).unwrap_or(i64::MAX)),
        }
    }
}

/// Logical service names used by the JSON-RPC method table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Registry name of the contacts backend.
    pub contacts_service: String,

    /// Registry name of the tickets backend.
    pub tickets_service: String,

    /// Registry name of the knowledge base backend.
    pub kb_service: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            contacts_service: "contacts".to_string(),
            tickets_service: "tickets".to_string(),
            kb_service: "kb".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound for a whole inbound request, retries included, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
