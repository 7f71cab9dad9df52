//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the registry snapshot named by the config
//! - Seed the default services into an empty registry
//!
//! # Design Decisions
//! - A snapshot that fails to load aborts startup rather than starting empty

use std::sync::Arc;

use thiserror::Error;

use crate::config::GatewayConfig;
use crate::registry::{RegistryError, ServiceInput, ServiceRegistry, SnapshotStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open service registry: {0}")]
    Registry(#[from] RegistryError),
}

/// Open the configured registry file and seed it when empty.
pub async fn open_registry(config: &GatewayConfig) -> Result<Arc<ServiceRegistry>, StartupError> {
    let registry = ServiceRegistry::open(SnapshotStore::file(&config.registry.path)).await?;

    let seeds = config.registry.seed.iter().map(ServiceInput::from);
    let added = registry.seed(seeds).await?;
    if added > 0 {
        tracing::info!(count = added, "Seeded default services");
    }

    Ok(Arc::new(registry))
}
