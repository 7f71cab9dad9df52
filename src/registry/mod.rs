//! Service registry subsystem.
//!
//! # Data Flow
//! ```text
//! startup:  store.rs (read snapshot) → ArcSwap<Vec<ServiceConfig>>
//! reads:    resolve_by_name / get / list_all → lock-free snapshot load
//! writes:   writer lock → build next snapshot → store.rs (persist)
//!           → publish next snapshot
//! ```
//!
//! # Design Decisions
//! - The registry is an owned instance shared via Arc, never a global
//! - Writes are serialized by a single async mutex
//! - A snapshot is published only after it has been persisted, so memory is
//!   never ahead of disk
//! - Records keep insertion order; name lookup returns the first match
//! - Duplicate names are rejected on create and update

pub mod model;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::observability::metrics;

pub use model::{ServiceConfig, ServiceInput};
pub use store::SnapshotStore;

/// Errors raised by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Input or merged record violates the registry invariants.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Service configuration not found: {0}")]
    NotFound(String),

    #[error("registry snapshot I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry snapshot {} is not valid JSON: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Durable mapping from logical service name to its configuration.
#[derive(Debug)]
pub struct ServiceRegistry {
    services: ArcSwap<Vec<ServiceConfig>>,
    store: SnapshotStore,
    writer: Mutex<()>,
}

impl ServiceRegistry {
    /// Open a registry backed by `store`, loading its current snapshot.
    pub async fn open(store: SnapshotStore) -> RegistryResult<Self> {
        let services = store.load().await?;
        tracing::info!(
            path = ?store.path(),
            count = services.len(),
            "Service registry loaded"
        );
        metrics::record_registry_size(services.len());

        Ok(Self {
            services: ArcSwap::from_pointee(services),
            store,
            writer: Mutex::new(()),
        })
    }

    /// Registry without a backing file.
    pub fn in_memory() -> Self {
        Self {
            services: ArcSwap::from_pointee(Vec::new()),
            store: SnapshotStore::memory(),
            writer: Mutex::new(()),
        }
    }

    /// First record whose name equals `name`, active or not.
    pub fn resolve_by_name(&self, name: &str) -> Option<ServiceConfig> {
        self.services.load().iter().find(|s| s.name == name).cloned()
    }

    pub fn get(&self, id: &str) -> Option<ServiceConfig> {
        self.services.load().iter().find(|s| s.id == id).cloned()
    }

    /// Every record in insertion order.
    pub fn list_all(&self) -> Vec<ServiceConfig> {
        self.services.load().as_ref().clone()
    }

    pub fn len(&self) -> usize {
        self.services.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.load().is_empty()
    }

    /// Register a new service under a freshly generated id.
    pub async fn create(&self, input: ServiceInput) -> RegistryResult<ServiceConfig> {
        let _guard = self.writer.lock().await;
        let current = self.services.load_full();

        let config = input
            .into_config(Uuid::new_v4().to_string(), Utc::now())
            .map_err(RegistryError::Validation)?;
        ensure_unique_name(&current, &config.name, None)?;

        let mut next = current.as_ref().clone();
        next.push(config.clone());
        self.commit(next).await?;

        tracing::info!(id = %config.id, name = %config.name, url = %config.url, "Service registered");
        Ok(config)
    }

    /// Merge `patch` over the record with `id`.
    pub async fn update(&self, id: &str, patch: ServiceInput) -> RegistryResult<ServiceConfig> {
        let _guard = self.writer.lock().await;
        let current = self.services.load_full();

        let index = current
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        let updated = current[index]
            .merged(patch, Utc::now())
            .map_err(RegistryError::Validation)?;
        ensure_unique_name(&current, &updated.name, Some(id))?;

        let mut next = current.as_ref().clone();
        next[index] = updated.clone();
        self.commit(next).await?;

        tracing::info!(id = %updated.id, name = %updated.name, "Service updated");
        Ok(updated)
    }

    /// Remove the record with `id`.
    pub async fn delete(&self, id: &str) -> RegistryResult<()> {
        let _guard = self.writer.lock().await;
        let current = self.services.load_full();

        if !current.iter().any(|s| s.id == id) {
            return Err(RegistryError::NotFound(id.to_string()));
        }

        let next: Vec<_> = current.iter().filter(|s| s.id != id).cloned().collect();
        self.commit(next).await?;

        tracing::info!(id = %id, "Service deregistered");
        Ok(())
    }

    /// Register `seeds` when the registry is empty. Returns how many were added.
    pub async fn seed(&self, seeds: impl IntoIterator<Item = ServiceInput>) -> RegistryResult<usize> {
        if !self.is_empty() {
            return Ok(0);
        }

        let mut added = 0;
        for input in seeds {
            self.create(input).await?;
            added += 1;
        }
        Ok(added)
    }

    async fn commit(&self, next: Vec<ServiceConfig>) -> RegistryResult<()> {
        self.store.persist(&next).await?;
        metrics::record_registry_size(next.len());
        self.services.store(Arc::new(next));
        Ok(())
    }
}

fn ensure_unique_name(services: &[ServiceConfig], name: &str, except_id: Option<&str>) -> RegistryResult<()> {
    let taken = services
        .iter()
        .any(|s| s.name == name && Some(s.id.as_str()) != except_id);
    if taken {
        return Err(RegistryError::Validation(vec![format!(
            "Service name '{}' is already registered",
            name
        )]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, url: &str) -> ServiceInput {
        ServiceInput {
            name: Some(name.into()),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_resolve() {
        let registry = ServiceRegistry::in_memory();
        let mut data = input("contacts", "http://localhost:3001");
        data.retry_attempts = Some(2);
        data.timeout_ms = Some(500);

        let created = registry.create(data).await.unwrap();
        let resolved = registry.resolve_by_name("contacts").unwrap();

        assert_eq!(created, resolved);
        assert_eq!(resolved.url, "http://localhost:3001");
        assert_eq!(resolved.retry_attempts, 2);
        assert_eq!(resolved.timeout_ms, 500);
        assert!(!resolved.id.is_empty());
        assert_eq!(registry.get(&created.id), Some(created));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let registry = ServiceRegistry::in_memory();
        let err = registry.create(ServiceInput::default()).await.unwrap_err();
        match err {
            RegistryError::Validation(errors) => {
                assert!(errors.contains(&"Service name is required".to_string()));
                assert!(errors.contains(&"Service URL is required".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_rejected() {
        let registry = ServiceRegistry::in_memory();
        registry.create(input("kb", "http://localhost:3003")).await.unwrap();
        let other = registry.create(input("ai", "http://localhost:3004")).await.unwrap();

        let err = registry.create(input("kb", "http://elsewhere")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));

        let rename = ServiceInput {
            name: Some("kb".into()),
            ..Default::default()
        };
        assert!(registry.update(&other.id, rename).await.is_err());
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_update_only_advances_timestamp() {
        let registry = ServiceRegistry::in_memory();
        let created = registry.create(input("tickets", "http://localhost:3002")).await.unwrap();

        let first = registry.update(&created.id, ServiceInput::default()).await.unwrap();
        let second = registry.update(&created.id, ServiceInput::default()).await.unwrap();

        let strip = |mut c: ServiceConfig| {
            c.updated_at = created.updated_at;
            c
        };
        assert_eq!(strip(first.clone()), created);
        assert_eq!(strip(second.clone()), created);
        assert!(first.updated_at >= created.updated_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let registry = ServiceRegistry::in_memory();
        assert!(matches!(
            registry.update("missing", ServiceInput::default()).await,
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.delete("missing").await,
            Err(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_then_resolve() {
        let registry = ServiceRegistry::in_memory();
        let created = registry.create(input("contacts", "http://localhost:3001")).await.unwrap();
        registry.delete(&created.id).await.unwrap();
        assert!(registry.resolve_by_name("contacts").is_none());
        assert!(registry.get(&created.id).is_none());
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service-configs.json");

        let registry = ServiceRegistry::open(SnapshotStore::file(&path)).await.unwrap();
        let contacts = registry.create(input("contacts", "http://localhost:3001")).await.unwrap();
        let tickets = registry.create(input("tickets", "http://localhost:3002")).await.unwrap();
        registry.delete(&contacts.id).await.unwrap();
        drop(registry);

        let reopened = ServiceRegistry::open(SnapshotStore::file(&path)).await.unwrap();
        assert_eq!(reopened.list_all(), vec![tickets]);
    }

    #[tokio::test]
    async fn test_first_match_wins_for_loaded_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service-configs.json");
        tokio::fs::write(
            &path,
            r#"[
                {"id":"a","name":"kb","url":"http://first"},
                {"id":"b","name":"kb","url":"http://second"}
            ]"#,
        )
        .await
        .unwrap();

        let registry = ServiceRegistry::open(SnapshotStore::file(&path)).await.unwrap();
        assert_eq!(registry.resolve_by_name("kb").unwrap().id, "a");
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let registry = ServiceRegistry::in_memory();
        let seeds = vec![
            input("contacts", "http://localhost:3001"),
            input("tickets", "http://localhost:3002"),
        ];

        assert_eq!(registry.seed(seeds.clone()).await.unwrap(), 2);
        assert_eq!(registry.seed(seeds).await.unwrap(), 0);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_all_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service-configs.json");
        let registry = Arc::new(ServiceRegistry::open(SnapshotStore::file(&path)).await.unwrap());

        let mut tasks = Vec::new();
        for i in 0..10 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                registry
                    .create(input(&format!("svc-{i}"), "http://localhost:4000"))
                    .await
                    .unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(registry.len(), 10);
        let reopened = ServiceRegistry::open(SnapshotStore::file(&path)).await.unwrap();
        assert_eq!(reopened.len(), 10);
    }
}
