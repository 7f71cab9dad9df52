//! Whole-snapshot persistence of the registry.
//!
//! The snapshot is a pretty-printed JSON array of every record. Writes go to
//! a sibling temporary file that is renamed over the target, so a reader
//! never observes a half-written snapshot.

use std::path::{Path, PathBuf};

use crate::registry::model::{validate_fields, ServiceConfig};
use crate::registry::RegistryError;

/// Backing storage for the registry snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: Option<PathBuf>,
}

impl SnapshotStore {
    /// Store backed by the JSON file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Store that keeps nothing on disk.
    pub fn memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read every record. A missing file is an empty registry.
    pub async fn load(&self) -> Result<Vec<ServiceConfig>, RegistryError> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };

        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(RegistryError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let records: Vec<ServiceConfig> =
            serde_json::from_slice(&content).map_err(|source| RegistryError::Serialization {
                path: path.clone(),
                source,
            })?;

        Ok(records.into_iter().filter(|r| is_loadable(path, r)).collect())
    }

    /// Replace the stored snapshot with `services`.
    pub async fn persist(&self, services: &[ServiceConfig]) -> Result<(), RegistryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let io_err = |source| RegistryError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let content = serde_json::to_vec_pretty(services).map_err(|source| {
            RegistryError::Serialization {
                path: path.clone(),
                source,
            }
        })?;

        let tmp = tmp_path(path);
        tokio::fs::write(&tmp, content).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;

        tracing::debug!(path = %path.display(), count = services.len(), "Registry snapshot written");
        Ok(())
    }
}

/// Records that break the registry invariants are skipped with a warning and
/// dropped from the file on the next write.
fn is_loadable(path: &Path, record: &ServiceConfig) -> bool {
    let timeout = i64::try_from(record.timeout_ms).unwrap_or(i64::MAX);
    let errors = validate_fields(&record.name, &record.url, i64::from(record.retry_attempts), timeout);
    if errors.is_empty() {
        return true;
    }
    tracing::warn!(
        path = %path.display(),
        id = %record.id,
        name = %record.name,
        errors = %errors.join("; "),
        "Skipping invalid service record in registry snapshot"
    );
    false
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
