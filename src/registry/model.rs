//! Service configuration records and their validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_HEALTH_CHECK_ENDPOINT: &str = "/health";
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// A registered backend, addressed by its logical `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Server-assigned identifier; never changes after creation.
    pub id: String,
    pub name: String,
    /// Base URL; forwarded paths are appended verbatim.
    pub url: String,
    #[serde(default = "default_health_check_endpoint")]
    pub health_check_endpoint: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    /// Retries after the first attempt.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Per-attempt timeout; 0 leaves the attempt unbounded.
    #[serde(default = "default_timeout_ms", alias = "timeout")]
    pub timeout_ms: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_health_check_endpoint() -> String {
    DEFAULT_HEALTH_CHECK_ENDPOINT.to_string()
}

fn default_is_active() -> bool {
    true
}

fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Caller-supplied fields for registering or patching a service.
///
/// Numeric fields are signed so negative input is reported as a validation
/// error instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub health_check_endpoint: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub retry_attempts: Option<i64>,
    #[serde(default, alias = "timeout")]
    pub timeout_ms: Option<i64>,
}

impl ServiceInput {
    /// Build a new record, filling unset fields with defaults.
    pub fn into_config(self, id: String, now: DateTime<Utc>) -> Result<ServiceConfig, Vec<String>> {
        let name = self.name.unwrap_or_default();
        let url = self.url.unwrap_or_default();
        let retry = self.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS as i64);
        let timeout = self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS as i64);

        let errors = validate_fields(&name, &url, retry, timeout);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ServiceConfig {
            id,
            name,
            url,
            health_check_endpoint: self
                .health_check_endpoint
                .unwrap_or_else(default_health_check_endpoint),
            is_active: self.is_active.unwrap_or(true),
            retry_attempts: retry as u32,
            timeout_ms: timeout as u64,
            created_at: now,
            updated_at: now,
        })
    }
}

impl ServiceConfig {
    /// Merge a patch over this record and re-validate the result.
    ///
    /// `id` and `created_at` are kept; `updated_at` becomes `now`.
    pub fn merged(&self, patch: ServiceInput, now: DateTime<Utc>) -> Result<ServiceConfig, Vec<String>> {
        let name = patch.name.unwrap_or_else(|| self.name.clone());
        let url = patch.url.unwrap_or_else(|| self.url.clone());
        let retry = patch.retry_attempts.unwrap_or(self.retry_attempts as i64);
        let timeout = patch
            .timeout_ms
            .unwrap_or_else(|| i64::try_from(self.timeout_ms).unwrap_or(i64::MAX));

        let errors = validate_fields(&name, &url, retry, timeout);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ServiceConfig {
            id: self.id.clone(),
            name,
            url,
            health_check_endpoint: patch
                .health_check_endpoint
                .unwrap_or_else(|| self.health_check_endpoint.clone()),
            is_active: patch.is_active.unwrap_or(self.is_active),
            retry_attempts: retry as u32,
            timeout_ms: timeout as u64,
            created_at: self.created_at,
            updated_at: now,
        })
    }

    /// Absolute URL for `path` on this backend.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    /// Absolute URL of the health endpoint.
    pub fn health_url(&self) -> String {
        self.endpoint(&self.health_check_endpoint)
    }
}

/// Check the invariants every stored record must satisfy.
///
/// Returns one message per violated rule; empty means valid.
pub fn validate_fields(name: &str, url: &str, retry_attempts: i64, timeout_ms: i64) -> Vec<String> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push("Service name is required".to_string());
    }

    if url.trim().is_empty() {
        errors.push("Service URL is required".to_string());
    } else if !(url.starts_with("http://") || url.starts_with("https://")) || Url::parse(url).is_err() {
        errors.push("Invalid service URL format".to_string());
    }

    if retry_attempts < 0 {
        errors.push("Retry attempts must be non-negative".to_string());
    } else if retry_attempts > u32::MAX as i64 {
        errors.push("Retry attempts out of range".to_string());
    }

    if timeout_ms < 0 {
        errors.push("Timeout must be non-negative".to_string());
    }

    errors
}
