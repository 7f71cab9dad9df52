//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, log levels and timeouts
//! - Check seed services against the same rules as registry input
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::registry::model;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid listener bind address '{0}'")]
    BindAddress(String),

    #[error("registry path must not be empty")]
    EmptyRegistryPath,

    #[error("seed service #{index}: {reason}")]
    Seed { index: usize, reason: String },

    #[error("duplicate seed service name '{0}'")]
    DuplicateSeed(String),

    #[error("rpc target '{0}' must not be empty")]
    EmptyRpcTarget(&'static str),

    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,

    #[error("unknown log level '{0}'")]
    LogLevel(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.registry.path.trim().is_empty() {
        errors.push(ValidationError::EmptyRegistryPath);
    }

    let mut seen = Vec::new();
    for (index, seed) in config.registry.seed.iter().enumerate() {
        let retry = seed.retry_attempts.map(i64::from).unwrap_or(model::DEFAULT_RETRY_ATTEMPTS as i64);
        let timeout = seed.timeout_ms.map(|ms| ms.min(i64::MAX as u64) as i64).unwrap_or(0);
        for reason in model::validate_fields(&seed.name, &seed.url, retry, timeout) {
            errors.push(ValidationError::Seed { index, reason });
        }
        if seen.contains(&seed.name.as_str()) {
            errors.push(ValidationError::DuplicateSeed(seed.name.clone()));
        }
        seen.push(seed.name.as_str());
    }

    for (label, value) in [
        ("contacts_service", &config.rpc.contacts_service),
        ("tickets_service", &config.rpc.tickets_service),
        ("kb_service", &config.rpc.kb_service),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyRpcTarget(label));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::SeedService;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.observability.log_level = "loud".into();
        config.registry.seed = vec![
            SeedService::new("contacts", "ftp://contacts"),
            SeedService::new("contacts", "http://localhost:3001"),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::BindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
        assert!(errors.contains(&ValidationError::LogLevel("loud".into())));
        assert!(errors.contains(&ValidationError::DuplicateSeed("contacts".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::Seed { index: 0, .. })));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MetricsAddress("nowhere".into())]
        );
    }
}
