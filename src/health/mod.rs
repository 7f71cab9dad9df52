//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health/{serviceName}
//!     → probe.rs resolves the service (unknown name is the only error)
//!     → one GET to url + healthCheckEndpoint, bounded by timeoutMs
//!     → 200 → healthy; anything else, including no answer → unhealthy
//! ```
//!
//! # Design Decisions
//! - Probes are on demand; no background monitor or hysteresis
//! - Inactive services are still probed
//! - Probe failures never propagate as errors

pub mod probe;

pub use probe::{HealthError, HealthProbe};
