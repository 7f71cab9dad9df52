//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry, forwarding, health, rpc
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (plain or JSON lines)
//!     → Prometheus scrape endpoint, when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the HTTP layer into every backend call
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
