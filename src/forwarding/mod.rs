//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! forward(service, request)
//!     → registry resolve_by_name (ServiceNotFound / ServiceInactive)
//!     → engine.rs builds the outbound call (url + path, JSON content type)
//!     → attempt loop driven by resilience::RetryMachine
//!         → transport.rs sends, bounded by the service timeout
//!         → response of any status: done
//!         → network error / timeout: back off linearly, retry
//!     → ForwardResponse or ForwardError::Exhausted
//! ```

pub mod engine;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{ForwardError, ForwardRequest, ForwardResponse, ForwardingEngine};
pub use transport::{HttpTransport, OutboundRequest, OutboundResponse, Transport, TransportError};
