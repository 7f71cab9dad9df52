//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, middleware stack)
//!     → request.rs (request ID assigned or kept, echoed on the response)
//!     → handlers.rs (registry CRUD, forward, health, JSON-RPC)
//!     → response.rs (subsystem errors → status + `{error}` body)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
