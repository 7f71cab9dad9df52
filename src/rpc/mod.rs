//! JSON-RPC 2.0 entry point.
//!
//! # Data Flow
//! ```text
//! POST /mcp
//!     → envelope.rs validates jsonrpc/method/params/id
//!     → methods.rs looks up the method row
//!     → dispatcher.rs builds the backend call and hands it to the
//!       forwarding engine
//!     → result shaped per method, or a fixed error code
//! ```
//!
//! # Design Decisions
//! - One request per POST; batches are rejected as invalid requests
//! - Error messages are fixed strings; backend details stay in the logs

pub mod dispatcher;
pub mod envelope;
pub mod methods;

pub use dispatcher::{RpcDispatcher, RpcOutcome};
pub use envelope::{JsonRpcId, RpcErrorCode, RpcRequest, RpcResponse};
