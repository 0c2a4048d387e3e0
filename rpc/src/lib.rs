//! HTTP/JSON server for the GaslessPoll relayer.
//!
//! Provides endpoints for:
//! - Poll creation and lifecycle (end, final flush, forced drain)
//! - Signed vote submission
//! - Tally, nonce, and pending-queue queries
//! - Batch settings administration
//!
//! Mutating calls carry an explicit caller address in the request body, the
//! same way the core attributes authorization to a caller identity.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, RpcServer, SharedService};
