//! Pending-vote queues, nonce ledger, and batch settlement for GaslessPoll.
//!
//! Voters sign structured vote messages off-line; this crate accepts them,
//! replay-protects them with per-voter nonces, buffers them in per-poll FIFO
//! queues, and settles them in batches against poll tallies. The
//! [`PollService`] orchestrator is the single entry point: every mutating
//! call takes `&mut self`, so wrapping it in a mutex (or a single-writer
//! actor) gives the per-call atomicity the protocol requires.

pub mod error;
pub mod events;
pub mod nonce;
pub mod params;
pub mod queue;
pub mod registry;
pub mod service;
pub mod settlement;
pub mod vote;

pub use error::CoreError;
pub use events::{DiscardReason, PollEvent, SettleReason};
pub use nonce::NonceLedger;
pub use params::{BatchSettings, PollLimits};
pub use queue::{PendingQueues, QueuedVote};
pub use registry::{Poll, PollRegistry};
pub use service::PollService;
pub use settlement::SettlementOutcome;
pub use vote::SignedVote;
