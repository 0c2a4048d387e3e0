//! Fundamental types for the GaslessPoll relayer.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: voter addresses, poll identifiers, cryptographic key material,
//! and timestamps.

pub mod address;
pub mod ids;
pub mod keys;
pub mod time;

pub use address::VoterAddress;
pub use ids::PollId;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use time::Timestamp;
