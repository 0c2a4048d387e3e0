//! Cryptographic primitives for GaslessPoll.
//!
//! - **Ed25519** for vote signing and signature verification
//! - **Blake2b** for hashing (address checksums, vote digests)
//! - Domain-separated vote digests so a signature over one poll can never be
//!   replayed against another poll, option, nonce, or deployment
//! - Address derivation with `gp_` prefix and base32 encoding

pub mod address;
pub mod digest;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{decode_address, derive_address, validate_address};
pub use digest::{sign_vote, verify_vote, vote_digest, DomainTag};
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
