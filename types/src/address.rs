//! Voter address type with `gp_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A GaslessPoll voter address, always prefixed with `gp_`.
///
/// Derived from the voter's public key via Blake2b hashing + base32 encoding
/// (see `gpoll_crypto::derive_address`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoterAddress(String);

impl VoterAddress {
    /// The standard prefix for all GaslessPoll voter addresses.
    pub const PREFIX: &'static str = "gp_";

    /// Create a new voter address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `gp_`.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with gp_");
        Self(s)
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this address is well-formed (prefix + non-empty body).
    ///
    /// Checksum validation lives in the crypto crate; this is the cheap
    /// structural check only.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for VoterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VoterAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
