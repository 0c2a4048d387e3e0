//! Per-voter sequential nonces — the sole replay-protection mechanism.

use crate::CoreError;
use gpoll_types::VoterAddress;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Monotone per-voter counters. A voter's next vote must carry exactly the
/// current value; acceptance advances it by one. Counters never decrease and
/// never skip.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NonceLedger {
    next: HashMap<VoterAddress, u64>,
}

impl NonceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The nonce the voter's next vote must carry. Starts at 0.
    pub fn current(&self, voter: &VoterAddress) -> u64 {
        self.next.get(voter).copied().unwrap_or(0)
    }

    /// Accept `claimed` iff it equals the current value, then advance by one.
    pub fn check_and_advance(
        &mut self,
        voter: &VoterAddress,
        claimed: u64,
    ) -> Result<(), CoreError> {
        let expected = self.current(voter);
        if claimed != expected {
            return Err(CoreError::InvalidNonce {
                expected,
                got: claimed,
            });
        }
        self.next.insert(voter.clone(), expected + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter() -> VoterAddress {
        VoterAddress::new("gp_nonce_test")
    }

    #[test]
    fn starts_at_zero() {
        let ledger = NonceLedger::new();
        assert_eq!(ledger.current(&voter()), 0);
    }

    #[test]
    fn advances_by_exactly_one() {
        let mut ledger = NonceLedger::new();
        ledger.check_and_advance(&voter(), 0).unwrap();
        assert_eq!(ledger.current(&voter()), 1);
        ledger.check_and_advance(&voter(), 1).unwrap();
        assert_eq!(ledger.current(&voter()), 2);
    }

    #[test]
    fn wrong_nonce_rejected_without_mutation() {
        let mut ledger = NonceLedger::new();
        let err = ledger.check_and_advance(&voter(), 3).unwrap_err();
        assert_eq!(err, CoreError::InvalidNonce { expected: 0, got: 3 });
        assert_eq!(ledger.current(&voter()), 0);
    }

    #[test]
    fn stale_nonce_rejected_after_advance() {
        let mut ledger = NonceLedger::new();
        ledger.check_and_advance(&voter(), 0).unwrap();
        let err = ledger.check_and_advance(&voter(), 0).unwrap_err();
        assert_eq!(err, CoreError::InvalidNonce { expected: 1, got: 0 });
    }

    #[test]
    fn voters_are_independent() {
        let mut ledger = NonceLedger::new();
        let a = VoterAddress::new("gp_a");
        let b = VoterAddress::new("gp_b");
        ledger.check_and_advance(&a, 0).unwrap();
        assert_eq!(ledger.current(&a), 1);
        assert_eq!(ledger.current(&b), 0);
    }
}
