//! Domain-separated vote digests.
//!
//! A vote signature covers a typed digest rather than raw bytes, so a
//! signature produced for one poll/option/nonce under one deployment can
//! never be replayed against any other context. The digest layout is a wire
//! contract: any off-line signer (wallet, browser extension, hardware key)
//! must reproduce it bit-exactly.
//!
//! Layout:
//! ```text
//! separator   = Blake2b-256("GaslessPoll" || "1" || instance)
//! vote_digest = Blake2b-256(separator || poll_id:u64 LE || option_index:u32 LE
//!                           || nonce:u64 LE || voter address UTF-8)
//! ```

use gpoll_types::{PollId, PrivateKey, PublicKey, Signature, VoterAddress};
use serde::{Deserialize, Serialize};

/// Domain name shared by all GaslessPoll deployments.
pub const DOMAIN_NAME: &str = "GaslessPoll";
/// Digest layout version. Bump on any change to the byte layout.
pub const DOMAIN_VERSION: &str = "1";

/// Binds signatures to one logical deployment ("contract identity").
///
/// Two services with different `instance` values accept disjoint signature
/// sets even for identical poll ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTag {
    /// 32 bytes of deployment identity, chosen at initialization.
    pub instance: [u8; 32],
}

impl DomainTag {
    pub fn new(instance: [u8; 32]) -> Self {
        Self { instance }
    }

    /// Derive a tag from a human-readable deployment label.
    pub fn from_label(label: &str) -> Self {
        Self {
            instance: crate::blake2b_256(label.as_bytes()),
        }
    }

    /// The domain separator: hash of name, version, and instance identity.
    pub fn separator(&self) -> [u8; 32] {
        crate::blake2b_256_multi(&[
            DOMAIN_NAME.as_bytes(),
            DOMAIN_VERSION.as_bytes(),
            &self.instance,
        ])
    }
}

/// Compute the canonical digest a voter signs for one vote.
///
/// Deterministic and independent of time; every field that scopes the vote
/// (poll, option, nonce, voter identity, deployment) is bound in.
pub fn vote_digest(
    tag: &DomainTag,
    poll_id: PollId,
    option_index: u32,
    nonce: u64,
    voter: &VoterAddress,
) -> [u8; 32] {
    let separator = tag.separator();
    crate::blake2b_256_multi(&[
        &separator,
        &poll_id.as_u64().to_le_bytes(),
        &option_index.to_le_bytes(),
        &nonce.to_le_bytes(),
        voter.as_str().as_bytes(),
    ])
}

/// Sign a vote digest with the voter's private key.
pub fn sign_vote(
    tag: &DomainTag,
    poll_id: PollId,
    option_index: u32,
    nonce: u64,
    voter: &VoterAddress,
    private_key: &PrivateKey,
) -> Signature {
    let digest = vote_digest(tag, poll_id, option_index, nonce, voter);
    crate::sign_message(&digest, private_key)
}

/// Verify that `voter` authored this vote.
///
/// Succeeds iff the signature checks against `public_key` over the canonical
/// digest AND `public_key` derives to the claimed voter address. The second
/// check is what binds the signature to the claimed identity — without it a
/// signer could attach an arbitrary key.
pub fn verify_vote(
    tag: &DomainTag,
    poll_id: PollId,
    option_index: u32,
    nonce: u64,
    voter: &VoterAddress,
    public_key: &PublicKey,
    signature: &Signature,
) -> bool {
    if crate::derive_address(public_key) != *voter {
        return false;
    }
    let digest = vote_digest(tag, poll_id, option_index, nonce, voter);
    crate::verify_signature(&digest, signature, public_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;

    fn tag() -> DomainTag {
        DomainTag::from_label("gpoll-test")
    }

    fn voter_keys(seed: u8) -> (gpoll_types::KeyPair, VoterAddress) {
        let kp = keypair_from_seed(&[seed; 32]);
        let addr = crate::derive_address(&kp.public);
        (kp, addr)
    }

    #[test]
    fn sign_then_verify() {
        let (kp, voter) = voter_keys(1);
        let sig = sign_vote(&tag(), PollId::new(3), 1, 0, &voter, &kp.private);
        assert!(verify_vote(
            &tag(),
            PollId::new(3),
            1,
            0,
            &voter,
            &kp.public,
            &sig
        ));
    }

    #[test]
    fn digest_is_deterministic() {
        let (_, voter) = voter_keys(1);
        let d1 = vote_digest(&tag(), PollId::new(0), 0, 0, &voter);
        let d2 = vote_digest(&tag(), PollId::new(0), 0, 0, &voter);
        assert_eq!(d1, d2);
    }

    #[test]
    fn every_field_changes_the_digest() {
        let (_, voter) = voter_keys(1);
        let (_, other) = voter_keys(2);
        let base = vote_digest(&tag(), PollId::new(1), 1, 1, &voter);
        assert_ne!(base, vote_digest(&tag(), PollId::new(2), 1, 1, &voter));
        assert_ne!(base, vote_digest(&tag(), PollId::new(1), 2, 1, &voter));
        assert_ne!(base, vote_digest(&tag(), PollId::new(1), 1, 2, &voter));
        assert_ne!(base, vote_digest(&tag(), PollId::new(1), 1, 1, &other));
    }

    #[test]
    fn different_deployments_reject_each_other() {
        let (kp, voter) = voter_keys(1);
        let sig = sign_vote(&tag(), PollId::new(0), 0, 0, &voter, &kp.private);
        let other = DomainTag::from_label("gpoll-other");
        assert!(!verify_vote(
            &other,
            PollId::new(0),
            0,
            0,
            &voter,
            &kp.public,
            &sig
        ));
    }

    #[test]
    fn tampered_fields_fail_verification() {
        let (kp, voter) = voter_keys(1);
        let sig = sign_vote(&tag(), PollId::new(5), 2, 7, &voter, &kp.private);
        let t = tag();
        assert!(!verify_vote(&t, PollId::new(6), 2, 7, &voter, &kp.public, &sig));
        assert!(!verify_vote(&t, PollId::new(5), 3, 7, &voter, &kp.public, &sig));
        assert!(!verify_vote(&t, PollId::new(5), 2, 8, &voter, &kp.public, &sig));
    }

    #[test]
    fn mismatched_key_and_address_fail() {
        let (kp, voter) = voter_keys(1);
        let (other_kp, _) = voter_keys(2);
        // Sign with the right key, but present someone else's public key.
        let sig = sign_vote(&tag(), PollId::new(0), 0, 0, &voter, &kp.private);
        assert!(!verify_vote(
            &tag(),
            PollId::new(0),
            0,
            0,
            &voter,
            &other_kp.public,
            &sig
        ));
    }

    #[test]
    fn malformed_signature_rejected() {
        let (kp, voter) = voter_keys(1);
        let sig = Signature([0u8; 64]);
        assert!(!verify_vote(
            &tag(),
            PollId::new(0),
            0,
            0,
            &voter,
            &kp.public,
            &sig
        ));
    }
}
