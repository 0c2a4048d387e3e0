//! The submission payload: an off-line signed vote.

use gpoll_types::{PollId, PublicKey, Signature, VoterAddress};
use serde::{Deserialize, Serialize};

/// A vote as produced by a voter's signer and relayed to the service.
///
/// The signature covers the domain-separated digest of
/// `(poll_id, option_index, nonce, voter)` — see `gpoll_crypto::vote_digest`.
/// The public key rides along so verification can both check the signature
/// and confirm the key derives to the claimed voter address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedVote {
    pub poll_id: PollId,
    pub option_index: u32,
    pub voter: VoterAddress,
    pub nonce: u64,
    pub public_key: PublicKey,
    pub signature: Signature,
}
