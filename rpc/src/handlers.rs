//! Request and response bodies for the RPC surface.

use crate::RpcError;
use gpoll_core::{Poll, PollEvent, SignedVote};
use gpoll_types::{PollId, PublicKey, Signature, Timestamp, VoterAddress};
use serde::{Deserialize, Serialize};

// ── Poll lifecycle ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreatePollRequest {
    pub caller: String,
    pub question: String,
    pub options: Vec<String>,
    pub duration_secs: u64,
}

#[derive(Serialize)]
pub struct CreatePollResponse {
    pub poll_id: u64,
    pub events: Vec<PollEvent>,
}

#[derive(Deserialize)]
pub struct CallerRequest {
    pub caller: String,
}

#[derive(Serialize)]
pub struct AckResponse {
    pub events: Vec<PollEvent>,
}

// ── Vote submission ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitVoteRequest {
    pub poll_id: u64,
    pub option_index: u32,
    pub voter: String,
    pub nonce: u64,
    /// Hex-encoded 32-byte Ed25519 public key.
    pub public_key: String,
    /// Hex-encoded 64-byte Ed25519 signature over the vote digest.
    pub signature: String,
}

#[derive(Serialize)]
pub struct SubmitVoteResponse {
    pub queued: bool,
    pub pending: usize,
    pub events: Vec<PollEvent>,
}

// ── Settlement ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SettlementResponse {
    pub processed: u64,
    pub discarded: u64,
    pub events: Vec<PollEvent>,
}

#[derive(Deserialize)]
pub struct BatchSettingsRequest {
    pub caller: String,
    pub min_batch_size: usize,
    pub max_batch_size: usize,
}

#[derive(Serialize)]
pub struct BatchSettingsView {
    pub min_batch_size: usize,
    pub max_batch_size: usize,
}

// ── Reads ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PollView {
    pub id: u64,
    pub question: String,
    pub options: Vec<String>,
    pub tallies: Vec<u64>,
    pub creator: String,
    pub created_at: u64,
    pub end_time: u64,
    pub active: bool,
    pub expired: bool,
    pub open: bool,
}

impl PollView {
    pub fn from_poll(poll: &Poll, now: Timestamp) -> Self {
        Self {
            id: poll.id.as_u64(),
            question: poll.question.clone(),
            options: poll.options.clone(),
            tallies: poll.tallies.clone(),
            creator: poll.creator.to_string(),
            created_at: poll.created_at.as_secs(),
            end_time: poll.end_time().as_secs(),
            active: poll.active,
            expired: poll.is_expired(now),
            open: poll.is_open(now),
        }
    }
}

#[derive(Serialize)]
pub struct TalliesResponse {
    pub poll_id: u64,
    pub tallies: Vec<u64>,
    pub total: u64,
}

#[derive(Serialize)]
pub struct HasVotedResponse {
    pub poll_id: u64,
    pub voter: String,
    pub voted: bool,
}

#[derive(Serialize)]
pub struct NonceResponse {
    pub voter: String,
    pub nonce: u64,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub poll_id: u64,
    pub pending: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub polls: usize,
}

// ── Parsing helpers ──────────────────────────────────────────────────────

pub fn parse_address(raw: &str) -> Result<VoterAddress, RpcError> {
    if !raw.starts_with(VoterAddress::PREFIX) {
        return Err(RpcError::InvalidRequest(format!(
            "address must start with {}",
            VoterAddress::PREFIX
        )));
    }
    Ok(VoterAddress::new(raw))
}

fn parse_hex<const N: usize>(raw: &str, what: &str) -> Result<[u8; N], RpcError> {
    let bytes = hex::decode(raw)
        .map_err(|_| RpcError::InvalidRequest(format!("{what} is not valid hex")))?;
    bytes
        .try_into()
        .map_err(|_| RpcError::InvalidRequest(format!("{what} must be {N} bytes")))
}

impl SubmitVoteRequest {
    pub fn into_signed_vote(self) -> Result<SignedVote, RpcError> {
        let voter = parse_address(&self.voter)?;
        let public_key = PublicKey(parse_hex::<32>(&self.public_key, "public_key")?);
        let signature = Signature(parse_hex::<64>(&self.signature, "signature")?);
        Ok(SignedVote {
            poll_id: PollId::new(self.poll_id),
            option_index: self.option_index,
            voter,
            nonce: self.nonce,
            public_key,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(public_key: &str, signature: &str, voter: &str) -> SubmitVoteRequest {
        SubmitVoteRequest {
            poll_id: 0,
            option_index: 1,
            voter: voter.into(),
            nonce: 4,
            public_key: public_key.into(),
            signature: signature.into(),
        }
    }

    #[test]
    fn well_formed_request_parses() {
        let req = request(&"ab".repeat(32), &"cd".repeat(64), "gp_somebody");
        let vote = req.into_signed_vote().unwrap();
        assert_eq!(vote.poll_id, PollId::new(0));
        assert_eq!(vote.nonce, 4);
        assert_eq!(vote.public_key.as_bytes(), &[0xAB; 32]);
        assert_eq!(vote.signature.as_bytes(), &[0xCD; 64]);
    }

    #[test]
    fn bad_hex_rejected() {
        let req = request("zz", &"cd".repeat(64), "gp_somebody");
        assert!(req.into_signed_vote().is_err());
    }

    #[test]
    fn wrong_key_length_rejected() {
        let req = request(&"ab".repeat(16), &"cd".repeat(64), "gp_somebody");
        assert!(req.into_signed_vote().is_err());
    }

    #[test]
    fn wrong_prefix_rejected() {
        let req = request(&"ab".repeat(32), &"cd".repeat(64), "vote_nope");
        assert!(req.into_signed_vote().is_err());
    }
}
