//! Events emitted by the poll service for external indexers.

use gpoll_types::{PollId, Timestamp, VoterAddress};
use serde::{Deserialize, Serialize};

/// Why a settlement pass ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettleReason {
    /// The pending queue reached the trigger threshold during submission.
    MinBatchSizeReached,
    /// Final flush after the poll ended or expired.
    PollEnded,
    /// Owner-invoked emergency drain.
    ForceProcessed,
}

/// Why a queued vote was dropped without being counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardReason {
    /// The poll's end time passed while the vote sat in the queue. The
    /// voter's nonce slot was already consumed at intake, so the vote
    /// cannot be replayed.
    PollExpired,
    /// The poll was ended explicitly before this vote settled.
    PollInactive,
    /// A vote for this (poll, voter) pair was already counted.
    AlreadyCounted,
}

/// Observable state transitions, in emission order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollEvent {
    PollCreated {
        poll_id: PollId,
        creator: VoterAddress,
        options: usize,
        end_time: Timestamp,
    },
    VoteQueued {
        poll_id: PollId,
        voter: VoterAddress,
        queue_len: usize,
    },
    VoteCounted {
        poll_id: PollId,
        voter: VoterAddress,
        option_index: u32,
    },
    VoteDiscarded {
        poll_id: PollId,
        voter: VoterAddress,
        reason: DiscardReason,
    },
    BatchSettled {
        poll_id: PollId,
        processed: u64,
        discarded: u64,
        reason: SettleReason,
    },
    PollEnded {
        poll_id: PollId,
    },
    BatchSettingsChanged {
        min_batch_size: usize,
        max_batch_size: usize,
    },
}
