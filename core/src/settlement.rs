//! The batch settlement engine.
//!
//! Drains a prefix of a poll's pending queue and re-validates each entry at
//! settlement time — validity may have changed since intake because the poll
//! expired or was ended. Stale entries are soft-discarded, never fatal to
//! the batch, and settlement on an empty queue is a no-op.

use crate::events::{DiscardReason, PollEvent, SettleReason};
use crate::queue::PendingQueues;
use crate::registry::Poll;
use gpoll_types::{PollId, Timestamp, VoterAddress};
use std::collections::HashSet;

/// Counts from one settlement pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// Votes applied to tallies.
    pub processed: u64,
    /// Votes dropped without counting.
    pub discarded: u64,
}

/// Run one settlement pass over `poll`'s queue, draining at most `cap`
/// entries. Returns the outcome; emits per-vote and aggregate events into
/// `events`.
///
/// Exactly `min(queue_len, cap)` entries leave the queue; the remainder keeps
/// its relative order for the next pass.
pub(crate) fn settle_poll(
    poll: &mut Poll,
    queues: &mut PendingQueues,
    counted: &mut HashSet<(PollId, VoterAddress)>,
    now: Timestamp,
    cap: usize,
    reason: SettleReason,
    events: &mut Vec<PollEvent>,
) -> SettlementOutcome {
    let batch = queues.len(poll.id).min(cap);
    if batch == 0 {
        return SettlementOutcome::default();
    }

    let mut outcome = SettlementOutcome::default();
    for entry in queues.drain_front(poll.id, batch) {
        if poll.is_expired(now) {
            // Soft-discard: the nonce slot died at intake, nothing to unwind.
            outcome.discarded += 1;
            tracing::debug!(poll = %poll.id, voter = %entry.voter, "discarding expired vote");
            events.push(PollEvent::VoteDiscarded {
                poll_id: poll.id,
                voter: entry.voter,
                reason: DiscardReason::PollExpired,
            });
        } else if !poll.active {
            outcome.discarded += 1;
            tracing::debug!(poll = %poll.id, voter = %entry.voter, "discarding vote for inactive poll");
            events.push(PollEvent::VoteDiscarded {
                poll_id: poll.id,
                voter: entry.voter,
                reason: DiscardReason::PollInactive,
            });
        } else if !counted.insert((poll.id, entry.voter.clone())) {
            // Unreachable through normal intake (the reservation check blocks
            // duplicates), kept as a guard against corrupted snapshots.
            outcome.discarded += 1;
            events.push(PollEvent::VoteDiscarded {
                poll_id: poll.id,
                voter: entry.voter,
                reason: DiscardReason::AlreadyCounted,
            });
        } else {
            poll.tallies[entry.option_index as usize] += 1;
            outcome.processed += 1;
            tracing::debug!(
                poll = %poll.id,
                voter = %entry.voter,
                option = entry.option_index,
                "vote counted"
            );
            events.push(PollEvent::VoteCounted {
                poll_id: poll.id,
                voter: entry.voter,
                option_index: entry.option_index,
            });
        }
    }

    tracing::info!(
        poll = %poll.id,
        processed = outcome.processed,
        discarded = outcome.discarded,
        ?reason,
        "batch settled"
    );
    events.push(PollEvent::BatchSettled {
        poll_id: poll.id,
        processed: outcome.processed,
        discarded: outcome.discarded,
        reason,
    });
    outcome
}
