//! Per-poll pending-vote queues.
//!
//! Each poll gets its own FIFO buffer. Entries are appended at intake and
//! removed only by the settlement engine, front-first, so removal order
//! always matches arrival order ("first claimed, first settled").

use gpoll_types::{PollId, Timestamp, VoterAddress};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// An accepted-but-unsettled vote. Signature and public key were verified at
/// intake and are not carried further; the entry exists only until it is
/// settled or discarded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedVote {
    pub poll_id: PollId,
    pub option_index: u32,
    pub voter: VoterAddress,
    pub nonce: u64,
    pub queued_at: Timestamp,
}

/// All pending queues, keyed by poll.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PendingQueues {
    queues: HashMap<PollId, VecDeque<QueuedVote>>,
}

impl PendingQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vote to its poll's queue.
    pub fn enqueue(&mut self, vote: QueuedVote) {
        self.queues.entry(vote.poll_id).or_default().push_back(vote);
    }

    /// Number of pending votes for one poll.
    pub fn len(&self, poll_id: PollId) -> usize {
        self.queues.get(&poll_id).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, poll_id: PollId) -> bool {
        self.len(poll_id) == 0
    }

    /// Total pending votes across all polls.
    pub fn total_len(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Remove and return up to `n` votes from the front of a poll's queue,
    /// preserving the relative order of the remainder.
    pub fn drain_front(&mut self, poll_id: PollId, n: usize) -> Vec<QueuedVote> {
        match self.queues.get_mut(&poll_id) {
            Some(queue) => {
                let take = n.min(queue.len());
                queue.drain(..take).collect()
            }
            None => Vec::new(),
        }
    }

    /// Peek at the pending entries for a poll, front first.
    pub fn pending(&self, poll_id: PollId) -> impl Iterator<Item = &QueuedVote> {
        self.queues.get(&poll_id).into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(poll: u64, voter: &str, nonce: u64) -> QueuedVote {
        QueuedVote {
            poll_id: PollId::new(poll),
            option_index: 0,
            voter: VoterAddress::new(format!("gp_{voter}")),
            nonce,
            queued_at: Timestamp::new(100),
        }
    }

    #[test]
    fn fifo_order_preserved() {
        let mut queues = PendingQueues::new();
        for i in 0..5 {
            queues.enqueue(vote(0, &format!("v{i}"), 0));
        }
        let drained = queues.drain_front(PollId::new(0), 3);
        let names: Vec<&str> = drained.iter().map(|v| v.voter.as_str()).collect();
        assert_eq!(names, ["gp_v0", "gp_v1", "gp_v2"]);

        // Remainder keeps its relative order.
        let rest: Vec<&str> = queues
            .pending(PollId::new(0))
            .map(|v| v.voter.as_str())
            .collect();
        assert_eq!(rest, ["gp_v3", "gp_v4"]);
    }

    #[test]
    fn drain_more_than_len_takes_all() {
        let mut queues = PendingQueues::new();
        queues.enqueue(vote(0, "a", 0));
        let drained = queues.drain_front(PollId::new(0), 10);
        assert_eq!(drained.len(), 1);
        assert!(queues.is_empty(PollId::new(0)));
    }

    #[test]
    fn drain_missing_poll_is_empty() {
        let mut queues = PendingQueues::new();
        assert!(queues.drain_front(PollId::new(7), 4).is_empty());
    }

    #[test]
    fn polls_are_isolated() {
        let mut queues = PendingQueues::new();
        queues.enqueue(vote(0, "a", 0));
        queues.enqueue(vote(1, "b", 0));
        queues.enqueue(vote(1, "c", 0));
        assert_eq!(queues.len(PollId::new(0)), 1);
        assert_eq!(queues.len(PollId::new(1)), 2);
        assert_eq!(queues.total_len(), 3);

        queues.drain_front(PollId::new(1), 5);
        assert_eq!(queues.len(PollId::new(0)), 1);
    }
}
