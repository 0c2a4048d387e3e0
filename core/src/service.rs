//! The vote submission orchestrator.
//!
//! [`PollService`] owns every piece of mutable state — registry, nonce
//! ledger, pending queues, vote records, batch settings — and is the single
//! entry point for all transitions. Every mutating method takes `&mut self`
//! and runs to completion before returning, which gives each call the
//! all-or-nothing semantics the settlement protocol assumes. Concurrent
//! callers must serialize through a mutex or a single-writer actor.

use crate::error::CoreError;
use crate::events::{PollEvent, SettleReason};
use crate::nonce::NonceLedger;
use crate::params::{BatchSettings, PollLimits};
use crate::queue::{PendingQueues, QueuedVote};
use crate::registry::{Poll, PollRegistry};
use crate::settlement::{self, SettlementOutcome};
use crate::vote::SignedVote;
use gpoll_crypto::{verify_vote, DomainTag};
use gpoll_types::{PollId, Timestamp, VoterAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Orchestrates intake, queueing, and batch settlement for all polls.
#[derive(Debug)]
pub struct PollService {
    domain: DomainTag,
    owner: VoterAddress,
    limits: PollLimits,
    batch: BatchSettings,
    registry: PollRegistry,
    nonces: NonceLedger,
    queues: PendingQueues,
    /// Intake reservation: set the moment a vote is accepted into the queue.
    has_voted: HashSet<(PollId, VoterAddress)>,
    /// Settlement record: set when a vote is applied to a tally.
    counted: HashSet<(PollId, VoterAddress)>,
    /// Polls whose final batch has been flushed.
    finalized: HashSet<PollId>,
    events: Vec<PollEvent>,
}

impl PollService {
    pub fn new(domain: DomainTag, owner: VoterAddress) -> Self {
        Self::with_settings(domain, owner, BatchSettings::default(), PollLimits::default())
    }

    pub fn with_settings(
        domain: DomainTag,
        owner: VoterAddress,
        batch: BatchSettings,
        limits: PollLimits,
    ) -> Self {
        Self {
            domain,
            owner,
            limits,
            batch,
            registry: PollRegistry::new(),
            nonces: NonceLedger::new(),
            queues: PendingQueues::new(),
            has_voted: HashSet::new(),
            counted: HashSet::new(),
            finalized: HashSet::new(),
            events: Vec::new(),
        }
    }

    fn record(&mut self, event: PollEvent) {
        tracing::info!(?event, "poll event");
        self.events.push(event);
    }

    /// Drain buffered events (for indexers / RPC responses).
    pub fn take_events(&mut self) -> Vec<PollEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Poll lifecycle ───────────────────────────────────────────────────

    /// Create a poll. Anyone may create; the caller becomes the creator.
    pub fn create_poll(
        &mut self,
        caller: VoterAddress,
        question: String,
        options: Vec<String>,
        duration_secs: u64,
        now: Timestamp,
    ) -> Result<PollId, CoreError> {
        let id = self.registry.create(
            caller.clone(),
            question,
            options,
            duration_secs,
            &self.limits,
            now,
        )?;
        let created = self.registry.get(id)?;
        let (end_time, options) = (created.end_time(), created.options.len());
        self.record(PollEvent::PollCreated {
            poll_id: id,
            creator: caller,
            options,
            end_time,
        });
        Ok(id)
    }

    /// End a poll explicitly. Creator or owner only.
    pub fn end_poll(&mut self, caller: &VoterAddress, poll_id: PollId) -> Result<(), CoreError> {
        self.registry.end(poll_id, caller, &self.owner)?;
        self.record(PollEvent::PollEnded { poll_id });
        Ok(())
    }

    // ── Vote intake ──────────────────────────────────────────────────────

    /// Validate and enqueue a signed vote, settling synchronously if the
    /// poll's queue reaches the trigger threshold.
    ///
    /// Validation order: poll exists and is open → option in range → not
    /// already voted → nonce matches → signature verifies. Only when all
    /// checks pass does intake reserve the (poll, voter) slot and advance
    /// the nonce, so every failing path leaves state untouched.
    pub fn submit_vote(&mut self, vote: SignedVote, now: Timestamp) -> Result<(), CoreError> {
        let poll = self.registry.get(vote.poll_id)?;
        if !poll.active {
            return Err(CoreError::PollNotActive);
        }
        if poll.is_expired(now) {
            return Err(CoreError::PollExpired);
        }
        if vote.option_index as usize >= poll.options.len() {
            return Err(CoreError::InvalidOption {
                index: vote.option_index,
                options: poll.options.len(),
            });
        }
        let slot = (vote.poll_id, vote.voter.clone());
        if self.has_voted.contains(&slot) {
            return Err(CoreError::AlreadyVoted);
        }
        let expected = self.nonces.current(&vote.voter);
        if vote.nonce != expected {
            return Err(CoreError::InvalidNonce {
                expected,
                got: vote.nonce,
            });
        }
        if !verify_vote(
            &self.domain,
            vote.poll_id,
            vote.option_index,
            vote.nonce,
            &vote.voter,
            &vote.public_key,
            &vote.signature,
        ) {
            return Err(CoreError::InvalidSignature);
        }

        // All checks passed; reserve the slot. The nonce is consumed here,
        // at intake, and never touched again — a later soft-discard leaves
        // it consumed so the slot cannot be replayed.
        self.nonces.check_and_advance(&vote.voter, vote.nonce)?;
        self.has_voted.insert(slot);

        let poll_id = vote.poll_id;
        let voter = vote.voter.clone();
        self.queues.enqueue(QueuedVote {
            poll_id,
            option_index: vote.option_index,
            voter: vote.voter,
            nonce: vote.nonce,
            queued_at: now,
        });
        let queue_len = self.queues.len(poll_id);
        self.record(PollEvent::VoteQueued {
            poll_id,
            voter,
            queue_len,
        });

        if queue_len >= self.batch.min_batch_size {
            self.run_settlement(poll_id, SettleReason::MinBatchSizeReached, now)?;
        }
        Ok(())
    }

    // ── Settlement entry points ──────────────────────────────────────────

    fn run_settlement(
        &mut self,
        poll_id: PollId,
        reason: SettleReason,
        now: Timestamp,
    ) -> Result<SettlementOutcome, CoreError> {
        let poll = self.registry.get_mut(poll_id)?;
        Ok(settlement::settle_poll(
            poll,
            &mut self.queues,
            &mut self.counted,
            now,
            self.batch.max_batch_size,
            reason,
            &mut self.events,
        ))
    }

    /// Flush all remaining pending votes for a poll that has ended or
    /// expired, and finalize it. Permissionless; callable exactly once per
    /// poll.
    ///
    /// The engine still caps each pass at `max_batch_size`; this loops
    /// passes until the queue is empty.
    pub fn process_pending_batch(
        &mut self,
        poll_id: PollId,
        now: Timestamp,
    ) -> Result<SettlementOutcome, CoreError> {
        let poll = self.registry.get(poll_id)?;
        if self.finalized.contains(&poll_id) {
            return Err(CoreError::BatchAlreadyProcessed);
        }
        if poll.is_open(now) {
            return Err(CoreError::PollStillOpen);
        }
        // Automatic transition: an expired poll that was never ended
        // explicitly goes inactive on its first final flush.
        if poll.active {
            self.registry.get_mut(poll_id)?.active = false;
            self.record(PollEvent::PollEnded { poll_id });
        }

        let mut total = SettlementOutcome::default();
        while !self.queues.is_empty(poll_id) {
            let pass = self.run_settlement(poll_id, SettleReason::PollEnded, now)?;
            total.processed += pass.processed;
            total.discarded += pass.discarded;
        }
        self.finalized.insert(poll_id);
        Ok(total)
    }

    /// Owner-only emergency drain of one poll's queue, ignoring the trigger
    /// threshold. A single engine pass, capped at `max_batch_size`.
    pub fn force_process_batch(
        &mut self,
        caller: &VoterAddress,
        poll_id: PollId,
        now: Timestamp,
    ) -> Result<SettlementOutcome, CoreError> {
        if caller != &self.owner {
            return Err(CoreError::Unauthorized);
        }
        self.registry.get(poll_id)?;
        self.run_settlement(poll_id, SettleReason::ForceProcessed, now)
    }

    /// Owner-only update of the batch trigger threshold and cap.
    pub fn set_batch_settings(
        &mut self,
        caller: &VoterAddress,
        min_batch_size: usize,
        max_batch_size: usize,
    ) -> Result<(), CoreError> {
        if caller != &self.owner {
            return Err(CoreError::Unauthorized);
        }
        self.batch = BatchSettings::new(min_batch_size, max_batch_size)?;
        self.record(PollEvent::BatchSettingsChanged {
            min_batch_size,
            max_batch_size,
        });
        Ok(())
    }

    // ── Read accessors (no side effects) ─────────────────────────────────

    pub fn owner(&self) -> &VoterAddress {
        &self.owner
    }

    pub fn domain(&self) -> &DomainTag {
        &self.domain
    }

    pub fn poll(&self, poll_id: PollId) -> Result<&Poll, CoreError> {
        self.registry.get(poll_id)
    }

    pub fn polls(&self) -> impl Iterator<Item = &Poll> {
        self.registry.iter()
    }

    pub fn vote_counts(&self, poll_id: PollId) -> Result<&[u64], CoreError> {
        Ok(&self.registry.get(poll_id)?.tallies)
    }

    pub fn has_voted_in_poll(&self, poll_id: PollId, voter: &VoterAddress) -> bool {
        self.has_voted.contains(&(poll_id, voter.clone()))
    }

    /// The nonce the voter's next vote must carry.
    pub fn nonce_of(&self, voter: &VoterAddress) -> u64 {
        self.nonces.current(voter)
    }

    pub fn is_poll_active(&self, poll_id: PollId, now: Timestamp) -> Result<bool, CoreError> {
        Ok(self.registry.get(poll_id)?.is_open(now))
    }

    pub fn is_poll_expired(&self, poll_id: PollId, now: Timestamp) -> Result<bool, CoreError> {
        Ok(self.registry.get(poll_id)?.is_expired(now))
    }

    pub fn pending_votes_count(&self, poll_id: PollId) -> usize {
        self.queues.len(poll_id)
    }

    pub fn batch_settings(&self) -> BatchSettings {
        self.batch
    }

    // ── Snapshot persistence ─────────────────────────────────────────────

    /// Serialize the full service state (minus the event buffer) to bytes.
    pub fn save_state(&self) -> Result<Vec<u8>, CoreError> {
        let snapshot = ServiceSnapshot {
            domain: self.domain.clone(),
            owner: self.owner.clone(),
            limits: self.limits,
            batch: self.batch,
            registry: self.registry.clone(),
            nonces: self.nonces.clone(),
            queues: self.queues.clone(),
            has_voted: self.has_voted.clone(),
            counted: self.counted.clone(),
            finalized: self.finalized.clone(),
        };
        bincode::serialize(&snapshot).map_err(|e| CoreError::Snapshot(e.to_string()))
    }

    /// Restore a service from serialized bytes.
    pub fn load_state(data: &[u8]) -> Result<Self, CoreError> {
        let snapshot: ServiceSnapshot =
            bincode::deserialize(data).map_err(|e| CoreError::Snapshot(e.to_string()))?;
        Ok(Self {
            domain: snapshot.domain,
            owner: snapshot.owner,
            limits: snapshot.limits,
            batch: snapshot.batch,
            registry: snapshot.registry,
            nonces: snapshot.nonces,
            queues: snapshot.queues,
            has_voted: snapshot.has_voted,
            counted: snapshot.counted,
            finalized: snapshot.finalized,
            events: Vec::new(),
        })
    }
}

/// Serializable snapshot of the service's state.
#[derive(Serialize, Deserialize)]
struct ServiceSnapshot {
    domain: DomainTag,
    owner: VoterAddress,
    limits: PollLimits,
    batch: BatchSettings,
    registry: PollRegistry,
    nonces: NonceLedger,
    queues: PendingQueues,
    has_voted: HashSet<(PollId, VoterAddress)>,
    counted: HashSet<(PollId, VoterAddress)>,
    finalized: HashSet<PollId>,
}
