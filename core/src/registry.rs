//! Poll definitions and lifecycle.

use crate::params::PollLimits;
use crate::CoreError;
use gpoll_types::{PollId, Timestamp, VoterAddress};
use serde::{Deserialize, Serialize};

/// A poll: question, options, and tallies aligned index-for-index.
///
/// Tallies are mutated only by the settlement engine; the submission path
/// never touches them. `tallies.len() == options.len()` always holds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
    pub tallies: Vec<u64>,
    pub creator: VoterAddress,
    pub created_at: Timestamp,
    pub duration_secs: u64,
    pub active: bool,
}

impl Poll {
    /// The instant the poll stops accepting votes.
    pub fn end_time(&self) -> Timestamp {
        self.created_at.plus_secs(self.duration_secs)
    }

    /// Whether `now` is past the end time. Expired-but-active polls are
    /// non-votable even before the lifecycle flag is cleared.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.created_at.has_expired(self.duration_secs, now)
    }

    /// Active and not expired.
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.active && !self.is_expired(now)
    }

    /// Total number of counted votes across all options.
    pub fn total_votes(&self) -> u64 {
        self.tallies.iter().sum()
    }
}

/// Holds all polls, assigning sequential ids starting at 0.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PollRegistry {
    polls: Vec<Poll>,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a poll. Validates option count and duration window.
    pub fn create(
        &mut self,
        creator: VoterAddress,
        question: String,
        options: Vec<String>,
        duration_secs: u64,
        limits: &PollLimits,
        now: Timestamp,
    ) -> Result<PollId, CoreError> {
        if options.len() < PollLimits::MIN_OPTIONS {
            return Err(CoreError::InsufficientOptions {
                have: options.len(),
            });
        }
        if options.len() > PollLimits::MAX_OPTIONS {
            return Err(CoreError::TooManyOptions {
                have: options.len(),
            });
        }
        if duration_secs < limits.min_duration_secs || duration_secs > limits.max_duration_secs {
            return Err(CoreError::InvalidPollDuration {
                duration: duration_secs,
                min: limits.min_duration_secs,
                max: limits.max_duration_secs,
            });
        }

        let id = PollId::new(self.polls.len() as u64);
        let tallies = vec![0u64; options.len()];
        self.polls.push(Poll {
            id,
            question,
            options,
            tallies,
            creator,
            created_at: now,
            duration_secs,
            active: true,
        });
        Ok(id)
    }

    pub fn get(&self, id: PollId) -> Result<&Poll, CoreError> {
        self.polls
            .get(id.as_u64() as usize)
            .ok_or(CoreError::PollNotFound(id.as_u64()))
    }

    pub fn get_mut(&mut self, id: PollId) -> Result<&mut Poll, CoreError> {
        self.polls
            .get_mut(id.as_u64() as usize)
            .ok_or(CoreError::PollNotFound(id.as_u64()))
    }

    /// Clear a poll's active flag. Only the creator or the service owner may
    /// end a poll; ending twice fails.
    pub fn end(
        &mut self,
        id: PollId,
        caller: &VoterAddress,
        owner: &VoterAddress,
    ) -> Result<(), CoreError> {
        let poll = self.get_mut(id)?;
        if caller != &poll.creator && caller != owner {
            return Err(CoreError::UnauthorizedEndPoll);
        }
        if !poll.active {
            return Err(CoreError::PollNotActive);
        }
        poll.active = false;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Poll> {
        self.polls.iter()
    }
}
