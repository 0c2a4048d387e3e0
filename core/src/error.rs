use thiserror::Error;

/// Error type for every operation on the poll service.
///
/// All errors are synchronous and leave state untouched: intake never
/// partially advances a nonce or reserves a vote slot on a failing path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("poll {0} not found")]
    PollNotFound(u64),

    #[error("too few options: {have} (minimum 2)")]
    InsufficientOptions { have: usize },

    #[error("too many options: {have} (maximum 10)")]
    TooManyOptions { have: usize },

    #[error("invalid poll duration {duration}s: must be within {min}s..={max}s")]
    InvalidPollDuration { duration: u64, min: u64, max: u64 },

    #[error("poll is not active")]
    PollNotActive,

    #[error("poll is still open")]
    PollStillOpen,

    #[error("poll has expired")]
    PollExpired,

    #[error("invalid option index {index}: poll has {options} options")]
    InvalidOption { index: u32, options: usize },

    #[error("voter has already voted in this poll")]
    AlreadyVoted,

    #[error("invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    #[error("invalid signature")]
    InvalidSignature,

    #[error("only the poll creator or the owner may end a poll")]
    UnauthorizedEndPoll,

    #[error("operation restricted to the service owner")]
    Unauthorized,

    #[error("invalid batch settings: min {min}, max {max}")]
    InvalidBatchSettings { min: usize, max: usize },

    #[error("final batch for this poll was already processed")]
    BatchAlreadyProcessed,

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
