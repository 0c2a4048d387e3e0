//! Tunable settlement and poll-creation parameters.

use crate::CoreError;
use serde::{Deserialize, Serialize};

/// Batch trigger threshold and per-call settlement cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Queue length at which submission triggers settlement synchronously.
    pub min_batch_size: usize,
    /// Hard cap on entries drained per settlement call.
    pub max_batch_size: usize,
}

impl BatchSettings {
    pub fn new(min_batch_size: usize, max_batch_size: usize) -> Result<Self, CoreError> {
        let settings = Self {
            min_batch_size,
            max_batch_size,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.min_batch_size == 0 || self.max_batch_size < self.min_batch_size {
            return Err(CoreError::InvalidBatchSettings {
                min: self.min_batch_size,
                max: self.max_batch_size,
            });
        }
        Ok(())
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            min_batch_size: 5,
            max_batch_size: 20,
        }
    }
}

/// Structural limits on poll creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollLimits {
    pub min_duration_secs: u64,
    pub max_duration_secs: u64,
}

impl PollLimits {
    /// Minimum number of options per poll.
    pub const MIN_OPTIONS: usize = 2;
    /// Maximum number of options per poll.
    pub const MAX_OPTIONS: usize = 10;
}

impl Default for PollLimits {
    fn default() -> Self {
        Self {
            min_duration_secs: 60,
            max_duration_secs: 60 * 60 * 24 * 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_min_rejected() {
        assert!(matches!(
            BatchSettings::new(0, 10),
            Err(CoreError::InvalidBatchSettings { .. })
        ));
    }

    #[test]
    fn max_below_min_rejected() {
        assert!(matches!(
            BatchSettings::new(5, 4),
            Err(CoreError::InvalidBatchSettings { .. })
        ));
    }

    #[test]
    fn min_equal_max_accepted() {
        assert!(BatchSettings::new(3, 3).is_ok());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(BatchSettings::default().validate().is_ok());
    }
}
