//! Engine Errors
//!
//! Two kinds of failure: configuration is either rejected up
//! front (`InvalidConfig`), or a timer could not be scheduled (`Schedule`).
//! Neither is retried.

use thiserror::Error;

/// Reasons a configuration is rejected at construction time
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvalidConfig {
    /// The role list has no entries
    #[error("role list must contain at least one role")]
    EmptyRoleList,

    /// A role in the list is the empty string
    #[error("role at index {index} is empty")]
    EmptyRole {
        /// Position of the offending role
        index: usize,
    },

    /// Per-character typing delay is zero or negative
    #[error("character delay must be positive (got {millis} ms)")]
    NonPositiveCharDelay {
        /// The rejected value
        millis: i64,
    },

    /// Pause after a completed role is negative
    #[error("pause must not be negative (got {millis} ms)")]
    NegativePause {
        /// The rejected value
        millis: i64,
    },

    /// Typing presenter speed is zero
    #[error("typing speed must be positive")]
    NonPositiveSpeed,
}

/// Errors surfaced by the animation engine
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Configuration rejected at construction
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] InvalidConfig),

    /// A tick could not be scheduled; fatal to the engine instance
    #[error("failed to schedule tick: {reason}")]
    Schedule {
        /// Scheduler-provided description
        reason: String,
    },
}

impl EngineError {
    /// Convenience constructor for scheduling failures
    pub fn schedule(reason: impl Into<String>) -> Self {
        Self::Schedule {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_converts() {
        let err: EngineError = InvalidConfig::EmptyRoleList.into();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: role list must contain at least one role"
        );
    }

    #[test]
    fn test_schedule_error_message() {
        let err = EngineError::schedule("no runtime");
        assert!(!matches!(err, EngineError::InvalidConfig(_)));
        assert_eq!(err.to_string(), "failed to schedule tick: no runtime");
    }
}
