//! Core traits and error types shared by every accumulator
//!
//! All numeric accumulators implement the base [`Accumulator`] trait, which
//! gives them a uniform push / merge / clear surface so per-log statistics
//! can be folded into a batch-wide aggregate.

use core::fmt::Debug;

#[cfg(feature = "std")]
use std::string::String;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Error during accumulator merge operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// Accumulators have incompatible configurations
    IncompatibleConfig {
        expected: String,
        found: String,
    },
    /// The merge target has already been finalized and is read-only
    Finalized,
}

impl core::fmt::Display for MergeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MergeError::IncompatibleConfig { expected, found } => {
                write!(f, "incompatible config: expected {}, found {}", expected, found)
            }
            MergeError::Finalized => write!(f, "merge target is already finalized"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MergeError {}

/// Error raised when an accumulator or aggregator is misconfigured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Sliding windows need room for at least one sample
    ZeroWindowSize,
    /// Source ids must lie strictly between `0x0000` and `0xFFFF`
    SourceIdOutOfRange(u32),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroWindowSize => write!(f, "sliding window size must be positive"),
            ConfigError::SourceIdOutOfRange(id) => write!(
                f,
                "source id {} (0x{:04X}) must be between 0x0000 and 0xFFFF (exclusive)",
                id, id
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Core trait for all streaming accumulators
pub trait Accumulator: Clone + Debug {
    /// Add a sample to the accumulator
    fn push(&mut self, value: f64);

    /// Merge another accumulator into this one
    ///
    /// The result must be equivalent to having pushed both sample
    /// streams into a single accumulator. Returns an error if the
    /// accumulators are incompatible.
    fn merge(&mut self, other: &Self) -> Result<(), MergeError>;

    /// Reset accumulator to empty state
    fn clear(&mut self);

    /// Number of samples accumulated
    fn count(&self) -> u64;

    /// Check if accumulator is empty
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_error_display() {
        let err = MergeError::IncompatibleConfig {
            expected: "radians".into(),
            found: "degrees".into(),
        };
        assert_eq!(
            err.to_string(),
            "incompatible config: expected radians, found degrees"
        );
        assert_eq!(
            MergeError::Finalized.to_string(),
            "merge target is already finalized"
        );
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::SourceIdOutOfRange(0xFFFF).to_string(),
            "source id 65535 (0xFFFF) must be between 0x0000 and 0xFFFF (exclusive)"
        );
        assert!(ConfigError::ZeroWindowSize.to_string().contains("positive"));
    }
}
