//! Error types for marker configuration and template evaluation.
//!
//! There is no "malformed template" error: every input tokenizes into a
//! balanced stream. [`InvariantViolation`] only ever signals a defect in the
//! tokenizer/evaluator contract.

use thiserror::Error;

use crate::config::MarkerRole;
use crate::span::Span;

/// Raised when a [`MarkerConfig`](crate::MarkerConfig) cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A marker is the empty string.
    #[error("{role} marker must not be empty")]
    EmptyMarker {
        /// Role of the empty marker.
        role: MarkerRole,
    },

    /// Two roles were given the same marker text.
    #[error("{first} and {second} markers are both {marker:?}; markers must be distinct")]
    DuplicateMarker {
        /// First role sharing the marker.
        first: MarkerRole,
        /// Second role sharing the marker.
        second: MarkerRole,
        /// The shared marker text.
        marker: String,
    },

    /// One marker is a proper prefix of another.
    #[error("{shorter} marker is a prefix of the {longer} marker")]
    PrefixOverlap {
        /// Role whose marker is the prefix.
        shorter: MarkerRole,
        /// Role whose marker starts with the other.
        longer: MarkerRole,
    },

    /// The settings object could not be read.
    #[error("invalid marker settings: {0}")]
    Settings(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Settings(err.to_string())
    }
}

/// Evaluation-stack state that a balanced token stream makes impossible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// An end token arrived with no open group.
    #[error("end token at bytes {}..{} has no open group", span.start, span.end)]
    UnmatchedEnd {
        /// Location of the offending token.
        span: Span,
    },

    /// A choice token arrived with no open group.
    #[error("choice token at bytes {}..{} has no open group", span.start, span.end)]
    UnmatchedChoice {
        /// Location of the offending token.
        span: Span,
    },

    /// Groups were still open when the token stream ended.
    #[error("{open} group(s) still open at end of token stream")]
    UnclosedGroups {
        /// Number of groups left on the stack.
        open: usize,
    },

    /// A random source returned an index outside the alternative list.
    #[error("random source picked index {index} from {count} alternative(s)")]
    PickOutOfRange {
        /// Index returned by the source.
        index: usize,
        /// Number of alternatives offered.
        count: usize,
    },
}
