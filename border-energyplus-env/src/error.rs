//! Errors of the wrappers.
use thiserror::Error;

/// Misuse of a wrapper or an invalid configuration.
///
/// These errors are never recovered inside the wrappers. Errors of the inner
/// environment are not converted into this type; they are propagated as they are.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    /// `step()` was called before `reset()`, or after the end of an episode
    /// without an intervening `reset()`.
    #[error("step() called before reset()")]
    NotReset,

    /// `step()` was called after the end of a segment without an intervening `reset()`.
    #[error("segment of {0} steps has finished, call reset() before step()")]
    SegmentFinished(usize),

    /// An action is out of the bounds of the action space.
    #[error("action {0} is out of bounds of {1}")]
    ActionOutOfBounds(String, String),

    /// The length of an action does not match the action space.
    #[error("action has {actual} elements, expected {expected}")]
    ActShape {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// The length of an observation does not match what the wrapper expects.
    #[error("observation has {actual} elements, expected {expected}")]
    ObsShape {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// The inner environment has an action space of another kind.
    #[error("expected {expected} action space, found {found}")]
    SpaceMismatch {
        /// Kind of the expected space.
        expected: &'static str,
        /// Kind of the space found.
        found: &'static str,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
