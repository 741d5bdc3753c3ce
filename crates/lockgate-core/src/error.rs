//! Error types for the lock core.

use std::time::Duration;

use thiserror::Error;

/// Failures of the environment collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// The entropy source could not produce random bytes.
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),
}

/// Invalid lock configuration, detected at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The pre-shared secret is empty.
    #[error("pre-shared secret must not be empty")]
    EmptySecret,

    /// The pre-shared secret exceeds the storage bound.
    #[error("pre-shared secret is {len} bytes, limit is {max}")]
    SecretTooLong {
        /// Supplied secret length.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// A correct response could never pass the malformed-input check.
    #[error("response bound {bound} cannot fit a {needed}-byte response")]
    ResponseBoundTooSmall {
        /// Longest possible correct response.
        needed: usize,
        /// Configured response bound.
        bound: usize,
    },

    /// A timer duration is too long to schedule a deadline with.
    #[error("{name} exceeds the {max:?} limit")]
    DurationTooLong {
        /// Which duration
        name: &'static str,
        /// Longest accepted duration
        max: Duration,
    },
}

/// Errors returned by lock operations.
///
/// A failed comparison is NOT an error: it is
/// [`VerifyOutcome::Rejected`](crate::lock::VerifyOutcome::Rejected). Errors
/// are reserved for inputs that never reach the comparison and for
/// collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// The response payload was empty.
    #[error("no response data received")]
    EmptyResponse,

    /// The response payload reached the length bound.
    #[error("response too long: {len} bytes (must be shorter than {max})")]
    ResponseTooLong {
        /// Received payload length.
        len: usize,
        /// Exclusive length bound.
        max: usize,
    },

    /// A collaborator the operation depends on failed.
    #[error(transparent)]
    Env(#[from] EnvError),
}

impl LockError {
    /// Whether this error describes malformed caller input (as opposed to a
    /// collaborator failure).
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::EmptyResponse | Self::ResponseTooLong { .. })
    }
}
