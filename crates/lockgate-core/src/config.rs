//! Lock configuration.
//!
//! The secret is provisioned once at startup and never changes for the life
//! of the process. Timing values default to the firmware's behaviour.

use std::{fmt, time::Duration};

use crate::{challenge::MAX_DECIMAL_TOKEN_LEN, error::ConfigError};

/// Longest accepted secret (a 32-byte buffer including its terminator).
pub const MAX_SECRET_LEN: usize = 31;

/// How long the Rejected indicator is held before relocking.
pub const DEFAULT_HOLD_DURATION: Duration = Duration::from_millis(4000);

/// Exclusive bound on response payload length. Payloads of this length or
/// longer are malformed.
pub const DEFAULT_MAX_RESPONSE_LEN: usize = 64;

/// Longest accepted hold or unlock timeout. Deadlines are computed as
/// `now + duration`, which must stay representable as an `Instant`.
pub const MAX_TIMER_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Pre-shared secret known to the controller and authorized clients.
///
/// `Debug` is redacted so the secret cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Validate and wrap a secret.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if bytes.len() > MAX_SECRET_LEN {
            return Err(ConfigError::SecretTooLong { len: bytes.len(), max: MAX_SECRET_LEN });
        }
        Ok(Self(bytes))
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Secret length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: empty secrets are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes redacted>)", self.0.len())
    }
}

/// Lock configuration
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Pre-shared secret
    pub secret: Secret,
    /// Rejected indicator hold, measured from entering Rejected
    pub hold_duration: Duration,
    /// Exclusive bound on response payload length
    pub max_response_len: usize,
    /// Relock an Unlocked lock after this long. `None` keeps it unlocked
    /// until the next rejected attempt.
    pub unlock_timeout: Option<Duration>,
}

impl LockConfig {
    /// Configuration with default timing for `secret`.
    pub fn new(secret: Secret) -> Self {
        Self {
            secret,
            hold_duration: DEFAULT_HOLD_DURATION,
            max_response_len: DEFAULT_MAX_RESPONSE_LEN,
            unlock_timeout: None,
        }
    }

    /// Check that a correct response can pass the length check and that
    /// every deadline derived from this configuration is representable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timer("hold duration", self.hold_duration)?;
        if let Some(timeout) = self.unlock_timeout {
            check_timer("unlock timeout", timeout)?;
        }

        let needed = MAX_DECIMAL_TOKEN_LEN + self.secret.len();
        if needed >= self.max_response_len {
            return Err(ConfigError::ResponseBoundTooSmall {
                needed,
                bound: self.max_response_len,
            });
        }
        Ok(())
    }
}

fn check_timer(name: &'static str, duration: Duration) -> Result<(), ConfigError> {
    if duration > MAX_TIMER_DURATION {
        return Err(ConfigError::DurationTooLong { name, max: MAX_TIMER_DURATION });
    }
    Ok(())
}
