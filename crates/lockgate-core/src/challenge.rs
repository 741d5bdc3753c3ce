//! Challenge authority.
//!
//! Holds exactly one outstanding challenge. Issuing a new challenge
//! overwrites the previous one, so a challenge handed to one client is
//! silently invalidated when another client asks for a fresh one. There is no
//! multi-session support.
//!
//! Tokens are the decimal rendering of a random `u32`. Thirty-two bits is
//! guessable within the lockout economics of the Rejected hold; the format is
//! kept because clients derive their response from the token text.

use std::fmt;

use tracing::{debug, warn};

use crate::{env::Environment, error::EnvError};

/// Longest decimal rendering of a `u32` (`4294967295`).
pub const MAX_DECIMAL_TOKEN_LEN: usize = 10;

/// One-time token anchoring a single authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Challenge(String);

impl Challenge {
    /// Render a random value as a challenge token.
    pub fn from_value(value: u32) -> Self {
        Self(value.to_string())
    }

    /// Token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Token bytes, as they appear in a response.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Consume into the token string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-slot challenge store.
#[derive(Debug, Default)]
pub struct ChallengeAuthority {
    outstanding: Option<Challenge>,
    issued: u64,
}

impl ChallengeAuthority {
    /// Authority with no outstanding challenge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh challenge, replacing any outstanding one.
    ///
    /// # Errors
    ///
    /// Returns the environment error if entropy is unavailable. The slot is
    /// cleared in that case so an older challenge cannot be redeemed after an
    /// issuance the caller saw fail.
    pub fn issue(&mut self, env: &impl Environment) -> Result<Challenge, EnvError> {
        let value = match env.random_u32() {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "challenge issuance failed");
                self.outstanding = None;
                return Err(error);
            },
        };

        let challenge = Challenge::from_value(value);
        if self.outstanding.is_some() {
            debug!("superseding unredeemed challenge");
        }
        self.outstanding = Some(challenge.clone());
        self.issued += 1;
        debug!(challenge = %challenge, issued = self.issued, "challenge issued");

        Ok(challenge)
    }

    /// Currently outstanding challenge, if any.
    pub fn outstanding(&self) -> Option<&Challenge> {
        self.outstanding.as_ref()
    }

    /// Remove and return the outstanding challenge.
    pub fn take(&mut self) -> Option<Challenge> {
        self.outstanding.take()
    }
}
