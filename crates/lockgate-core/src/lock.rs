//! Lock state machine.
//!
//! Verifies claimed responses against the outstanding challenge and owns every
//! transition of the access state and the indicator state.
//!
//! # Architecture: Action-Based State Machine
//!
//! - Methods accept time as a parameter (no stored clock)
//! - Methods return the [`LockAction`]s the driver must execute
//! - The driver applies indicator colours and calls [`Lock::tick`] when a
//!   scheduled deadline passes
//!
//! # State Machine
//!
//! ```text
//!             Issue                          Issue
//!            ┌─────┐                        ┌─────┐
//!            ↓     │      Verify: accepted  ↓     │
//!        ┌────────┐│ ─────────────────────> ┌──────────┐
//!  ────> │ Locked │┘ <───────────────────── │ Unlocked │
//!        └────────┘    unlock timeout (opt) └──────────┘
//!            │  ↑                                │
//!  Verify:   │  │ hold expires                   │ Verify: rejected
//!  rejected  ↓  │                                │
//!        ┌──────────┐ <──────────────────────────┘
//!        │ Rejected │  (indicator only, transient)
//!        └──────────┘
//! ```
//!
//! # Hold
//!
//! Entering Rejected shows blue and schedules a tick `hold_duration` after the
//! moment Rejected was entered. Until that tick fires no verification can
//! succeed and no other indicator write is emitted. When it fires the lock is
//! Locked and red, whatever the access state was before.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    challenge::{Challenge, ChallengeAuthority},
    config::LockConfig,
    env::Environment,
    error::{ConfigError, LockError},
    indicator::IndicatorState,
    response,
};

/// Current lock condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessState {
    /// Lock engaged
    Locked,
    /// Access granted
    Unlocked,
}

/// Actions returned by the lock state machine.
///
/// The driver (production controller or test harness) executes these:
/// - `SetIndicator`: map the state to a colour and write it to the sink
/// - `ScheduleTick`: call [`Lock::tick`] once `at` has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    /// Show this indicator state
    SetIndicator(IndicatorState),

    /// Call `tick` at (or after) this instant
    ScheduleTick {
        /// Deadline for the next timed transition
        at: Instant,
    },
}

/// Why a well-formed response was rejected.
///
/// For logging only. Callers outside the controller must not be able to tell
/// these apart, or they learn about challenge freshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No challenge outstanding (never issued, consumed, or superseded)
    NoChallenge,
    /// Response differs from the expected value
    Mismatch,
    /// A previous rejection's hold is still running
    HoldActive,
}

/// Result of verifying a well-formed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Response matched; the lock is open
    Accepted,
    /// Response refused
    Rejected(RejectReason),
}

impl VerifyOutcome {
    /// Whether access was granted.
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Read-only snapshot for the request layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockStatus {
    /// Access state
    pub access: AccessState,
    /// Indicator state
    pub indicator: IndicatorState,
}

/// Lock state machine
///
/// Owns the secret, the challenge slot, and both states. Pure: no I/O, no
/// clock, no hardware.
#[derive(Debug)]
pub struct Lock {
    config: LockConfig,
    authority: ChallengeAuthority,
    access: AccessState,
    indicator: IndicatorState,
    /// End of the current Rejected hold
    hold_until: Option<Instant>,
    /// When the lock was last opened
    unlocked_at: Option<Instant>,
}

impl Lock {
    /// Create a Locked lock with no outstanding challenge.
    ///
    /// # Errors
    ///
    /// Returns the configuration error if a correct response could never pass
    /// the length check.
    pub fn new(config: LockConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            authority: ChallengeAuthority::new(),
            access: AccessState::Locked,
            indicator: IndicatorState::Locked,
            hold_until: None,
            unlocked_at: None,
        })
    }

    /// Actions to run once when the driver starts: show the initial state.
    pub fn startup(&self) -> Vec<LockAction> {
        vec![LockAction::SetIndicator(self.indicator)]
    }

    /// Current access state.
    pub fn access(&self) -> AccessState {
        self.access
    }

    /// Current indicator state.
    pub fn indicator(&self) -> IndicatorState {
        self.indicator
    }

    /// Snapshot of both states.
    pub fn status(&self) -> LockStatus {
        LockStatus { access: self.access, indicator: self.indicator }
    }

    /// Whether a Rejected hold is running.
    pub fn is_holding(&self) -> bool {
        self.hold_until.is_some()
    }

    /// End of the running hold, if any.
    pub fn hold_until(&self) -> Option<Instant> {
        self.hold_until
    }

    /// Outstanding challenge, if any.
    pub fn outstanding_challenge(&self) -> Option<&Challenge> {
        self.authority.outstanding()
    }

    /// Configuration in use.
    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Issue a challenge, superseding any outstanding one.
    ///
    /// Leaves the access and indicator states untouched.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Env` if the entropy source fails.
    pub fn issue_challenge(&mut self, env: &impl Environment) -> Result<Challenge, LockError> {
        Ok(self.authority.issue(env)?)
    }

    /// Verify a claimed response.
    ///
    /// Malformed payloads are refused before anything else happens: the
    /// outstanding challenge survives and no state changes. Any well-formed
    /// payload consumes the outstanding challenge, whatever the outcome.
    ///
    /// # Arguments
    /// * `claimed` - Response bytes as received
    /// * `now` - Current time
    ///
    /// # Errors
    ///
    /// Returns `EmptyResponse` or `ResponseTooLong` for malformed input.
    pub fn verify(
        &mut self,
        claimed: &[u8],
        now: Instant,
    ) -> Result<(VerifyOutcome, Vec<LockAction>), LockError> {
        response::check_well_formed(claimed, self.config.max_response_len)?;

        // Apply a hold that expired before the driver got round to ticking.
        let mut actions = self.tick(now);
        let challenge = self.authority.take();

        if self.is_holding() {
            warn!("verification attempted during hold");
            return Ok((VerifyOutcome::Rejected(RejectReason::HoldActive), actions));
        }

        let outcome = match challenge {
            None => VerifyOutcome::Rejected(RejectReason::NoChallenge),
            Some(challenge) => {
                let expected = response::expected_response(&challenge, &self.config.secret);
                if response::matches(claimed, &expected) {
                    VerifyOutcome::Accepted
                } else {
                    VerifyOutcome::Rejected(RejectReason::Mismatch)
                }
            },
        };

        match outcome {
            VerifyOutcome::Accepted => self.unlock(now, &mut actions),
            VerifyOutcome::Rejected(reason) => self.reject(reason, now, &mut actions),
        }

        Ok((outcome, actions))
    }

    /// Perform timed transitions that are due at `now`.
    ///
    /// Call when a [`LockAction::ScheduleTick`] deadline passes. Calling early
    /// or repeatedly is harmless.
    pub fn tick(&mut self, now: Instant) -> Vec<LockAction> {
        let mut actions = Vec::new();

        if let Some(until) = self.hold_until {
            if now >= until {
                self.hold_until = None;
                info!("hold expired, relocking");
                self.relock(&mut actions);
            }
            return actions;
        }

        if self.access == AccessState::Unlocked
            && let (Some(timeout), Some(opened)) = (self.config.unlock_timeout, self.unlocked_at)
            && now >= opened + timeout
        {
            info!(?timeout, "unlock timeout, relocking");
            self.relock(&mut actions);
        }

        actions
    }

    fn unlock(&mut self, now: Instant, actions: &mut Vec<LockAction>) {
        info!("unlock accepted");
        self.access = AccessState::Unlocked;
        self.indicator = IndicatorState::Unlocked;
        self.unlocked_at = Some(now);
        actions.push(LockAction::SetIndicator(IndicatorState::Unlocked));

        if let Some(timeout) = self.config.unlock_timeout {
            actions.push(LockAction::ScheduleTick { at: now + timeout });
        }
    }

    fn reject(&mut self, reason: RejectReason, now: Instant, actions: &mut Vec<LockAction>) {
        warn!(?reason, hold = ?self.config.hold_duration, "invalid response");
        let until = now + self.config.hold_duration;
        self.indicator = IndicatorState::Rejected;
        self.hold_until = Some(until);
        actions.push(LockAction::SetIndicator(IndicatorState::Rejected));
        actions.push(LockAction::ScheduleTick { at: until });
    }

    fn relock(&mut self, actions: &mut Vec<LockAction>) {
        self.access = AccessState::Locked;
        self.indicator = IndicatorState::Locked;
        self.unlocked_at = None;
        debug!("locked");
        actions.push(LockAction::SetIndicator(IndicatorState::Locked));
    }
}
