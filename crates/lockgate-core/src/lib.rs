//! Lockgate core logic
//!
//! Pure state machine logic for a challenge-response lock controller,
//! completely decoupled from I/O. A controller issues a one-time challenge, a
//! client holding the pre-shared secret answers with a response, and the lock
//! grants or denies access and drives a tri-color indicator.
//!
//! # Architecture
//!
//! Nothing in this crate reads a clock, touches an entropy source, sleeps, or
//! writes to hardware. Time is passed into operations as a parameter and
//! randomness comes from an [`env::Environment`] supplied by the caller.
//!
//! Transitions return declarative [`lock::LockAction`]s (set the indicator,
//! schedule a tick) rather than executing them. A runtime or test harness
//! interprets the actions, which keeps the same decision logic usable in the
//! production controller, unit tests, and the deterministic simulation.
//!
//! # Security
//!
//! The response scheme is the literal concatenation `challenge ++ secret`
//! compared for byte equality. It is NOT a MAC: there is no replay protection
//! beyond single use of each challenge, no transport confidentiality, the
//! comparison is not constant-time, and the challenge is a 32-bit value that
//! can be brute-forced. Changing any of this changes the wire contract, so the
//! primitive lives behind [`response::expected_response`] where a hardening
//! pass can swap it without touching the state machine.
//!
//! # Components
//!
//! - [`challenge`]: Challenge authority (single outstanding challenge slot)
//! - [`response`]: Response derivation and comparison
//! - [`lock`]: Lock state machine (verify, hold, relock)
//! - [`indicator`]: Indicator state to colour mapping and the sink trait
//! - [`config`]: Secret and timing configuration
//! - [`mod@env`]: Environment abstraction (time, RNG)
//! - [`error`]: Error types

pub mod challenge;
pub mod config;
pub mod env;
pub mod error;
pub mod indicator;
pub mod lock;
pub mod response;

pub use challenge::{Challenge, ChallengeAuthority};
pub use config::{LockConfig, Secret};
pub use env::Environment;
pub use error::{ConfigError, EnvError, LockError};
pub use indicator::{Color, IndicatorSink, IndicatorState};
pub use lock::{AccessState, Lock, LockAction, LockStatus, RejectReason, VerifyOutcome};
