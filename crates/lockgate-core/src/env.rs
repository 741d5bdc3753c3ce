//! Environment abstraction for time and randomness.
//!
//! State machines never call `Instant::now()` or an OS entropy source
//! directly. The driver hands them an [`Environment`]: production uses the OS
//! entropy pool and tokio time, simulation uses a seeded RNG and a virtual
//! clock so every run is reproducible.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use crate::error::EnvError;

/// Source of time and randomness for the lock.
///
/// Unlike a general-purpose RNG, [`Environment::random_bytes`] is fallible.
/// An entropy source that cannot produce bytes must surface that to the
/// caller; implementations must never fall back to a predictable source.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Sleep for `duration`.
    ///
    /// Simulation implementations advance their virtual clock when the sleep
    /// completes.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Fill `buffer` with cryptographically adequate random bytes.
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EnvError>;

    /// Draw a uniformly random `u32`.
    fn random_u32(&self) -> Result<u32, EnvError> {
        let mut bytes = [0u8; 4];
        self.random_bytes(&mut bytes)?;
        Ok(u32::from_be_bytes(bytes))
    }
}
