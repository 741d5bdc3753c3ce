//! Simulated environment.

use std::{
    collections::VecDeque,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use lockgate_core::{EnvError, Environment};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

struct SimState {
    rng: ChaCha8Rng,
    base: Instant,
    elapsed: Duration,
    scripted: VecDeque<u8>,
    entropy_failing: bool,
}

/// Seeded environment with a virtual clock.
///
/// Clones share state. The clock only moves through [`SimEnv::advance`] or a
/// completed [`Environment::sleep`], which waits on tokio's (pausable) timer
/// and then advances by the slept duration.
#[derive(Clone)]
pub struct SimEnv {
    state: Arc<Mutex<SimState>>,
}

impl SimEnv {
    /// Environment seeded with 0.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Environment whose entropy is derived from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        let state = SimState {
            rng: ChaCha8Rng::seed_from_u64(seed),
            base: Instant::now(),
            elapsed: Duration::ZERO,
            scripted: VecDeque::new(),
            entropy_failing: false,
        };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, duration: Duration) {
        self.state().elapsed += duration;
    }

    /// Virtual time since creation.
    pub fn elapsed(&self) -> Duration {
        self.state().elapsed
    }

    /// Make the next `random_u32` draw return `value`.
    pub fn script_u32(&self, value: u32) {
        self.state().scripted.extend(value.to_be_bytes());
    }

    /// Make the entropy source fail (or recover).
    pub fn set_entropy_failing(&self, failing: bool) {
        self.state().entropy_failing = failing;
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        let state = self.state();
        state.base + state.elapsed
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        let env = self.clone();
        async move {
            tokio::time::sleep(duration).await;
            env.advance(duration);
        }
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EnvError> {
        let mut state = self.state();
        if state.entropy_failing {
            return Err(EnvError::EntropyUnavailable("simulated entropy failure".into()));
        }

        if state.scripted.len() >= buffer.len() {
            for byte in &mut *buffer {
                *byte = state.scripted.pop_front().unwrap_or_default();
            }
        } else {
            state.rng.fill_bytes(buffer);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_draws() {
        let a = SimEnv::with_seed(7);
        let b = SimEnv::with_seed(7);
        let draws_a: Vec<u32> = (0..8).map(|_| a.random_u32().unwrap()).collect();
        let draws_b: Vec<u32> = (0..8).map(|_| b.random_u32().unwrap()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn scripted_values_come_first() {
        let env = SimEnv::with_seed(1);
        env.script_u32(482_913);
        assert_eq!(env.random_u32().unwrap(), 482_913);
        assert_ne!(env.random_u32().unwrap(), 482_913);
    }

    #[test]
    fn clock_moves_only_when_advanced() {
        let env = SimEnv::new();
        let t0 = env.now();
        assert_eq!(env.now(), t0);

        env.advance(Duration::from_millis(4000));
        assert_eq!(env.now() - t0, Duration::from_millis(4000));
        assert_eq!(env.elapsed(), Duration::from_millis(4000));
    }

    #[test]
    fn entropy_failure_is_reported() {
        let env = SimEnv::new();
        env.set_entropy_failing(true);
        assert!(env.random_u32().is_err());

        env.set_entropy_failing(false);
        assert!(env.random_u32().is_ok());
    }
}
