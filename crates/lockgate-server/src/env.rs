//! Production environment.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use lockgate_core::{Environment, EnvError};

/// OS entropy and tokio time.
///
/// Time is read through tokio's clock so paused-clock tests observe the
/// same instants the controller schedules against.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EnvError> {
        getrandom::fill(buffer).map_err(|e| EnvError::EntropyUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_fill_buffer() {
        let env = SystemEnv;
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        env.random_bytes(&mut a).unwrap();
        env.random_bytes(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn now_follows_tokio_clock() {
        let env = SystemEnv;
        let t0 = env.now();
        env.sleep(Duration::from_secs(4)).await;
        assert!(env.now() - t0 >= Duration::from_secs(4));
    }
}
