//! Command-line and environment configuration.
//!
//! The pre-shared secret is read once at startup, from `--secret`
//! (`LOCKGATE_SECRET`) or `--secret-file`. Provisioning that value is the
//! deployment's job; with neither set the firmware default is used and a
//! warning is logged.

use std::{fs, net::SocketAddr, path::PathBuf, time::Duration};

use clap::Parser;
use lockgate_core::{LockConfig, Secret};
use tracing::warn;

use crate::error::ServerError;

/// Secret used when none is provisioned.
pub const DEFAULT_SECRET: &str = "DEFAULT_KEY";

/// Lockgate controller
#[derive(Debug, Parser)]
#[command(name = "lockgate-server", version, about = "Challenge-response lock controller")]
pub struct Args {
    /// Address to serve HTTP on
    #[arg(long, env = "LOCKGATE_LISTEN", default_value = "0.0.0.0:80")]
    pub listen: SocketAddr,

    /// Pre-shared secret
    #[arg(long, env = "LOCKGATE_SECRET", hide_env_values = true, conflicts_with = "secret_file")]
    pub secret: Option<String>,

    /// File containing the pre-shared secret (one trailing newline is ignored)
    #[arg(long, env = "LOCKGATE_SECRET_FILE")]
    pub secret_file: Option<PathBuf>,

    /// How long the rejected indicator is held, in milliseconds
    #[arg(long, default_value_t = 4000)]
    pub hold_ms: u64,

    /// Relock an unlocked lock after this many seconds (default: never)
    #[arg(long)]
    pub unlock_timeout_secs: Option<u64>,
}

impl Args {
    /// Resolve the secret and build the lock configuration.
    pub fn lock_config(&self) -> Result<LockConfig, ServerError> {
        let secret = Secret::new(self.secret_bytes()?)?;

        let config = LockConfig {
            hold_duration: Duration::from_millis(self.hold_ms),
            unlock_timeout: self.unlock_timeout_secs.map(Duration::from_secs),
            ..LockConfig::new(secret)
        };
        config.validate()?;

        Ok(config)
    }

    fn secret_bytes(&self) -> Result<Vec<u8>, ServerError> {
        if let Some(secret) = &self.secret {
            return Ok(secret.as_bytes().to_vec());
        }

        if let Some(path) = &self.secret_file {
            let mut bytes = fs::read(path)
                .map_err(|source| ServerError::SecretFile { path: path.clone(), source })?;
            if bytes.ends_with(b"\n") {
                bytes.pop();
                if bytes.ends_with(b"\r") {
                    bytes.pop();
                }
            }
            return Ok(bytes);
        }

        warn!("no secret provisioned, using the factory default");
        Ok(DEFAULT_SECRET.as_bytes().to_vec())
    }
}
