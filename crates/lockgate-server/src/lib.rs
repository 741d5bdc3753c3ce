//! Lockgate controller runtime.
//!
//! Executes the `lockgate-core` state machine in production: a single
//! controller task owns the [`Lock`](lockgate_core::Lock), an HTTP layer
//! translates requests into controller commands, and the indicator sink
//! applies colours.
//!
//! # Components
//!
//! - [`Controller`]: Actor owning the lock; serializes every operation
//! - [`ControllerHandle`]: Cloneable handle the request layer talks through
//! - [`router`]: HTTP routes (`/challenge`, `/response`, `/status`)
//! - [`SystemEnv`]: OS entropy + tokio time
//! - [`TracingIndicator`]: Indicator sink that reports colours through tracing
//! - [`Args`]: Command-line / environment configuration

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod controller;
pub mod env;
pub mod error;
pub mod http;
pub mod indicator;

pub use config::Args;
pub use controller::{Controller, ControllerError, ControllerHandle};
pub use env::SystemEnv;
pub use error::ServerError;
pub use http::router;
pub use indicator::TracingIndicator;
