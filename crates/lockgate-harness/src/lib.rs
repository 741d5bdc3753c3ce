//! Deterministic simulation harness for Lockgate testing.
//!
//! Seeded, virtual-clock implementations of the core's collaborators plus a
//! reference model of the lock for model-based property tests.
//!
//! - [`SimEnv`]: seeded entropy, scripted challenge values, injectable
//!   entropy failure, virtual clock
//! - [`RecordingIndicator`]: sink that timestamps every colour written
//! - [`model`]: reference lock model and the operations tests drive it with

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod recording;
pub mod sim_env;

pub use model::{ModelLock, Operation, OperationResult, ResponseKind};
pub use recording::{IndicatorWrite, RecordingIndicator};
pub use sim_env::SimEnv;
