//! Recording indicator sink.

use std::{
    convert::Infallible,
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use lockgate_core::{Color, Environment, IndicatorSink};

use crate::sim_env::SimEnv;

/// One colour written to the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorWrite {
    /// Virtual time of the write
    pub at: Instant,
    /// Colour written
    pub color: Color,
}

/// Sink that records every write with its virtual timestamp.
///
/// Clones share the log, so a test keeps one clone and hands the other to the
/// controller.
#[derive(Clone)]
pub struct RecordingIndicator {
    env: SimEnv,
    writes: Arc<Mutex<Vec<IndicatorWrite>>>,
}

impl RecordingIndicator {
    /// Record against `env`'s clock.
    pub fn new(env: SimEnv) -> Self {
        Self { env, writes: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Every write so far, oldest first.
    pub fn writes(&self) -> Vec<IndicatorWrite> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Colours written so far, oldest first.
    pub fn colors(&self) -> Vec<Color> {
        self.writes().into_iter().map(|w| w.color).collect()
    }

    /// Colour currently shown.
    pub fn last(&self) -> Option<Color> {
        self.writes().last().map(|w| w.color)
    }
}

impl IndicatorSink for RecordingIndicator {
    type Error = Infallible;

    fn apply(&mut self, color: Color) -> Result<(), Self::Error> {
        let write = IndicatorWrite { at: self.env.now(), color };
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).push(write);
        Ok(())
    }
}
