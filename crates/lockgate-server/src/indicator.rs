//! Indicator sink for hosts without an LED driver.

use std::convert::Infallible;

use lockgate_core::{Color, IndicatorSink};
use tracing::info;

/// Reports every colour change as a structured log event.
///
/// Boards with an addressable LED provide their own [`IndicatorSink`]; this
/// one keeps the controller observable everywhere else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingIndicator;

impl TracingIndicator {
    /// Create the sink.
    pub fn new() -> Self {
        Self
    }
}

impl IndicatorSink for TracingIndicator {
    type Error = Infallible;

    fn apply(&mut self, color: Color) -> Result<(), Self::Error> {
        info!(r = color.r, g = color.g, b = color.b, "indicator");
        Ok(())
    }
}
