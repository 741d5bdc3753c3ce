//! Indicator mapping.
//!
//! The lock exposes its state through a single RGB indicator. The mapping
//! from [`IndicatorState`] to [`Color`] is a pure, total function; the
//! physical write happens in an [`IndicatorSink`] owned by the driver, so the
//! state machine stays hardware-agnostic.

use serde::{Deserialize, Serialize};

/// Externally visible status signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorState {
    /// Lock engaged
    Locked,
    /// Access granted
    Unlocked,
    /// Transient: a verification just failed, held for the hold duration
    Rejected,
}

impl IndicatorState {
    /// Colour the indicator shows for this state.
    pub const fn color(self) -> Color {
        match self {
            Self::Locked => Color::RED,
            Self::Unlocked => Color::GREEN,
            Self::Rejected => Color::BLUE,
        }
    }
}

/// Solid RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red intensity
    pub r: u8,
    /// Green intensity
    pub g: u8,
    /// Blue intensity
    pub b: u8,
}

impl Color {
    /// Solid red
    pub const RED: Self = Self { r: 255, g: 0, b: 0 };
    /// Solid green
    pub const GREEN: Self = Self { r: 0, g: 255, b: 0 };
    /// Solid blue
    pub const BLUE: Self = Self { r: 0, g: 0, b: 255 };
}

/// Hardware (or simulated) indicator driver.
///
/// Applies a colour with no further semantics. Called only by the driver
/// executing [`LockAction::SetIndicator`](crate::lock::LockAction).
pub trait IndicatorSink: Send + 'static {
    /// Driver-specific write failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Show `color` on the indicator.
    fn apply(&mut self, color: Color) -> Result<(), Self::Error>;
}
