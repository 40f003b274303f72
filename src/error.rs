//! Unified error type for the ventilation controller.
//!
//! A single `Copy` enum that every engine returns, so that a bad call is
//! handed back to the caller as a value and never aborts a scheduled
//! batch pass.  Persistence failures live on the port boundary
//! ([`StorageError`](crate::app::ports::StorageError)) and are logged
//! rather than propagated.

use core::fmt;

// ---------------------------------------------------------------------------
// Controller error
// ---------------------------------------------------------------------------

/// Every fallible controller operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// No unit is registered under the given id.
    UnknownUnit,
    /// No zone is registered under the given id.
    UnknownZone,
    /// Fan tier is not one of `off|low|medium|high|boost`.
    InvalidFanSpeed,
    /// Seasonal mode is not one of `winter|summer|auto`.
    InvalidSeasonalMode,
    /// A setpoint fell outside its permitted band.
    /// The `&'static str` names the setpoint and the band.
    SetpointOutOfRange(&'static str),
    /// An inbound event had an unknown type or a malformed payload.
    InvalidEvent,
    /// A telemetry value is outside its physically plausible range.
    ReadingOutOfRange,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUnit => write!(f, "unknown unit"),
            Self::UnknownZone => write!(f, "unknown zone"),
            Self::InvalidFanSpeed => write!(f, "invalid fan speed"),
            Self::InvalidSeasonalMode => write!(f, "invalid seasonal mode"),
            Self::SetpointOutOfRange(msg) => write!(f, "setpoint out of range: {msg}"),
            Self::InvalidEvent => write!(f, "invalid event"),
            Self::ReadingOutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl std::error::Error for ControlError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_setpoint() {
        let e = ControlError::SetpointOutOfRange("co2 setpoint must be 400–1500 ppm");
        assert_eq!(
            e.to_string(),
            "setpoint out of range: co2 setpoint must be 400–1500 ppm"
        );
    }

    #[test]
    fn display_of_rejected_reading() {
        assert_eq!(ControlError::ReadingOutOfRange.to_string(), "reading out of range");
    }
}
