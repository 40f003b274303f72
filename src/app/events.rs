//! Outbound application events.
//!
//! The [`VentilationController`](super::service::VentilationController)
//! emits these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them: log lines,
//! a notification service, a message bus, etc.

use crate::energy::EnergySavings;
use crate::filters::FilterType;
use crate::fsm::UnitState;
use crate::seasonal::SeasonalMode;

/// Structured events emitted by the controller core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A new unit was registered (re-registration emits nothing).
    UnitRegistered { unit_id: String },

    /// A unit and its filters were removed.
    UnitRemoved { unit_id: String },

    /// A unit's operating state changed.
    UnitStateChanged {
        unit_id: String,
        from: UnitState,
        to: UnitState,
    },

    /// A bypass valve physically moved.
    BypassChanged { unit_id: String, open: bool },

    /// A defrost cycle began.
    DefrostStarted { unit_id: String },

    /// A defrost cycle ended (timer fired).
    DefrostCompleted { unit_id: String, state: UnitState },

    /// A filter crossed into replacement-due.
    FilterReplacementDue {
        unit_id: String,
        filter_type: FilterType,
    },

    /// A filter was reset to its just-installed state.
    FilterReplaced {
        unit_id: String,
        filter_type: FilterType,
    },

    /// The operator changed the seasonal mode.
    SeasonalModeChanged { mode: SeasonalMode },

    ZoneRegistered { zone_id: String },

    ZoneRemoved { zone_id: String },

    /// The energy accumulator was reset; carries the closed period.
    EnergySavingsReset(EnergySavings),

    /// The controller stopped its schedules and flushed state.
    Shutdown,
}
