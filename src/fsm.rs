//! Unit operating-state machine.
//!
//! ```text
//!            [fan on]             [bypass open]
//!   IDLE ◀──────────────▶ ACTIVE ◀──────────────▶ BYPASS
//!     │     [fan off]       │  ▲  [bypass closed]    │
//!     │                     │  │                     │
//!     │           [tier=boost] [tier<boost]          │
//!     │                     ▼  │                     │
//!     │                    BOOST                     │
//!     │                                              │
//!     └────────[defrost]──▶ DEFROSTING ◀──[defrost]──┘
//!                              │
//!                   [timer expired] → settle()
//! ```
//!
//! The state is never set directly.  Every control change (fan tier,
//! bypass valve, defrost flag) updates the unit's inputs and then calls
//! [`settle`], which derives the one state consistent with them.  This
//! keeps `state` and the controls from drifting apart.

use core::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Operating state of one HRV/ERV unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitState {
    /// Fan off, no air moving.
    Idle,
    /// Fan on, air through the heat-exchanger core.
    Active,
    /// Bypass valve open, air routed around the core (free cooling).
    Bypass,
    /// Timed defrost cycle in progress.
    Defrosting,
    /// Active at the boost tier.
    Boost,
}

impl UnitState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Bypass => "bypass",
            Self::Defrosting => "defrosting",
            Self::Boost => "boost",
        }
    }

    /// True when the unit is recovering heat through its core.
    pub fn is_recovering(self) -> bool {
        matches!(self, Self::Active | Self::Boost)
    }

    /// True when the supply fan is moving air to the zones.
    pub fn is_supplying(self) -> bool {
        matches!(self, Self::Active | Self::Boost | Self::Bypass)
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Settle rule
// ---------------------------------------------------------------------------

/// Control inputs that determine a unit's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInputs {
    pub fan_running: bool,
    pub boost_tier: bool,
    pub bypass_open: bool,
    pub defrosting: bool,
}

/// Derive the state consistent with `inputs`.
///
/// Priority: defrost > fan off > bypass > boost > active.
pub fn settle(inputs: StateInputs) -> UnitState {
    if inputs.defrosting {
        UnitState::Defrosting
    } else if !inputs.fan_running {
        UnitState::Idle
    } else if inputs.bypass_open {
        UnitState::Bypass
    } else if inputs.boost_tier {
        UnitState::Boost
    } else {
        UnitState::Active
    }
}

/// A state change worth reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: UnitState,
    pub to: UnitState,
}

/// Move `current` to the settled state for `inputs`.
/// Returns the transition if the state actually changed.
pub fn apply(current: &mut UnitState, inputs: StateInputs) -> Option<Transition> {
    let next = settle(inputs);
    if next == *current {
        return None;
    }
    let t = Transition {
        from: *current,
        to: next,
    };
    *current = next;
    Some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(fan: bool, boost: bool, bypass: bool, defrost: bool) -> StateInputs {
        StateInputs {
            fan_running: fan,
            boost_tier: boost,
            bypass_open: bypass,
            defrosting: defrost,
        }
    }

    #[test]
    fn fan_off_is_idle() {
        assert_eq!(settle(inputs(false, false, false, false)), UnitState::Idle);
        assert_eq!(settle(inputs(false, false, true, false)), UnitState::Idle);
    }

    #[test]
    fn defrost_wins_over_everything() {
        assert_eq!(settle(inputs(true, true, true, true)), UnitState::Defrosting);
        assert_eq!(settle(inputs(false, false, false, true)), UnitState::Defrosting);
    }

    #[test]
    fn bypass_wins_over_boost() {
        assert_eq!(settle(inputs(true, true, true, false)), UnitState::Bypass);
        assert_eq!(settle(inputs(true, true, false, false)), UnitState::Boost);
        assert_eq!(settle(inputs(true, false, false, false)), UnitState::Active);
    }

    #[test]
    fn apply_reports_only_real_changes() {
        let mut s = UnitState::Active;
        assert!(apply(&mut s, inputs(true, false, false, false)).is_none());
        let t = apply(&mut s, inputs(true, false, true, false)).unwrap();
        assert_eq!(t.from, UnitState::Active);
        assert_eq!(t.to, UnitState::Bypass);
        assert_eq!(s, UnitState::Bypass);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&UnitState::Defrosting).unwrap();
        assert_eq!(json, "\"defrosting\"");
    }
}
