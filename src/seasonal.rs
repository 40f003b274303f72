//! Seasonal strategy selector.
//!
//! Winter: recover every watt, bypass closed everywhere.
//! Summer: open the bypass wherever outdoor air is cool enough to be
//! free cooling, close it elsewhere.
//! Auto:   winter or summer from the mean outdoor temperature.
//!
//! Units in a defrost cycle are skipped; their valve belongs to the
//! defrost routine until it completes.

use core::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::ControlError;
use crate::units::{ControlChange, UnitRegistry};

/// Mean outdoor temperature at/above which `auto` behaves as summer (°C).
pub const AUTO_SUMMER_THRESHOLD_C: f32 = 15.0;
/// Outdoor air must be this much cooler than extract air to free-cool (K).
pub const FREE_COOLING_MARGIN_C: f32 = 2.0;

/// Operator-selected seasonal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalMode {
    Winter,
    Summer,
    #[default]
    Auto,
}

impl SeasonalMode {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Winter => "winter",
            Self::Summer => "summer",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for SeasonalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SeasonalMode {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "winter" => Ok(Self::Winter),
            "summer" => Ok(Self::Summer),
            "auto" => Ok(Self::Auto),
            _ => Err(ControlError::InvalidSeasonalMode),
        }
    }
}

/// The behaviour actually in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Summer,
}

/// Resolve `mode` against the units' latest outdoor readings.
///
/// `auto` with no readings at all resolves to winter.
pub fn resolve(mode: SeasonalMode, units: &UnitRegistry) -> Season {
    match mode {
        SeasonalMode::Winter => Season::Winter,
        SeasonalMode::Summer => Season::Summer,
        SeasonalMode::Auto => {
            let (sum, n) = units
                .iter()
                .filter_map(|u| u.outdoor_temp())
                .fold((0.0_f32, 0_u32), |(s, n), t| (s + t, n + 1));
            if n == 0 {
                return Season::Winter;
            }
            if sum / n as f32 >= AUTO_SUMMER_THRESHOLD_C {
                Season::Summer
            } else {
                Season::Winter
            }
        }
    }
}

/// A bypass decision that moved a valve or changed a state.
#[derive(Debug, Clone, PartialEq)]
pub struct BypassDecision {
    pub unit_id: String,
    pub open: bool,
    pub change: ControlChange,
}

/// Apply the strategy for `season` to every unit.
pub fn apply_strategy(units: &mut UnitRegistry, season: Season) -> Vec<BypassDecision> {
    let mut decisions = Vec::new();
    for unit in units.iter_mut() {
        if unit.defrost_active {
            debug!("Seasonal: '{}' defrosting, bypass left alone", unit.id);
            continue;
        }
        let open = match season {
            Season::Winter => false,
            Season::Summer => unit
                .temperatures
                .is_some_and(|t| t.outdoor <= t.extract - FREE_COOLING_MARGIN_C),
        };
        let change = unit.set_bypass(open);
        if change.valve_moved || change.transition.is_some() {
            info!(
                "Seasonal: '{}' bypass {} ({:?})",
                unit.id,
                if open { "opened" } else { "closed" },
                season
            );
            decisions.push(BypassDecision {
                unit_id: unit.id.clone(),
                open,
                change,
            });
        }
    }
    decisions
}
