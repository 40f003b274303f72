//! Heat-recovery efficiency monitor.
//!
//! Temperature-ratio efficiency of the supply side:
//!
//! ```text
//!          T_supply − T_outdoor
//!   η = ─────────────────────── × 100
//!          T_extract − T_outdoor
//! ```
//!
//! Clamped to [0, 100] and rounded to one decimal.  When extract and
//! outdoor are within [`MIN_DELTA_C`] the ratio is meaningless and the
//! efficiency is reported as 0.

use serde::{Deserialize, Serialize};

use crate::units::{HrvUnit, UnitRegistry};

/// Smallest extract/outdoor spread that yields a usable ratio (K).
pub const MIN_DELTA_C: f32 = 0.5;

/// Compute recovery efficiency (%).
pub fn recovery_efficiency(supply_c: f32, extract_c: f32, outdoor_c: f32) -> f32 {
    let denom = extract_c - outdoor_c;
    if denom.abs() < MIN_DELTA_C {
        return 0.0;
    }
    let eta = ((supply_c - outdoor_c) / denom * 100.0).clamp(0.0, 100.0);
    (eta * 10.0).round() / 10.0
}

/// Qualitative rating for a recovery efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl EfficiencyRating {
    pub fn from_efficiency(pct: f32) -> Self {
        if pct >= 85.0 {
            Self::Excellent
        } else if pct >= 70.0 {
            Self::Good
        } else if pct >= 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// One row of the efficiency report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyEntry {
    pub unit_id: String,
    pub name: String,
    pub efficiency_pct: f32,
    pub rating: EfficiencyRating,
}

impl From<&HrvUnit> for EfficiencyEntry {
    fn from(unit: &HrvUnit) -> Self {
        Self {
            unit_id: unit.id.clone(),
            name: unit.name.clone(),
            efficiency_pct: unit.efficiency_pct,
            rating: EfficiencyRating::from_efficiency(unit.efficiency_pct),
        }
    }
}

/// Rate every registered unit.
pub fn report(units: &UnitRegistry) -> Vec<EfficiencyEntry> {
    units.iter().map(EfficiencyEntry::from).collect()
}

/// Mean efficiency across all units, one decimal; 0 with no units.
pub fn average(units: &UnitRegistry) -> f32 {
    if units.is_empty() {
        return 0.0;
    }
    let sum: f32 = units.iter().map(|u| u.efficiency_pct).sum();
    (sum / units.len() as f32 * 10.0).round() / 10.0
}
