//! Humidity & condensation evaluator.
//!
//! Dew point by the Magnus approximation:
//!
//! ```text
//!   γ  = (a·T)/(b + T) + ln(RH/100)
//!   Td = (b·γ)/(a − γ)          a = 17.27, b = 237.7 °C
//! ```
//!
//! Risk is classified from the zone's relative humidity; high humidity
//! opens the damper, very dry air closes it.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::zones::{VentilationZone, ZoneRegistry};

const MAGNUS_A: f32 = 17.27;
const MAGNUS_B: f32 = 237.7;

/// RH at or above which condensation risk is high (%).
pub const CONDENSATION_RH_PCT: f32 = 70.0;
/// RH at or above which the zone is watched (%).
pub const MODERATE_RH_PCT: f32 = 60.0;
/// RH at or below which the air is too dry (%).
pub const DRY_RH_PCT: f32 = 25.0;
/// Damper step for humidity corrections (points).
pub const HUMIDITY_STEP_PCT: f32 = 10.0;
/// Outdoor temperature assumed when none has been reported (°C).
pub const DEFAULT_OUTDOOR_C: f32 = 10.0;

/// Dew point (°C) for a dry-bulb temperature and relative humidity.
pub fn dew_point(temperature_c: f32, relative_humidity_pct: f32) -> f32 {
    // ln(0) is −∞; a bone-dry reading still needs a finite answer.
    let rh = relative_humidity_pct.clamp(1.0, 100.0);
    let gamma = (MAGNUS_A * temperature_c) / (MAGNUS_B + temperature_c) + (rh / 100.0).ln();
    (MAGNUS_B * gamma) / (MAGNUS_A - gamma)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CondensationRisk {
    High,
    Moderate,
    Low,
    Dry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumidityAction {
    IncreaseVentilation,
    Monitor,
    DecreaseVentilation,
    None,
}

impl CondensationRisk {
    pub fn from_humidity(rh_pct: f32) -> Self {
        if rh_pct >= CONDENSATION_RH_PCT {
            Self::High
        } else if rh_pct >= MODERATE_RH_PCT {
            Self::Moderate
        } else if rh_pct <= DRY_RH_PCT {
            Self::Dry
        } else {
            Self::Low
        }
    }

    pub fn action(self) -> HumidityAction {
        match self {
            Self::High => HumidityAction::IncreaseVentilation,
            Self::Moderate => HumidityAction::Monitor,
            Self::Dry => HumidityAction::DecreaseVentilation,
            Self::Low => HumidityAction::None,
        }
    }
}

/// Result of a condensation evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CondensationAssessment {
    pub zone_id: String,
    pub humidity_pct: f32,
    pub dew_point_c: f32,
    pub risk: CondensationRisk,
    pub action: HumidityAction,
    pub damper_position_pct: f32,
}

/// Apply a humidity action to the damper.  Monitor/None leave it alone.
fn apply_action(zone: &mut VentilationZone, action: HumidityAction) {
    let delta = match action {
        HumidityAction::IncreaseVentilation => HUMIDITY_STEP_PCT,
        HumidityAction::DecreaseVentilation => -HUMIDITY_STEP_PCT,
        HumidityAction::Monitor | HumidityAction::None => return,
    };
    zone.adjust_damper(delta);
    zone.recompute_flow_from(zone.target_flow_m3h);
}

/// Evaluate one zone and apply the corrective action.
pub fn evaluate_zone(zone: &mut VentilationZone, outdoor_temp_c: Option<f32>) -> CondensationAssessment {
    let temp = outdoor_temp_c.unwrap_or(DEFAULT_OUTDOOR_C);
    let dew = dew_point(temp, zone.humidity_pct);
    let risk = CondensationRisk::from_humidity(zone.humidity_pct);
    let action = risk.action();
    apply_action(zone, action);

    match risk {
        CondensationRisk::High => warn!(
            "Humidity: zone '{}' at {:.0}% RH (dew point {:.1} °C) → damper {:.0}%",
            zone.id,
            zone.humidity_pct,
            dew,
            zone.damper_position()
        ),
        CondensationRisk::Dry => info!(
            "Humidity: zone '{}' dry at {:.0}% RH → damper {:.0}%",
            zone.id,
            zone.humidity_pct,
            zone.damper_position()
        ),
        CondensationRisk::Moderate | CondensationRisk::Low => {}
    }

    CondensationAssessment {
        zone_id: zone.id.clone(),
        humidity_pct: zone.humidity_pct,
        dew_point_c: dew,
        risk,
        action,
        damper_position_pct: zone.damper_position(),
    }
}

/// Periodic pass: open humid zones, close dry ones.
/// Returns the ids of zones whose damper was moved.
pub fn run_humidity_control(zones: &mut ZoneRegistry) -> Vec<String> {
    let mut moved = Vec::new();
    for zone in zones.iter_mut() {
        let action = if zone.humidity_pct >= CONDENSATION_RH_PCT {
            HumidityAction::IncreaseVentilation
        } else if zone.humidity_pct <= DRY_RH_PCT {
            HumidityAction::DecreaseVentilation
        } else {
            continue;
        };
        apply_action(zone, action);
        moved.push(zone.id.clone());
    }
    if !moved.is_empty() {
        info!("Humidity: corrected {} zone(s)", moved.len());
    }
    moved
}
