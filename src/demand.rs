//! Demand & air-quality engine.
//!
//! Two paths move zone dampers on air-quality grounds:
//!
//! 1. **Event path**: every indoor air-quality reading is classified and,
//!    when outdoor air is demonstrably cleaner, high CO2 opens the damper.
//!    Comfortably low CO2 with excess airflow closes it a little.
//! 2. **Periodic DCV pass**: a reverse-acting proportional controller per
//!    zone drives CO2 towards the setpoint.
//!
//! In both paths the damper is clamped to its travel and the zone's actual
//! flow becomes `target × damper / 100`.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::context::within;
use crate::control::proportional::ProportionalController;
use crate::units::TEMPERATURE_RANGE_C;
use crate::zones::{DAMPER_MAX_PCT, DAMPER_MIN_PCT, VentilationZone, ZoneRegistry};

/// DCV gain (damper points per ppm of error).
pub const DCV_GAIN: f32 = 0.05;
/// Smallest damper move the DCV pass applies (points).
pub const DCV_HYSTERESIS_PCT: f32 = 2.0;

/// Damper opening for poor indoor air when outdoor air is better.
const POOR_AIR_STEP_PCT: f32 = 10.0;
/// Damper opening for critical indoor air when outdoor air is better.
const CRITICAL_AIR_STEP_PCT: f32 = 15.0;
/// Damper closing for clean air with excess flow.
const EXCESS_FLOW_STEP_PCT: f32 = 5.0;

/// Plausible CO2 concentration (ppm).
pub const CO2_RANGE_PPM: (f32, f32) = (0.0, 40_000.0);
/// Relative humidity (%RH).
pub const HUMIDITY_RANGE_PCT: (f32, f32) = (0.0, 100.0);
/// Plausible PM2.5 concentration (µg/m³).
pub const PM25_RANGE: (f32, f32) = (0.0, 2_000.0);
/// Plausible VOC reading (index or ppb).
pub const VOC_RANGE: (f32, f32) = (0.0, 65_000.0);

// ---------------------------------------------------------------------------
// CO2 classification
// ---------------------------------------------------------------------------

/// CO2 concentration band, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Co2Level {
    /// < 400 ppm
    Excellent,
    /// 400–600 ppm
    Good,
    /// 600–800 ppm
    Acceptable,
    /// 800–1000 ppm
    Poor,
    /// 1000–1500 ppm
    Critical,
    /// ≥ 1500 ppm
    Hazardous,
}

impl Co2Level {
    pub fn from_ppm(ppm: f32) -> Self {
        if ppm < 400.0 {
            Self::Excellent
        } else if ppm < 600.0 {
            Self::Good
        } else if ppm < 800.0 {
            Self::Acceptable
        } else if ppm < 1000.0 {
            Self::Poor
        } else if ppm < 1500.0 {
            Self::Critical
        } else {
            Self::Hazardous
        }
    }

    /// Comfortably low: no reason to move extra air.
    pub fn is_comfortable(self) -> bool {
        self <= Self::Good
    }
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Latest outdoor air-quality reading, shared by all zones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutdoorAirReading {
    pub co2_ppm: f32,
    pub pm25: f32,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub recorded_at: DateTime<Utc>,
}

/// Whether an outdoor reading's four values are physically plausible.
pub fn outdoor_values_plausible(co2_ppm: f32, pm25: f32, temperature_c: f32, humidity_pct: f32) -> bool {
    within(CO2_RANGE_PPM, co2_ppm)
        && within(PM25_RANGE, pm25)
        && within(TEMPERATURE_RANGE_C, temperature_c)
        && within(HUMIDITY_RANGE_PCT, humidity_pct)
}

/// One indoor air-quality reading for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndoorAirReading {
    pub co2_ppm: f32,
    pub humidity_pct: f32,
    pub pm25: Option<f32>,
    pub voc: Option<f32>,
}

impl IndoorAirReading {
    /// Every supplied value lies in its plausible band.
    pub fn is_plausible(&self) -> bool {
        within(CO2_RANGE_PPM, self.co2_ppm)
            && within(HUMIDITY_RANGE_PCT, self.humidity_pct)
            && self.pm25.is_none_or(|v| within(PM25_RANGE, v))
            && self.voc.is_none_or(|v| within(VOC_RANGE, v))
    }
}

/// What the event path did to the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityAction {
    IncreaseVentilation,
    DecreaseVentilation,
    None,
}

/// Result of an indoor air-quality update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirQualityOutcome {
    pub co2_level: Co2Level,
    pub outdoor_better: bool,
    pub action: AirQualityAction,
    pub damper_position_pct: f32,
}

/// Outdoor air is better only if it is cleaner on both PM2.5 and CO2.
/// Unknown zone PM2.5 means "not provably better".
pub fn outdoor_is_better(zone: &VentilationZone, outdoor: Option<&OutdoorAirReading>) -> bool {
    match (outdoor, zone.pm25) {
        (Some(o), Some(zone_pm25)) => o.pm25 < zone_pm25 && o.co2_ppm < zone.co2_ppm,
        _ => false,
    }
}

/// Store a reading on the zone and apply the event-path rules.
pub fn apply_indoor_reading(
    zone: &mut VentilationZone,
    reading: &IndoorAirReading,
    outdoor: Option<&OutdoorAirReading>,
) -> AirQualityOutcome {
    zone.co2_ppm = reading.co2_ppm;
    zone.humidity_pct = reading.humidity_pct;
    if reading.pm25.is_some() {
        zone.pm25 = reading.pm25;
    }
    if reading.voc.is_some() {
        zone.voc = reading.voc;
    }

    let level = Co2Level::from_ppm(zone.co2_ppm);
    let outdoor_better = outdoor_is_better(zone, outdoor);

    let action = if outdoor_better && level >= Co2Level::Poor {
        let step = if level >= Co2Level::Critical {
            CRITICAL_AIR_STEP_PCT
        } else {
            POOR_AIR_STEP_PCT
        };
        zone.adjust_damper(step);
        zone.recompute_flow_from(zone.target_flow_m3h);
        info!(
            "DCV: zone '{}' CO2 {:.0} ppm ({:?}) → damper {:.0}%",
            zone.id,
            zone.co2_ppm,
            level,
            zone.damper_position()
        );
        AirQualityAction::IncreaseVentilation
    } else if level.is_comfortable() && zone.actual_flow_m3h > zone.target_flow_m3h {
        zone.adjust_damper(-EXCESS_FLOW_STEP_PCT);
        zone.recompute_flow_from(zone.target_flow_m3h);
        debug!(
            "DCV: zone '{}' over-ventilated at {:.0} ppm → damper {:.0}%",
            zone.id,
            zone.co2_ppm,
            zone.damper_position()
        );
        AirQualityAction::DecreaseVentilation
    } else {
        AirQualityAction::None
    };

    AirQualityOutcome {
        co2_level: level,
        outdoor_better,
        action,
        damper_position_pct: zone.damper_position(),
    }
}

// ---------------------------------------------------------------------------
// Periodic DCV pass
// ---------------------------------------------------------------------------

/// One damper move made by the DCV pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DamperMove {
    pub zone_id: String,
    pub from_pct: f32,
    pub to_pct: f32,
}

/// The DCV controller tuned for a CO2 setpoint.
pub fn dcv_controller(co2_setpoint_ppm: f32) -> ProportionalController {
    let mut p = ProportionalController::new(DCV_GAIN, co2_setpoint_ppm);
    p.set_limits(DAMPER_MIN_PCT, DAMPER_MAX_PCT);
    p.set_deadband(DCV_HYSTERESIS_PCT);
    p
}

/// Run the proportional controller across every zone.
pub fn run_demand_control(zones: &mut ZoneRegistry, co2_setpoint_ppm: f32) -> Vec<DamperMove> {
    let controller = dcv_controller(co2_setpoint_ppm);
    let mut moves = Vec::new();
    for zone in zones.iter_mut() {
        let from = zone.damper_position();
        if let Some(next) = controller.compute(zone.co2_ppm, from) {
            let to = zone.set_damper(next);
            zone.recompute_flow_from(zone.target_flow_m3h);
            moves.push(DamperMove {
                zone_id: zone.id.clone(),
                from_pct: from,
                to_pct: to,
            });
        }
    }
    if !moves.is_empty() {
        info!("DCV: adjusted {} zone damper(s)", moves.len());
    }
    moves
}
