//! Query payloads.
//!
//! Plain, serializable snapshots of the controller context for the
//! surrounding layer (HTTP handlers, dashboards, a message bus).  Every
//! payload is built from a shared borrow and owns its data, so callers
//! can hold on to one while the controller keeps running.

use serde::Serialize;

use crate::context::ControlContext;
use crate::demand::OutdoorAirReading;
use crate::efficiency::{self, EfficiencyEntry};
use crate::energy::EnergySavings;
use crate::filters::FilterAlert;
use crate::fsm::UnitState;
use crate::seasonal::{self, Season, SeasonalMode};
use crate::units::{HrvUnit, TemperatureReadings};
use crate::zones::VentilationZone;

/// HVAC-side view of one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitHvacView {
    pub unit_id: String,
    pub name: String,
    pub state: UnitState,
    pub temperatures: Option<TemperatureReadings>,
    pub supply_flow_m3h: f32,
    pub extract_flow_m3h: f32,
    pub bypass_open: bool,
    pub fan_speed_percent: u8,
}

impl From<&HrvUnit> for UnitHvacView {
    fn from(u: &HrvUnit) -> Self {
        Self {
            unit_id: u.id.clone(),
            name: u.name.clone(),
            state: u.state,
            temperatures: u.temperatures,
            supply_flow_m3h: u.supply_flow_m3h,
            extract_flow_m3h: u.extract_flow_m3h,
            bypass_open: u.bypass_open,
            fan_speed_percent: u.fan_speed_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HvacPayload {
    pub seasonal_mode: SeasonalMode,
    pub season: Season,
    pub units: Vec<UnitHvacView>,
}

/// Air-quality view of one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneAirView {
    pub zone_id: String,
    pub name: String,
    pub co2_ppm: f32,
    pub humidity_pct: f32,
    pub damper_position_pct: f32,
    pub occupied: bool,
    pub occupant_count: u32,
}

impl From<&VentilationZone> for ZoneAirView {
    fn from(z: &VentilationZone) -> Self {
        Self {
            zone_id: z.id.clone(),
            name: z.name.clone(),
            co2_ppm: z.co2_ppm,
            humidity_pct: z.humidity_pct,
            damper_position_pct: z.damper_position(),
            occupied: z.occupied,
            occupant_count: z.occupant_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityPayload {
    pub co2_setpoint_ppm: f32,
    pub humidity_setpoint_pct: f32,
    pub outdoor: Option<OutdoorAirReading>,
    pub zones: Vec<ZoneAirView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyPayload {
    /// Combined electrical draw of every unit (W).
    pub total_power_w: f32,
    pub savings: EnergySavings,
    pub average_efficiency_pct: f32,
    pub efficiency: Vec<EfficiencyEntry>,
}

/// Full system summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSummary {
    pub unit_count: usize,
    pub active_unit_count: usize,
    pub zone_count: usize,
    pub seasonal_mode: SeasonalMode,
    pub season: Season,
    pub average_efficiency_pct: f32,
    pub total_power_w: f32,
    pub co2_setpoint_ppm: f32,
    pub humidity_setpoint_pct: f32,
    pub filters_needing_replacement: Vec<FilterAlert>,
    pub units: Vec<HrvUnit>,
    pub zones: Vec<VentilationZone>,
}

fn total_power(ctx: &ControlContext) -> f32 {
    ctx.units.iter().map(|u| u.power_w).sum()
}

pub fn hvac(ctx: &ControlContext) -> HvacPayload {
    HvacPayload {
        seasonal_mode: ctx.seasonal_mode,
        season: seasonal::resolve(ctx.seasonal_mode, &ctx.units),
        units: ctx.units.iter().map(UnitHvacView::from).collect(),
    }
}

pub fn air_quality(ctx: &ControlContext) -> AirQualityPayload {
    AirQualityPayload {
        co2_setpoint_ppm: ctx.co2_setpoint_ppm,
        humidity_setpoint_pct: ctx.humidity_setpoint_pct,
        outdoor: ctx.outdoor_air,
        zones: ctx.zones.iter().map(ZoneAirView::from).collect(),
    }
}

pub fn energy(ctx: &ControlContext) -> EnergyPayload {
    EnergyPayload {
        total_power_w: total_power(ctx),
        savings: ctx.energy.clone(),
        average_efficiency_pct: efficiency::average(&ctx.units),
        efficiency: efficiency::report(&ctx.units),
    }
}

pub fn summary(ctx: &ControlContext) -> SystemSummary {
    SystemSummary {
        unit_count: ctx.units.len(),
        active_unit_count: ctx.units.iter().filter(|u| u.state != UnitState::Idle).count(),
        zone_count: ctx.zones.len(),
        seasonal_mode: ctx.seasonal_mode,
        season: seasonal::resolve(ctx.seasonal_mode, &ctx.units),
        average_efficiency_pct: efficiency::average(&ctx.units),
        total_power_w: total_power(ctx),
        co2_setpoint_ppm: ctx.co2_setpoint_ppm,
        humidity_setpoint_pct: ctx.humidity_setpoint_pct,
        filters_needing_replacement: ctx.filters.needing_replacement(),
        units: ctx.units.iter().cloned().collect(),
        zones: ctx.zones.iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::units::{FanCurve, FanSpeed};
    use chrono::{TimeZone, Utc};

    const CURVE: FanCurve = FanCurve {
        power_w: 160.0,
        airflow_m3h: 300.0,
    };

    fn ctx() -> ControlContext {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        let mut ctx = ControlContext::new(&ControllerConfig::default(), now);
        ctx.units.register("u1", "Attic", vec!["z1".into()], &CURVE);
        ctx.units.register("u2", "Garage", Vec::new(), &CURVE);
        ctx.units
            .get_mut("u2")
            .unwrap()
            .apply_fan_speed(FanSpeed::Off, &CURVE);
        ctx.filters.install("u1", now, 180);
        ctx.zones.register("z1", "Living");
        ctx
    }

    #[test]
    fn summary_counts() {
        let s = summary(&ctx());
        assert_eq!(s.unit_count, 2);
        assert_eq!(s.active_unit_count, 1);
        assert_eq!(s.zone_count, 1);
        assert_eq!(s.season, Season::Winter);
        assert!((s.total_power_w - 20.0).abs() < 1e-3);
        assert!(s.filters_needing_replacement.is_empty());
    }

    #[test]
    fn payloads_serialize_to_json() {
        let c = ctx();
        let hvac = serde_json::to_value(hvac(&c)).unwrap();
        assert_eq!(hvac["units"][0]["fan_speed_percent"], 50);
        assert_eq!(hvac["units"][1]["state"], "idle");

        let aq = serde_json::to_value(air_quality(&c)).unwrap();
        assert_eq!(aq["co2_setpoint_ppm"], 800.0);
        assert_eq!(aq["zones"][0]["damper_position_pct"], 50.0);

        let e = energy(&c);
        assert_eq!(e.efficiency.len(), 2);
        assert_eq!(e.savings.total_kwh, 0.0);
    }
}
