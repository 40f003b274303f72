//! Controller context.
//!
//! Everything the engines share lives in one explicit struct: the unit,
//! zone and filter arenas, the seasonal mode, the two setpoints, the
//! energy accumulator and the outdoor-air cache.  The context is also the
//! persistence unit: it is serialized whole as the state blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::demand::OutdoorAirReading;
use crate::energy::EnergySavings;
use crate::filters::FilterTracker;
use crate::seasonal::SeasonalMode;
use crate::units::UnitRegistry;
use crate::zones::ZoneRegistry;

/// CO2 setpoint band (ppm).
pub const CO2_SETPOINT_RANGE: (f32, f32) = (400.0, 1500.0);
/// Humidity setpoint band (%RH).
pub const HUMIDITY_SETPOINT_RANGE: (f32, f32) = (20.0, 70.0);

/// Shared mutable state of one controller instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlContext {
    pub units: UnitRegistry,
    pub zones: ZoneRegistry,
    pub filters: FilterTracker,
    #[serde(default)]
    pub seasonal_mode: SeasonalMode,
    pub co2_setpoint_ppm: f32,
    pub humidity_setpoint_pct: f32,
    pub energy: EnergySavings,
    /// Most recent outdoor air-quality reading.
    #[serde(default)]
    pub outdoor_air: Option<OutdoorAirReading>,
}

impl ControlContext {
    /// Empty cold-start context.
    pub fn new(config: &ControllerConfig, now: DateTime<Utc>) -> Self {
        Self {
            units: UnitRegistry::new(),
            zones: ZoneRegistry::new(),
            filters: FilterTracker::new(),
            seasonal_mode: SeasonalMode::default(),
            co2_setpoint_ppm: config.default_co2_setpoint_ppm,
            humidity_setpoint_pct: config.default_humidity_setpoint_pct,
            energy: EnergySavings::new(now),
            outdoor_air: None,
        }
    }

    /// Best available outdoor temperature: the outdoor-air cache first,
    /// then the mean of the units' outdoor probes.
    pub fn outdoor_temperature(&self) -> Option<f32> {
        if let Some(reading) = &self.outdoor_air {
            return Some(reading.temperature_c);
        }
        let (sum, n) = self
            .units
            .iter()
            .filter_map(|u| u.outdoor_temp())
            .fold((0.0_f32, 0_u32), |(s, n), t| (s + t, n + 1));
        (n > 0).then(|| sum / n as f32)
    }
}

/// Whether `value` lies inside the inclusive `range`.
pub fn within(range: (f32, f32), value: f32) -> bool {
    value >= range.0 && value <= range.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{FanCurve, TemperatureReadings};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 6, 0, 0).unwrap()
    }

    #[test]
    fn cold_start_uses_configured_setpoints() {
        let ctx = ControlContext::new(&ControllerConfig::default(), now());
        assert_eq!(ctx.co2_setpoint_ppm, 800.0);
        assert_eq!(ctx.humidity_setpoint_pct, 50.0);
        assert_eq!(ctx.seasonal_mode, SeasonalMode::Auto);
        assert!(ctx.units.is_empty() && ctx.zones.is_empty());
        assert_eq!(ctx.outdoor_temperature(), None);
    }

    #[test]
    fn outdoor_temperature_falls_back_to_unit_sensors() {
        let mut ctx = ControlContext::new(&ControllerConfig::default(), now());
        let curve = FanCurve {
            power_w: 150.0,
            airflow_m3h: 300.0,
        };
        ctx.units.register("u1", "Attic", Vec::new(), &curve);
        ctx.units.get_mut("u1").unwrap().temperatures = Some(TemperatureReadings {
            supply: 18.0,
            extract: 21.0,
            outdoor: -2.0,
            exhaust: 3.0,
        });
        assert_eq!(ctx.outdoor_temperature(), Some(-2.0));

        ctx.outdoor_air = Some(OutdoorAirReading {
            co2_ppm: 420.0,
            pm25: 6.0,
            temperature_c: 4.0,
            humidity_pct: 80.0,
            recorded_at: now(),
        });
        assert_eq!(ctx.outdoor_temperature(), Some(4.0));
    }

    #[test]
    fn blob_roundtrip() {
        let mut ctx = ControlContext::new(&ControllerConfig::default(), now());
        ctx.zones.register("z1", "Living");
        ctx.seasonal_mode = SeasonalMode::Summer;
        let json = serde_json::to_string(&ctx).unwrap();
        let back: ControlContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn setpoint_bands_are_inclusive() {
        assert!(within(CO2_SETPOINT_RANGE, 400.0));
        assert!(within(CO2_SETPOINT_RANGE, 1500.0));
        assert!(!within(HUMIDITY_SETPOINT_RANGE, 70.5));
    }
}
