//! Controller configuration parameters
//!
//! All tunable parameters for the ventilation controller: loop cadences,
//! default setpoints, tariff factors and the nominal fan curve.
//! Values can be overridden by the embedding layer before construction.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Cadences ---
    /// Seasonal + demand + humidity pass interval (seconds)
    pub monitor_interval_secs: u32,
    /// Filter-aging sweep interval (seconds)
    pub filter_sweep_interval_secs: u32,
    /// Energy-savings integration interval (seconds)
    pub energy_interval_secs: u32,
    /// Defrost-trigger check interval (seconds)
    pub defrost_check_interval_secs: u32,
    /// Zone-balancing pass interval (seconds)
    pub balance_interval_secs: u32,
    /// Length of one defrost cycle (seconds)
    pub defrost_duration_secs: u32,

    // --- Setpoints ---
    /// CO2 setpoint applied on cold start (ppm)
    pub default_co2_setpoint_ppm: f32,
    /// Humidity setpoint applied on cold start (%RH)
    pub default_humidity_setpoint_pct: f32,

    // --- Filters ---
    /// Expected filter lifespan (days)
    pub filter_lifespan_days: u32,

    // --- Energy accounting ---
    /// Electricity/heat tariff (currency units per kWh)
    pub energy_rate_per_kwh: f64,
    /// Grid emission factor (kg CO2 per kWh)
    pub co2_kg_per_kwh: f64,

    // --- Fan curve ---
    /// Electrical draw at 100 % fan speed (W)
    pub nominal_fan_power_w: f32,
    /// Supply/extract airflow at 100 % fan speed (m³/h)
    pub nominal_airflow_m3h: f32,

    // --- Persistence ---
    /// Storage namespace for the state blob
    pub storage_namespace: String,
    /// Storage key for the state blob
    pub storage_key: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Cadences
            monitor_interval_secs: 300,        // 5 min
            filter_sweep_interval_secs: 86_400, // 24 h
            energy_interval_secs: 300,         // 5 min
            defrost_check_interval_secs: 120,  // 2 min
            balance_interval_secs: 180,        // 3 min
            defrost_duration_secs: 300,        // 5 min

            // Setpoints
            default_co2_setpoint_ppm: 800.0,
            default_humidity_setpoint_pct: 50.0,

            // Filters
            filter_lifespan_days: 180,

            // Energy
            energy_rate_per_kwh: 0.12,
            co2_kg_per_kwh: 0.233,

            // Fan curve
            nominal_fan_power_w: 150.0,
            nominal_airflow_m3h: 300.0,

            // Persistence
            storage_namespace: "hrv".into(),
            storage_key: "controller_state".into(),
        }
    }
}

impl ControllerConfig {
    /// Range-check every field.
    ///
    /// Invalid values are rejected, never clamped: a controller that
    /// silently ran its monitor loop every 0 s would spin the host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cadences = [
            self.monitor_interval_secs,
            self.energy_interval_secs,
            self.defrost_check_interval_secs,
            self.balance_interval_secs,
        ];
        if cadences.iter().any(|s| !(10..=3_600).contains(s)) {
            return Err(ConfigError::ValidationFailed(
                "loop intervals must be 10–3600 s",
            ));
        }
        if !(3_600..=604_800).contains(&self.filter_sweep_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "filter_sweep_interval_secs must be 3600–604800",
            ));
        }
        if !(30..=3_600).contains(&self.defrost_duration_secs) {
            return Err(ConfigError::ValidationFailed(
                "defrost_duration_secs must be 30–3600",
            ));
        }
        if !(400.0..=1500.0).contains(&self.default_co2_setpoint_ppm) {
            return Err(ConfigError::ValidationFailed(
                "default_co2_setpoint_ppm must be 400–1500",
            ));
        }
        if !(20.0..=70.0).contains(&self.default_humidity_setpoint_pct) {
            return Err(ConfigError::ValidationFailed(
                "default_humidity_setpoint_pct must be 20–70",
            ));
        }
        if !(15..=730).contains(&self.filter_lifespan_days) {
            return Err(ConfigError::ValidationFailed(
                "filter_lifespan_days must be 15–730",
            ));
        }
        if !(0.0..=10.0).contains(&self.energy_rate_per_kwh) {
            return Err(ConfigError::ValidationFailed(
                "energy_rate_per_kwh must be 0–10",
            ));
        }
        if !(0.0..=2.0).contains(&self.co2_kg_per_kwh) {
            return Err(ConfigError::ValidationFailed(
                "co2_kg_per_kwh must be 0–2",
            ));
        }
        if !(1.0..=5_000.0).contains(&self.nominal_fan_power_w) {
            return Err(ConfigError::ValidationFailed(
                "nominal_fan_power_w must be 1–5000",
            ));
        }
        if !(10.0..=20_000.0).contains(&self.nominal_airflow_m3h) {
            return Err(ConfigError::ValidationFailed(
                "nominal_airflow_m3h must be 10–20000",
            ));
        }
        if self.storage_namespace.is_empty() || self.storage_key.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "storage namespace and key must be non-empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = ControllerConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.monitor_interval_secs, 300);
        assert_eq!(c.filter_sweep_interval_secs, 86_400);
        assert_eq!(c.energy_interval_secs, 300);
        assert_eq!(c.defrost_check_interval_secs, 120);
        assert_eq!(c.balance_interval_secs, 180);
        assert_eq!(c.defrost_duration_secs, 300);
    }

    #[test]
    fn serde_roundtrip() {
        let c = ControllerConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: ControllerConfig = serde_json::from_str(&json).unwrap();
        assert!((c.default_co2_setpoint_ppm - c2.default_co2_setpoint_ppm).abs() < 0.001);
        assert_eq!(c.balance_interval_secs, c2.balance_interval_secs);
        assert_eq!(c.storage_key, c2.storage_key);
    }

    #[test]
    fn rejects_zero_cadence() {
        let c = ControllerConfig {
            monitor_interval_secs: 0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn rejects_setpoint_outside_band() {
        let c = ControllerConfig {
            default_co2_setpoint_ppm: 2_000.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = ControllerConfig::default();
        assert!(
            c.defrost_check_interval_secs < c.defrost_duration_secs,
            "defrost check should run more often than one defrost cycle"
        );
        assert!(
            c.monitor_interval_secs < c.filter_sweep_interval_secs,
            "monitor loop should be faster than the filter sweep"
        );
    }
}
