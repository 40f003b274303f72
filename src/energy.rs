//! Energy-savings accumulator.
//!
//! Recovered thermal power of one unit:
//!
//! ```text
//!   P = ρ · cp · V̇ · ΔT      ρ = 1.2 kg/m³, cp = 1005 J/(kg·K)
//!   V̇ = supply flow / 3600   (m³/s)
//!   ΔT = |T_supply − T_outdoor|
//! ```
//!
//! Each integration tick adds `Σ P · Δt` (Wh → kWh) to a running total
//! from which cost and avoided-CO2 figures are derived.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::units::UnitRegistry;

/// Density of air (kg/m³).
pub const AIR_DENSITY: f64 = 1.2;
/// Specific heat of air (J/(kg·K)).
pub const AIR_SPECIFIC_HEAT: f64 = 1005.0;

/// Tariff factors used to derive cost and CO2 from energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tariff {
    pub rate_per_kwh: f64,
    pub co2_kg_per_kwh: f64,
}

/// Recovered thermal power (W) for a supply flow and temperature lift.
pub fn recovered_power_w(supply_flow_m3h: f32, delta_t_c: f32) -> f64 {
    let flow_m3s = f64::from(supply_flow_m3h) / 3600.0;
    AIR_DENSITY * AIR_SPECIFIC_HEAT * flow_m3s * f64::from(delta_t_c.abs())
}

/// Running totals since the last reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySavings {
    pub total_kwh: f64,
    pub cost_savings: f64,
    pub co2_avoided_kg: f64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

impl EnergySavings {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            total_kwh: 0.0,
            cost_savings: 0.0,
            co2_avoided_kg: 0.0,
            period_start: now,
            period_end: now,
        }
    }

    /// Integrate one tick of `dt_hours`.  Only units that are recovering
    /// heat (active or boost, bypass closed) with readings contribute.
    /// Returns the energy added (kWh).
    pub fn accumulate(
        &mut self,
        units: &UnitRegistry,
        dt_hours: f64,
        now: DateTime<Utc>,
        tariff: Tariff,
    ) -> f64 {
        let watt_hours: f64 = units
            .iter()
            .filter(|u| u.state.is_recovering() && !u.bypass_open)
            .filter_map(|u| {
                let t = u.temperatures?;
                Some(recovered_power_w(u.supply_flow_m3h, t.supply - t.outdoor) * dt_hours)
            })
            .sum();
        let kwh = watt_hours / 1000.0;

        self.total_kwh += kwh;
        self.cost_savings = self.total_kwh * tariff.rate_per_kwh;
        self.co2_avoided_kg = self.total_kwh * tariff.co2_kg_per_kwh;
        self.period_end = now;

        debug!("Energy: +{:.4} kWh (total {:.3} kWh)", kwh, self.total_kwh);
        kwh
    }

    /// Start a fresh period; returns the totals of the one just closed.
    pub fn reset(&mut self, now: DateTime<Utc>) -> EnergySavings {
        let mut prior = std::mem::replace(self, EnergySavings::new(now));
        prior.period_end = now;
        info!(
            "Energy: period closed at {:.3} kWh, {:.2} saved, {:.2} kg CO2 avoided",
            prior.total_kwh, prior.cost_savings, prior.co2_avoided_kg
        );
        prior
    }
}
