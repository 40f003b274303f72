//! Zone balancer.
//!
//! Splits the units' combined supply airflow across zones in proportion
//! to each zone's target, then nudges any zone whose share misses its
//! target by more than [`BALANCE_TOLERANCE_PCT`].
//!
//! ```text
//!   allocated = Σsupply × target / Σtarget
//!   error %   = (allocated − target) / target × 100
//!   error > +5 %  → damper −2      error < −5 %  → damper +2
//!   actual    = allocated × damper / 100
//! ```

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::units::UnitRegistry;
use crate::zones::ZoneRegistry;

/// Allowed deviation of a zone's allocation from its target (%).
pub const BALANCE_TOLERANCE_PCT: f32 = 5.0;
/// Damper nudge per balancing pass (points).
pub const BALANCE_STEP_PCT: f32 = 2.0;

/// Per-zone result of a balancing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAllocation {
    pub zone_id: String,
    pub allocated_flow_m3h: f32,
    pub error_pct: f32,
    pub damper_position_pct: f32,
    pub adjusted: bool,
}

/// Summary of one balancing pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub total_target_m3h: f32,
    pub total_supply_m3h: f32,
    pub zones: Vec<ZoneAllocation>,
}

/// Run one balancing pass.  No-op when there is no target demand.
pub fn balance(zones: &mut ZoneRegistry, units: &UnitRegistry) -> BalanceReport {
    let total_target: f32 = zones.iter().map(|z| z.target_flow_m3h).sum();
    let total_supply: f32 = units
        .iter()
        .filter(|u| u.state.is_supplying())
        .map(|u| u.supply_flow_m3h)
        .sum();

    let mut report = BalanceReport {
        total_target_m3h: total_target,
        total_supply_m3h: total_supply,
        zones: Vec::new(),
    };
    if total_target <= 0.0 {
        debug!("Balancer: no target demand, skipping");
        return report;
    }

    for zone in zones.iter_mut() {
        if zone.target_flow_m3h <= 0.0 {
            continue;
        }
        let allocated = total_supply * (zone.target_flow_m3h / total_target);
        let error_pct = (allocated - zone.target_flow_m3h) / zone.target_flow_m3h * 100.0;

        let adjusted = error_pct.abs() > BALANCE_TOLERANCE_PCT;
        if adjusted {
            let step = if error_pct > 0.0 {
                -BALANCE_STEP_PCT
            } else {
                BALANCE_STEP_PCT
            };
            zone.adjust_damper(step);
            zone.recompute_flow_from(allocated);
        }

        report.zones.push(ZoneAllocation {
            zone_id: zone.id.clone(),
            allocated_flow_m3h: allocated,
            error_pct,
            damper_position_pct: zone.damper_position(),
            adjusted,
        });
    }

    let adjusted = report.zones.iter().filter(|z| z.adjusted).count();
    if adjusted > 0 {
        info!(
            "Balancer: {:.0} m³/h supply over {:.0} m³/h demand, {} zone(s) nudged",
            total_supply, total_target, adjusted
        );
    }
    report
}
