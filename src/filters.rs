//! Filter lifecycle tracker.
//!
//! Every unit carries exactly two filters (supply and extract), created
//! with the unit and dropped with it.  A filter is flagged for
//! replacement when any of these hold:
//!
//! - pressure drop exceeds twice its clean baseline (loaded media),
//! - age exceeds the expected lifespan,
//! - remaining life is at most [`REPLACEMENT_WARNING_DAYS`].
//!
//! The flag is latched: only [`FilterTracker::replace`] clears it.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::context::within;
use crate::error::{ControlError, Result};

/// Remaining life (days) at or below which a filter is due.
pub const REPLACEMENT_WARNING_DAYS: f64 = 14.0;

/// Clean-media pressure drop of a supply filter (Pa).
pub const SUPPLY_BASELINE_PA: f32 = 30.0;
/// Clean-media pressure drop of an extract filter (Pa).
pub const EXTRACT_BASELINE_PA: f32 = 25.0;

/// Plausible differential pressure across a filter (Pa).
pub const PRESSURE_RANGE_PA: (f32, f32) = (0.0, 2_000.0);

/// Loading factor beyond which a filter is clogged.
const CLOGGED_RATIO: f32 = 2.0;

const SECS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Supply,
    Extract,
}

impl FilterType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Supply => "supply",
            Self::Extract => "extract",
        }
    }

    const fn baseline_pa(self) -> f32 {
        match self {
            Self::Supply => SUPPLY_BASELINE_PA,
            Self::Extract => EXTRACT_BASELINE_PA,
        }
    }
}

impl FromStr for FilterType {
    type Err = ControlError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "supply" => Ok(Self::Supply),
            "extract" => Ok(Self::Extract),
            _ => Err(ControlError::InvalidEvent),
        }
    }
}

/// State of one filter cartridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterStatus {
    pub filter_type: FilterType,
    pub installed_at: DateTime<Utc>,
    pub lifespan_days: u32,
    pub pressure_drop_pa: f32,
    pub baseline_pressure_pa: f32,
    pub efficiency_pct: f32,
    pub replacement_due: bool,
}

impl FilterStatus {
    fn fresh(filter_type: FilterType, now: DateTime<Utc>, lifespan_days: u32) -> Self {
        let baseline = filter_type.baseline_pa();
        Self {
            filter_type,
            installed_at: now,
            lifespan_days,
            pressure_drop_pa: baseline,
            baseline_pressure_pa: baseline,
            efficiency_pct: 100.0,
            replacement_due: false,
        }
    }

    /// Days since installation (fractional).
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        (now - self.installed_at).num_seconds() as f64 / SECS_PER_DAY
    }

    /// Days of life left; negative once overdue.
    pub fn remaining_life_days(&self, now: DateTime<Utc>) -> f64 {
        f64::from(self.lifespan_days) - self.age_days(now)
    }

    /// Latch the replacement flag if any trigger holds.
    /// Returns `true` only on the transition into "due".
    fn evaluate(&mut self, now: DateTime<Utc>) -> bool {
        if self.replacement_due {
            return false;
        }
        let clogged = self.pressure_drop_pa > CLOGGED_RATIO * self.baseline_pressure_pa;
        let expired = self.age_days(now) > f64::from(self.lifespan_days);
        let nearly_expired = self.remaining_life_days(now) <= REPLACEMENT_WARNING_DAYS;
        if clogged || expired || nearly_expired {
            self.replacement_due = true;
            return true;
        }
        false
    }
}

/// Filtration efficiency from the measured pressure drop (%).
///
/// Falls by half for every baseline's worth of extra loading; readings
/// below baseline count as clean media.
pub fn efficiency_from_pressure(pressure_pa: f32, baseline_pa: f32) -> f32 {
    if baseline_pa <= 0.0 {
        return 0.0;
    }
    let loading = (pressure_pa - baseline_pa) / baseline_pa;
    ((1.0 - 0.5 * loading).max(0.0) * 100.0).min(100.0)
}

/// The supply/extract pair of one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPair {
    pub supply: FilterStatus,
    pub extract: FilterStatus,
}

impl FilterPair {
    pub fn get(&self, filter_type: FilterType) -> &FilterStatus {
        match filter_type {
            FilterType::Supply => &self.supply,
            FilterType::Extract => &self.extract,
        }
    }

    fn get_mut(&mut self, filter_type: FilterType) -> &mut FilterStatus {
        match filter_type {
            FilterType::Supply => &mut self.supply,
            FilterType::Extract => &mut self.extract,
        }
    }

    fn both_mut(&mut self) -> [&mut FilterStatus; 2] {
        [&mut self.supply, &mut self.extract]
    }
}

/// Outcome of a pressure update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureUpdate {
    pub efficiency_pct: f32,
    pub replacement_due: bool,
    /// The update is what tripped the flag.
    pub newly_due: bool,
}

/// A filter that needs servicing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterAlert {
    pub unit_id: String,
    pub filter_type: FilterType,
}

/// Filter pairs keyed by owning unit id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterTracker {
    pairs: BTreeMap<String, FilterPair>,
}

impl FilterTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create both filters for a newly registered unit.
    /// An existing pair is left untouched.
    pub fn install(&mut self, unit_id: &str, now: DateTime<Utc>, lifespan_days: u32) {
        self.pairs.entry(unit_id.to_owned()).or_insert_with(|| FilterPair {
            supply: FilterStatus::fresh(FilterType::Supply, now, lifespan_days),
            extract: FilterStatus::fresh(FilterType::Extract, now, lifespan_days),
        });
    }

    /// Drop both filters of a removed unit.
    pub fn remove(&mut self, unit_id: &str) -> bool {
        self.pairs.remove(unit_id).is_some()
    }

    pub fn pair(&self, unit_id: &str) -> Option<&FilterPair> {
        self.pairs.get(unit_id)
    }

    /// Record a differential-pressure reading.
    pub fn update_pressure(
        &mut self,
        unit_id: &str,
        filter_type: FilterType,
        pressure_pa: f32,
        now: DateTime<Utc>,
    ) -> Result<PressureUpdate> {
        if !within(PRESSURE_RANGE_PA, pressure_pa) {
            return Err(ControlError::ReadingOutOfRange);
        }
        let filter = self
            .pairs
            .get_mut(unit_id)
            .ok_or(ControlError::UnknownUnit)?
            .get_mut(filter_type);

        filter.pressure_drop_pa = pressure_pa;
        filter.efficiency_pct = efficiency_from_pressure(pressure_pa, filter.baseline_pressure_pa);
        let newly_due = filter.evaluate(now);
        if newly_due {
            warn!(
                "Filters: {} filter on '{}' due for replacement ({:.0} Pa, {:.0}% eff)",
                filter_type.name(),
                unit_id,
                pressure_pa,
                filter.efficiency_pct
            );
        }
        Ok(PressureUpdate {
            efficiency_pct: filter.efficiency_pct,
            replacement_due: filter.replacement_due,
            newly_due,
        })
    }

    /// Reset a filter to its just-installed state.
    pub fn replace(&mut self, unit_id: &str, filter_type: FilterType, now: DateTime<Utc>) -> Result<()> {
        let filter = self
            .pairs
            .get_mut(unit_id)
            .ok_or(ControlError::UnknownUnit)?
            .get_mut(filter_type);
        *filter = FilterStatus::fresh(filter_type, now, filter.lifespan_days);
        info!("Filters: {} filter on '{}' replaced", filter_type.name(), unit_id);
        Ok(())
    }

    /// Age-based sweep.  Returns every filter that became due.
    pub fn sweep_age(&mut self, now: DateTime<Utc>) -> Vec<FilterAlert> {
        let mut flagged = Vec::new();
        for (unit_id, pair) in &mut self.pairs {
            for filter in pair.both_mut() {
                if filter.evaluate(now) {
                    warn!(
                        "Filters: {} filter on '{}' due by age ({:.1} days left)",
                        filter.filter_type.name(),
                        unit_id,
                        filter.remaining_life_days(now)
                    );
                    flagged.push(FilterAlert {
                        unit_id: unit_id.clone(),
                        filter_type: filter.filter_type,
                    });
                }
            }
        }
        flagged
    }

    /// Every filter currently flagged.
    pub fn needing_replacement(&self) -> Vec<FilterAlert> {
        self.pairs
            .iter()
            .flat_map(|(unit_id, pair)| {
                [&pair.supply, &pair.extract]
                    .into_iter()
                    .filter(|f| f.replacement_due)
                    .map(move |f| FilterAlert {
                        unit_id: unit_id.clone(),
                        filter_type: f.filter_type,
                    })
            })
            .collect()
    }
}
