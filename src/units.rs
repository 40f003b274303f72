//! HRV/ERV unit records and the registry that owns them.
//!
//! Units live in an arena keyed by id.  Zones are referenced by id only;
//! removing a zone never touches a unit and vice versa.
//!
//! Every control change goes through a method on [`HrvUnit`] so the
//! table-derived fields (`fan_speed_percent`, `power_w`, flows) and the
//! [`UnitState`] are re-derived together.

use std::collections::BTreeMap;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use crate::context::within;
use crate::error::ControlError;
use crate::fsm::{self, StateInputs, Transition, UnitState};

/// Outdoor temperature at or below which a running unit needs defrosting (°C).
pub const DEFROST_TRIGGER_C: f32 = -5.0;

/// Physically plausible probe temperature (°C).
pub const TEMPERATURE_RANGE_C: (f32, f32) = (-60.0, 90.0);
/// Physically plausible measured airflow (m³/h).
pub const FLOW_RANGE_M3H: (f32, f32) = (0.0, 10_000.0);

/// Whether a measured airflow is worth storing.
pub fn flow_is_plausible(flow_m3h: f32) -> bool {
    within(FLOW_RANGE_M3H, flow_m3h)
}

// ---------------------------------------------------------------------------
// Fan tiers
// ---------------------------------------------------------------------------

/// Discrete fan-speed tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanSpeed {
    Off,
    Low,
    Medium,
    High,
    Boost,
}

impl FanSpeed {
    /// Fixed percentage for each tier.
    pub const fn percent(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Low => 25,
            Self::Medium => 50,
            Self::High => 75,
            Self::Boost => 100,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Boost => "boost",
        }
    }
}

impl FromStr for FanSpeed {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "boost" => Ok(Self::Boost),
            _ => Err(ControlError::InvalidFanSpeed),
        }
    }
}

/// Nominal fan curve used to derive power and airflow from a tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanCurve {
    /// Electrical draw at 100 % (W).
    pub power_w: f32,
    /// Airflow at 100 % (m³/h).
    pub airflow_m3h: f32,
}

impl FanCurve {
    /// Fan-affinity law: power scales with the cube of speed.
    pub fn power_at(&self, percent: u8) -> f32 {
        let ratio = f32::from(percent) / 100.0;
        self.power_w * ratio * ratio * ratio
    }

    /// Airflow scales linearly with speed.
    pub fn airflow_at(&self, percent: u8) -> f32 {
        self.airflow_m3h * f32::from(percent) / 100.0
    }
}

// ---------------------------------------------------------------------------
// Unit record
// ---------------------------------------------------------------------------

/// The four probe temperatures of a heat-recovery unit (°C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReadings {
    pub supply: f32,
    pub extract: f32,
    pub outdoor: f32,
    pub exhaust: f32,
}

impl TemperatureReadings {
    /// Every probe reads inside [`TEMPERATURE_RANGE_C`].  NaN and
    /// infinities never do.
    pub fn is_plausible(&self) -> bool {
        [self.supply, self.extract, self.outdoor, self.exhaust]
            .into_iter()
            .all(|t| within(TEMPERATURE_RANGE_C, t))
    }
}

/// One physical heat-recovery air handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrvUnit {
    pub id: String,
    pub name: String,
    pub zone_ids: Vec<String>,

    pub state: UnitState,
    pub fan_speed: FanSpeed,
    pub fan_speed_percent: u8,
    pub bypass_open: bool,
    pub defrost_active: bool,

    /// Latest probe readings; `None` until the first telemetry arrives.
    pub temperatures: Option<TemperatureReadings>,
    pub supply_flow_m3h: f32,
    pub extract_flow_m3h: f32,
    pub power_w: f32,
    /// Derived recovery efficiency (0–100).
    pub efficiency_pct: f32,
}

/// Result of a valve-moving control change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange {
    /// The bypass valve actually changed position.
    pub valve_moved: bool,
    pub transition: Option<Transition>,
}

impl HrvUnit {
    fn new(id: &str, name: &str, zone_ids: Vec<String>, curve: &FanCurve) -> Self {
        let fan_speed = FanSpeed::Medium;
        let percent = fan_speed.percent();
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            zone_ids,
            state: UnitState::Active,
            fan_speed,
            fan_speed_percent: percent,
            bypass_open: false,
            defrost_active: false,
            temperatures: None,
            supply_flow_m3h: curve.airflow_at(percent),
            extract_flow_m3h: curve.airflow_at(percent),
            power_w: curve.power_at(percent),
            efficiency_pct: 0.0,
        }
    }

    fn inputs(&self) -> StateInputs {
        StateInputs {
            fan_running: self.fan_speed != FanSpeed::Off,
            boost_tier: self.fan_speed == FanSpeed::Boost,
            bypass_open: self.bypass_open,
            defrosting: self.defrost_active,
        }
    }

    fn resettle(&mut self) -> Option<Transition> {
        let inputs = self.inputs();
        fsm::apply(&mut self.state, inputs)
    }

    /// Latest outdoor temperature, if any telemetry has arrived.
    pub fn outdoor_temp(&self) -> Option<f32> {
        self.temperatures.map(|t| t.outdoor)
    }

    /// Cold enough to ice the core while moving air and not already
    /// defrosting.
    pub fn needs_defrost(&self) -> bool {
        !self.defrost_active
            && self.state != UnitState::Idle
            && self.outdoor_temp().is_some_and(|t| t <= DEFROST_TRIGGER_C)
    }

    /// Select a fan tier; re-derives percent, power, flows and state.
    pub fn apply_fan_speed(&mut self, speed: FanSpeed, curve: &FanCurve) -> Option<Transition> {
        self.fan_speed = speed;
        self.fan_speed_percent = speed.percent();
        self.power_w = curve.power_at(self.fan_speed_percent);
        self.supply_flow_m3h = curve.airflow_at(self.fan_speed_percent);
        self.extract_flow_m3h = curve.airflow_at(self.fan_speed_percent);
        self.resettle()
    }

    /// Open or close the bypass valve.  While defrosting the valve moves
    /// but the state stays `defrosting`.
    pub fn set_bypass(&mut self, open: bool) -> ControlChange {
        let valve_moved = self.bypass_open != open;
        self.bypass_open = open;
        ControlChange {
            valve_moved,
            transition: self.resettle(),
        }
    }

    /// Enter a defrost cycle.  `None` if one is already running.
    ///
    /// The bypass valve is closed so warm extract air passes the core.
    pub fn begin_defrost(&mut self) -> Option<ControlChange> {
        if self.defrost_active {
            return None;
        }
        let valve_moved = self.bypass_open;
        self.bypass_open = false;
        self.defrost_active = true;
        Some(ControlChange {
            valve_moved,
            transition: self.resettle(),
        })
    }

    /// Leave the defrost cycle.  `None` if no cycle was running.
    pub fn end_defrost(&mut self) -> Option<Option<Transition>> {
        if !self.defrost_active {
            return None;
        }
        self.defrost_active = false;
        Some(self.resettle())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Arena of unit records keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitRegistry {
    units: BTreeMap<String, HrvUnit>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent create.  Returns the record and whether it was new;
    /// an existing id is returned unchanged.
    pub fn register(
        &mut self,
        id: &str,
        name: &str,
        zone_ids: Vec<String>,
        curve: &FanCurve,
    ) -> (&HrvUnit, bool) {
        let created = !self.units.contains_key(id);
        if created {
            info!("Registry: unit '{}' ({}) registered", id, name);
        }
        let unit = self
            .units
            .entry(id.to_owned())
            .or_insert_with(|| HrvUnit::new(id, name, zone_ids, curve));
        (unit, created)
    }

    /// Remove a unit; returns the removed record.
    pub fn remove(&mut self, id: &str) -> Option<HrvUnit> {
        let removed = self.units.remove(id);
        if removed.is_some() {
            info!("Registry: unit '{}' removed", id);
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&HrvUnit> {
        self.units.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut HrvUnit> {
        self.units.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.units.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HrvUnit> {
        self.units.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut HrvUnit> {
        self.units.values_mut()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
