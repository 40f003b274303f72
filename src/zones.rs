//! Ventilation zones and their registry.
//!
//! A zone is one controlled space with a single damper.  The two laws
//! that every engine relies on live here: the damper clamp and the
//! occupancy flow law.

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Deserializer, Serialize};

/// Damper travel limits (% open).  The lower stop keeps a trickle of
/// air moving through every zone.
pub const DAMPER_MIN_PCT: f32 = 10.0;
pub const DAMPER_MAX_PCT: f32 = 100.0;

/// Background ventilation floor (m³/h).
pub const BACKGROUND_FLOW_M3H: f32 = 15.0;

/// Fresh-air allowance per occupant (m³/h).
pub const FLOW_PER_OCCUPANT_M3H: f32 = 30.0;

const INITIAL_DAMPER_PCT: f32 = 50.0;

/// Clamp a damper position to its mechanical travel.
pub fn clamp_damper(position: f32) -> f32 {
    position.clamp(DAMPER_MIN_PCT, DAMPER_MAX_PCT)
}

/// Restored damper positions go through the same clamp as live moves.
fn deserialize_damper<'de, D: Deserializer<'de>>(de: D) -> Result<f32, D::Error> {
    f32::deserialize(de).map(clamp_damper)
}

/// Target flow for a given occupancy.
pub fn target_flow_for(occupied: bool, occupant_count: u32) -> f32 {
    if occupied {
        (occupant_count as f32 * FLOW_PER_OCCUPANT_M3H).max(BACKGROUND_FLOW_M3H)
    } else {
        BACKGROUND_FLOW_M3H
    }
}

/// One controlled space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VentilationZone {
    pub id: String,
    pub name: String,
    pub target_flow_m3h: f32,
    pub actual_flow_m3h: f32,
    /// Always within [`DAMPER_MIN_PCT`, `DAMPER_MAX_PCT`].
    #[serde(deserialize_with = "deserialize_damper")]
    damper_position_pct: f32,
    pub co2_ppm: f32,
    pub humidity_pct: f32,
    /// Last-known PM2.5 (µg/m³); `None` until a reading carries it.
    pub pm25: Option<f32>,
    /// Last-known VOC index; informational only.
    pub voc: Option<f32>,
    pub occupied: bool,
    pub occupant_count: u32,
}

impl VentilationZone {
    fn new(id: &str, name: &str) -> Self {
        let target = target_flow_for(false, 0);
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            target_flow_m3h: target,
            actual_flow_m3h: target * INITIAL_DAMPER_PCT / 100.0,
            damper_position_pct: INITIAL_DAMPER_PCT,
            co2_ppm: 400.0,
            humidity_pct: 50.0,
            pm25: None,
            voc: None,
            occupied: false,
            occupant_count: 0,
        }
    }

    pub fn damper_position(&self) -> f32 {
        self.damper_position_pct
    }

    /// Move the damper, clamped.  Returns the applied position.
    /// A NaN position leaves the damper where it is.
    pub fn set_damper(&mut self, position: f32) -> f32 {
        if !position.is_nan() {
            self.damper_position_pct = clamp_damper(position);
        }
        self.damper_position_pct
    }

    /// Nudge the damper by `delta` points, clamped.
    pub fn adjust_damper(&mut self, delta: f32) -> f32 {
        self.set_damper(self.damper_position_pct + delta)
    }

    /// Actual flow delivered by the current damper against `base` (m³/h).
    pub fn recompute_flow_from(&mut self, base: f32) {
        self.actual_flow_m3h = base * self.damper_position_pct / 100.0;
    }

    /// Apply an occupancy event and re-derive the target flow.
    pub fn set_occupancy(&mut self, occupied: bool, occupant_count: u32) {
        self.occupied = occupied;
        self.occupant_count = if occupied { occupant_count } else { 0 };
        self.target_flow_m3h = target_flow_for(occupied, occupant_count);
    }
}

/// Arena of zone records keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneRegistry {
    zones: BTreeMap<String, VentilationZone>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent create; an existing id is returned unchanged.
    pub fn register(&mut self, id: &str, name: &str) -> (&VentilationZone, bool) {
        let created = !self.zones.contains_key(id);
        if created {
            info!("Registry: zone '{}' ({}) registered", id, name);
        }
        let zone = self
            .zones
            .entry(id.to_owned())
            .or_insert_with(|| VentilationZone::new(id, name));
        (zone, created)
    }

    pub fn remove(&mut self, id: &str) -> Option<VentilationZone> {
        let removed = self.zones.remove(id);
        if removed.is_some() {
            info!("Registry: zone '{}' removed", id);
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&VentilationZone> {
        self.zones.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut VentilationZone> {
        self.zones.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VentilationZone> {
        self.zones.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut VentilationZone> {
        self.zones.values_mut()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
