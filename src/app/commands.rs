//! Inbound telemetry events.
//!
//! These represent readings and notifications pushed by the outside world
//! (sensor gateways, the building's HVAC controller, an operator console)
//! that the [`VentilationController`](super::service::VentilationController)
//! interprets through its single dispatch entry point.
//!
//! Wire shape: an event-type string plus a JSON payload object.
//!
//! ```text
//! { "type": "occupancy", "payload": { "zone_id": "z1", "occupied": true, "count": 3 } }
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::context::within;
use crate::demand::{self, IndoorAirReading};
use crate::error::{ControlError, Result};
use crate::filters::PRESSURE_RANGE_PA;
use crate::units::{self, TemperatureReadings};

/// Four probe temperatures of one unit, optionally with measured flows.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemperatureEvent {
    pub unit_id: String,
    pub supply: f32,
    pub extract: f32,
    pub outdoor: f32,
    pub exhaust: f32,
    #[serde(default)]
    pub supply_flow: Option<f32>,
    #[serde(default)]
    pub extract_flow: Option<f32>,
}

impl TemperatureEvent {
    pub fn readings(&self) -> TemperatureReadings {
        TemperatureReadings {
            supply: self.supply,
            extract: self.extract,
            outdoor: self.outdoor,
            exhaust: self.exhaust,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndoorAirEvent {
    pub zone_id: String,
    pub co2: f32,
    pub humidity: f32,
    #[serde(default)]
    pub pm25: Option<f32>,
    #[serde(default)]
    pub voc: Option<f32>,
}

impl IndoorAirEvent {
    pub fn reading(&self) -> IndoorAirReading {
        IndoorAirReading {
            co2_ppm: self.co2,
            humidity_pct: self.humidity,
            pm25: self.pm25,
            voc: self.voc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutdoorAirEvent {
    pub co2: f32,
    pub pm25: f32,
    pub temperature: f32,
    pub humidity: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OccupancyEvent {
    pub zone_id: String,
    pub occupied: bool,
    #[serde(default)]
    pub count: u32,
}

/// HVAC mode reported by the building controller (`cooling`, `heating`, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HvacModeEvent {
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterPressureEvent {
    pub unit_id: String,
    pub filter_type: String,
    pub pressure: f32,
}

/// Events that external adapters can push into the controller core.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Temperature(TemperatureEvent),
    IndoorAirQuality(IndoorAirEvent),
    OutdoorAirQuality(OutdoorAirEvent),
    Occupancy(OccupancyEvent),
    HvacMode(HvacModeEvent),
    FilterPressure(FilterPressureEvent),
}

fn payload<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|_| ControlError::InvalidEvent)
}

impl InboundEvent {
    /// Decode an event from its type tag and payload object.
    ///
    /// Numbers outside their plausible band (including values that only
    /// overflow to infinity once narrowed to `f32`) are rejected here.
    pub fn parse(event_type: &str, value: Value) -> Result<Self> {
        let event = match event_type {
            "temperature" => payload(value).map(Self::Temperature),
            "indoor_air_quality" => payload(value).map(Self::IndoorAirQuality),
            "outdoor_air_quality" => payload(value).map(Self::OutdoorAirQuality),
            "occupancy" => payload(value).map(Self::Occupancy),
            "hvac_mode" => payload(value).map(Self::HvacMode),
            "filter_pressure" => payload(value).map(Self::FilterPressure),
            _ => Err(ControlError::InvalidEvent),
        }?;
        if event.is_plausible() {
            Ok(event)
        } else {
            Err(ControlError::InvalidEvent)
        }
    }

    /// Whether every numeric field lies in its plausible band.
    pub fn is_plausible(&self) -> bool {
        match self {
            Self::Temperature(t) => {
                t.readings().is_plausible()
                    && [t.supply_flow, t.extract_flow]
                        .into_iter()
                        .flatten()
                        .all(units::flow_is_plausible)
            }
            Self::IndoorAirQuality(aq) => aq.reading().is_plausible(),
            Self::OutdoorAirQuality(o) => {
                demand::outdoor_values_plausible(o.co2, o.pm25, o.temperature, o.humidity)
            }
            Self::FilterPressure(f) => within(PRESSURE_RANGE_PA, f.pressure),
            Self::Occupancy(_) | Self::HvacMode(_) => true,
        }
    }

    /// Decode a `{ "type": ..., "payload": ... }` envelope from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(rename = "type")]
            event_type: String,
            #[serde(default)]
            payload: Value,
        }

        let envelope: Envelope =
            serde_json::from_slice(bytes).map_err(|_| ControlError::InvalidEvent)?;
        Self::parse(&envelope.event_type, envelope.payload)
    }

    /// The wire tag of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Temperature(_) => "temperature",
            Self::IndoorAirQuality(_) => "indoor_air_quality",
            Self::OutdoorAirQuality(_) => "outdoor_air_quality",
            Self::Occupancy(_) => "occupancy",
            Self::HvacMode(_) => "hvac_mode",
            Self::FilterPressure(_) => "filter_pressure",
        }
    }
}
