//! Application core: controller orchestration, zero direct I/O.
//!
//! This module wires the engines into one controller: inbound telemetry
//! dispatch, outbound events, query payloads and scheduling.  All
//! interaction with storage, time and notification delivery happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable with in-memory adapters.

pub mod commands;
pub mod events;
pub mod payloads;
pub mod ports;
pub mod service;
