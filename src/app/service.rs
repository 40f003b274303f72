//! Application service: the hexagonal core.
//!
//! [`VentilationController`] owns the [`ControlContext`], the scheduler and
//! the three driven ports.  It exposes a clean, transport-agnostic API:
//! every registry mutation, every telemetry update and every scheduled
//! pass goes through it, and every mutation is followed by a save of the
//! whole context.
//!
//! ```text
//!  dispatch() ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │     VentilationController     │
//!  tick() ──────▶ │  Scheduler · Context · Engines│ ──▶ StoragePort
//!                 └──────────────────────────────┘
//!                               ▲
//!                             Clock
//! ```

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::Value;

use crate::balancer::{self, BalanceReport};
use crate::config::ControllerConfig;
use crate::context::{self, CO2_SETPOINT_RANGE, ControlContext, HUMIDITY_SETPOINT_RANGE};
use crate::demand::{self, AirQualityOutcome, IndoorAirReading, OutdoorAirReading};
use crate::efficiency::{self, EfficiencyEntry};
use crate::energy::{EnergySavings, Tariff};
use crate::error::{ControlError, Result};
use crate::filters::{FilterAlert, FilterPair, FilterType, PressureUpdate};
use crate::fsm::{Transition, UnitState};
use crate::humidity::{self, CondensationAssessment};
use crate::scheduler::{ScheduledTask, Scheduler};
use crate::seasonal::{self, BypassDecision, Season, SeasonalMode};
use crate::units::{self, ControlChange, FanCurve, FanSpeed, HrvUnit, TemperatureReadings};
use crate::zones::VentilationZone;

use super::commands::InboundEvent;
use super::events::AppEvent;
use super::payloads::{self, AirQualityPayload, EnergyPayload, HvacPayload, SystemSummary};
use super::ports::{Clock, ConfigError, EventSink, ScheduleFiredKind, SchedulerDelegate, StoragePort};

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Collects fired tasks so they run after the scheduler releases its borrow.
#[derive(Default)]
struct FiredTasks(Vec<ScheduledTask>);

impl SchedulerDelegate for FiredTasks {
    fn on_schedule_fired(&mut self, task: &ScheduledTask, _kind: ScheduleFiredKind) {
        self.0.push(task.clone());
    }
}

// ───────────────────────────────────────────────────────────────
// VentilationController
// ───────────────────────────────────────────────────────────────

/// The controller orchestrates all domain logic.
pub struct VentilationController<S: StoragePort, C: Clock, E: EventSink> {
    config: ControllerConfig,
    curve: FanCurve,
    tariff: Tariff,
    ctx: ControlContext,
    scheduler: Scheduler,
    storage: S,
    clock: C,
    sink: E,
    last_tick: DateTime<Utc>,
    running: bool,
}

impl<S: StoragePort, C: Clock, E: EventSink> VentilationController<S, C, E> {
    /// Construct the controller, restore persisted state and arm the
    /// five periodic passes.
    ///
    /// A missing blob is a cold start; an unreadable one is logged and
    /// also treated as a cold start.  Units restored mid-defrost get a
    /// fresh completion timer.
    pub fn new(config: ControllerConfig, storage: S, clock: C, sink: E) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        let now = clock.now();
        let ctx = load_context(&storage, &config, now);

        let mut scheduler = Scheduler::new();
        scheduler.add_periodic(ScheduledTask::Monitor, config.monitor_interval_secs);
        scheduler.add_periodic(ScheduledTask::FilterSweep, config.filter_sweep_interval_secs);
        scheduler.add_periodic(ScheduledTask::EnergyIntegration, config.energy_interval_secs);
        scheduler.add_periodic(ScheduledTask::DefrostCheck, config.defrost_check_interval_secs);
        scheduler.add_periodic(ScheduledTask::ZoneBalance, config.balance_interval_secs);
        for unit in ctx.units.iter().filter(|u| u.defrost_active) {
            scheduler.add_one_shot(
                ScheduledTask::DefrostComplete(unit.id.clone()),
                config.defrost_duration_secs,
            );
        }

        let curve = FanCurve {
            power_w: config.nominal_fan_power_w,
            airflow_m3h: config.nominal_airflow_m3h,
        };
        let tariff = Tariff {
            rate_per_kwh: config.energy_rate_per_kwh,
            co2_kg_per_kwh: config.co2_kg_per_kwh,
        };

        info!(
            "Controller started: {} unit(s), {} zone(s), mode {}",
            ctx.units.len(),
            ctx.zones.len(),
            ctx.seasonal_mode
        );

        Ok(Self {
            config,
            curve,
            tariff,
            ctx,
            scheduler,
            storage,
            clock,
            sink,
            last_tick: now,
            running: true,
        })
    }

    // ── Scheduling ────────────────────────────────────────────

    /// Advance the scheduler by the wall-clock time elapsed since the
    /// previous tick and run every pass that came due.
    /// Returns the number of passes run.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let elapsed = (now - self.last_tick).num_milliseconds() as f64 / 1000.0;
        self.last_tick = now;
        if !self.running {
            return 0;
        }

        let mut fired = FiredTasks::default();
        self.scheduler.tick(elapsed, &mut fired);
        for task in &fired.0 {
            self.run_task(task);
        }
        if !fired.0.is_empty() {
            self.persist();
        }
        fired.0.len()
    }

    /// Run one scheduled pass immediately.  Does not persist.
    pub fn run_task(&mut self, task: &ScheduledTask) {
        match task {
            ScheduledTask::Monitor => self.monitor_pass(),
            ScheduledTask::FilterSweep => self.filter_sweep(),
            ScheduledTask::EnergyIntegration => {
                let dt_hours = f64::from(self.config.energy_interval_secs) / 3600.0;
                let now = self.clock.now();
                self.ctx.energy.accumulate(&self.ctx.units, dt_hours, now, self.tariff);
            }
            ScheduledTask::DefrostCheck => self.defrost_check(),
            ScheduledTask::ZoneBalance => {
                balancer::balance(&mut self.ctx.zones, &self.ctx.units);
            }
            ScheduledTask::DefrostComplete(unit_id) => self.complete_defrost(unit_id),
        }
    }

    /// Stop every schedule and flush the final state.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.scheduler.set_enabled(false);
        self.scheduler.clear();
        self.sink.emit(&AppEvent::Shutdown);
        self.persist();
        info!("Controller shut down");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of live schedules (periodic passes plus pending defrost timers).
    pub fn scheduled_task_count(&self) -> usize {
        self.scheduler.active_count()
    }

    // ── Unit registry ─────────────────────────────────────────

    /// Idempotent registration.  A new unit gets a fresh filter pair.
    pub fn register_unit(&mut self, unit_id: &str, name: &str, zone_ids: Vec<String>) -> HrvUnit {
        let (unit, created) = self.ctx.units.register(unit_id, name, zone_ids, &self.curve);
        let unit = unit.clone();
        if created {
            let now = self.clock.now();
            self.ctx.filters.install(unit_id, now, self.config.filter_lifespan_days);
            self.sink.emit(&AppEvent::UnitRegistered {
                unit_id: unit_id.to_owned(),
            });
            self.persist();
        }
        unit
    }

    /// Remove a unit, its filters and any pending defrost completion.
    pub fn remove_unit(&mut self, unit_id: &str) -> bool {
        if self.ctx.units.remove(unit_id).is_none() {
            return false;
        }
        self.ctx.filters.remove(unit_id);
        self.scheduler
            .cancel(&ScheduledTask::DefrostComplete(unit_id.to_owned()));
        self.sink.emit(&AppEvent::UnitRemoved {
            unit_id: unit_id.to_owned(),
        });
        self.persist();
        true
    }

    /// Select a fan tier by name (`off|low|medium|high|boost`).
    pub fn set_fan_speed(&mut self, unit_id: &str, speed: &str) -> Result<UnitState> {
        let speed: FanSpeed = speed.parse()?;
        let unit = self.ctx.units.get_mut(unit_id).ok_or(ControlError::UnknownUnit)?;
        let transition = unit.apply_fan_speed(speed, &self.curve);
        let state = unit.state;
        info!("Registry: '{}' fan → {} ({}%)", unit_id, speed.name(), speed.percent());
        emit_transition(&mut self.sink, unit_id, transition);
        self.persist();
        Ok(state)
    }

    /// Open or close the bypass valve.
    pub fn set_bypass(&mut self, unit_id: &str, open: bool) -> Result<UnitState> {
        let unit = self.ctx.units.get_mut(unit_id).ok_or(ControlError::UnknownUnit)?;
        let change = unit.set_bypass(open);
        let state = unit.state;
        emit_change(&mut self.sink, unit_id, open, change);
        self.persist();
        Ok(state)
    }

    /// Start a defrost cycle.  `Ok(false)` if one is already running.
    pub fn trigger_defrost(&mut self, unit_id: &str) -> Result<bool> {
        if !self.ctx.units.contains(unit_id) {
            return Err(ControlError::UnknownUnit);
        }
        let started = self.start_defrost(unit_id);
        if started {
            self.persist();
        }
        Ok(started)
    }

    // ── Telemetry ─────────────────────────────────────────────

    /// Store the four probe temperatures and return the new efficiency.
    pub fn update_temperatures(&mut self, unit_id: &str, readings: TemperatureReadings) -> Result<f32> {
        let efficiency = self.store_temperatures(unit_id, readings, None, None)?;
        self.persist();
        Ok(efficiency)
    }

    /// Record a filter differential-pressure reading.
    pub fn update_filter_pressure(
        &mut self,
        unit_id: &str,
        filter_type: FilterType,
        pressure_pa: f32,
    ) -> Result<PressureUpdate> {
        let now = self.clock.now();
        let update = self
            .ctx
            .filters
            .update_pressure(unit_id, filter_type, pressure_pa, now)?;
        if update.newly_due {
            self.sink.emit(&AppEvent::FilterReplacementDue {
                unit_id: unit_id.to_owned(),
                filter_type,
            });
        }
        self.persist();
        Ok(update)
    }

    /// Reset a filter to its just-installed state.
    pub fn replace_filter(&mut self, unit_id: &str, filter_type: FilterType) -> Result<()> {
        let now = self.clock.now();
        self.ctx.filters.replace(unit_id, filter_type, now)?;
        self.sink.emit(&AppEvent::FilterReplaced {
            unit_id: unit_id.to_owned(),
            filter_type,
        });
        self.persist();
        Ok(())
    }

    // ── Zones ─────────────────────────────────────────────────

    /// Idempotent zone registration.
    pub fn register_zone(&mut self, zone_id: &str, name: &str) -> VentilationZone {
        let (zone, created) = self.ctx.zones.register(zone_id, name);
        let zone = zone.clone();
        if created {
            self.sink.emit(&AppEvent::ZoneRegistered {
                zone_id: zone_id.to_owned(),
            });
            self.persist();
        }
        zone
    }

    pub fn remove_zone(&mut self, zone_id: &str) -> bool {
        if self.ctx.zones.remove(zone_id).is_none() {
            return false;
        }
        self.sink.emit(&AppEvent::ZoneRemoved {
            zone_id: zone_id.to_owned(),
        });
        self.persist();
        true
    }

    /// Apply an occupancy event; returns the new target flow (m³/h).
    pub fn update_occupancy(&mut self, zone_id: &str, occupied: bool, occupant_count: u32) -> Result<f32> {
        let zone = self.ctx.zones.get_mut(zone_id).ok_or(ControlError::UnknownZone)?;
        zone.set_occupancy(occupied, occupant_count);
        let target = zone.target_flow_m3h;
        debug!("DCV: zone '{}' occupancy {} ({}) → {:.0} m³/h", zone_id, occupied, occupant_count, target);
        self.persist();
        Ok(target)
    }

    pub fn update_indoor_air_quality(
        &mut self,
        zone_id: &str,
        reading: IndoorAirReading,
    ) -> Result<AirQualityOutcome> {
        if !reading.is_plausible() {
            return Err(ControlError::ReadingOutOfRange);
        }
        let zone = self.ctx.zones.get_mut(zone_id).ok_or(ControlError::UnknownZone)?;
        let outcome = demand::apply_indoor_reading(zone, &reading, self.ctx.outdoor_air.as_ref());
        self.persist();
        Ok(outcome)
    }

    /// Cache the latest outdoor reading, stamped with the current time.
    pub fn update_outdoor_air_quality(
        &mut self,
        co2_ppm: f32,
        pm25: f32,
        temperature_c: f32,
        humidity_pct: f32,
    ) -> Result<OutdoorAirReading> {
        if !demand::outdoor_values_plausible(co2_ppm, pm25, temperature_c, humidity_pct) {
            return Err(ControlError::ReadingOutOfRange);
        }
        let reading = OutdoorAirReading {
            co2_ppm,
            pm25,
            temperature_c,
            humidity_pct,
            recorded_at: self.clock.now(),
        };
        self.ctx.outdoor_air = Some(reading);
        self.persist();
        Ok(reading)
    }

    /// Dew-point evaluation of one zone, applying the corrective action.
    pub fn evaluate_condensation_risk(&mut self, zone_id: &str) -> Result<CondensationAssessment> {
        let outdoor = self.ctx.outdoor_temperature();
        let zone = self.ctx.zones.get_mut(zone_id).ok_or(ControlError::UnknownZone)?;
        let assessment = humidity::evaluate_zone(zone, outdoor);
        self.persist();
        Ok(assessment)
    }

    // ── Modes & setpoints ─────────────────────────────────────

    /// Set the seasonal mode by name and re-apply the strategy at once.
    pub fn set_seasonal_mode(&mut self, mode: &str) -> Result<Season> {
        let mode: SeasonalMode = mode.parse()?;
        Ok(self.apply_seasonal_mode(mode))
    }

    pub fn set_co2_setpoint(&mut self, ppm: f32) -> Result<()> {
        if !context::within(CO2_SETPOINT_RANGE, ppm) {
            return Err(ControlError::SetpointOutOfRange("co2 setpoint must be 400–1500 ppm"));
        }
        self.ctx.co2_setpoint_ppm = ppm;
        info!("DCV: CO2 setpoint {:.0} ppm", ppm);
        self.persist();
        Ok(())
    }

    pub fn set_humidity_setpoint(&mut self, pct: f32) -> Result<()> {
        if !context::within(HUMIDITY_SETPOINT_RANGE, pct) {
            return Err(ControlError::SetpointOutOfRange("humidity setpoint must be 20–70 %"));
        }
        self.ctx.humidity_setpoint_pct = pct;
        info!("Humidity: setpoint {:.0}%", pct);
        self.persist();
        Ok(())
    }

    /// Close the current accumulation period; returns its totals.
    pub fn reset_energy_savings(&mut self) -> EnergySavings {
        let now = self.clock.now();
        let prior = self.ctx.energy.reset(now);
        self.sink.emit(&AppEvent::EnergySavingsReset(prior.clone()));
        self.persist();
        prior
    }

    // ── Inbound dispatch ──────────────────────────────────────

    /// Single entry point for external telemetry, keyed by event type.
    pub fn dispatch(&mut self, event_type: &str, payload: Value) -> Result<()> {
        let event = InboundEvent::parse(event_type, payload)?;
        self.handle_event(event)
    }

    /// Apply an already-decoded inbound event.
    pub fn handle_event(&mut self, event: InboundEvent) -> Result<()> {
        match event {
            InboundEvent::Temperature(t) => {
                self.store_temperatures(&t.unit_id, t.readings(), t.supply_flow, t.extract_flow)?;
                self.persist();
            }
            InboundEvent::IndoorAirQuality(aq) => {
                self.update_indoor_air_quality(&aq.zone_id, aq.reading())?;
            }
            InboundEvent::OutdoorAirQuality(o) => {
                self.update_outdoor_air_quality(o.co2, o.pm25, o.temperature, o.humidity)?;
            }
            InboundEvent::Occupancy(o) => {
                self.update_occupancy(&o.zone_id, o.occupied, o.count)?;
            }
            InboundEvent::HvacMode(h) => match h.mode.as_str() {
                "cooling" => {
                    self.apply_seasonal_mode(SeasonalMode::Summer);
                }
                "heating" => {
                    self.apply_seasonal_mode(SeasonalMode::Winter);
                }
                other => debug!("Seasonal: HVAC mode '{}' ignored", other),
            },
            InboundEvent::FilterPressure(f) => {
                let filter_type: FilterType = f.filter_type.parse()?;
                self.update_filter_pressure(&f.unit_id, filter_type, f.pressure)?;
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn unit(&self, unit_id: &str) -> Option<HrvUnit> {
        self.ctx.units.get(unit_id).cloned()
    }

    pub fn units(&self) -> Vec<HrvUnit> {
        self.ctx.units.iter().cloned().collect()
    }

    pub fn zone(&self, zone_id: &str) -> Option<VentilationZone> {
        self.ctx.zones.get(zone_id).cloned()
    }

    pub fn zones(&self) -> Vec<VentilationZone> {
        self.ctx.zones.iter().cloned().collect()
    }

    pub fn filters(&self, unit_id: &str) -> Option<FilterPair> {
        self.ctx.filters.pair(unit_id).cloned()
    }

    pub fn filters_needing_replacement(&self) -> Vec<FilterAlert> {
        self.ctx.filters.needing_replacement()
    }

    pub fn efficiency_report(&self) -> Vec<EfficiencyEntry> {
        efficiency::report(&self.ctx.units)
    }

    pub fn seasonal_mode(&self) -> SeasonalMode {
        self.ctx.seasonal_mode
    }

    /// The behaviour `auto` currently resolves to.
    pub fn resolved_season(&self) -> Season {
        seasonal::resolve(self.ctx.seasonal_mode, &self.ctx.units)
    }

    pub fn co2_setpoint(&self) -> f32 {
        self.ctx.co2_setpoint_ppm
    }

    pub fn humidity_setpoint(&self) -> f32 {
        self.ctx.humidity_setpoint_pct
    }

    pub fn energy_savings(&self) -> EnergySavings {
        self.ctx.energy.clone()
    }

    pub fn outdoor_air(&self) -> Option<OutdoorAirReading> {
        self.ctx.outdoor_air
    }

    /// Read-only view of the whole context.
    pub fn context(&self) -> &ControlContext {
        &self.ctx
    }

    pub fn hvac_payload(&self) -> HvacPayload {
        payloads::hvac(&self.ctx)
    }

    pub fn air_quality_payload(&self) -> AirQualityPayload {
        payloads::air_quality(&self.ctx)
    }

    pub fn energy_payload(&self) -> EnergyPayload {
        payloads::energy(&self.ctx)
    }

    pub fn system_summary(&self) -> SystemSummary {
        payloads::summary(&self.ctx)
    }

    /// Run a balancing pass now and return its report.
    pub fn balance_zones(&mut self) -> BalanceReport {
        let report = balancer::balance(&mut self.ctx.zones, &self.ctx.units);
        self.persist();
        report
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    // ── Internal ──────────────────────────────────────────────

    fn store_temperatures(
        &mut self,
        unit_id: &str,
        readings: TemperatureReadings,
        supply_flow: Option<f32>,
        extract_flow: Option<f32>,
    ) -> Result<f32> {
        let flows_ok = [supply_flow, extract_flow]
            .into_iter()
            .flatten()
            .all(units::flow_is_plausible);
        if !readings.is_plausible() || !flows_ok {
            return Err(ControlError::ReadingOutOfRange);
        }
        let unit = self.ctx.units.get_mut(unit_id).ok_or(ControlError::UnknownUnit)?;
        unit.temperatures = Some(readings);
        unit.efficiency_pct =
            efficiency::recovery_efficiency(readings.supply, readings.extract, readings.outdoor);
        if let Some(flow) = supply_flow {
            unit.supply_flow_m3h = flow;
        }
        if let Some(flow) = extract_flow {
            unit.extract_flow_m3h = flow;
        }
        debug!("Registry: '{}' efficiency {:.1}%", unit_id, unit.efficiency_pct);
        Ok(unit.efficiency_pct)
    }

    fn apply_seasonal_mode(&mut self, mode: SeasonalMode) -> Season {
        let changed = self.ctx.seasonal_mode != mode;
        self.ctx.seasonal_mode = mode;
        let season = seasonal::resolve(mode, &self.ctx.units);
        let decisions = seasonal::apply_strategy(&mut self.ctx.units, season);
        emit_decisions(&mut self.sink, &decisions);
        if changed {
            info!("Seasonal: mode {} ({:?})", mode, season);
            self.sink.emit(&AppEvent::SeasonalModeChanged { mode });
        }
        self.persist();
        season
    }

    /// Begin a defrost cycle and arm its completion timer.
    fn start_defrost(&mut self, unit_id: &str) -> bool {
        let Some(unit) = self.ctx.units.get_mut(unit_id) else {
            return false;
        };
        let Some(change) = unit.begin_defrost() else {
            debug!("Registry: '{}' already defrosting", unit_id);
            return false;
        };
        emit_change(&mut self.sink, unit_id, false, change);
        self.sink.emit(&AppEvent::DefrostStarted {
            unit_id: unit_id.to_owned(),
        });
        self.scheduler.add_one_shot(
            ScheduledTask::DefrostComplete(unit_id.to_owned()),
            self.config.defrost_duration_secs,
        );
        info!("Registry: '{}' defrost started", unit_id);
        true
    }

    fn complete_defrost(&mut self, unit_id: &str) {
        let Some(unit) = self.ctx.units.get_mut(unit_id) else {
            return;
        };
        let Some(transition) = unit.end_defrost() else {
            return;
        };
        let state = unit.state;
        emit_transition(&mut self.sink, unit_id, transition);
        self.sink.emit(&AppEvent::DefrostCompleted {
            unit_id: unit_id.to_owned(),
            state,
        });
        info!("Registry: '{}' defrost complete → {}", unit_id, state);
    }

    /// Seasonal strategy, then DCV, then humidity.
    fn monitor_pass(&mut self) {
        let season = seasonal::resolve(self.ctx.seasonal_mode, &self.ctx.units);
        let decisions = seasonal::apply_strategy(&mut self.ctx.units, season);
        emit_decisions(&mut self.sink, &decisions);
        demand::run_demand_control(&mut self.ctx.zones, self.ctx.co2_setpoint_ppm);
        humidity::run_humidity_control(&mut self.ctx.zones);
    }

    fn filter_sweep(&mut self) {
        let now = self.clock.now();
        for alert in self.ctx.filters.sweep_age(now) {
            self.sink.emit(&AppEvent::FilterReplacementDue {
                unit_id: alert.unit_id,
                filter_type: alert.filter_type,
            });
        }
    }

    fn defrost_check(&mut self) {
        let due: Vec<String> = self
            .ctx
            .units
            .iter()
            .filter(|u| u.needs_defrost())
            .map(|u| u.id.clone())
            .collect();
        for unit_id in due {
            self.start_defrost(&unit_id);
        }
    }

    /// Save the whole context.  Failures are logged; in-memory state
    /// stays authoritative until the next successful save.
    fn persist(&mut self) {
        let blob = match serde_json::to_string(&self.ctx) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Store: serialize failed: {}", e);
                return;
            }
        };
        if let Err(e) = self
            .storage
            .set(&self.config.storage_namespace, &self.config.storage_key, &blob)
        {
            warn!("Store: save failed: {}", e);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Helpers
// ───────────────────────────────────────────────────────────────

fn load_context(storage: &impl StoragePort, config: &ControllerConfig, now: DateTime<Utc>) -> ControlContext {
    match storage.get(&config.storage_namespace, &config.storage_key) {
        Ok(Some(blob)) => match serde_json::from_str::<ControlContext>(&blob) {
            Ok(ctx) => {
                info!(
                    "Store: restored {} unit(s), {} zone(s)",
                    ctx.units.len(),
                    ctx.zones.len()
                );
                ctx
            }
            Err(e) => {
                warn!("Store: state blob corrupted ({}), starting fresh", e);
                ControlContext::new(config, now)
            }
        },
        Ok(None) => {
            info!("Store: no saved state, cold start");
            ControlContext::new(config, now)
        }
        Err(e) => {
            warn!("Store: load failed ({}), starting fresh", e);
            ControlContext::new(config, now)
        }
    }
}

fn emit_transition(sink: &mut impl EventSink, unit_id: &str, transition: Option<Transition>) {
    if let Some(t) = transition {
        sink.emit(&AppEvent::UnitStateChanged {
            unit_id: unit_id.to_owned(),
            from: t.from,
            to: t.to,
        });
    }
}

fn emit_change(sink: &mut impl EventSink, unit_id: &str, open: bool, change: ControlChange) {
    if change.valve_moved {
        sink.emit(&AppEvent::BypassChanged {
            unit_id: unit_id.to_owned(),
            open,
        });
    }
    emit_transition(sink, unit_id, change.transition);
}

fn emit_decisions(sink: &mut impl EventSink, decisions: &[BypassDecision]) {
    for d in decisions {
        emit_change(sink, &d.unit_id, d.open, d.change);
    }
}
