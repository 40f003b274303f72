//! Cooperative scheduler.
//!
//! Drives the controller's five periodic passes and the one-shot defrost
//! completions.  Single-threaded: each fired pass runs to completion
//! before the next is dispatched.  The scheduler notifies a
//! [`SchedulerDelegate`] when schedules fire; the controller implements
//! the delegate by queuing the pass to run.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Schedules                                │
//! │                                                              │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ │
//! │  │ Monitor │ │ Filter  │ │ Energy  │ │ Defrost │ │ Balance │ │
//! │  │  5 min  │ │  24 h   │ │  5 min  │ │  2 min  │ │  3 min  │ │
//! │  └────┬────┘ └────┬────┘ └────┬────┘ └────┬────┘ └────┬────┘ │
//! │       │           │           │           │           │      │
//! │       │     ┌─────────────────────────┐   │           │      │
//! │       │     │ DefrostComplete(unit)   │   │           │      │
//! │       │     │ one-shot, 5 min         │   │           │      │
//! │       │     └────────────┬────────────┘   │           │      │
//! │       ▼                  ▼                ▼           ▼      │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                         │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          ▼                                   │
//! │              VentilationController::run_task()               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::app::ports::{ScheduleFiredKind, SchedulerDelegate};
use log::{debug, info, warn};

/// Most fires a periodic schedule makes in one tick when catching up.
/// Intervals missed beyond this are dropped.
pub const MAX_CATCH_UP_FIRES: u32 = 12;

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// What a schedule does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScheduledTask {
    /// Seasonal strategy, DCV and humidity passes.
    Monitor,
    /// Age-based filter sweep.
    FilterSweep,
    /// Energy-savings integration.
    EnergyIntegration,
    /// Auto-defrost trigger check.
    DefrostCheck,
    /// Zone-balancing pass.
    ZoneBalance,
    /// End the defrost cycle of the named unit.
    DefrostComplete(String),
}

impl ScheduledTask {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monitor => "monitor",
            Self::FilterSweep => "filter-sweep",
            Self::EnergyIntegration => "energy",
            Self::DefrostCheck => "defrost-check",
            Self::ZoneBalance => "zone-balance",
            Self::DefrostComplete(_) => "defrost-complete",
        }
    }
}

/// A single schedule entry.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub task: ScheduledTask,
    /// Type of schedule.
    pub kind: ScheduleKind,
    /// Whether this schedule is currently enabled.
    pub enabled: bool,
}

/// The type of schedule determines how and when it fires.
#[derive(Debug, Clone, Copy)]
pub enum ScheduleKind {
    /// Fire every `interval_secs` seconds.
    Periodic { interval_secs: u32 },
    /// Fire once after `delay_secs`, then drop out of the scheduler.
    OneShot { delay_secs: u32 },
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// The scheduler engine.
///
/// Decoupled from the engines it drives: when a schedule fires it calls
/// the [`SchedulerDelegate`] rather than touching controller state, so
/// the scheduler is testable on its own.
pub struct Scheduler {
    entries: Vec<ScheduleEntry>,
    /// Global enable flag.
    enabled: bool,
}

/// Internal bookkeeping for a live schedule.
#[derive(Debug, Clone)]
struct ScheduleEntry {
    schedule: Schedule,
    /// Seconds accumulated since last fire (Periodic) or since added (OneShot).
    elapsed_secs: f64,
    /// Whether the schedule has fired (for OneShot).
    fired: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            enabled: true,
        }
    }

    /// Add a schedule.  A one-shot for a task that is already pending is
    /// not duplicated; returns `false` in that case.
    pub fn add(&mut self, schedule: Schedule) -> bool {
        if self.contains(&schedule.task) {
            debug!("Scheduler: '{}' already scheduled", schedule.task.label());
            return false;
        }
        info!("Scheduler: added '{}' ({:?})", schedule.task.label(), schedule.kind);
        self.entries.push(ScheduleEntry {
            schedule,
            elapsed_secs: 0.0,
            fired: false,
        });
        true
    }

    /// Convenience: add an enabled periodic schedule.
    pub fn add_periodic(&mut self, task: ScheduledTask, interval_secs: u32) -> bool {
        self.add(Schedule {
            task,
            kind: ScheduleKind::Periodic { interval_secs },
            enabled: true,
        })
    }

    /// Convenience: add an enabled one-shot schedule.
    pub fn add_one_shot(&mut self, task: ScheduledTask, delay_secs: u32) -> bool {
        self.add(Schedule {
            task,
            kind: ScheduleKind::OneShot { delay_secs },
            enabled: true,
        })
    }

    /// Remove the schedule for `task`.  Returns whether one was removed.
    pub fn cancel(&mut self, task: &ScheduledTask) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.schedule.task != task);
        let removed = self.entries.len() != before;
        if removed {
            info!("Scheduler: cancelled '{}'", task.label());
        }
        removed
    }

    /// Whether a schedule for `task` is pending.
    pub fn contains(&self, task: &ScheduledTask) -> bool {
        self.entries.iter().any(|e| &e.schedule.task == task)
    }

    /// Drop every schedule.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Enable or disable the entire scheduler.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Advance the scheduler by `elapsed_secs` of wall-clock time.
    ///
    /// A periodic schedule fires once for every whole interval elapsed,
    /// up to [`MAX_CATCH_UP_FIRES`]; any further missed intervals are
    /// dropped and the cadence restarts from now.  Fired one-shots are
    /// removed.
    pub fn tick(&mut self, elapsed_secs: f64, delegate: &mut dyn SchedulerDelegate) {
        if !self.enabled || elapsed_secs <= 0.0 {
            return;
        }

        for entry in &mut self.entries {
            if !entry.schedule.enabled {
                continue;
            }
            entry.elapsed_secs += elapsed_secs;

            match entry.schedule.kind {
                ScheduleKind::Periodic { interval_secs } => {
                    let interval = f64::from(interval_secs.max(1));
                    let mut fires = 0;
                    while entry.elapsed_secs >= interval && fires < MAX_CATCH_UP_FIRES {
                        debug!(
                            "Scheduler: '{}' periodic fire (every {}s)",
                            entry.schedule.task.label(),
                            interval_secs
                        );
                        delegate.on_schedule_fired(&entry.schedule.task, ScheduleFiredKind::Periodic);
                        entry.elapsed_secs -= interval;
                        fires += 1;
                    }
                    if entry.elapsed_secs >= interval {
                        warn!(
                            "Scheduler: '{}' dropped {:.0} missed interval(s)",
                            entry.schedule.task.label(),
                            (entry.elapsed_secs / interval).floor()
                        );
                        entry.elapsed_secs %= interval;
                    }
                }

                ScheduleKind::OneShot { delay_secs } => {
                    if !entry.fired && entry.elapsed_secs >= f64::from(delay_secs) {
                        info!(
                            "Scheduler: '{}' one-shot fired (after {}s)",
                            entry.schedule.task.label(),
                            delay_secs
                        );
                        delegate.on_schedule_fired(&entry.schedule.task, ScheduleFiredKind::OneShot);
                        entry.fired = true;
                    }
                }
            }
        }

        self.entries.retain(|e| !e.fired);
    }

    /// Number of active (enabled) schedules.
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.schedule.enabled).count()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
