//! Mock port adapters for integration tests.
//!
//! Records every emitted event so tests can assert on the full
//! notification history, and bundles the in-memory store and manual
//! clock into one harness.

use chrono::{DateTime, TimeZone, Utc};
use hrv_controller::adapters::clock::ManualClock;
use hrv_controller::adapters::memory_store::MemoryStore;
use hrv_controller::app::events::AppEvent;
use hrv_controller::app::ports::EventSink;
use hrv_controller::{ControllerConfig, VentilationController};

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|&e| pred(e)).count()
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

pub type TestController = VentilationController<MemoryStore, ManualClock, RecordingSink>;

pub struct Harness {
    pub ctl: TestController,
    pub clock: ManualClock,
    pub store: MemoryStore,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 12, 6, 0, 0).unwrap()
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new(), ManualClock::new(start_time()))
    }

    pub fn with_store(store: MemoryStore, clock: ManualClock) -> Self {
        let ctl = VentilationController::new(
            ControllerConfig::default(),
            store.clone(),
            clock.clone(),
            RecordingSink::default(),
        )
        .expect("default config is valid");
        Self { ctl, clock, store }
    }

    /// A second controller over the same store and clock, as after a restart.
    pub fn restart(&self) -> Self {
        Self::with_store(self.store.clone(), self.clock.clone())
    }

    /// Advance the clock in `step_secs` increments, ticking after each.
    pub fn run_for(&mut self, total_secs: i64, step_secs: i64) {
        let mut elapsed = 0;
        while elapsed < total_secs {
            self.clock.advance(chrono::Duration::seconds(step_secs));
            self.ctl.tick();
            elapsed += step_secs;
        }
    }

    pub fn events(&self) -> &[AppEvent] {
        &self.ctl.sink().events
    }

    pub fn saved_blob(&self) -> Option<String> {
        let config = ControllerConfig::default();
        self.store.raw(&config.storage_namespace, &config.storage_key)
    }
}
