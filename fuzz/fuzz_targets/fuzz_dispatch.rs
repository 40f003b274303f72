//! Fuzz target: `InboundEvent::from_slice` → `VentilationController::handle_event`
//!
//! Drives arbitrary byte sequences through the inbound event decoder and,
//! when they decode, into a controller with one unit and one zone.
//! Asserts that nothing panics, that every zone damper stays within its
//! travel afterwards, and that the saved blob restores the same context.
//!
//! cargo fuzz run fuzz_dispatch

#![no_main]

use chrono::{TimeZone, Utc};
use hrv_controller::adapters::clock::ManualClock;
use hrv_controller::adapters::log_sink::LogEventSink;
use hrv_controller::adapters::memory_store::MemoryStore;
use hrv_controller::app::commands::InboundEvent;
use hrv_controller::zones::{DAMPER_MAX_PCT, DAMPER_MIN_PCT};
use hrv_controller::{ControllerConfig, VentilationController};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(event) = InboundEvent::from_slice(data) else {
        return;
    };

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let store = MemoryStore::new();
    let mut ctl = VentilationController::new(
        ControllerConfig::default(),
        store.clone(),
        clock.clone(),
        LogEventSink::new(),
    )
    .unwrap();
    ctl.register_unit("u1", "Unit", vec!["z1".into()]);
    ctl.register_zone("z1", "Zone");

    let _ = ctl.handle_event(event);
    ctl.balance_zones();

    for zone in ctl.zones() {
        let d = zone.damper_position();
        assert!((DAMPER_MIN_PCT..=DAMPER_MAX_PCT).contains(&d));
    }

    let restored =
        VentilationController::new(ControllerConfig::default(), store, clock, LogEventSink::new())
            .unwrap();
    assert_eq!(restored.context(), ctl.context());
});
