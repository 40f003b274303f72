//! State-blob persistence: save on mutation, restore on start,
//! tolerate absence, corruption and write failures.

use hrv_controller::app::ports::StoragePort;
use hrv_controller::demand::IndoorAirReading;
use hrv_controller::filters::FilterType;
use hrv_controller::fsm::UnitState;
use hrv_controller::seasonal::SeasonalMode;
use hrv_controller::units::TemperatureReadings;
use hrv_controller::{ControlError, ControllerConfig};
use serde_json::json;

use super::mock_ports::Harness;

#[test]
fn every_mutation_is_saved() {
    let mut h = Harness::new();
    assert!(h.saved_blob().is_none(), "nothing saved before the first change");

    h.ctl.register_unit("u1", "Attic", vec!["z1".into()]);
    let first = h.saved_blob().unwrap();
    assert!(first.contains("\"u1\""));

    h.ctl.set_fan_speed("u1", "high").unwrap();
    let second = h.saved_blob().unwrap();
    assert_ne!(first, second);
    assert!(second.contains("\"high\""));
}

#[test]
fn restart_restores_whole_context() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", vec!["z1".into()]);
    h.ctl.register_zone("z1", "Living");
    h.ctl.update_occupancy("z1", true, 2).unwrap();
    h.ctl.set_seasonal_mode("summer").unwrap();
    h.ctl.set_co2_setpoint(950.0).unwrap();
    h.ctl.set_humidity_setpoint(45.0).unwrap();
    h.ctl.update_outdoor_air_quality(430.0, 9.0, 17.0, 55.0).unwrap();

    let restarted = h.restart();
    assert_eq!(restarted.ctl.context(), h.ctl.context());
    assert_eq!(restarted.ctl.seasonal_mode(), SeasonalMode::Summer);
    assert_eq!(restarted.ctl.zone("z1").unwrap().target_flow_m3h, 60.0);
    assert_eq!(restarted.ctl.co2_setpoint(), 950.0);
    assert_eq!(restarted.ctl.humidity_setpoint(), 45.0);
    assert!(restarted.ctl.filters("u1").is_some());
}

#[test]
fn corrupted_blob_means_cold_start() {
    let h = Harness::new();
    let config = ControllerConfig::default();
    let mut store = h.store.clone();
    store
        .set(&config.storage_namespace, &config.storage_key, "{not json")
        .unwrap();

    let restarted = h.restart();
    assert!(restarted.ctl.units().is_empty());
    assert_eq!(restarted.ctl.co2_setpoint(), 800.0);
    assert_eq!(restarted.ctl.seasonal_mode(), SeasonalMode::Auto);
}

#[test]
fn failed_save_keeps_in_memory_state() {
    let mut h = Harness::new();
    h.store.set_fail_writes(true);
    h.ctl.register_unit("u1", "Attic", Vec::new());
    assert!(h.ctl.unit("u1").is_some());
    assert!(h.saved_blob().is_none());

    // The next successful save carries everything.
    h.store.set_fail_writes(false);
    h.ctl.register_zone("z1", "Living");
    let blob = h.saved_blob().unwrap();
    assert!(blob.contains("\"u1\"") && blob.contains("\"z1\""));
}

#[test]
fn defrost_in_progress_survives_restart() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    h.ctl.trigger_defrost("u1").unwrap();

    let mut restarted = h.restart();
    assert_eq!(restarted.ctl.unit("u1").unwrap().state, UnitState::Defrosting);
    assert_eq!(restarted.ctl.scheduled_task_count(), 6);

    restarted.run_for(300, 60);
    assert_eq!(restarted.ctl.unit("u1").unwrap().state, UnitState::Active);
}

#[test]
fn shutdown_flushes_final_state() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    h.store.set_fail_writes(true);
    h.ctl.set_bypass("u1", true).unwrap();
    h.store.set_fail_writes(false);

    h.ctl.shutdown();
    assert!(!h.ctl.is_running());
    let restarted = h.restart();
    assert_eq!(restarted.ctl.unit("u1").unwrap().state, UnitState::Bypass);
}

#[test]
fn implausible_telemetry_never_reaches_the_blob() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", vec!["z1".into()]);
    h.ctl.register_zone("z1", "Living");
    let readings = TemperatureReadings {
        supply: 17.8,
        extract: 21.0,
        outdoor: 0.0,
        exhaust: 4.0,
    };
    h.ctl.update_temperatures("u1", readings).unwrap();
    let saved = h.saved_blob();

    // 1e39 is a valid JSON number but overflows f32 to infinity.
    assert_eq!(
        h.ctl.dispatch(
            "temperature",
            json!({ "unit_id": "u1", "supply": 1e39, "extract": 21.0, "outdoor": 0.0, "exhaust": 4.0 }),
        ),
        Err(ControlError::InvalidEvent)
    );
    assert_eq!(
        h.ctl.dispatch("indoor_air_quality", json!({ "zone_id": "z1", "co2": 1e39, "humidity": 50.0 })),
        Err(ControlError::InvalidEvent)
    );
    assert_eq!(
        h.ctl.update_temperatures("u1", TemperatureReadings { supply: f32::NAN, ..readings }),
        Err(ControlError::ReadingOutOfRange)
    );
    let smoky = IndoorAirReading {
        co2_ppm: f32::INFINITY,
        humidity_pct: 50.0,
        pm25: None,
        voc: None,
    };
    assert_eq!(
        h.ctl.update_indoor_air_quality("z1", smoky),
        Err(ControlError::ReadingOutOfRange)
    );
    assert_eq!(
        h.ctl.update_outdoor_air_quality(420.0, f32::NAN, 5.0, 60.0),
        Err(ControlError::ReadingOutOfRange)
    );
    assert_eq!(
        h.ctl.update_filter_pressure("u1", FilterType::Supply, f32::INFINITY),
        Err(ControlError::ReadingOutOfRange)
    );
    assert_eq!(h.saved_blob(), saved, "rejected readings are not saved");
    assert_eq!(h.ctl.unit("u1").unwrap().temperatures, Some(readings));

    h.run_for(600, 300);
    assert!(h.ctl.energy_savings().total_kwh.is_finite());

    let restarted = h.restart();
    assert_eq!(restarted.ctl.units().len(), 1);
    assert_eq!(restarted.ctl.zones().len(), 1);
    assert_eq!(restarted.ctl.context(), h.ctl.context());
}
