//! Controller scenarios driven through ticks and the dispatch entry point.

use hrv_controller::ControlError;
use hrv_controller::app::events::AppEvent;
use hrv_controller::filters::FilterType;
use hrv_controller::fsm::UnitState;
use hrv_controller::humidity::{CondensationRisk, HumidityAction};
use hrv_controller::scheduler::MAX_CATCH_UP_FIRES;
use hrv_controller::seasonal::{Season, SeasonalMode};
use hrv_controller::zones::{DAMPER_MAX_PCT, DAMPER_MIN_PCT};
use serde_json::json;

use super::mock_ports::Harness;

fn temps(h: &mut Harness, unit: &str, supply: f32, extract: f32, outdoor: f32) {
    h.ctl
        .dispatch(
            "temperature",
            json!({
                "unit_id": unit,
                "supply": supply,
                "extract": extract,
                "outdoor": outdoor,
                "exhaust": outdoor + 3.0,
            }),
        )
        .unwrap();
}

// ── Defrost ───────────────────────────────────────────────────

#[test]
fn defrost_reverts_to_active_after_five_minutes() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    assert_eq!(h.ctl.trigger_defrost("u1"), Ok(true));
    assert_eq!(h.ctl.unit("u1").unwrap().state, UnitState::Defrosting);

    h.run_for(240, 60);
    assert_eq!(h.ctl.unit("u1").unwrap().state, UnitState::Defrosting);

    h.run_for(60, 60);
    let unit = h.ctl.unit("u1").unwrap();
    assert_eq!(unit.state, UnitState::Active);
    assert!(!unit.defrost_active);
    assert_eq!(
        h.ctl.sink().count(|e| matches!(e, AppEvent::DefrostCompleted { .. })),
        1
    );
}

#[test]
fn defrost_on_stopped_fan_reverts_to_idle() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    h.ctl.set_fan_speed("u1", "off").unwrap();
    h.ctl.trigger_defrost("u1").unwrap();
    h.run_for(300, 300);
    let unit = h.ctl.unit("u1").unwrap();
    assert_eq!(unit.state, UnitState::Idle);
    assert!(!unit.defrost_active);
}

#[test]
fn cold_outdoor_air_triggers_defrost() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    h.ctl.register_unit("u2", "Garage", Vec::new());
    temps(&mut h, "u1", 10.0, 21.0, -8.0);
    temps(&mut h, "u2", 14.0, 21.0, -2.0);

    h.run_for(120, 60);
    assert_eq!(h.ctl.unit("u1").unwrap().state, UnitState::Defrosting);
    assert_eq!(h.ctl.unit("u2").unwrap().state, UnitState::Active);
    assert_eq!(
        h.ctl.sink().count(|e| matches!(e, AppEvent::DefrostStarted { .. })),
        1
    );

    // The next check does not restart a running cycle.
    h.run_for(120, 60);
    assert_eq!(
        h.ctl.sink().count(|e| matches!(e, AppEvent::DefrostStarted { .. })),
        1
    );
}

// ── Seasonal strategy ─────────────────────────────────────────

#[test]
fn summer_mode_opens_bypass_and_heating_closes_it() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    temps(&mut h, "u1", 20.0, 24.0, 18.0);

    assert_eq!(h.ctl.set_seasonal_mode("summer"), Ok(Season::Summer));
    let unit = h.ctl.unit("u1").unwrap();
    assert!(unit.bypass_open);
    assert_eq!(unit.state, UnitState::Bypass);
    assert!(h.events().contains(&AppEvent::BypassChanged {
        unit_id: "u1".into(),
        open: true,
    }));

    h.ctl.dispatch("hvac_mode", json!({ "mode": "heating" })).unwrap();
    assert_eq!(h.ctl.seasonal_mode(), SeasonalMode::Winter);
    assert_eq!(h.ctl.unit("u1").unwrap().state, UnitState::Active);

    // Unrecognised HVAC modes change nothing.
    h.ctl.dispatch("hvac_mode", json!({ "mode": "fan_only" })).unwrap();
    assert_eq!(h.ctl.seasonal_mode(), SeasonalMode::Winter);
}

#[test]
fn monitor_pass_applies_auto_mode() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    temps(&mut h, "u1", 21.0, 25.0, 20.0);
    assert_eq!(h.ctl.resolved_season(), Season::Summer);
    assert!(!h.ctl.unit("u1").unwrap().bypass_open);

    h.run_for(300, 60);
    assert!(h.ctl.unit("u1").unwrap().bypass_open);
}

// ── Zones & air quality ───────────────────────────────────────

#[test]
fn occupancy_and_air_quality_through_dispatch() {
    let mut h = Harness::new();
    h.ctl.register_zone("z1", "Living");

    h.ctl
        .dispatch("occupancy", json!({ "zone_id": "z1", "occupied": true, "count": 3 }))
        .unwrap();
    assert_eq!(h.ctl.zone("z1").unwrap().target_flow_m3h, 90.0);

    h.ctl
        .dispatch(
            "outdoor_air_quality",
            json!({ "co2": 420.0, "pm25": 6.0, "temperature": 8.0, "humidity": 70.0 }),
        )
        .unwrap();
    h.ctl
        .dispatch(
            "indoor_air_quality",
            json!({ "zone_id": "z1", "co2": 950.0, "humidity": 48.0, "pm25": 14.0 }),
        )
        .unwrap();
    let zone = h.ctl.zone("z1").unwrap();
    assert_eq!(zone.damper_position(), 60.0);
    assert!((zone.actual_flow_m3h - 54.0).abs() < 1e-3);
    assert_eq!(zone.pm25, Some(14.0));
}

#[test]
fn dispatch_rejects_bad_events_without_side_effects() {
    let mut h = Harness::new();
    h.ctl.register_zone("z1", "Living");
    let before = h.ctl.zones();

    assert_eq!(
        h.ctl.dispatch("window_opened", json!({ "zone_id": "z1" })),
        Err(ControlError::InvalidEvent)
    );
    assert_eq!(
        h.ctl.dispatch("occupancy", json!({ "zone_id": "z1", "occupied": "yes" })),
        Err(ControlError::InvalidEvent)
    );
    assert_eq!(
        h.ctl.dispatch("occupancy", json!({ "zone_id": "z9", "occupied": true })),
        Err(ControlError::UnknownZone)
    );
    assert_eq!(
        h.ctl.dispatch(
            "filter_pressure",
            json!({ "unit_id": "u1", "filter_type": "hepa", "pressure": 40.0 })
        ),
        Err(ControlError::InvalidEvent)
    );
    assert_eq!(h.ctl.zones(), before);
}

#[test]
fn condensation_scenario() {
    let mut h = Harness::new();
    h.ctl.register_zone("z1", "Bathroom");
    h.ctl
        .dispatch(
            "outdoor_air_quality",
            json!({ "co2": 420.0, "pm25": 6.0, "temperature": 10.0, "humidity": 80.0 }),
        )
        .unwrap();
    h.ctl
        .dispatch("indoor_air_quality", json!({ "zone_id": "z1", "co2": 700.0, "humidity": 75.0 }))
        .unwrap();

    let a = h.ctl.evaluate_condensation_risk("z1").unwrap();
    assert_eq!(a.risk, CondensationRisk::High);
    assert_eq!(a.action, HumidityAction::IncreaseVentilation);
    assert_eq!(a.damper_position_pct, 60.0);
    assert!((a.dew_point_c - 5.7).abs() < 0.2);
    assert_eq!(
        h.ctl.evaluate_condensation_risk("z9"),
        Err(ControlError::UnknownZone)
    );
}

#[test]
fn dampers_stay_clamped_over_a_day_of_passes() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    h.ctl.register_zone("z1", "Living");
    h.ctl.register_zone("z2", "Office");
    h.ctl.update_occupancy("z1", true, 3).unwrap();
    h.ctl
        .dispatch("indoor_air_quality", json!({ "zone_id": "z2", "co2": 1400.0, "humidity": 80.0 }))
        .unwrap();

    h.run_for(86_400, 600);
    for zone in h.ctl.zones() {
        let d = zone.damper_position();
        assert!((DAMPER_MIN_PCT..=DAMPER_MAX_PCT).contains(&d), "{} at {}", zone.id, d);
    }
    // Clean, over-supplied z1 sits on the lower stop; stuffy, humid z2
    // is held near fully open despite the balancer trimming it.
    assert_eq!(h.ctl.zone("z1").unwrap().damper_position(), DAMPER_MIN_PCT);
    assert!(h.ctl.zone("z2").unwrap().damper_position() > 80.0);
}

// ── Filters ───────────────────────────────────────────────────

#[test]
fn filter_sweep_flags_ageing_filters_once() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());

    h.clock.advance(chrono::Duration::days(167));
    h.ctl.tick();
    assert_eq!(h.ctl.filters_needing_replacement().len(), 2);
    assert_eq!(
        h.ctl.sink().count(|e| matches!(e, AppEvent::FilterReplacementDue { .. })),
        2
    );

    h.ctl.replace_filter("u1", FilterType::Supply).unwrap();
    let pair = h.ctl.filters("u1").unwrap();
    assert!(!pair.supply.replacement_due);
    assert_eq!(pair.supply.efficiency_pct, 100.0);
    assert!(pair.extract.replacement_due);
}

#[test]
fn clogged_filter_via_dispatch() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    h.ctl
        .dispatch(
            "filter_pressure",
            json!({ "unit_id": "u1", "filter_type": "extract", "pressure": 55.0 }),
        )
        .unwrap();
    let pair = h.ctl.filters("u1").unwrap();
    assert!(pair.extract.replacement_due);
    assert!((pair.extract.efficiency_pct - 40.0).abs() < 1e-3);
    assert!(h.events().contains(&AppEvent::FilterReplacementDue {
        unit_id: "u1".into(),
        filter_type: FilterType::Extract,
    }));
}

#[test]
fn removing_unit_drops_filters() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    assert!(h.ctl.remove_unit("u1"));
    assert!(h.ctl.filters("u1").is_none());
    assert!(!h.ctl.remove_unit("u1"));
    assert_eq!(
        h.ctl.replace_filter("u1", FilterType::Supply),
        Err(ControlError::UnknownUnit)
    );
}

// ── Energy ────────────────────────────────────────────────────

#[test]
fn energy_accumulates_over_ticks_and_resets() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    h.ctl
        .dispatch(
            "temperature",
            json!({
                "unit_id": "u1",
                "supply": 20.0, "extract": 22.0, "outdoor": 0.0, "exhaust": 3.0,
                "supply_flow": 100.0, "extract_flow": 100.0
            }),
        )
        .unwrap();

    h.run_for(300, 60);
    let kwh = h.ctl.energy_savings().total_kwh;
    assert!((kwh - 0.0558).abs() / 0.0558 < 0.01, "got {kwh}");

    let prior = h.ctl.reset_energy_savings();
    assert!((prior.total_kwh - kwh).abs() < 1e-12);
    assert_eq!(h.ctl.energy_savings().total_kwh, 0.0);
    assert!(matches!(h.ctl.sink().last(), Some(AppEvent::EnergySavingsReset(_))));
}

#[test]
fn year_long_clock_jump_books_bounded_savings() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", Vec::new());
    h.ctl
        .dispatch(
            "temperature",
            json!({
                "unit_id": "u1",
                "supply": 20.0, "extract": 22.0, "outdoor": 0.0, "exhaust": 3.0,
                "supply_flow": 100.0, "extract_flow": 100.0
            }),
        )
        .unwrap();

    h.clock.advance(chrono::Duration::days(365));
    let passes = h.ctl.tick();
    assert_eq!(passes, 5 * MAX_CATCH_UP_FIRES as usize);

    let expected = f64::from(MAX_CATCH_UP_FIRES) * 0.0558;
    let kwh = h.ctl.energy_savings().total_kwh;
    assert!((kwh - expected).abs() / expected < 0.01, "got {kwh}");
}

// ── Payloads ──────────────────────────────────────────────────

#[test]
fn summary_reflects_registries() {
    let mut h = Harness::new();
    h.ctl.register_unit("u1", "Attic", vec!["z1".into()]);
    h.ctl.register_unit("u2", "Garage", Vec::new());
    h.ctl.set_fan_speed("u2", "off").unwrap();
    h.ctl.register_zone("z1", "Living");
    h.ctl.set_co2_setpoint(900.0).unwrap();

    let s = h.ctl.system_summary();
    assert_eq!(s.unit_count, 2);
    assert_eq!(s.active_unit_count, 1);
    assert_eq!(s.zone_count, 1);
    assert_eq!(s.co2_setpoint_ppm, 900.0);
    assert_eq!(s.units.len(), 2);

    let aq = h.ctl.air_quality_payload();
    assert_eq!(aq.co2_setpoint_ppm, 900.0);
    assert_eq!(aq.zones.len(), 1);

    let hvac = h.ctl.hvac_payload();
    assert_eq!(hvac.units[1].fan_speed_percent, 0);

    let json = serde_json::to_string(&h.ctl.energy_payload()).unwrap();
    assert!(json.contains("total_power_w"));
}
