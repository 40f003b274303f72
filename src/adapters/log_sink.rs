//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! whatever `log` backend the host installed.  A notification-service or
//! message-bus adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::UnitRegistered { unit_id } => info!("UNIT  | {} registered", unit_id),
            AppEvent::UnitRemoved { unit_id } => info!("UNIT  | {} removed", unit_id),
            AppEvent::UnitStateChanged { unit_id, from, to } => {
                info!("STATE | {} {} -> {}", unit_id, from, to);
            }
            AppEvent::BypassChanged { unit_id, open } => {
                info!("VALVE | {} bypass {}", unit_id, if *open { "open" } else { "closed" });
            }
            AppEvent::DefrostStarted { unit_id } => info!("FROST | {} started", unit_id),
            AppEvent::DefrostCompleted { unit_id, state } => {
                info!("FROST | {} complete, now {}", unit_id, state);
            }
            AppEvent::FilterReplacementDue { unit_id, filter_type } => {
                warn!("FILTR | {} {} filter due", unit_id, filter_type.name());
            }
            AppEvent::FilterReplaced { unit_id, filter_type } => {
                info!("FILTR | {} {} filter replaced", unit_id, filter_type.name());
            }
            AppEvent::SeasonalModeChanged { mode } => info!("SEASN | mode={}", mode),
            AppEvent::ZoneRegistered { zone_id } => info!("ZONE  | {} registered", zone_id),
            AppEvent::ZoneRemoved { zone_id } => info!("ZONE  | {} removed", zone_id),
            AppEvent::EnergySavingsReset(prior) => {
                info!(
                    "ENRGY | reset: {:.3} kWh, {:.2} saved, {:.2} kg CO2 ({} .. {})",
                    prior.total_kwh,
                    prior.cost_savings,
                    prior.co2_avoided_kg,
                    prior.period_start,
                    prior.period_end
                );
            }
            AppEvent::Shutdown => info!("STOP  | controller shut down"),
        }
    }
}
