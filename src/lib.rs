//! Heat-recovery ventilation controller library.
//!
//! Models HRV/ERV units, the zones they serve and the control loops that
//! keep recovery efficiency, indoor air quality, humidity and filter
//! health in bounds.  The [`app::service::VentilationController`] is the
//! entry point; everything it touches outside the process goes through
//! the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod balancer;
pub mod config;
pub mod context;
pub mod control;
pub mod demand;
pub mod efficiency;
pub mod energy;
pub mod error;
pub mod filters;
pub mod fsm;
pub mod humidity;
pub mod scheduler;
pub mod seasonal;
pub mod units;
pub mod zones;

pub use app::service::VentilationController;
pub use config::ControllerConfig;
pub use error::{ControlError, Result};
