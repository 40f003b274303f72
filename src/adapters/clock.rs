//! Clock adapters.
//!
//! - [`SystemClock`] reads the host wall clock.
//! - [`ManualClock`] is set and advanced by hand; clones share one
//!   instant, so a test can keep a handle after passing a clone to the
//!   controller and drive days of operation without sleeping.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

use crate::app::ports::Clock;

/// Wall-clock time from the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and simulations.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.now.set(instant);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
