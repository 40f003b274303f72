//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ VentilationController (domain)
//! ```
//!
//! Driven adapters (state storage, wall clock, notification sinks)
//! implement these traits.  The
//! [`VentilationController`](super::service::VentilationController)
//! consumes them via generics, so the domain core never touches a file,
//! a socket or the system clock directly.
//!
//! ## Failure notes
//!
//! - **StoragePort** failures never abort the triggering state change;
//!   the controller logs them and keeps in-memory state authoritative.
//! - All port errors are typed; callers must handle every variant explicitly.

use chrono::{DateTime, Utc};

use crate::scheduler::ScheduledTask;

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ key-value store)
// ───────────────────────────────────────────────────────────────

/// Scoped string key-value storage for the controller state blob.
///
/// Keys are namespaced to prevent collisions with other subsystems
/// sharing the same host store.  A `set` must replace the previous value
/// atomically; a partially written blob is reported as corrupted on the
/// next load, which the controller treats as a cold start.
pub trait StoragePort {
    /// Read a value.  `Ok(None)` when the key has never been written.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock → domain)
// ───────────────────────────────────────────────────────────────

/// Source of wall-clock time.
///
/// Filter ages, accumulation periods and scheduler progress are all
/// measured against this port, so tests can drive days of operation
/// without sleeping.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / notification)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log lines, a
/// notification service, a message bus, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the engines)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a schedule fires.
///
/// The [`Scheduler`](crate::scheduler::Scheduler) only counts seconds;
/// it knows nothing about units, zones or engines.  The controller
/// collects fired tasks through this trait and runs the matching pass
/// once the scheduler has released its borrow.
pub trait SchedulerDelegate {
    /// Called when a schedule fires.
    ///
    /// * `task`: which pass (or which unit's defrost completion) is due.
    /// * `kind`: whether it was a periodic or a one-shot fire.
    fn on_schedule_fired(&mut self, task: &ScheduledTask, kind: ScheduleFiredKind);
}

/// Discriminant passed to [`SchedulerDelegate::on_schedule_fired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleFiredKind {
    /// A recurring periodic schedule fired.
    Periodic,
    /// A one-shot schedule fired (removed after).
    OneShot,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage backend is full.
    Full,
    /// Generic I/O error.
    IoError,
    /// Stored blob failed deserialization.
    Corrupted,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
            Self::Corrupted => write!(f, "stored state corrupted"),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for StorageError {}
