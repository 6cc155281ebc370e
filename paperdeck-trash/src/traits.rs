//! Collaborator seams the coordinator consumes.
//!
//! The host platform supplies all four: a persisted key-value store
//! (shared preferences, a settings table, whatever survives process
//! death), a durable delayed-job scheduler with
//! at-most-one-instance-per-key semantics, the deletion backend, and
//! a notifier for the one failure class that must reach the user.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::records::DocumentId;

/// Persisted string store surviving process death.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>>;
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;
    async fn clear(&self, key: &str) -> Result<()>;
}

/// Durable delayed-job scheduler.
///
/// Jobs survive process death and run independently of the app's
/// in-memory state. `schedule_unique` replaces any job already queued
/// under the same key; `cancel` is best-effort — execution-time
/// re-validation, not cancellation, is the authoritative gate.
#[async_trait]
pub trait DeleteScheduler: Send + Sync {
    async fn schedule_unique(&self, key: &str, delay: Duration, doc: DocumentId) -> Result<()>;
    async fn cancel(&self, key: &str) -> Result<()>;
}

/// The backend call that permanently removes a document.
#[async_trait]
pub trait DocumentRemover: Send + Sync {
    async fn delete_permanently(&self, doc: DocumentId) -> Result<()>;
}

/// Surfaces deletion failures to the user. The user explicitly asked
/// for this data to be removed; a failure must not vanish into a log.
#[async_trait]
pub trait DeleteNotifier: Send + Sync {
    async fn deletion_failed(&self, doc: DocumentId, reason: &str);
}

/// Wall-clock seam. Countdown restarts are reconciled against
/// wall-clock elapsed time, so tests need to control it exactly.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
