//! Per-document countdown-before-permanent-deletion.
//!
//! State machine per document: in trash → counting down → deleted, or
//! back to in-trash on undo. The persisted record is authoritative;
//! the scheduled job and the UI ticker are both derived from it.
//!
//! # Restart protocol
//!
//! After an interruption (app lock, process death), [`restore`] reads
//! every persisted record and recomputes its remaining time from the
//! wall clock. Elapsed countdowns get an immediate deletion job;
//! live ones get a job re-enqueued with the *remaining* delay and a
//! ticker resumed at the correct point. The delay is always derived
//! from `started_at`, never reset to the full duration — resetting
//! would let repeated interruptions postpone a deletion forever.
//!
//! # Execute-time re-validation
//!
//! Cancelling the scheduled job is not atomic with removing the
//! persisted record, so [`execute_due`] re-checks the store before
//! deleting. A job that finds its record gone is a normal no-op.
//!
//! [`restore`]: PendingDeleteCoordinator::restore
//! [`execute_due`]: PendingDeleteCoordinator::execute_due

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::countdown::{ActiveCountdown, CountdownFrame};
use crate::error::{Result, TrashError};
use crate::records::{self, DocumentId, PendingDelete, PENDING_DELETES_KEY};
use crate::traits::{Clock, DeleteNotifier, DeleteScheduler, DocumentRemover, StateStore};

#[derive(Debug, Clone)]
pub struct TrashConfig {
    /// Grace period before permanent deletion.
    pub total: Duration,
    /// Cosmetic progress-bar tick period.
    pub tick: Duration,
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            total: Duration::from_secs(30),
            tick: Duration::from_millis(100),
        }
    }
}

/// Outcome of a durable job execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// The document was permanently deleted.
    Deleted,
    /// The record was gone (cancelled countdown); nothing to do.
    Skipped,
}

/// A countdown brought back by [`PendingDeleteCoordinator::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoredCountdown {
    pub doc: DocumentId,
    /// Zero when the countdown elapsed while the app was unobservable.
    pub remaining: Duration,
}

pub struct PendingDeleteCoordinator {
    store: Arc<dyn StateStore>,
    scheduler: Arc<dyn DeleteScheduler>,
    remover: Arc<dyn DocumentRemover>,
    notifier: Arc<dyn DeleteNotifier>,
    clock: Arc<dyn Clock>,
    config: TrashConfig,
    tickers: Mutex<HashMap<DocumentId, ActiveCountdown>>,
}

impl PendingDeleteCoordinator {
    pub fn new(
        store: Arc<dyn StateStore>,
        scheduler: Arc<dyn DeleteScheduler>,
        remover: Arc<dyn DocumentRemover>,
        notifier: Arc<dyn DeleteNotifier>,
        clock: Arc<dyn Clock>,
        config: TrashConfig,
    ) -> Self {
        Self {
            store,
            scheduler,
            remover,
            notifier,
            clock,
            config,
            tickers: Mutex::new(HashMap::new()),
        }
    }

    fn job_key(doc: DocumentId) -> String {
        format!("trash_delete_{doc}")
    }

    fn lock_tickers(&self) -> MutexGuard<'_, HashMap<DocumentId, ActiveCountdown>> {
        self.tickers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn load_records(&self) -> Result<Vec<PendingDelete>> {
        let raw = self.store.get_string(PENDING_DELETES_KEY).await?;
        Ok(raw.as_deref().map(records::decode).unwrap_or_default())
    }

    async fn persist_records(&self, records: &[PendingDelete]) -> Result<()> {
        if records.is_empty() {
            self.store.clear(PENDING_DELETES_KEY).await
        } else {
            self.store
                .set_string(PENDING_DELETES_KEY, &records::encode(records)?)
                .await
        }
    }

    /// Start (or restart) the countdown for `doc`.
    ///
    /// Persists the record first, then enqueues the durable job keyed
    /// by the document with replace-on-conflict semantics — a second
    /// start restarts the countdown cleanly. Returns the progress
    /// receiver for the UI.
    pub async fn start(&self, doc: DocumentId) -> Result<watch::Receiver<CountdownFrame>> {
        let started_at = self.clock.now();

        let mut records = self.load_records().await?;
        records.retain(|record| record.doc != doc);
        records.push(PendingDelete { doc, started_at });
        self.persist_records(&records).await?;

        self.scheduler
            .schedule_unique(&Self::job_key(doc), self.config.total, doc)
            .await?;

        let ticker = ActiveCountdown::spawn(
            Arc::clone(&self.clock),
            started_at,
            self.config.total,
            self.config.tick,
        );
        let rx = ticker.rx.clone();
        // Replacing the entry drops (and aborts) any previous ticker.
        self.lock_tickers().insert(doc, ticker);

        info!(doc = %doc, total_secs = self.config.total.as_secs(), "delete countdown started");
        Ok(rx)
    }

    /// Undo: stop the countdown and keep the document.
    ///
    /// Safe to call when the UI ticker no longer exists — job
    /// cancellation and record removal are independent of UI lifetime.
    pub async fn cancel(&self, doc: DocumentId) -> Result<()> {
        self.scheduler.cancel(&Self::job_key(doc)).await?;

        let mut records = self.load_records().await?;
        let before = records.len();
        records.retain(|record| record.doc != doc);
        if records.len() != before {
            self.persist_records(&records).await?;
        }

        if let Some(ticker) = self.lock_tickers().remove(&doc) {
            ticker.stop();
        }

        info!(doc = %doc, "delete countdown cancelled");
        Ok(())
    }

    /// Re-initialize after an interruption: reconcile every persisted
    /// record against the wall clock.
    pub async fn restore(&self) -> Result<Vec<RestoredCountdown>> {
        let now = self.clock.now();
        let records = self.load_records().await?;
        let mut restored = Vec::with_capacity(records.len());

        for record in records {
            let elapsed = (now - record.started_at).to_std().unwrap_or_default();
            let remaining = self.config.total.saturating_sub(elapsed);

            if remaining.is_zero() {
                // Countdown ran out while the UI was unobservable;
                // delete as soon as the scheduler gets to it.
                debug!(doc = %record.doc, "countdown elapsed during interruption");
                self.scheduler
                    .schedule_unique(&Self::job_key(record.doc), Duration::ZERO, record.doc)
                    .await?;
            } else {
                self.scheduler
                    .schedule_unique(&Self::job_key(record.doc), remaining, record.doc)
                    .await?;
                let ticker = ActiveCountdown::spawn(
                    Arc::clone(&self.clock),
                    record.started_at,
                    self.config.total,
                    self.config.tick,
                );
                self.lock_tickers().insert(record.doc, ticker);
            }

            restored.push(RestoredCountdown {
                doc: record.doc,
                remaining,
            });
        }

        if !restored.is_empty() {
            info!(count = restored.len(), "restored pending-delete countdowns");
        }
        Ok(restored)
    }

    /// Entry point for the durable job: delete `doc` if its record is
    /// still present.
    ///
    /// The record, not the job queue, is the authoritative gate: a job
    /// racing a cancellation finds the record gone and no-ops. Backend
    /// failures are terminal — reported through the notifier, record
    /// removed, no automatic retry.
    pub async fn execute_due(&self, doc: DocumentId) -> Result<ExecuteOutcome> {
        let mut records = self.load_records().await?;
        if !records.iter().any(|record| record.doc == doc) {
            debug!(doc = %doc, "deletion job found no record; treating as cancelled");
            return Ok(ExecuteOutcome::Skipped);
        }

        let outcome = self.remover.delete_permanently(doc).await;

        // Either way the record is spent: success deleted the document,
        // failure is terminal and reported, never retried silently.
        records.retain(|record| record.doc != doc);
        self.persist_records(&records).await?;
        if let Some(ticker) = self.lock_tickers().remove(&doc) {
            ticker.stop();
        }

        match outcome {
            Ok(()) => {
                info!(doc = %doc, "document permanently deleted");
                Ok(ExecuteOutcome::Deleted)
            }
            Err(err) => {
                let reason = err.to_string();
                error!(doc = %doc, %reason, "permanent deletion failed");
                self.notifier.deletion_failed(doc, &reason).await;
                Err(TrashError::deletion(doc, reason))
            }
        }
    }

    /// Remaining grace time for `doc`, from the persisted record.
    pub async fn remaining(&self, doc: DocumentId) -> Result<Option<Duration>> {
        let now = self.clock.now();
        Ok(self.load_records().await?.iter().find_map(|record| {
            (record.doc == doc).then(|| {
                let elapsed = (now - record.started_at).to_std().unwrap_or_default();
                self.config.total.saturating_sub(elapsed)
            })
        }))
    }

    /// Live progress receiver for `doc`, if a ticker is running.
    pub fn progress(&self, doc: DocumentId) -> Option<watch::Receiver<CountdownFrame>> {
        self.lock_tickers().get(&doc).map(|ticker| ticker.rx.clone())
    }

    pub fn config(&self) -> &TrashConfig {
        &self.config
    }
}

impl std::fmt::Debug for PendingDeleteCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingDeleteCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
