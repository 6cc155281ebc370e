//! Pending-delete countdown coordination for trashed documents.
//!
//! When the user swipes a trashed document away, it gets a grace
//! period (default 30 s) before permanent deletion. The countdown must
//! survive anything the platform throws at it — app lock, process
//! death, the screen being torn down mid-tick — so the design splits
//! responsibility:
//!
//! - The persisted `(document, started_at)` record in the host's
//!   [`StateStore`] is the single source of truth for "this deletion
//!   should still happen".
//! - A durable job in the host's [`DeleteScheduler`] eventually
//!   executes the deletion, re-validating against the store first.
//! - The in-memory ticker is cosmetic: it re-derives the remaining
//!   time from the persisted start timestamp on every tick and feeds a
//!   progress bar. Killing it loses nothing.
//!
//! On re-initialization, [`PendingDeleteCoordinator::restore`]
//! recomputes each record's remaining time from the wall clock and
//! either re-enqueues the job with the *remaining* delay or enqueues
//! an immediate one — never the full duration, or repeated
//! interruptions would postpone deletions forever.

pub mod coordinator;
pub mod countdown;
pub mod error;
pub mod records;
pub mod traits;

pub use coordinator::{ExecuteOutcome, PendingDeleteCoordinator, RestoredCountdown, TrashConfig};
pub use countdown::CountdownFrame;
pub use error::{Result, TrashError};
pub use records::{DocumentId, PendingDelete};
pub use traits::{Clock, DeleteNotifier, DeleteScheduler, DocumentRemover, StateStore, SystemClock};
