//! Exclusive drag-permission lock shared by every card in a list.
//!
//! Gesture delivery and recomposition may run on different execution
//! contexts in the host framework, so ownership lives in an atomic
//! rather than behind the registry's locks. This is best-effort mutual
//! exclusion, not a correctness-critical lock: a refused acquisition
//! means the gesture silently does not start.
//!
//! Drag and animated transitions are mutually exclusive — a card being
//! dragged while the registry drives its offset would fight over the
//! same value — so acquisition is also refused for the duration of a
//! registry transition, and starting a transition preempts whatever
//! drag was in progress.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::debug;

use crate::CardId;

/// Sentinel for "no card is dragging".
const VACANT: u64 = u64::MAX;

#[derive(Debug)]
pub struct DragArbiter {
    holder: AtomicU64,
    transition_in_flight: AtomicBool,
}

impl Default for DragArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl DragArbiter {
    pub fn new() -> Self {
        Self {
            holder: AtomicU64::new(VACANT),
            transition_in_flight: AtomicBool::new(false),
        }
    }

    /// Try to take drag ownership for `id`.
    ///
    /// Succeeds if no card holds the lock or if `id` already holds it.
    /// Fails while a reveal transition is animating.
    pub fn try_acquire(&self, id: CardId) -> bool {
        if self.transition_in_flight.load(Ordering::Acquire) {
            debug!(card = %id, "drag refused: transition in flight");
            return false;
        }
        match self
            .holder
            .compare_exchange(VACANT, id.raw(), Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(current) => {
                let held = current == id.raw();
                if !held {
                    debug!(card = %id, holder = current, "drag refused: held by other card");
                }
                held
            }
        }
    }

    /// Release ownership if `id` holds it.
    ///
    /// A no-op for non-holders, so a delayed release can never clobber
    /// a newer owner.
    pub fn release(&self, id: CardId) {
        let _ = self
            .holder
            .compare_exchange(id.raw(), VACANT, Ordering::AcqRel, Ordering::Acquire);
    }

    /// True when some card other than `id` is mid-drag. Non-owning
    /// cards use this to disable their own gesture recognition.
    pub fn is_held_by_other(&self, id: CardId) -> bool {
        let current = self.holder.load(Ordering::Acquire);
        current != VACANT && current != id.raw()
    }

    /// The card currently holding drag ownership, if any.
    pub fn holder(&self) -> Option<CardId> {
        match self.holder.load(Ordering::Acquire) {
            VACANT => None,
            raw => Some(CardId::new(raw)),
        }
    }

    /// True while the registry is animating a reveal transition.
    pub fn is_transition_in_flight(&self) -> bool {
        self.transition_in_flight.load(Ordering::Acquire)
    }

    /// Called by the registry when a transition starts. Evicts any
    /// in-progress drag so the animation and the finger never drive
    /// the same offset.
    pub(crate) fn begin_transition(&self) {
        self.transition_in_flight.store(true, Ordering::Release);
        self.holder.store(VACANT, Ordering::Release);
    }

    pub(crate) fn end_transition(&self) {
        self.transition_in_flight.store(false, Ordering::Release);
    }
}
