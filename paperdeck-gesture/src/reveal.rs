//! Per-list tracker of the single revealed card.
//!
//! # Architecture
//!
//! The registry keeps an id → offset-handle lookup for every mounted
//! card plus the id of the one card currently revealed. All state
//! changes that animate go through a single `tokio::sync::Mutex`
//! critical section: while it is held, the previous card's close and
//! the next card's open run concurrently (`tokio::join!`), and
//! `active` is updated once, relative to the mutex rather than per
//! animation frame. That critical section is what makes "never two
//! cards open at once" hold under rapid multi-touch input — a third
//! transition cannot begin until both in-flight animations settle.
//!
//! # Cancellation
//!
//! Transitions are futures and cancel by drop (card unmounted,
//! navigation away). A dropped transition must not leave `active`
//! pointing at a card whose handle is gone, so the critical section
//! arms a guard that reconciles `active` to `None` and clears the
//! in-flight flag unless the transition ran to completion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::Mutex;
use tracing::debug;

use crate::arbiter::DragArbiter;
use crate::error::{GestureError, Result};
use crate::motion::{AnimatedOffset, Spring};
use crate::CardId;

#[derive(Debug, Clone)]
struct CardSlot {
    offset: AnimatedOffset,
    open_offset: f32,
}

#[derive(Debug, Default)]
struct RegistryInner {
    cards: HashMap<CardId, CardSlot>,
    active: Option<CardId>,
}

#[derive(Debug)]
pub struct RevealRegistry {
    inner: StdMutex<RegistryInner>,
    /// Serializes animated transitions. Never held across a lock of
    /// `inner`; `inner` is never held across an await.
    transition: Mutex<()>,
    arbiter: Arc<DragArbiter>,
}

impl RevealRegistry {
    pub fn new(arbiter: Arc<DragArbiter>) -> Self {
        Self {
            inner: StdMutex::new(RegistryInner::default()),
            transition: Mutex::new(()),
            arbiter,
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True iff `id` is the revealed card.
    pub fn is_revealed(&self, id: CardId) -> bool {
        self.lock_inner().active == Some(id)
    }

    /// The revealed card, if any.
    pub fn active(&self) -> Option<CardId> {
        self.lock_inner().active
    }

    /// True while an animated transition is executing.
    pub fn is_animating(&self) -> bool {
        self.arbiter.is_transition_in_flight()
    }

    /// Register a freshly mounted card's offset handle.
    pub fn register(&self, id: CardId, offset: AnimatedOffset, open_offset: f32) {
        let mut inner = self.lock_inner();
        inner.cards.insert(id, CardSlot { offset, open_offset });
        debug!(card = %id, "card registered");
    }

    /// Drop a card's handle on unmount.
    ///
    /// Synchronously clears the revealed state if it pointed at `id`
    /// and releases any drag ownership `id` held, even mid-animation.
    /// Abrupt disposal (list virtualization, navigation) must never
    /// leave a phantom open card blocking the list.
    pub fn unregister(&self, id: CardId) {
        {
            let mut inner = self.lock_inner();
            inner.cards.remove(&id);
            if inner.active == Some(id) {
                inner.active = None;
            }
        }
        self.arbiter.release(id);
        debug!(card = %id, "card unregistered");
    }

    /// Reveal `id`, animating the previously revealed card closed at
    /// the same time.
    ///
    /// Suspends until both animations settle. Dropping the future
    /// mid-flight reconciles the revealed state to `None`.
    pub async fn request_reveal(&self, id: CardId) -> Result<()> {
        let _transition = self.transition.lock().await;

        let (slot, previous) = {
            let inner = self.lock_inner();
            let slot = inner
                .cards
                .get(&id)
                .cloned()
                .ok_or_else(|| GestureError::unknown_card(id))?;
            if inner.active == Some(id) && slot.offset.is_settled_at(slot.open_offset) {
                return Ok(());
            }
            // Already active but displaced (a partial drag let go over
            // the open card): fall through with no previous card, so
            // the offset animates back home.
            let previous = inner
                .active
                .filter(|prev| *prev != id)
                .and_then(|prev| inner.cards.get(&prev).map(|s| s.offset.clone()));
            (slot, previous)
        };

        self.arbiter.begin_transition();
        let guard = TransitionGuard::arm(self);

        let open = slot.offset.animate_to(slot.open_offset, Spring::no_overshoot());
        match previous {
            Some(prev_offset) => {
                // Close-previous and open-next run in parallel, not
                // sequentially, to keep the swap snappy.
                let close = prev_offset.animate_to(0.0, Spring::no_overshoot());
                tokio::join!(close, open);
            }
            None => open.await,
        }

        guard.complete(Some(id));
        debug!(card = %id, "card revealed");
        Ok(())
    }

    /// Clear the revealed state for `id` without animating.
    ///
    /// Fire-and-forget reset used when the card's own settle animation
    /// already moved it; a no-op unless `id` is the revealed card.
    pub fn request_close(&self, id: CardId) {
        let mut inner = self.lock_inner();
        if inner.active == Some(id) {
            inner.active = None;
        }
    }

    /// Animate the revealed card (if any) closed and clear the state.
    ///
    /// Idempotent: a no-op when nothing is revealed.
    pub async fn close_active_animated(&self) -> Result<()> {
        let _transition = self.transition.lock().await;
        let Some(offset) = ({
            let inner = self.lock_inner();
            inner
                .active
                .and_then(|id| inner.cards.get(&id).map(|s| s.offset.clone()))
        }) else {
            return Ok(());
        };

        self.arbiter.begin_transition();
        let guard = TransitionGuard::arm(self);
        offset.animate_to(0.0, Spring::no_overshoot()).await;
        guard.complete(None);
        Ok(())
    }

    /// Animate `id` to the requested reveal state. The UI-facing
    /// entry point behind "swipe actions" toggles.
    pub async fn set_revealed_animated(&self, id: CardId, revealed: bool) -> Result<()> {
        if revealed {
            return self.request_reveal(id).await;
        }

        let _transition = self.transition.lock().await;
        let Some(offset) = ({
            let inner = self.lock_inner();
            (inner.active == Some(id))
                .then(|| inner.cards.get(&id).map(|s| s.offset.clone()))
                .flatten()
        }) else {
            return Ok(());
        };

        self.arbiter.begin_transition();
        let guard = TransitionGuard::arm(self);
        offset.animate_to(0.0, Spring::no_overshoot()).await;
        guard.complete(None);
        Ok(())
    }

    fn finish_transition(&self, active: Option<CardId>) {
        {
            let mut inner = self.lock_inner();
            // The card may have unmounted while its open animation ran;
            // never resurrect a handle-less id.
            let next = active.filter(|id| inner.cards.contains_key(id));
            inner.active = next;
        }
        self.arbiter.end_transition();
    }
}

/// Reconciles registry state if a transition future is dropped before
/// completion.
struct TransitionGuard<'a> {
    registry: &'a RevealRegistry,
    armed: bool,
}

impl<'a> TransitionGuard<'a> {
    fn arm(registry: &'a RevealRegistry) -> Self {
        Self {
            registry,
            armed: true,
        }
    }

    fn complete(mut self, active: Option<CardId>) {
        self.armed = false;
        self.registry.finish_transition(active);
    }
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("transition cancelled mid-flight; reconciling revealed state");
            self.registry.finish_transition(None);
        }
    }
}
