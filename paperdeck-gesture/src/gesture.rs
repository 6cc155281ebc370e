//! Per-card swipe state machine.
//!
//! A card is either settled (offset 0) or revealed (offset at the
//! negative open width). Continuous drags require drag ownership from
//! the [`DragArbiter`]; discrete actions (long-press reveal) do not.
//! On release, either the raw position against a 30% travel threshold
//! or — for fast releases — a decaying-fling projection decides which
//! anchor the card snaps to.
//!
//! The registry drives this card's offset directly when *another*
//! card's swipe closes this one, so the controller's internal anchor
//! can go stale. [`SwipeGestureController::sync_revealed`] reconciles
//! it whenever the externally commanded state diverges by more than
//! epsilon, so the next drag starts from the true baseline instead of
//! snapping.

use std::sync::Arc;

use tracing::debug;

use crate::arbiter::DragArbiter;
use crate::config::GestureConfig;
use crate::error::Result;
use crate::motion::{fling_projection, AnimatedOffset, Spring};
use crate::reveal::RevealRegistry;
use crate::CardId;

/// The two rest positions of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAnchor {
    /// Offset 0; actions hidden.
    Settled,
    /// Offset at the negative open width; actions exposed.
    Revealed,
}

/// Outcome of a drag release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseDecision {
    Settled,
    Revealed,
}

/// Decide which anchor a release at `position`/`velocity` lands on.
///
/// Fast releases (at or above the velocity threshold) are judged by
/// where the fling would coast to; slow releases by the raw position
/// against the reveal boundary.
pub fn release_target(position: f32, velocity: f32, config: &GestureConfig) -> SwipeAnchor {
    let deciding_position = if velocity.abs() >= config.velocity_threshold {
        fling_projection(position, velocity, config.fling_friction)
    } else {
        position
    };
    if deciding_position <= config.reveal_boundary() {
        SwipeAnchor::Revealed
    } else {
        SwipeAnchor::Settled
    }
}

pub struct SwipeGestureController {
    id: CardId,
    offset: AnimatedOffset,
    anchor: SwipeAnchor,
    dragging: bool,
    registry: Arc<RevealRegistry>,
    arbiter: Arc<DragArbiter>,
    config: GestureConfig,
}

impl SwipeGestureController {
    pub(crate) fn new(
        id: CardId,
        offset: AnimatedOffset,
        registry: Arc<RevealRegistry>,
        arbiter: Arc<DragArbiter>,
        config: GestureConfig,
    ) -> Self {
        Self {
            id,
            offset,
            anchor: SwipeAnchor::Settled,
            dragging: false,
            registry,
            arbiter,
            config,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    /// The live offset, for rendering. Clones share the value.
    pub fn offset(&self) -> AnimatedOffset {
        self.offset.clone()
    }

    pub fn anchor(&self) -> SwipeAnchor {
        self.anchor
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Begin a drag. Refused (returning `false`) while another card is
    /// dragging or a reveal transition is animating.
    pub fn drag_start(&mut self) -> bool {
        if !self.arbiter.try_acquire(self.id) {
            return false;
        }
        self.dragging = true;
        true
    }

    /// Apply a horizontal drag delta. Ignored unless this card holds
    /// drag ownership; the position is clamped to the travel range.
    pub fn drag_by(&mut self, delta: f32) {
        if !self.dragging || self.arbiter.holder() != Some(self.id) {
            return;
        }
        let position = (self.offset.value() + delta).clamp(self.config.open_offset(), 0.0);
        self.offset.snap_to(position);
    }

    /// End the drag with the release velocity reported by the host's
    /// gesture recognizer. Returns the decision, or `None` if no drag
    /// was in progress or a transition evicted this drag mid-flight.
    pub async fn drag_end(&mut self, velocity: f32) -> Result<Option<ReleaseDecision>> {
        if !self.dragging {
            return Ok(None);
        }
        self.dragging = false;
        if self.arbiter.holder() != Some(self.id) {
            // A reveal transition took over while we were dragging; it
            // owns the outcome, and the next reveal-state sync re-homes
            // the offset. Deciding here would override the transition
            // from a stale position.
            debug!(card = %self.id, "drag evicted before release; no decision");
            return Ok(None);
        }
        self.arbiter.release(self.id);

        match release_target(self.offset.value(), velocity, &self.config) {
            SwipeAnchor::Revealed => {
                self.anchor = SwipeAnchor::Revealed;
                // The registry animates this card open and any other
                // revealed card closed, under its transition mutex.
                self.registry.request_reveal(self.id).await?;
                Ok(Some(ReleaseDecision::Revealed))
            }
            SwipeAnchor::Settled => {
                self.anchor = SwipeAnchor::Settled;
                self.offset.animate_to(0.0, Spring::no_overshoot()).await;
                self.registry.request_close(self.id);
                Ok(Some(ReleaseDecision::Settled))
            }
        }
    }

    /// A second pointer touched down mid-drag. Combined-gesture
    /// behavior is undefined, so settle conservatively: end the drag
    /// and animate back to the settled anchor.
    pub async fn pointer_joined(&mut self) -> Result<()> {
        if !self.dragging {
            return Ok(());
        }
        debug!(card = %self.id, "second pointer during drag; auto-settling");
        self.dragging = false;
        self.arbiter.release(self.id);
        self.anchor = SwipeAnchor::Settled;
        self.offset.animate_to(0.0, Spring::no_overshoot()).await;
        self.registry.request_close(self.id);
        Ok(())
    }

    /// Accessibility path: reveal on long-press without drag
    /// permission. A discrete action, so the arbiter is not consulted.
    pub async fn long_press_reveal(&mut self) -> Result<()> {
        self.anchor = SwipeAnchor::Revealed;
        self.registry.request_reveal(self.id).await
    }

    /// Reconcile with an externally commanded reveal state (another
    /// card opened, or a scroll closed this one).
    ///
    /// Updates the internal anchor, and if the offset disagrees with
    /// the commanded rest position by more than epsilon while no
    /// registry transition is driving it, animates home so the next
    /// drag starts from the correct baseline.
    pub async fn sync_revealed(&mut self, revealed: bool) {
        self.anchor = if revealed {
            SwipeAnchor::Revealed
        } else {
            SwipeAnchor::Settled
        };
        let target = match self.anchor {
            SwipeAnchor::Revealed => self.config.open_offset(),
            SwipeAnchor::Settled => 0.0,
        };
        if self.registry.is_animating() {
            // The registry owns the offset for the duration of the
            // transition; it will land on the commanded state.
            return;
        }
        if (self.offset.value() - target).abs() > self.config.epsilon {
            debug!(card = %self.id, target_offset = target, "resyncing offset with external state");
            self.offset.animate_to(target, Spring::no_overshoot()).await;
        }
    }
}

impl Drop for SwipeGestureController {
    /// Unmount cleanup is a hard requirement: release drag ownership
    /// and clear the revealed state synchronously, even mid-animation.
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}
