//! Per-list interaction context.
//!
//! One [`SwipeDeck`] is constructed per rendered list and passed down
//! to each card — explicit scoping instead of process-wide singletons,
//! so two lists on screen can never leak reveal state into each other
//! and tests get isolated instances.

use std::sync::Arc;

use futures::Stream;

use crate::arbiter::DragArbiter;
use crate::config::GestureConfig;
use crate::error::Result;
use crate::gesture::SwipeGestureController;
use crate::motion::AnimatedOffset;
use crate::reveal::RevealRegistry;
use crate::scroll::{ScrollAutoCloser, ScrollSample};
use crate::CardId;

#[derive(Clone)]
pub struct SwipeDeck {
    registry: Arc<RevealRegistry>,
    arbiter: Arc<DragArbiter>,
    config: GestureConfig,
}

impl SwipeDeck {
    pub fn new(config: GestureConfig) -> Self {
        let arbiter = Arc::new(DragArbiter::new());
        let registry = Arc::new(RevealRegistry::new(Arc::clone(&arbiter)));
        Self {
            registry,
            arbiter,
            config,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<RevealRegistry> {
        &self.registry
    }

    /// Mount a card: registers a fresh offset handle with the registry
    /// and returns the card's gesture controller. Dropping the
    /// controller unmounts the card.
    pub fn mount(&self, id: CardId) -> SwipeGestureController {
        let offset = AnimatedOffset::new(0.0);
        self.registry
            .register(id, offset.clone(), self.config.open_offset());
        SwipeGestureController::new(
            id,
            offset,
            Arc::clone(&self.registry),
            Arc::clone(&self.arbiter),
            self.config.clone(),
        )
    }

    /// UI query: is this card the revealed one?
    pub fn is_revealed(&self, id: CardId) -> bool {
        self.registry.is_revealed(id)
    }

    /// UI query: should this card disable its own gesture recognition
    /// because another card is mid-drag?
    pub fn is_other_card_dragging(&self, id: CardId) -> bool {
        self.arbiter.is_held_by_other(id)
    }

    /// UI query: is a reveal transition animating?
    pub fn is_animation_running(&self) -> bool {
        self.registry.is_animating()
    }

    /// Animate a card to the given reveal state.
    pub async fn set_revealed_animated(&self, id: CardId, revealed: bool) -> Result<()> {
        self.registry.set_revealed_animated(id, revealed).await
    }

    /// Animate the revealed card closed, if any. Used by the list
    /// screen when entering selection mode.
    pub async fn close_all(&self) -> Result<()> {
        self.registry.close_active_animated().await
    }

    /// Consume a scroll sample stream for this list, closing the
    /// revealed card on threshold crossings. The host spawns this on
    /// its runtime for the lifetime of the list.
    pub async fn drive_scroll<S>(&self, samples: S) -> Result<()>
    where
        S: Stream<Item = ScrollSample> + Unpin,
    {
        ScrollAutoCloser::new(self.config.scroll_close_threshold)
            .drive(samples, &self.registry)
            .await
    }
}
