//! Swipe-to-reveal coordination for document list cards.
//!
//! A list screen renders N card instances at once; swiping a card left
//! reveals a destructive action behind it. This crate owns the parts of
//! that interaction that span cards:
//!
//! - [`RevealRegistry`] — at most one card is revealed per list, enforced
//!   by a mutex-guarded transition that animates the previous card closed
//!   and the next card open concurrently.
//! - [`DragArbiter`] — at most one card receives drag input at a time.
//! - [`ScrollAutoCloser`] — closes the revealed card when the list scrolls
//!   far enough.
//! - [`SwipeGestureController`] — the per-card state machine translating
//!   drag deltas and release velocity into a settled/revealed position.
//!
//! Rendering, hit testing, and gesture recognition stay in the host UI;
//! it feeds raw drag deltas in and reads the live [`AnimatedOffset`] out.
//! Construct one [`SwipeDeck`] per list and mount a controller per card.

pub mod arbiter;
pub mod config;
pub mod deck;
pub mod error;
pub mod gesture;
pub mod motion;
pub mod reveal;
pub mod scroll;

pub use arbiter::DragArbiter;
pub use config::GestureConfig;
pub use deck::SwipeDeck;
pub use error::{GestureError, Result};
pub use gesture::{ReleaseDecision, SwipeAnchor, SwipeGestureController};
pub use motion::{AnimatedOffset, Spring};
pub use reveal::RevealRegistry;
pub use scroll::{ScrollAutoCloser, ScrollSample};

/// Identifier of a card within one list instance.
///
/// Values are supplied by the host (document ids work well). The all-ones
/// pattern is reserved as the arbiter's vacant sentinel and must not be
/// used as a real id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

impl CardId {
    pub fn new(raw: u64) -> Self {
        debug_assert!(raw != u64::MAX, "u64::MAX is reserved");
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
