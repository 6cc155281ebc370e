//! Structured error types for paperdeck-gesture.
//!
//! Arbitration conflicts and interrupted animations are not errors in
//! this crate: a refused drag degrades to "nothing happens" and a
//! cancelled transition reconciles its own state. The error surface is
//! therefore small — it only covers calls that reference cards the
//! registry does not know about.

use thiserror::Error;

use crate::CardId;

/// Main error type for paperdeck-gesture operations
#[derive(Error, Debug)]
pub enum GestureError {
    /// A transition was requested for a card with no registered handle
    #[error("No animation handle registered for card {id}")]
    UnknownCard { id: CardId },
}

/// Result type alias for paperdeck-gesture operations
pub type Result<T> = std::result::Result<T, GestureError>;

impl GestureError {
    /// Create an unknown-card error
    pub fn unknown_card(id: CardId) -> Self {
        Self::UnknownCard { id }
    }
}
