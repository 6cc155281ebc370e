//! Structured error types for paperdeck-trash.
//!
//! Corrupt persisted entries and jobs racing a cancellation are *not*
//! errors here — the first is skipped with a warning, the second is a
//! normal no-op. Errors cover the collaborators this crate consumes:
//! the persisted store, the durable scheduler, and the deletion
//! backend.

use thiserror::Error;

use crate::records::DocumentId;

/// Main error type for paperdeck-trash operations
#[derive(Error, Debug)]
pub enum TrashError {
    /// The persisted key-value store failed
    #[error("State store error: {reason}")]
    Store { reason: String },

    /// The durable job scheduler failed
    #[error("Scheduler error: {reason}")]
    Scheduler { reason: String },

    /// The deletion backend failed; terminal and user-visible
    #[error("Permanent deletion of document {doc} failed: {reason}")]
    Deletion { doc: DocumentId, reason: String },

    /// Encoding the pending-delete records failed
    #[error("Failed to encode pending-delete records: {source}")]
    Encode {
        #[from]
        source: serde_json::Error,
    },
}

/// Result type alias for paperdeck-trash operations
pub type Result<T> = std::result::Result<T, TrashError>;

impl TrashError {
    /// Create a store error
    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store {
            reason: reason.into(),
        }
    }

    /// Create a scheduler error
    pub fn scheduler(reason: impl Into<String>) -> Self {
        Self::Scheduler {
            reason: reason.into(),
        }
    }

    /// Create a deletion-backend error
    pub fn deletion(doc: DocumentId, reason: impl Into<String>) -> Self {
        Self::Deletion {
            doc,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrashError::deletion(DocumentId::new(42), "backend unreachable");
        assert_eq!(
            err.to_string(),
            "Permanent deletion of document 42 failed: backend unreachable"
        );
    }
}
