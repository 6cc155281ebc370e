//! Persisted pending-delete records.
//!
//! Records are stored as a JSON array under a single store key. An
//! earlier client release persisted them as a comma-joined
//! `id:epoch_millis` string; that format had no escaping and is kept
//! only as a read-side migration path. Decoding is lenient in both
//! formats — one malformed entry is skipped with a warning, never
//! failing the whole scan — because the restart protocol must recover
//! every countdown it still can.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Store key the record list is persisted under.
pub const PENDING_DELETES_KEY: &str = "trash.pending_deletes";

/// Identifier of a document in the server's archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One document awaiting permanent deletion.
///
/// Presence of this record in the durable store is the single source
/// of truth for "the deletion should still happen". The countdown UI
/// derives its position from `started_at`, never from its own ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingDelete {
    pub doc: DocumentId,
    pub started_at: DateTime<Utc>,
}

/// Encode records for persistence.
pub fn encode(records: &[PendingDelete]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Decode a persisted record list, skipping malformed entries.
///
/// Accepts the current JSON format and the legacy delimited format.
pub fn decode(raw: &str) -> Vec<PendingDelete> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('[') {
        decode_json(trimmed)
    } else {
        decode_legacy(trimmed)
    }
}

fn decode_json(raw: &str) -> Vec<PendingDelete> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(err) => {
            warn!(%err, "pending-delete store is not a JSON array; dropping it");
            return Vec::new();
        }
    };
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(%err, "skipping malformed pending-delete entry");
                None
            }
        })
        .collect()
}

/// Legacy format: `id:epoch_millis` entries joined by commas.
fn decode_legacy(raw: &str) -> Vec<PendingDelete> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| {
            let parsed = entry.trim().split_once(':').and_then(|(id, millis)| {
                let id = id.trim().parse::<u64>().ok()?;
                let millis = millis.trim().parse::<i64>().ok()?;
                let started_at = DateTime::from_timestamp_millis(millis)?;
                Some(PendingDelete {
                    doc: DocumentId::new(id),
                    started_at,
                })
            });
            if parsed.is_none() {
                warn!(entry, "skipping malformed legacy pending-delete entry");
            }
            parsed
        })
        .collect()
}
