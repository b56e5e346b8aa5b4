use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::remote::ScratchStore;
use crate::scratch::DRAFT_KEY;

#[derive(Debug, Serialize, Deserialize)]
struct DraftSlot {
    date: NaiveDate,
    text: String,
}

/// Single-slot recovery buffer for unsaved entry text. One draft exists
/// system-wide; a keystroke for a different date silently overwrites whatever
/// was there. Best-effort only: scratch I/O failures are logged, never
/// surfaced to the editor.
pub struct DraftCache {
    scratch: Arc<dyn ScratchStore>,
}

impl DraftCache {
    pub fn new(scratch: Arc<dyn ScratchStore>) -> Self {
        Self { scratch }
    }

    /// Called on every keystroke in the active editor.
    pub fn record(&self, date: NaiveDate, text: &str) {
        let slot = DraftSlot {
            date,
            text: text.to_string(),
        };
        let result = serde_json::to_string(&slot)
            .map_err(crate::error::AppError::from)
            .and_then(|json| self.scratch.set(DRAFT_KEY, &json));
        if let Err(e) = result {
            tracing::warn!("Failed to persist entry draft: {}", e);
        }
    }

    /// Returns the protected text when opening the editor for the date the
    /// slot belongs to. Drafts for other dates are ignored.
    pub fn offer(&self, date: NaiveDate) -> Option<String> {
        let json = self.scratch.get(DRAFT_KEY).ok().flatten()?;
        let slot: DraftSlot = serde_json::from_str(&json).ok()?;
        (slot.date == date && !slot.text.is_empty()).then_some(slot.text)
    }

    /// Clears the slot, both when the user discards the draft and after a
    /// successful save.
    pub fn clear(&self) {
        if let Err(e) = self.scratch.remove(DRAFT_KEY) {
            tracing::warn!("Failed to clear entry draft: {}", e);
        }
    }
}
