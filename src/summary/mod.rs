use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{parse_summary, CachedSummary, Entry, MonthKey, ParsedSummary, UserId};
use crate::remote::{CompletionService, RemoteRows, ScratchStore};
use crate::scratch::corrupt_summary_key;
use crate::store::EntryStore;

/// A month needs at least this many entries before it can be summarized.
pub const MIN_ENTRIES_FOR_SUMMARY: usize = 15;

/// Result of a summary read. `recovered_raw` carries the raw text of a
/// corrupt cache row that was deleted and regenerated during this call, so
/// the caller can offer it for manual recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    pub summary: CachedSummary,
    pub parsed: ParsedSummary,
    pub recovered_raw: Option<String>,
}

/// Per-(user, month, year) cached AI summary with format validation and
/// self-healing regeneration. This is the only component that repairs its own
/// stored state: a cached row failing the highlights contract is deleted,
/// preserved, and regenerated as if it never existed.
pub struct SummaryCache {
    user: UserId,
    rows: Arc<dyn RemoteRows>,
    completion: Arc<dyn CompletionService>,
    scratch: Arc<dyn ScratchStore>,
}

impl SummaryCache {
    pub fn new(
        user: UserId,
        rows: Arc<dyn RemoteRows>,
        completion: Arc<dyn CompletionService>,
        scratch: Arc<dyn ScratchStore>,
    ) -> Self {
        Self {
            user,
            rows,
            completion,
            scratch,
        }
    }

    pub async fn get_or_generate(
        &self,
        key: MonthKey,
        today: NaiveDate,
        entries: &EntryStore,
    ) -> Result<SummaryOutcome> {
        if key.is_current(today) {
            return Err(AppError::CurrentMonth);
        }

        match self.rows.fetch_summary(&self.user, key).await? {
            Some(mut cached) => match parse_summary(&cached.raw_text) {
                Some(parsed) => {
                    if cached.average_rating.is_none() {
                        // Legacy row: backfill the derived average on read.
                        cached.average_rating = average_rating(&entries.month_entries(key));
                        self.rows.update_summary(&self.user, &cached).await?;
                    }
                    Ok(SummaryOutcome {
                        summary: cached,
                        parsed,
                        recovered_raw: None,
                    })
                }
                None => {
                    tracing::warn!(
                        "Cached summary for {}/{} is malformed; deleting and regenerating",
                        key.month,
                        key.year
                    );
                    let raw = cached.raw_text;
                    if let Err(e) = self
                        .scratch
                        .set(&corrupt_summary_key(key.month, key.year), &raw)
                    {
                        tracing::warn!("Failed to preserve corrupt summary payload: {}", e);
                    }
                    self.rows.delete_summary(&self.user, key).await?;
                    let (summary, parsed) = self.generate(key, entries).await?;
                    Ok(SummaryOutcome {
                        summary,
                        parsed,
                        recovered_raw: Some(raw),
                    })
                }
            },
            None => {
                let (summary, parsed) = self.generate(key, entries).await?;
                Ok(SummaryOutcome {
                    summary,
                    parsed,
                    recovered_raw: None,
                })
            }
        }
    }

    /// Manual in-place edit of the stored text. Never creates a row and never
    /// re-invokes the completion service; the replacement text must still
    /// satisfy the format contract.
    pub async fn update(&self, key: MonthKey, raw_text: &str) -> Result<CachedSummary> {
        if parse_summary(raw_text).is_none() {
            return Err(AppError::SummaryFormat {
                month: key.month,
                year: key.year,
            });
        }

        let mut cached = self
            .rows
            .fetch_summary(&self.user, key)
            .await?
            .ok_or(AppError::SummaryMissing {
                month: key.month,
                year: key.year,
            })?;
        cached.raw_text = raw_text.to_string();

        if !self.rows.update_summary(&self.user, &cached).await? {
            return Err(AppError::SummaryMissing {
                month: key.month,
                year: key.year,
            });
        }
        Ok(cached)
    }

    pub async fn invalidate(&self, key: MonthKey) -> Result<()> {
        self.rows.delete_summary(&self.user, key).await
    }

    async fn generate(
        &self,
        key: MonthKey,
        entries: &EntryStore,
    ) -> Result<(CachedSummary, ParsedSummary)> {
        let month_entries = entries.month_entries(key);
        if month_entries.len() < MIN_ENTRIES_FOR_SUMMARY {
            return Err(AppError::InsufficientData {
                have: month_entries.len(),
                need: MIN_ENTRIES_FOR_SUMMARY,
            });
        }

        let texts: Vec<&str> = month_entries.iter().map(|e| e.text.as_str()).collect();
        let raw = self.completion.complete(&summary_prompt(&texts)).await?;

        let parsed = parse_summary(&raw).ok_or(AppError::SummaryFormat {
            month: key.month,
            year: key.year,
        })?;

        let summary = CachedSummary {
            month: key.month,
            year: key.year,
            raw_text: raw,
            average_rating: average_rating(&month_entries),
        };
        self.rows.insert_summary(&self.user, &summary).await?;
        Ok((summary, parsed))
    }
}

/// Mean over real ratings only; the no-rating sentinel is excluded. A rating
/// of 1 counts like any other real rating.
fn average_rating(entries: &[&Entry]) -> Option<f64> {
    let rated: Vec<u8> = entries
        .iter()
        .filter(|e| !e.rating.is_unrated())
        .map(|e| e.rating.get())
        .collect();
    if rated.is_empty() {
        return None;
    }
    Some(rated.iter().map(|&r| f64::from(r)).sum::<f64>() / rated.len() as f64)
}

fn summary_prompt(entry_texts: &[&str]) -> String {
    format!(
        "You are to summarize a user's journal entries for a month. Do not make assumptions, \
         don't be sappy. Be more direct. Use second person only, less formal. Max of 5 sentences. \
         There's {count} entries. START: {entries}\nThen, type \"**Highlights:**\" and separately \
         from the summary give 3 events that are highlights from the month, still in second \
         person, numbered.",
        count = entry_texts.len(),
        entries = entry_texts.join("\nNext:\n"),
    )
}
