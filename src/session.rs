use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::calendar::{day_access, project_all, project_one, CalendarEvent, CalendarPatch, DayAccess};
use crate::error::Result;
use crate::models::{
    Attachment, CachedSummary, Entry, MonthKey, Rating, TrackerDefinition, TrackerKind,
    TrackerValues, UserId,
};
use crate::remote::{BlobStore, CompletionService, RemoteRows, ScratchStore};
use crate::store::{AttachmentManager, DraftCache, EntryStore, TrackerRegistry};
use crate::summary::{SummaryCache, SummaryOutcome};

/// What opening a day resolves to, combining the selection-eligibility rule
/// with the draft-recovery check.
#[derive(Debug, Clone, PartialEq)]
pub enum DayView {
    /// Creation or edit allowed; a matching unsaved draft is offered.
    Editor {
        existing: Option<Entry>,
        draft: Option<String>,
    },
    /// Outside the edit window with edit mode off.
    ReadOnly(Entry),
    /// Outside the edit window and nothing was ever written that day.
    NoEntry,
    /// Future days are never opened.
    Future,
}

/// One signed-in user's journal session. Created on sign-in, dropped on
/// sign-out; owns the entry index, tracker list, attachment listings, draft
/// slot and summary cache for exactly that window of time.
pub struct Session {
    user: UserId,
    narrow: bool,
    edit_mode: bool,
    entries: EntryStore,
    trackers: TrackerRegistry,
    attachments: AttachmentManager,
    drafts: DraftCache,
    summaries: SummaryCache,
}

impl Session {
    /// Loads all entries and trackers up front; the caller must not project
    /// the calendar before this returns.
    pub async fn sign_in(
        user: UserId,
        rows: Arc<dyn RemoteRows>,
        blobs: Arc<dyn BlobStore>,
        completion: Arc<dyn CompletionService>,
        scratch: Arc<dyn ScratchStore>,
        narrow: bool,
    ) -> Result<Self> {
        let entries = EntryStore::load(user.clone(), rows.clone()).await?;
        let trackers = TrackerRegistry::load(user.clone(), rows.clone()).await?;
        tracing::info!("Session started for {}", user);
        Ok(Self {
            attachments: AttachmentManager::new(user.clone(), blobs),
            drafts: DraftCache::new(scratch.clone()),
            summaries: SummaryCache::new(user.clone(), rows, completion, scratch),
            user,
            narrow,
            edit_mode: false,
            entries,
            trackers,
        })
    }

    pub fn sign_out(self) {
        tracing::info!("Session ended for {}", self.user);
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
    }

    // Entries

    pub fn entry(&self, date: NaiveDate) -> Option<&Entry> {
        self.entries.get(date)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Full projection for the initial calendar paint. All later changes go
    /// through the per-mutation patches.
    pub fn calendar_events(&self) -> Vec<CalendarEvent> {
        project_all(
            self.entries.iter(),
            self.trackers.list(),
            self.today(),
            self.narrow,
        )
    }

    /// Resolves a date selection into an editor, a read-only view or a
    /// refusal, per the seven-day rule and the edit-mode override.
    pub fn open_day(&self, date: NaiveDate) -> DayView {
        match day_access(date, self.today(), self.edit_mode) {
            DayAccess::Future => DayView::Future,
            DayAccess::ReadOnly => match self.entries.get(date) {
                Some(entry) => DayView::ReadOnly(entry.clone()),
                None => DayView::NoEntry,
            },
            DayAccess::Editable => DayView::Editor {
                existing: self.entries.get(date).cloned(),
                draft: self.drafts.offer(date),
            },
        }
    }

    pub async fn save_entry(
        &mut self,
        date: NaiveDate,
        rating: Option<u8>,
        text: &str,
        trackers: TrackerValues,
        starred: bool,
    ) -> Result<CalendarPatch> {
        let rating = Rating::from_slider(rating)?;
        let entry = self.entries.save(date, rating, text, trackers, starred).await?;
        self.drafts.clear();
        Ok(CalendarPatch::Upsert(project_one(
            &entry,
            self.trackers.list(),
            self.today(),
            self.narrow,
        )))
    }

    pub async fn delete_entry(&mut self, date: NaiveDate) -> Result<CalendarPatch> {
        self.entries.delete(date, &mut self.attachments).await?;
        Ok(CalendarPatch::Remove(date))
    }

    pub async fn set_starred(
        &mut self,
        date: NaiveDate,
        starred: bool,
    ) -> Result<Option<CalendarPatch>> {
        let updated = self.entries.set_starred(date, starred).await?;
        Ok(updated.map(|entry| {
            CalendarPatch::Upsert(project_one(
                &entry,
                self.trackers.list(),
                self.today(),
                self.narrow,
            ))
        }))
    }

    pub fn search(&self, query: &str, ascending: bool) -> Vec<&Entry> {
        self.entries.search(query, ascending)
    }

    // Drafts

    pub fn record_draft(&self, date: NaiveDate, text: &str) {
        self.drafts.record(date, text);
    }

    pub fn discard_draft(&self) {
        self.drafts.clear();
    }

    // Trackers

    pub fn trackers(&self) -> &[TrackerDefinition] {
        self.trackers.list()
    }

    pub async fn create_tracker(
        &mut self,
        name: &str,
        kind: TrackerKind,
    ) -> Result<TrackerDefinition> {
        self.trackers.create(name, kind).await
    }

    pub async fn delete_tracker(&mut self, name: &str) -> Result<()> {
        self.trackers.delete(name).await
    }

    pub async fn set_tracker_icon(&mut self, name: &str, icon: &str) -> Result<()> {
        self.trackers.set_icon(name, icon).await
    }

    // Attachments

    pub async fn attachments(&mut self, date: NaiveDate) -> Result<Vec<Attachment>> {
        self.attachments.list(date).await
    }

    pub async fn upload_attachment(
        &mut self,
        date: NaiveDate,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Attachment> {
        self.attachments.upload(date, filename, content_type, bytes).await
    }

    pub async fn remove_attachment(&mut self, date: NaiveDate, filename: &str) -> Result<()> {
        self.attachments.remove(date, filename).await
    }

    pub async fn remove_all_attachments(&mut self, date: NaiveDate) -> Result<()> {
        self.attachments.remove_all(date).await
    }

    // Summaries

    pub async fn get_or_generate_summary(&self, month: u32, year: i32) -> Result<SummaryOutcome> {
        let key = MonthKey::new(month, year)?;
        self.summaries
            .get_or_generate(key, self.today(), &self.entries)
            .await
    }

    pub async fn update_summary(&self, month: u32, year: i32, raw_text: &str) -> Result<CachedSummary> {
        let key = MonthKey::new(month, year)?;
        self.summaries.update(key, raw_text).await
    }

    pub async fn invalidate_summary(&self, month: u32, year: i32) -> Result<()> {
        let key = MonthKey::new(month, year)?;
        self.summaries.invalidate(key).await
    }
}
