use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{Result, ValidationError};
use crate::models::{Entry, MonthKey, Rating, TrackerValue, TrackerValues, UserId};
use crate::remote::RemoteRows;
use crate::store::AttachmentManager;

/// Authoritative in-memory mirror of the user's entries for the active
/// session, keyed by date. The remote store is the durable owner; the index
/// here is only touched after a remote call succeeds, so a failed operation
/// never leaves a partial update behind.
pub struct EntryStore {
    user: UserId,
    rows: Arc<dyn RemoteRows>,
    index: BTreeMap<NaiveDate, Entry>,
}

impl EntryStore {
    /// Fetches all entries for the user once. Must complete before the first
    /// calendar projection.
    pub async fn load(user: UserId, rows: Arc<dyn RemoteRows>) -> Result<Self> {
        let entries = rows.fetch_entries(&user).await?;
        let index = entries.into_iter().map(|e| (e.date, e)).collect::<BTreeMap<_, _>>();
        tracing::info!("Loaded {} entries for {}", index.len(), user);
        Ok(Self { user, rows, index })
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Entry> {
        self.index.get(&date)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Date-ordered iteration over the whole index.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.index.values()
    }

    /// Date-ascending entries belonging to one month.
    pub fn month_entries(&self, key: MonthKey) -> Vec<&Entry> {
        self.index
            .values()
            .filter(|entry| key.contains(entry.date))
            .collect()
    }

    /// Upsert for one calendar day. Empty text is rejected locally; empty
    /// tracker text values are dropped so the stored mapping stays sparse.
    pub async fn save(
        &mut self,
        date: NaiveDate,
        rating: Rating,
        text: &str,
        trackers: TrackerValues,
        starred: bool,
    ) -> Result<Entry> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyEntryText.into());
        }

        let trackers: TrackerValues = trackers
            .into_iter()
            .filter(|(_, value)| !matches!(value, TrackerValue::Text(t) if t.is_empty()))
            .collect();

        let entry = Entry {
            date,
            rating,
            text: text.to_string(),
            trackers,
            starred,
        };

        if self.index.contains_key(&date) {
            self.rows.update_entry(&self.user, &entry).await?;
        } else {
            self.rows.insert_entry(&self.user, &entry).await?;
        }
        self.index.insert(date, entry.clone());
        Ok(entry)
    }

    /// Removes the entry row first, then cascades to its attachments, then
    /// drops the local index entry. Attachment cleanup only runs once the row
    /// delete is confirmed, so a failed row delete never strands
    /// referenced-but-deleted files.
    pub async fn delete(
        &mut self,
        date: NaiveDate,
        attachments: &mut AttachmentManager,
    ) -> Result<()> {
        self.rows.delete_entry(&self.user, date).await?;
        attachments.remove_all(date).await?;
        self.index.remove(&date);
        Ok(())
    }

    /// Independent partial update; valid even while the rest of the entry is
    /// untouched. Returns the updated entry when it is locally known.
    pub async fn set_starred(&mut self, date: NaiveDate, starred: bool) -> Result<Option<Entry>> {
        self.rows.set_entry_starred(&self.user, date, starred).await?;
        Ok(self.index.get_mut(&date).map(|entry| {
            entry.starred = starred;
            entry.clone()
        }))
    }

    /// Local search over the loaded index: an all-digit query matches against
    /// the `YYYY-MM-DD` date string, anything else substring-matches the
    /// entry text.
    pub fn search(&self, query: &str, ascending: bool) -> Vec<&Entry> {
        let numeric = !query.is_empty() && query.chars().all(|c| c.is_ascii_digit());
        let mut hits: Vec<&Entry> = self
            .index
            .values()
            .filter(|entry| {
                if numeric {
                    entry.date.to_string().contains(query)
                } else {
                    entry.text.contains(query)
                }
            })
            .collect();
        if !ascending {
            hits.reverse();
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MemoryBlobs, MemoryRows};
    use std::sync::atomic::Ordering;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn store() -> (Arc<MemoryRows>, EntryStore) {
        let rows = Arc::new(MemoryRows::default());
        let store = EntryStore::load(UserId::from("u1"), rows.clone())
            .await
            .unwrap();
        (rows, store)
    }

    fn attachments() -> (Arc<MemoryBlobs>, AttachmentManager) {
        let blobs = Arc::new(MemoryBlobs::default());
        (blobs.clone(), AttachmentManager::new(UserId::from("u1"), blobs))
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let (_rows, mut store) = store().await;
        let d = date(2024, 8, 10);
        let mut trackers = TrackerValues::new();
        trackers.insert("Gym".into(), TrackerValue::Flag(true));

        store
            .save(d, Rating::new(7).unwrap(), "good day", trackers.clone(), true)
            .await
            .unwrap();

        let entry = store.get(d).unwrap();
        assert_eq!(entry.rating.get(), 7);
        assert_eq!(entry.text, "good day");
        assert_eq!(entry.trackers, trackers);
        assert!(entry.starred);
    }

    #[tokio::test]
    async fn save_twice_updates_in_place() {
        let (rows, mut store) = store().await;
        let d = date(2024, 8, 10);
        store
            .save(d, Rating::new(3).unwrap(), "meh", TrackerValues::new(), false)
            .await
            .unwrap();
        store
            .save(d, Rating::new(9).unwrap(), "actually great", TrackerValues::new(), false)
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(rows.entries.lock().unwrap().len(), 1);
        assert_eq!(store.get(d).unwrap().rating.get(), 9);
    }

    #[tokio::test]
    async fn empty_text_is_rejected_without_a_remote_call() {
        let (rows, mut store) = store().await;
        let before = rows.call_count();
        let err = store
            .save(date(2024, 8, 10), Rating::UNRATED, "   ", TrackerValues::new(), false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Validation(ValidationError::EmptyEntryText)
        ));
        assert!(err.is_local());
        assert_eq!(rows.call_count(), before);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn empty_tracker_text_values_are_dropped() {
        let (_rows, mut store) = store().await;
        let d = date(2024, 8, 10);
        let mut trackers = TrackerValues::new();
        trackers.insert("Dinner".into(), TrackerValue::Text(String::new()));
        trackers.insert("Gym".into(), TrackerValue::Flag(false));

        store
            .save(d, Rating::UNRATED, "quiet day", trackers, false)
            .await
            .unwrap();

        let saved = &store.get(d).unwrap().trackers;
        assert!(!saved.contains_key("Dinner"));
        // false checkbox values are real data and stay
        assert_eq!(saved.get("Gym"), Some(&TrackerValue::Flag(false)));
    }

    #[tokio::test]
    async fn remote_failure_leaves_the_index_unchanged() {
        let (rows, mut store) = store().await;
        let d = date(2024, 8, 10);
        store
            .save(d, Rating::new(5).unwrap(), "before", TrackerValues::new(), false)
            .await
            .unwrap();

        rows.fail.store(true, Ordering::SeqCst);
        let err = store
            .save(d, Rating::new(1).unwrap(), "after", TrackerValues::new(), false)
            .await
            .unwrap_err();
        assert!(!err.is_local());
        assert_eq!(store.get(d).unwrap().text, "before");

        let (_blobs, mut atts) = attachments();
        assert!(store.delete(d, &mut atts).await.is_err());
        assert!(store.get(d).is_some());
    }

    #[tokio::test]
    async fn delete_cascades_to_attachments() {
        let (_rows, mut store) = store().await;
        let (blobs, mut atts) = attachments();
        let d = date(2024, 8, 10);
        store
            .save(d, Rating::new(5).unwrap(), "with photos", TrackerValues::new(), false)
            .await
            .unwrap();
        atts.upload(d, "a.jpg", "image/jpeg", vec![1]).await.unwrap();
        atts.upload(d, "b.jpg", "image/jpeg", vec![2]).await.unwrap();

        store.delete(d, &mut atts).await.unwrap();

        assert!(store.get(d).is_none());
        assert!(atts.list(d).await.unwrap().is_empty());
        assert!(blobs.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_starred_is_an_independent_partial_update() {
        let (rows, mut store) = store().await;
        let d = date(2024, 8, 10);
        store
            .save(d, Rating::new(5).unwrap(), "day", TrackerValues::new(), false)
            .await
            .unwrap();

        let updated = store.set_starred(d, true).await.unwrap().unwrap();
        assert!(updated.starred);
        assert!(rows.entries.lock().unwrap().get(&d).unwrap().starred);
        // rest of the entry untouched
        assert_eq!(store.get(d).unwrap().text, "day");
    }

    #[tokio::test]
    async fn search_matches_dates_for_numeric_queries_and_text_otherwise() {
        let (_rows, mut store) = store().await;
        store
            .save(date(2024, 8, 10), Rating::UNRATED, "beach trip", TrackerValues::new(), false)
            .await
            .unwrap();
        store
            .save(date(2024, 9, 1), Rating::UNRATED, "back to work", TrackerValues::new(), false)
            .await
            .unwrap();

        let by_text = store.search("beach", true);
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].date, date(2024, 8, 10));

        let by_date = store.search("2024", false);
        assert_eq!(by_date.len(), 2);
        // descending order
        assert_eq!(by_date[0].date, date(2024, 9, 1));
    }
}
