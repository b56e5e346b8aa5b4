//! In-memory fakes for the remote gateways, used by unit tests only.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{CachedSummary, Entry, MonthKey, TrackerDefinition, UserId};
use crate::remote::{BlobStore, CompletionService, RemoteRows, ScratchStore};

fn failure() -> AppError {
    AppError::Remote("injected failure".to_string())
}

#[derive(Default)]
pub struct MemoryRows {
    pub entries: Mutex<BTreeMap<NaiveDate, Entry>>,
    pub trackers: Mutex<Vec<TrackerDefinition>>,
    pub summaries: Mutex<HashMap<(u32, i32), CachedSummary>>,
    /// When set, every call fails before touching state.
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl MemoryRows {
    fn tick(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(failure())
        } else {
            Ok(())
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteRows for MemoryRows {
    async fn fetch_entries(&self, _user: &UserId) -> Result<Vec<Entry>> {
        self.tick()?;
        Ok(self.entries.lock().unwrap().values().cloned().collect())
    }

    async fn insert_entry(&self, _user: &UserId, entry: &Entry) -> Result<()> {
        self.tick()?;
        self.entries.lock().unwrap().insert(entry.date, entry.clone());
        Ok(())
    }

    async fn update_entry(&self, _user: &UserId, entry: &Entry) -> Result<()> {
        self.tick()?;
        self.entries.lock().unwrap().insert(entry.date, entry.clone());
        Ok(())
    }

    async fn delete_entry(&self, _user: &UserId, date: NaiveDate) -> Result<()> {
        self.tick()?;
        self.entries.lock().unwrap().remove(&date);
        Ok(())
    }

    async fn set_entry_starred(
        &self,
        _user: &UserId,
        date: NaiveDate,
        starred: bool,
    ) -> Result<()> {
        self.tick()?;
        if let Some(entry) = self.entries.lock().unwrap().get_mut(&date) {
            entry.starred = starred;
        }
        Ok(())
    }

    async fn fetch_trackers(&self, _user: &UserId) -> Result<Vec<TrackerDefinition>> {
        self.tick()?;
        Ok(self.trackers.lock().unwrap().clone())
    }

    async fn insert_tracker(&self, _user: &UserId, tracker: &TrackerDefinition) -> Result<()> {
        self.tick()?;
        self.trackers.lock().unwrap().push(tracker.clone());
        Ok(())
    }

    async fn delete_tracker(&self, _user: &UserId, name: &str) -> Result<()> {
        self.tick()?;
        self.trackers.lock().unwrap().retain(|t| t.name != name);
        Ok(())
    }

    async fn set_tracker_icon(&self, _user: &UserId, name: &str, icon: &str) -> Result<()> {
        self.tick()?;
        let mut trackers = self.trackers.lock().unwrap();
        if let Some(tracker) = trackers.iter_mut().find(|t| t.name == name) {
            tracker.icon = icon.to_string();
        }
        Ok(())
    }

    async fn fetch_summary(&self, _user: &UserId, key: MonthKey) -> Result<Option<CachedSummary>> {
        self.tick()?;
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .get(&(key.month, key.year))
            .cloned())
    }

    async fn insert_summary(&self, _user: &UserId, summary: &CachedSummary) -> Result<()> {
        self.tick()?;
        self.summaries
            .lock()
            .unwrap()
            .insert((summary.month, summary.year), summary.clone());
        Ok(())
    }

    async fn update_summary(&self, _user: &UserId, summary: &CachedSummary) -> Result<bool> {
        self.tick()?;
        let mut summaries = self.summaries.lock().unwrap();
        match summaries.get_mut(&(summary.month, summary.year)) {
            Some(existing) => {
                *existing = summary.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_summary(&self, _user: &UserId, key: MonthKey) -> Result<()> {
        self.tick()?;
        self.summaries.lock().unwrap().remove(&(key.month, key.year));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBlobs {
    /// path -> content type
    pub objects: Mutex<BTreeMap<String, String>>,
    pub sign_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = format!("{prefix}/");
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .map(|name| name.to_string())
            .collect())
    }

    async fn sign_many(&self, paths: &[String], ttl_secs: u64) -> Result<Vec<String>> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        Ok(paths
            .iter()
            .map(|path| format!("https://signed.test/{path}?expires={ttl_secs}"))
            .collect())
    }

    async fn upload(&self, path: &str, content_type: &str, _bytes: Vec<u8>) -> Result<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(path) {
            return Err(AppError::Remote(format!("'{path}' already exists")));
        }
        objects.insert(path.to_string(), content_type.to_string());
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<()> {
        let mut objects = self.objects.lock().unwrap();
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryScratch {
    pub map: Mutex<BTreeMap<String, String>>,
}

impl ScratchStore for MemoryScratch {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.map.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Completion fake that replays queued responses in order.
#[derive(Default)]
pub struct CannedCompletion {
    pub responses: Mutex<VecDeque<String>>,
    pub calls: AtomicUsize,
}

impl CannedCompletion {
    pub fn with_response(raw: &str) -> Self {
        let canned = Self::default();
        canned.responses.lock().unwrap().push_back(raw.to_string());
        canned
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for CannedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::CompletionApi("no canned response queued".to_string()))
    }
}
