mod rows;
mod storage;

pub use rows::RestRows;
pub use storage::RestBlobs;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{CachedSummary, Entry, MonthKey, TrackerDefinition, UserId};

/// Row-level CRUD against the remote persistence gateway. Keys are
/// `(user, date)` for entries, `(user, name)` for trackers and
/// `(user, month, year)` for summaries.
#[async_trait]
pub trait RemoteRows: Send + Sync {
    async fn fetch_entries(&self, user: &UserId) -> Result<Vec<Entry>>;
    async fn insert_entry(&self, user: &UserId, entry: &Entry) -> Result<()>;
    async fn update_entry(&self, user: &UserId, entry: &Entry) -> Result<()>;
    async fn delete_entry(&self, user: &UserId, date: NaiveDate) -> Result<()>;
    async fn set_entry_starred(&self, user: &UserId, date: NaiveDate, starred: bool) -> Result<()>;

    async fn fetch_trackers(&self, user: &UserId) -> Result<Vec<TrackerDefinition>>;
    async fn insert_tracker(&self, user: &UserId, tracker: &TrackerDefinition) -> Result<()>;
    async fn delete_tracker(&self, user: &UserId, name: &str) -> Result<()>;
    async fn set_tracker_icon(&self, user: &UserId, name: &str, icon: &str) -> Result<()>;

    async fn fetch_summary(&self, user: &UserId, key: MonthKey) -> Result<Option<CachedSummary>>;
    async fn insert_summary(&self, user: &UserId, summary: &CachedSummary) -> Result<()>;
    /// Returns `false` when no row exists for the key; never inserts.
    async fn update_summary(&self, user: &UserId, summary: &CachedSummary) -> Result<bool>;
    async fn delete_summary(&self, user: &UserId, key: MonthKey) -> Result<()>;
}

/// Blob storage for attachments, keyed by `{user}/{date}/{filename}` paths.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Filenames directly under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
    /// One batched signing call for all paths; URLs come back in input order.
    async fn sign_many(&self, paths: &[String], ttl_secs: u64) -> Result<Vec<String>>;
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<()>;
    async fn remove(&self, paths: &[String]) -> Result<()>;
}

/// Single-shot AI completion call; no retry, no streaming.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Small local key/value scratch space (draft slot, preserved corrupt summary
/// payloads). Best-effort persistence, synchronous.
pub trait ScratchStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}
