use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Signed URLs are valid for 7 days.
pub const SIGNED_URL_TTL_SECS: u64 = 3600 * 24 * 7;

/// 10 MiB upload ceiling.
pub const MAX_UPLOAD_BYTES: usize = 10_485_760;

/// One stored file attached to an entry, addressed as
/// `{user}/{date}/{filename}` in blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub date: NaiveDate,
    pub filename: String,
    /// Time-boxed signed URL; refreshed on every listing.
    pub url: String,
}
