mod attachment;
mod entry;
mod summary;
mod tracker;

pub use attachment::{Attachment, MAX_UPLOAD_BYTES, SIGNED_URL_TTL_SECS};
pub use entry::{Entry, Rating, TrackerValue, TrackerValues, UserId};
pub use summary::{parse_summary, CachedSummary, MonthKey, ParsedSummary};
pub use tracker::{sort_trackers, TrackerDefinition, TrackerKind, DEFAULT_TRACKER_ICON};

/// Fixed 11-slot rating gradient; index `rating - 1`, gray sentinel at the end.
pub const RATING_COLORS: [&str; 11] = [
    "#FF0000", "#FF3300", "#FF6600", "#FF9900", "#FFCC00", "#FFFF00", "#CCFF00", "#99FF00",
    "#66FF00", "#33FF00", "#bdbdbd",
];
