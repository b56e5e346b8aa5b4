use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Any remote CRUD or storage call that did not succeed. The operation is
    /// aborted and local state is left unchanged; never retried.
    #[error("Remote call failed: {0}")]
    Remote(String),

    #[error("Completion API error: {0}")]
    CompletionApi(String),

    /// The stored or freshly generated summary text does not match the
    /// narrative + "**Highlights:**" + three numbered highlights contract.
    #[error("Summary for {month}/{year} does not match the highlights format")]
    SummaryFormat { month: u32, year: i32 },

    #[error("Only {have} entries exist for that month; at least {need} are required")]
    InsufficientData { have: usize, need: usize },

    #[error("The current month cannot be summarized")]
    CurrentMonth,

    #[error("No summary exists for {month}/{year}")]
    SummaryMissing { month: u32, year: i32 },
}

/// Rejected locally before any remote call is attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Entry text must not be empty")]
    EmptyEntryText,

    #[error("Rating {0} is outside 1-10")]
    RatingOutOfRange(u8),

    #[error("A tracker named '{0}' already exists")]
    DuplicateTracker(String),

    #[error("A file named '{0}' already exists for that date")]
    DuplicateFilename(String),

    #[error("File is {size} bytes; the limit is {limit}")]
    OversizeUpload { size: usize, limit: usize },

    #[error("Only image uploads are accepted, got '{0}'")]
    NotAnImage(String),

    #[error("Month {0} is outside 1-12")]
    BadMonth(u32),
}

impl AppError {
    /// True for failures produced before any remote call was made.
    pub fn is_local(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}
