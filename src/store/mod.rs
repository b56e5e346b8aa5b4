mod attachments;
mod draft;
mod entries;
mod trackers;

pub use attachments::AttachmentManager;
pub use draft::DraftCache;
pub use entries::EntryStore;
pub use trackers::TrackerRegistry;
