mod projector;
mod selection;

pub use projector::{project_all, project_one, CalendarEvent, CalendarPatch, EventDisplay};
pub use selection::{allow_selection, day_access, DayAccess, EDIT_WINDOW_DAYS};
