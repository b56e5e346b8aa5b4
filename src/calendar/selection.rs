use chrono::NaiveDate;

/// Days older than this open read-only unless edit mode is active.
pub const EDIT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayAccess {
    /// Entry may be created or edited.
    Editable,
    /// Strictly older than the edit window with edit mode off: detail view only.
    ReadOnly,
    /// Future days are never selectable for creation in any mode.
    Future,
}

/// Selection-eligibility rule consumed from the calendar widget: a range must
/// cover exactly one day (`end` is exclusive) and must not reach past today.
pub fn allow_selection(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> bool {
    let single_day = end - start == chrono::Duration::days(1);
    let last_day = end - chrono::Duration::days(1);
    single_day && last_day <= today
}

pub fn day_access(date: NaiveDate, today: NaiveDate, edit_mode: bool) -> DayAccess {
    if date > today {
        return DayAccess::Future;
    }
    if (today - date).num_days() > EDIT_WINDOW_DAYS && !edit_mode {
        return DayAccess::ReadOnly;
    }
    DayAccess::Editable
}
