use chrono::NaiveDate;

use crate::models::{Entry, TrackerDefinition, RATING_COLORS};

/// How the calendar widget should render an event. Today's entry is a small
/// foreground marker so it stays visible even when the month is dense; every
/// other day fills the whole square with the rating color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisplay {
    Foreground,
    Background,
}

/// One visual calendar event, derived from an entry. Never mutated in place;
/// a new event is projected after each confirmed store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub color: &'static str,
    pub display: EventDisplay,
    /// Entry text; suppressed on narrow presentation contexts.
    pub title: Option<String>,
    pub starred: bool,
    /// Icons of checkbox trackers whose value is true for this day.
    pub glyphs: Vec<String>,
}

/// Incremental instruction for the calendar widget. After the initial full
/// projection, every mutation produces exactly one patch; the full rebuild
/// path is never re-invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarPatch {
    Upsert(CalendarEvent),
    Remove(NaiveDate),
}

/// Projects a single entry to its visual event.
pub fn project_one(
    entry: &Entry,
    trackers: &[TrackerDefinition],
    today: NaiveDate,
    narrow: bool,
) -> CalendarEvent {
    let glyphs = entry
        .trackers
        .iter()
        .filter(|(_, value)| value.as_flag() == Some(true))
        .filter_map(|(name, _)| trackers.iter().find(|t| &t.name == name))
        .map(|tracker| tracker.icon.clone())
        .collect();

    CalendarEvent {
        date: entry.date,
        color: RATING_COLORS[entry.rating.color_index()],
        display: if entry.date == today {
            EventDisplay::Foreground
        } else {
            EventDisplay::Background
        },
        title: (!narrow).then(|| entry.text.clone()),
        starred: entry.starred,
        glyphs,
    }
}

/// Full projection, used exactly once after the initial load. Output is
/// ordered by date.
pub fn project_all<'a, I>(
    entries: I,
    trackers: &[TrackerDefinition],
    today: NaiveDate,
    narrow: bool,
) -> Vec<CalendarEvent>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut events: Vec<CalendarEvent> = entries
        .into_iter()
        .map(|entry| project_one(entry, trackers, today, narrow))
        .collect();
    events.sort_by_key(|event| event.date);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rating, TrackerKind, TrackerValue, TrackerValues};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(d: NaiveDate, rating: u8) -> Entry {
        Entry {
            date: d,
            rating: Rating::new(rating).unwrap(),
            text: "walked the dog".into(),
            trackers: TrackerValues::new(),
            starred: false,
        }
    }

    #[test]
    fn today_is_foreground_everything_else_background() {
        let today = date(2024, 8, 20);
        let ev = project_one(&entry(today, 5), &[], today, false);
        assert_eq!(ev.display, EventDisplay::Foreground);

        let ev = project_one(&entry(date(2024, 8, 19), 5), &[], today, false);
        assert_eq!(ev.display, EventDisplay::Background);
    }

    #[test]
    fn color_comes_from_the_gradient_with_gray_sentinel() {
        let today = date(2024, 8, 20);
        let ev = project_one(&entry(today, 1), &[], today, false);
        assert_eq!(ev.color, "#FF0000");

        let mut unrated = entry(today, 5);
        unrated.rating = Rating::UNRATED;
        let ev = project_one(&unrated, &[], today, false);
        assert_eq!(ev.color, "#bdbdbd");
    }

    #[test]
    fn title_suppressed_when_narrow() {
        let today = date(2024, 8, 20);
        assert_eq!(
            project_one(&entry(today, 5), &[], today, false).title.as_deref(),
            Some("walked the dog")
        );
        assert_eq!(project_one(&entry(today, 5), &[], today, true).title, None);
    }

    #[test]
    fn glyphs_only_for_true_checkbox_trackers() {
        let today = date(2024, 8, 20);
        let trackers = vec![
            TrackerDefinition::new("Gym", TrackerKind::Checkbox),
            TrackerDefinition::new("Read", TrackerKind::Checkbox),
            TrackerDefinition::new("Dinner", TrackerKind::Text),
        ];
        let mut e = entry(today, 5);
        e.trackers.insert("Gym".into(), TrackerValue::Flag(true));
        e.trackers.insert("Read".into(), TrackerValue::Flag(false));
        e.trackers
            .insert("Dinner".into(), TrackerValue::Text("ramen".into()));
        // A value whose tracker was deleted produces no glyph either
        e.trackers.insert("Ghost".into(), TrackerValue::Flag(true));

        let ev = project_one(&e, &trackers, today, false);
        assert_eq!(ev.glyphs, vec!["fas fa-circle".to_string()]);
    }

    #[test]
    fn full_projection_is_date_ordered() {
        let today = date(2024, 8, 20);
        let entries = vec![
            entry(date(2024, 8, 12), 3),
            entry(date(2024, 8, 2), 8),
            entry(date(2024, 8, 20), 9),
        ];
        let events = project_all(&entries, &[], today, false);
        let dates: Vec<NaiveDate> = events.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 8, 2), date(2024, 8, 12), date(2024, 8, 20)]
        );
    }
}
