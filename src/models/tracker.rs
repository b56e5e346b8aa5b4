use serde::{Deserialize, Serialize};

pub const DEFAULT_TRACKER_ICON: &str = "fas fa-circle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    Text,
    Checkbox,
}

/// User-defined per-day attribute. The kind is fixed at creation; only the
/// icon is mutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TrackerKind,
    pub icon: String,
}

impl TrackerDefinition {
    pub fn new(name: &str, kind: TrackerKind) -> Self {
        TrackerDefinition {
            name: capitalize(name),
            kind,
            icon: DEFAULT_TRACKER_ICON.to_string(),
        }
    }
}

/// Text trackers sort before checkbox trackers; insertion order is preserved
/// within each group.
pub fn sort_trackers(trackers: &mut [TrackerDefinition]) {
    trackers.sort_by_key(|t| matches!(t.kind, TrackerKind::Checkbox));
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
