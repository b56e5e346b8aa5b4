use std::sync::Arc;

use crate::error::{Result, ValidationError};
use crate::models::{sort_trackers, TrackerDefinition, TrackerKind, UserId};
use crate::remote::RemoteRows;

/// Session-scoped mirror of the user's tracker definitions. The local list is
/// only updated after a successful remote acknowledgment; there is no
/// rollback path because nothing is applied early.
pub struct TrackerRegistry {
    user: UserId,
    rows: Arc<dyn RemoteRows>,
    trackers: Vec<TrackerDefinition>,
}

impl TrackerRegistry {
    pub async fn load(user: UserId, rows: Arc<dyn RemoteRows>) -> Result<Self> {
        let mut trackers = rows.fetch_trackers(&user).await?;
        sort_trackers(&mut trackers);
        tracing::info!("Loaded {} trackers for {}", trackers.len(), user);
        Ok(Self {
            user,
            rows,
            trackers,
        })
    }

    /// Ordered view: text trackers first, checkbox trackers last, stable
    /// within each group.
    pub fn list(&self) -> &[TrackerDefinition] {
        &self.trackers
    }

    pub fn get(&self, name: &str) -> Option<&TrackerDefinition> {
        self.trackers.iter().find(|t| t.name == name)
    }

    pub async fn create(&mut self, name: &str, kind: TrackerKind) -> Result<TrackerDefinition> {
        let tracker = TrackerDefinition::new(name, kind);
        if self.trackers.iter().any(|t| t.name == tracker.name) {
            return Err(ValidationError::DuplicateTracker(tracker.name).into());
        }

        self.rows.insert_tracker(&self.user, &tracker).await?;
        self.trackers.push(tracker.clone());
        sort_trackers(&mut self.trackers);
        Ok(tracker)
    }

    /// Removes the definition only. Values already recorded on entries under
    /// this name stay stored and simply stop rendering.
    pub async fn delete(&mut self, name: &str) -> Result<()> {
        self.rows.delete_tracker(&self.user, name).await?;
        self.trackers.retain(|t| t.name != name);
        Ok(())
    }

    pub async fn set_icon(&mut self, name: &str, icon: &str) -> Result<()> {
        self.rows.set_tracker_icon(&self.user, name, icon).await?;
        if let Some(tracker) = self.trackers.iter_mut().find(|t| t.name == name) {
            tracker.icon = icon.to_string();
        }
        Ok(())
    }
}
