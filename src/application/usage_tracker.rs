use crate::domain::{DomainError, Event, EventBus, Profile, ProfileRepository};
use chrono::Utc;
use std::sync::Arc;

/// Records that a connection attempt was issued for a profile
pub struct UsageTracker {
    repository: Arc<dyn ProfileRepository>,
    event_bus: Arc<EventBus>,
}

impl UsageTracker {
    pub fn new(repository: Arc<dyn ProfileRepository>, event_bus: Arc<EventBus>) -> Self {
        Self {
            repository,
            event_bus,
        }
    }

    /// Stamp `last_used` with the current time and add one to `use_count`.
    ///
    /// Every call counts; two calls in a row yield N+1 and N+2.
    pub async fn record_use(&self, name: &str) -> Result<Profile, DomainError> {
        let profile = self.repository.mark_used(name, Utc::now()).await?;
        tracing::debug!(name = %profile.name, use_count = profile.use_count, "usage recorded");
        self.event_bus.publish(Event::ProfileUsed(profile.clone()));
        Ok(profile)
    }
}
