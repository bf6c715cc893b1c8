use crate::domain::search::{self, SearchQuery};
use crate::domain::{
    DomainError, Event, EventBus, NewProfile, Profile, ProfileChanges, ProfileRepository, ProfileStats, SortKey,
};
use std::sync::Arc;

/// ProfileService manages SSH profiles
pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
    event_bus: Arc<EventBus>,
}

impl ProfileService {
    /// Create a new ProfileService with the provided repository and event bus
    pub fn new(repository: Arc<dyn ProfileRepository>, event_bus: Arc<EventBus>) -> Self {
        Self {
            repository,
            event_bus,
        }
    }

    /// Add a new profile
    pub async fn add_profile(&self, fields: NewProfile) -> Result<Profile, DomainError> {
        let profile = self.repository.add(fields).await?;
        self.event_bus.publish(Event::ProfileCreated(profile.clone()));
        Ok(profile)
    }

    /// Get a profile by name
    pub async fn get_profile(&self, name: &str) -> Result<Profile, DomainError> {
        self.repository.get(name).await
    }

    /// Apply a partial update; an empty change set is a no-op
    pub async fn update_profile(&self, name: &str, changes: ProfileChanges) -> Result<Profile, DomainError> {
        if changes.is_empty() {
            return self.repository.get(name).await;
        }

        let profile = self.repository.edit(name, changes).await?;
        self.event_bus.publish(Event::ProfileUpdated {
            previous_name: name.to_string(),
            profile: profile.clone(),
        });
        Ok(profile)
    }

    /// Remove a profile by name
    pub async fn remove_profile(&self, name: &str) -> Result<Profile, DomainError> {
        let removed = self.repository.delete(name).await?;
        self.event_bus.publish(Event::ProfileRemoved(removed.clone()));
        Ok(removed)
    }

    /// List profiles carrying every tag in `tags`, ordered by `sort`
    pub async fn list_profiles(&self, sort: SortKey, tags: &[String]) -> Result<Vec<Profile>, DomainError> {
        let filter = SearchQuery::default().with_tags(tags);
        let mut profiles: Vec<Profile> = self
            .repository
            .list()
            .await?
            .into_iter()
            .filter(|profile| filter.matches(profile))
            .collect();
        sort.apply(&mut profiles);
        Ok(profiles)
    }

    /// Free-text search; `#tag` tokens and `tags` both filter by tag
    pub async fn search_profiles(&self, query: &str, tags: &[String]) -> Result<Vec<Profile>, DomainError> {
        let profiles = self.repository.list().await?;
        let found = search::search(&profiles, query, tags).cloned().collect();
        Ok(found)
    }

    pub async fn stats(&self) -> Result<ProfileStats, DomainError> {
        let profiles = self.repository.list().await?;
        Ok(ProfileStats::compute(&profiles))
    }

    /// Names resembling `name`, for "did you mean" hints
    pub async fn suggest_similar(&self, name: &str) -> Result<Vec<String>, DomainError> {
        let profiles = self.repository.list().await?;
        Ok(search::suggest_similar(&profiles, name))
    }

    /// Delete every profile, returning how many were removed
    pub async fn reset_all(&self) -> Result<usize, DomainError> {
        let count = self.repository.clear().await?;
        self.event_bus.publish(Event::ProfilesCleared(count));
        Ok(count)
    }
}
