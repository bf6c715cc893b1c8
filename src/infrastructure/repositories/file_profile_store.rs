use crate::domain::validation::{normalize_changes, normalize_fields, validate_profile};
use crate::domain::{
    ConflictPolicy, DomainError, MergeReport, NewProfile, Profile, ProfileChanges, ProfileRepository,
};
use crate::infrastructure::repositories::profile_document;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Ordered profiles plus a name -> position index
#[derive(Debug, Clone, Default)]
struct StoreState {
    profiles: Vec<Profile>,
    index: HashMap<String, usize>,
}

impl StoreState {
    fn new(profiles: Vec<Profile>) -> Self {
        let mut state = Self {
            profiles,
            index: HashMap::new(),
        };
        state.reindex();
        state
    }

    fn reindex(&mut self) {
        self.index = self
            .profiles
            .iter()
            .enumerate()
            .map(|(position, profile)| (profile.name.clone(), position))
            .collect();
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn require(&self, name: &str) -> Result<usize, DomainError> {
        self.position(name)
            .ok_or_else(|| DomainError::NotFound(name.to_string()))
    }

    fn id_taken(&self, id: &str, except: Option<usize>) -> bool {
        self.profiles
            .iter()
            .enumerate()
            .any(|(position, p)| p.id == id && Some(position) != except)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.id_taken(&id, None) {
                return id;
            }
        }
    }

    fn push(&mut self, profile: Profile) {
        self.index.insert(profile.name.clone(), self.profiles.len());
        self.profiles.push(profile);
    }
}

/// JSON-file backed profile store.
///
/// Every mutation is applied to a copy of the state, written to disk with an
/// atomic replace, and only then swapped in. A failed write leaves both the
/// file and the in-memory state as they were.
pub struct ProfileStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl ProfileStore {
    /// Load the store from `path`. A missing file yields an empty store; a
    /// malformed one is a `CorruptConfig` error.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let profiles = match profile_document::read(&path).await? {
            Some(profiles) => {
                tracing::debug!(path = %path.display(), count = profiles.len(), "loaded profiles");
                profiles
            }
            None => {
                tracing::debug!(path = %path.display(), "no profiles file yet, starting empty");
                Vec::new()
            }
        };

        Ok(Self {
            path,
            state: RwLock::new(StoreState::new(profiles)),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn commit<T, F>(&self, mutate: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut StoreState) -> Result<T, DomainError>,
    {
        let mut state = self.state.write().await;
        let mut candidate = state.clone();
        let outcome = mutate(&mut candidate)?;
        candidate.reindex();

        profile_document::write(&self.path, &candidate.profiles)?;
        tracing::debug!(path = %self.path.display(), count = candidate.profiles.len(), "saved profiles");

        *state = candidate;
        Ok(outcome)
    }
}

#[async_trait]
impl ProfileRepository for ProfileStore {
    async fn add(&self, fields: NewProfile) -> Result<Profile, DomainError> {
        let fields = normalize_fields(fields)?;

        self.commit(|state| {
            if state.position(&fields.name).is_some() {
                return Err(DomainError::DuplicateName(fields.name));
            }
            let profile = Profile::from_fields(fields, state.fresh_id(), Utc::now());
            validate_profile(&profile)?;
            state.push(profile.clone());
            Ok(profile)
        })
        .await
    }

    async fn get(&self, name: &str) -> Result<Profile, DomainError> {
        let state = self.state.read().await;
        let position = state.require(name)?;
        Ok(state.profiles[position].clone())
    }

    async fn edit(&self, name: &str, changes: ProfileChanges) -> Result<Profile, DomainError> {
        let changes = normalize_changes(changes)?;

        self.commit(|state| {
            let position = state.require(name)?;
            let mut updated = state.profiles[position].clone();
            updated.apply(changes);
            validate_profile(&updated)?;

            if updated.name != name && state.position(&updated.name).is_some() {
                return Err(DomainError::DuplicateName(updated.name));
            }

            state.profiles[position] = updated.clone();
            Ok(updated)
        })
        .await
    }

    async fn delete(&self, name: &str) -> Result<Profile, DomainError> {
        self.commit(|state| {
            let position = state.require(name)?;
            Ok(state.profiles.remove(position))
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Profile>, DomainError> {
        let state = self.state.read().await;
        Ok(state.profiles.clone())
    }

    async fn exists(&self, name: &str) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(state.position(name).is_some())
    }

    async fn mark_used(&self, name: &str, at: DateTime<Utc>) -> Result<Profile, DomainError> {
        self.commit(|state| {
            let position = state.require(name)?;
            let profile = &mut state.profiles[position];
            profile.last_used = Some(at);
            profile.use_count = profile.use_count.saturating_add(1);
            Ok(profile.clone())
        })
        .await
    }

    async fn merge(&self, profiles: Vec<Profile>, policy: ConflictPolicy) -> Result<MergeReport, DomainError> {
        for profile in &profiles {
            validate_profile(profile)?;
        }

        self.commit(|state| {
            let mut report = MergeReport::default();

            for mut incoming in profiles {
                match state.position(&incoming.name) {
                    Some(_) if policy == ConflictPolicy::Skip => report.skipped += 1,
                    Some(position) => {
                        if state.id_taken(&incoming.id, Some(position)) {
                            incoming.id = state.fresh_id();
                        }
                        state.profiles[position] = incoming;
                        report.replaced += 1;
                    }
                    None => {
                        if state.id_taken(&incoming.id, None) {
                            incoming.id = state.fresh_id();
                        }
                        state.push(incoming);
                        report.added += 1;
                    }
                }
            }

            Ok(report)
        })
        .await
    }

    async fn clear(&self) -> Result<usize, DomainError> {
        self.commit(|state| {
            let removed = state.profiles.len();
            state.profiles.clear();
            Ok(removed)
        })
        .await
    }

    async fn save(&self) -> Result<(), DomainError> {
        let state = self.state.read().await;
        profile_document::write(&self.path, &state.profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (ProfileStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = ProfileStore::load(temp.path().join("profiles.json")).await.unwrap();
        (store, temp)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let (store, _temp) = store().await;
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_add_assigns_id_and_persists() {
        let (store, _temp) = store().await;
        let added = store
            .add(NewProfile::new("web", "example.com", "deploy").tag("Prod"))
            .await
            .unwrap();

        assert!(!added.id.is_empty());
        assert!(added.tags.contains("prod"));
        assert_eq!(added.use_count, 0);
        assert!(store.path().exists());

        let reloaded = ProfileStore::load(store.path()).await.unwrap();
        assert_eq!(reloaded.get("web").await.unwrap(), added);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_fields() {
        let (store, _temp) = store().await;
        let result = store.add(NewProfile::new("web", "", "deploy")).await;
        assert!(matches!(result, Err(DomainError::Validation { field: "host", .. })));
        let result = store.add(NewProfile::new("web", "h", "u").port(0)).await;
        assert!(matches!(result, Err(DomainError::Validation { field: "port", .. })));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_padded_name_is_rejected_not_trimmed() {
        let (store, _temp) = store().await;
        let result = store.add(NewProfile::new(" web ", "h", "u")).await;
        assert!(matches!(result, Err(DomainError::Validation { field: "name", .. })));
        assert!(store.list().await.unwrap().is_empty());

        store.add(NewProfile::new("web", "h", "u")).await.unwrap();
        let result = store.edit("web", ProfileChanges::default().rename("web ")).await;
        assert!(matches!(result, Err(DomainError::Validation { field: "name", .. })));
        let result = store.edit("web", ProfileChanges::default().host(" h")).await;
        assert!(matches!(result, Err(DomainError::Validation { field: "host", .. })));
    }

    #[tokio::test]
    async fn test_description_is_stored_as_typed() {
        let (store, _temp) = store().await;
        let added = store
            .add(NewProfile::new("web", "h", "u").description("  indented note  "))
            .await
            .unwrap();
        assert_eq!(added.description.as_deref(), Some("  indented note  "));
        assert_eq!(store.get("web").await.unwrap(), added);
    }

    #[tokio::test]
    async fn test_rename_checks_uniqueness() {
        let (store, _temp) = store().await;
        store.add(NewProfile::new("web", "a.example.com", "u")).await.unwrap();
        store.add(NewProfile::new("api", "b.example.com", "u")).await.unwrap();

        let result = store.edit("api", ProfileChanges::default().rename("web")).await;
        assert!(matches!(result, Err(DomainError::DuplicateName(name)) if name == "web"));

        let renamed = store.edit("api", ProfileChanges::default().rename("backend")).await.unwrap();
        assert_eq!(renamed.host, "b.example.com");
        assert!(!store.exists("api").await.unwrap());
        assert!(store.exists("backend").await.unwrap());
    }

    #[tokio::test]
    async fn test_edit_unknown_and_invalid() {
        let (store, _temp) = store().await;
        let result = store.edit("ghost", ProfileChanges::default().port(2222)).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));

        store.add(NewProfile::new("web", "h", "u")).await.unwrap();
        let result = store.edit("web", ProfileChanges::default().host("-oProxyCommand=x")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(store.get("web").await.unwrap().host, "h");
    }

    #[tokio::test]
    async fn test_mark_used_increments() {
        let (store, _temp) = store().await;
        store.add(NewProfile::new("web", "h", "u")).await.unwrap();
        let at = Utc::now();

        let first = store.mark_used("web", at).await.unwrap();
        let second = store.mark_used("web", at).await.unwrap();

        assert_eq!(first.use_count, 1);
        assert_eq!(second.use_count, 2);
        assert_eq!(second.last_used, Some(at));
    }

    #[tokio::test]
    async fn test_merge_policies() {
        let (store, _temp) = store().await;
        let existing = store.add(NewProfile::new("web", "old.example.com", "u")).await.unwrap();

        let mut clash = existing.clone();
        clash.host = "new.example.com".to_string();
        let mut fresh = existing.clone();
        fresh.name = "api".to_string();

        let report = store
            .merge(vec![clash.clone(), fresh], ConflictPolicy::Skip)
            .await
            .unwrap();
        assert_eq!(report, MergeReport { added: 1, replaced: 0, skipped: 1 });

        let api = store.get("api").await.unwrap();
        assert_ne!(api.id, existing.id, "a clashing id must be re-issued");
        assert_eq!(store.get("web").await.unwrap().host, "old.example.com");

        let report = store.merge(vec![clash], ConflictPolicy::Overwrite).await.unwrap();
        assert_eq!(report.replaced, 1);
        let web = store.get("web").await.unwrap();
        assert_eq!(web.host, "new.example.com");
        assert_eq!(web.id, existing.id);
    }

    #[tokio::test]
    async fn test_clear() {
        let (store, _temp) = store().await;
        store.add(NewProfile::new("a", "h", "u")).await.unwrap();
        store.add(NewProfile::new("b", "h", "u")).await.unwrap();
        assert_eq!(store.clear().await.unwrap(), 2);
        let reloaded = ProfileStore::load(store.path()).await.unwrap();
        assert!(reloaded.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_state_unchanged() {
        let temp = TempDir::new().unwrap();
        let store = ProfileStore::load(temp.path().join("sub").join("profiles.json")).await.unwrap();
        std::fs::write(temp.path().join("sub"), "blocks the directory").unwrap();

        let result = store.add(NewProfile::new("web", "h", "u")).await;

        assert!(matches!(result, Err(DomainError::Io { .. })));
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.exists("web").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("profiles.json");
        std::fs::write(&path, "{ \"version\": \"2.0\", \"profiles\": [").unwrap();

        let result = ProfileStore::load(&path).await;

        assert!(matches!(result, Err(DomainError::CorruptConfig { .. })));
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("{ \"version\""));
    }
}
