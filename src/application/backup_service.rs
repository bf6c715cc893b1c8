use crate::domain::{ConflictPolicy, DomainError, Event, EventBus, MergeReport, ProfileRepository};
use crate::infrastructure::repositories::profile_document;
use crate::infrastructure::{BackupEntry, BackupStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What an import did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub report: MergeReport,
    /// Backup taken before merging, if one was configured
    pub backup: Option<PathBuf>,
}

/// Backups, export and import of the profile collection
pub struct BackupService {
    repository: Arc<dyn ProfileRepository>,
    store: BackupStore,
    max_backups: usize,
    backup_before_import: bool,
    event_bus: Arc<EventBus>,
}

impl BackupService {
    pub fn new(
        repository: Arc<dyn ProfileRepository>,
        store: BackupStore,
        max_backups: usize,
        backup_before_import: bool,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            repository,
            store,
            max_backups,
            backup_before_import,
            event_bus,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        self.store.dir()
    }

    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    /// Snapshot the current profiles into the backup directory
    pub async fn create_backup(&self) -> Result<PathBuf, DomainError> {
        let profiles = self.repository.list().await?;
        self.store.create(&profiles).await
    }

    pub async fn list_backups(&self) -> Result<Vec<BackupEntry>, DomainError> {
        self.store.list().await
    }

    /// Keep the newest `keep` backups (default: the configured maximum)
    pub async fn clean_backups(&self, keep: Option<usize>) -> Result<usize, DomainError> {
        self.store.clean(keep.unwrap_or(self.max_backups)).await
    }

    /// Write all profiles to `path` in the profiles-file format
    pub async fn export(&self, path: &Path) -> Result<usize, DomainError> {
        let profiles = self.repository.list().await?;
        profile_document::write(path, &profiles)?;
        tracing::info!(path = %path.display(), count = profiles.len(), "profiles exported");
        Ok(profiles.len())
    }

    /// Merge profiles from `path`; the file must validate completely first
    pub async fn import(&self, path: &Path, policy: ConflictPolicy) -> Result<ImportSummary, DomainError> {
        let incoming = profile_document::read(path)
            .await?
            .ok_or_else(|| DomainError::io(path, std::io::ErrorKind::NotFound.into()))?;

        let backup = if self.backup_before_import {
            Some(self.create_backup().await?)
        } else {
            None
        };

        let report = self.repository.merge(incoming, policy).await?;
        self.event_bus.publish(Event::ProfilesImported {
            added: report.added,
            replaced: report.replaced,
            skipped: report.skipped,
        });

        Ok(ImportSummary { report, backup })
    }
}
