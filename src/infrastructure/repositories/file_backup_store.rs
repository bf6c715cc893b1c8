use crate::domain::{DomainError, Profile};
use crate::infrastructure::repositories::profile_document;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::path::{Path, PathBuf};

const BACKUP_PREFIX: &str = "profiles_backup_";
const BACKUP_EXTENSION: &str = ".json";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A backup file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub file_name: String,
    /// Local time encoded in the file name
    pub created_at: DateTime<Local>,
    sequence: u32,
}

/// Timestamped copies of the profiles document in a `backups/` directory
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a backup of `profiles` and return its path
    pub async fn create(&self, profiles: &[Profile]) -> Result<PathBuf, DomainError> {
        let stamp = Local::now().format(STAMP_FORMAT).to_string();

        let mut path = self.dir.join(format!("{}{}{}", BACKUP_PREFIX, stamp, BACKUP_EXTENSION));
        let mut sequence = 1;
        while tokio::fs::try_exists(&path).await.map_err(|e| DomainError::io(&path, e))? {
            path = self
                .dir
                .join(format!("{}{}-{}{}", BACKUP_PREFIX, stamp, sequence, BACKUP_EXTENSION));
            sequence += 1;
        }

        profile_document::write(&path, profiles)?;
        tracing::info!(path = %path.display(), count = profiles.len(), "backup created");
        Ok(path)
    }

    /// Backups in this directory, newest first
    pub async fn list(&self) -> Result<Vec<BackupEntry>, DomainError> {
        let mut entries = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(DomainError::io(&self.dir, e)),
        };

        while let Some(entry) = dir.next_entry().await.map_err(|e| DomainError::io(&self.dir, e))? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some((created_at, sequence)) = parse_file_name(&file_name) {
                entries.push(BackupEntry {
                    path: entry.path(),
                    file_name,
                    created_at,
                    sequence,
                });
            }
        }

        entries.sort_by(|a, b| (b.created_at, b.sequence).cmp(&(a.created_at, a.sequence)));
        Ok(entries)
    }

    /// Delete all but the newest `keep` backups, returning how many were removed
    pub async fn clean(&self, keep: usize) -> Result<usize, DomainError> {
        let entries = self.list().await?;
        let mut removed = 0;
        for entry in entries.into_iter().skip(keep) {
            tokio::fs::remove_file(&entry.path)
                .await
                .map_err(|e| DomainError::io(&entry.path, e))?;
            tracing::debug!(path = %entry.path.display(), "removed old backup");
            removed += 1;
        }
        Ok(removed)
    }
}

/// `profiles_backup_20240101_120000.json` or `..._120000-2.json`
fn parse_file_name(file_name: &str) -> Option<(DateTime<Local>, u32)> {
    let stem = file_name
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(BACKUP_EXTENSION)?;
    let (stamp, sequence) = match stem.split_once('-') {
        Some((stamp, sequence)) => (stamp, sequence.parse().ok()?),
        None => (stem, 0),
    };
    let naive = NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()?;
    let created_at = Local.from_local_datetime(&naive).earliest()?;
    Some((created_at, sequence))
}
