use crate::domain::command::SshCommand;
use crate::domain::models::{NewProfile, Profile, ProfileChanges};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// ProfileRepository defines the interface for profile storage
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Validate and append a new profile, assigning its id and creation time
    async fn add(&self, fields: NewProfile) -> Result<Profile, Error>;

    /// Get a profile by name
    async fn get(&self, name: &str) -> Result<Profile, Error>;

    /// Apply a partial update to an existing profile
    async fn edit(&self, name: &str, changes: ProfileChanges) -> Result<Profile, Error>;

    /// Remove a profile by name, returning the removed record
    async fn delete(&self, name: &str) -> Result<Profile, Error>;

    /// Snapshot of all profiles in creation order
    async fn list(&self) -> Result<Vec<Profile>, Error>;

    /// Check if a profile exists
    async fn exists(&self, name: &str) -> Result<bool, Error>;

    /// Set `last_used` and bump `use_count` by one
    async fn mark_used(&self, name: &str, at: DateTime<Utc>) -> Result<Profile, Error>;

    /// Merge externally loaded profiles into the store
    async fn merge(&self, profiles: Vec<Profile>, policy: ConflictPolicy) -> Result<MergeReport, Error>;

    /// Remove every profile
    async fn clear(&self) -> Result<usize, Error>;

    /// Persist the current state
    async fn save(&self) -> Result<(), Error>;
}

/// What to do when an incoming profile's name is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    Skip,
    Overwrite,
}

/// Outcome of a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub replaced: usize,
    pub skipped: usize,
}

/// SshLauncher starts the system SSH client for a built command
#[async_trait]
pub trait SshLauncher: Send + Sync {
    /// Spawn the client; returning `Ok` means the connection attempt was issued
    async fn spawn(&self, command: &SshCommand) -> Result<Box<dyn SshSession>, Error>;
}

/// A running SSH client process
#[async_trait]
pub trait SshSession: Send {
    /// Block until the client exits and return its exit code
    async fn wait(self: Box<Self>) -> Result<i32, Error>;
}

/// Unified error type for domain services
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Profile already exists: {0}")]
    DuplicateName(String),

    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Corrupt profiles file {}: {message}", path.display())]
    CorruptConfig { path: PathBuf, message: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot build SSH command: {0}")]
    InvalidRecord(String),

    #[error("Failed to launch SSH client: {0}")]
    Launch(String),
}

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation { field, message: message.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::CorruptConfig { path: path.into(), message: message.into() }
    }
}
