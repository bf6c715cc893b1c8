//! Settings layered from defaults, `config.toml` and `SSH_MANAGER_*`
//! environment variables. Command-line flags are applied on top by the caller.

use crate::errors::{AppError, ErrorContext, Result};
use crate::utils::{app_config_dir, expand_path};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const PROFILES_FILE_NAME: &str = "profiles.json";
pub const ENV_PREFIX: &str = "SSH_MANAGER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where profiles are stored
    pub profiles_file: PathBuf,
    /// Backup directory; `backups/` next to the profiles file when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
    /// How many backups `backup clean` keeps by default
    pub max_backups: usize,
    /// SSH client to run
    pub ssh_program: String,
    /// Take a backup before every import
    pub backup_before_import: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profiles_file: app_config_dir().join(PROFILES_FILE_NAME),
            backup_dir: None,
            max_backups: 5,
            ssh_program: "ssh".to_string(),
            backup_before_import: true,
        }
    }
}

impl AppConfig {
    /// Default location of the settings file
    pub fn default_path() -> PathBuf {
        app_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Load settings. An explicit `config_file` must exist; the default one is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (expand_path(path), true),
            None => (Self::default_path(), false),
        };
        tracing::debug!(path = %path.display(), required, "loading settings");

        let settings = Config::builder()
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(required))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("reading {}", path.display()))?;

        Self::finish(settings)
    }

    /// Load settings from one TOML file only, ignoring the environment
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()
            .with_context(|| format!("reading {}", path.display()))?;

        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self> {
        let mut config: AppConfig = settings.try_deserialize()?;
        config.profiles_file = expand_path(&config.profiles_file);
        config.backup_dir = config.backup_dir.as_deref().map(expand_path);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.profiles_file.as_os_str().is_empty() {
            return Err(AppError::Config("profiles_file cannot be empty".to_string()));
        }
        if self.ssh_program.trim().is_empty() {
            return Err(AppError::Config("ssh_program cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Point at a different profiles file (the `--profiles` flag)
    pub fn with_profiles_file(mut self, path: &Path) -> Self {
        self.profiles_file = expand_path(path);
        self
    }

    pub fn backup_dir(&self) -> PathBuf {
        match &self.backup_dir {
            Some(dir) => dir.clone(),
            None => self
                .profiles_file
                .parent()
                .map(|parent| parent.join("backups"))
                .unwrap_or_else(|| PathBuf::from("backups")),
        }
    }

    /// The effective settings as TOML, for display
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
