use crate::application::{BackupService, ConnectionService, ProfileService};
use crate::config::AppConfig;
use crate::domain::{CommandBuilder, EventBus, LoggingListener, ProfileRepository};
use crate::errors::Result;
use crate::infrastructure::{BackupStore, ProfileStore, SystemSshLauncher};
use std::sync::Arc;

/// The wired-up services for one run of the program
pub struct App {
    pub config: AppConfig,
    pub profile_service: Arc<ProfileService>,
    pub connection_service: Arc<ConnectionService>,
    pub backup_service: Arc<BackupService>,
}

impl App {
    /// Load the profiles file named by `config` and build every service on top of it
    pub async fn bootstrap(config: AppConfig) -> Result<Self> {
        let mut event_bus = EventBus::new();
        event_bus.register(Arc::new(LoggingListener));
        let event_bus = Arc::new(event_bus);

        let store = ProfileStore::load(config.profiles_file.clone()).await?;
        tracing::debug!(path = %store.path().display(), "profiles loaded");
        let repository: Arc<dyn ProfileRepository> = Arc::new(store);

        let profile_service = Arc::new(ProfileService::new(repository.clone(), event_bus.clone()));
        let connection_service = Arc::new(ConnectionService::new(
            repository.clone(),
            Arc::new(SystemSshLauncher::new()),
            CommandBuilder::new(config.ssh_program.clone()),
            event_bus.clone(),
        ));
        let backup_service = Arc::new(BackupService::new(
            repository,
            BackupStore::new(config.backup_dir()),
            config.max_backups,
            config.backup_before_import,
            event_bus,
        ));

        Ok(Self {
            config,
            profile_service,
            connection_service,
            backup_service,
        })
    }
}
