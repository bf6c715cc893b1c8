pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infrastructure;
pub mod interface;
pub mod utils;

/// Re-export common types
pub use domain::{
    CommandBuilder, ConflictPolicy, DomainError, Event, EventBus, EventListener, MergeReport, NewProfile, Profile,
    ProfileChanges, ProfileRepository, ProfileStats, SearchQuery, SortKey, SshCommand,
};

pub use application::{BackupService, ConnectOutcome, ConnectionService, ProfileService, UsageTracker};

pub use infrastructure::{BackupStore, ProfileStore, SystemSshLauncher};

pub use app::App;
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use interface::{Cli, CommandHandler, InteractiveMenu};
