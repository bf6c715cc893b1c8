pub mod command;
pub mod events;
pub mod models;
pub mod search;
pub mod services;
pub mod stats;
pub mod validation;

// Re-export common types
pub use command::{CommandBuilder, SshCommand};
pub use events::{Event, EventBus, EventListener, LoggingListener};
pub use models::{NewProfile, Profile, ProfileChanges, SortKey};
pub use search::SearchQuery;
pub use services::{
    ConflictPolicy, Error as DomainError, MergeReport, ProfileRepository, SshLauncher, SshSession,
};
pub use stats::ProfileStats;
