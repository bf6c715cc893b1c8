pub mod backup_service;
pub mod connection_service;
pub mod profile_service;
pub mod usage_tracker;

// Re-export application services
pub use backup_service::{BackupService, ImportSummary};
pub use connection_service::{ConnectOutcome, ConnectionService};
pub use profile_service::ProfileService;
pub use usage_tracker::UsageTracker;
