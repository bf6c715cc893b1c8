pub mod repositories;
pub mod ssh;

pub use repositories::{BackupEntry, BackupStore, ProfileStore};
pub use ssh::SystemSshLauncher;
