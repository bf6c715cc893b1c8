pub mod file_backup_store;
pub mod file_profile_store;
pub mod profile_document;

pub use file_backup_store::{BackupEntry, BackupStore};
pub use file_profile_store::ProfileStore;
