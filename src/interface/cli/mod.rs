pub mod commands;
pub mod handler;

pub use commands::{AddArgs, BackupCommands, Cli, Commands, EditArgs};
pub use handler::CommandHandler;
