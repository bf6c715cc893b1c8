pub mod cli;
pub mod format;
pub mod menu;

pub use cli::{Cli, CommandHandler};
pub use menu::InteractiveMenu;
