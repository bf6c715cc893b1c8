use crate::domain::SortKey;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// ssh-manager - keep named SSH connection profiles and connect to them
#[derive(Parser, Debug)]
#[command(name = "ssh-manager")]
#[command(author = "Arash")]
#[command(version)]
#[command(about = "Manage SSH connection profiles", long_about = None)]
pub struct Cli {
    /// Profiles file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub profiles: Option<PathBuf>,

    /// Settings file to use instead of the default config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Supported commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List saved profiles
    List {
        /// Sort order: created, name, last-used or use-count
        #[arg(long, short, default_value_t = SortKey::Created)]
        sort: SortKey,

        /// Only profiles carrying this tag (repeatable)
        #[arg(long, short)]
        tag: Vec<String>,
    },

    /// Add a new profile
    Add(AddArgs),

    /// Change fields of an existing profile
    Edit(EditArgs),

    /// Show every field of a profile
    Show {
        /// Profile name
        name: String,
    },

    /// Connect to a saved profile
    Connect {
        /// Profile name
        name: String,

        /// Print the ssh command instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete a profile
    #[command(visible_alias = "remove")]
    Delete {
        /// Profile name
        name: String,
    },

    /// Search profiles by text; `#tag` words filter by tag
    Search {
        /// Search words, all of which must match
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Only profiles carrying this tag (repeatable)
        #[arg(long, short)]
        tag: Vec<String>,
    },

    /// Usage statistics for all profiles, or one
    Stats {
        /// Profile name
        name: Option<String>,
    },

    /// Write all profiles to a JSON file
    Export {
        /// Destination file
        file: PathBuf,
    },

    /// Merge profiles from a JSON file
    Import {
        /// Source file
        file: PathBuf,

        /// Replace profiles whose names already exist instead of skipping them
        #[arg(long)]
        overwrite: bool,
    },

    /// Manage backups of the profiles file
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Open the interactive menu
    Menu,
}

/// Arguments for the 'add' command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Profile name
    pub name: String,

    /// Hostname or IP address
    pub host: String,

    /// Username
    pub username: String,

    /// SSH port
    #[arg(long, short, default_value_t = 22, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Path to the private key
    #[arg(long = "key", short = 'i', value_name = "PATH")]
    pub key: Option<String>,

    /// Jump host as user@host[:port]
    #[arg(long = "jump", short = 'j', value_name = "JUMP")]
    pub jump: Option<String>,

    /// Free-text description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Tags (repeatable or comma separated)
    #[arg(long = "tag", short = 't', value_delimiter = ',')]
    pub tags: Vec<String>,
}

/// Arguments for the 'edit' command
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Profile name
    pub name: String,

    /// New profile name
    #[arg(long, value_name = "NEW_NAME")]
    pub rename: Option<String>,

    /// New hostname
    #[arg(long)]
    pub host: Option<String>,

    /// New username
    #[arg(long = "user", short = 'u')]
    pub username: Option<String>,

    /// New port
    #[arg(long, short, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// New private key path
    #[arg(long = "key", short = 'i', value_name = "PATH", conflicts_with = "clear_key")]
    pub key: Option<String>,

    /// Remove the private key path
    #[arg(long)]
    pub clear_key: bool,

    /// New jump host
    #[arg(long = "jump", short = 'j', value_name = "JUMP", conflicts_with = "clear_jump")]
    pub jump: Option<String>,

    /// Remove the jump host
    #[arg(long)]
    pub clear_jump: bool,

    /// New description
    #[arg(long, short, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,

    /// Replace all tags (comma separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "clear_tags")]
    pub tags: Option<Vec<String>>,

    /// Remove all tags
    #[arg(long)]
    pub clear_tags: bool,
}

/// Backup subcommands
#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Write a timestamped copy of the profiles file
    Create,

    /// List backups, newest first
    List,

    /// Delete old backups
    Clean {
        /// How many of the newest backups to keep (default: max_backups setting)
        #[arg(long, short)]
        keep: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_parses_options_and_tags() {
        let cli = Cli::try_parse_from([
            "ssh-manager", "add", "api", "api.example.com", "dev", "-p", "2222", "-i", "~/.ssh/id", "-t", "prod,API",
            "--tag", "eu",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.port, 2222);
                assert_eq!(args.key.as_deref(), Some("~/.ssh/id"));
                assert_eq!(args.tags, ["prod", "API", "eu"]);
            }
            other => panic!("Expected add, got {:?}", other),
        }
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(Cli::try_parse_from(["ssh-manager", "add", "a", "h", "u", "-p", "0"]).is_err());
    }

    #[test]
    fn test_edit_conflicting_flags() {
        assert!(Cli::try_parse_from(["ssh-manager", "edit", "a", "-i", "k", "--clear-key"]).is_err());
    }

    #[test]
    fn test_remove_alias_and_global_flags() {
        let cli = Cli::try_parse_from(["ssh-manager", "remove", "web", "--profiles", "/tmp/p.json", "-vv"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Delete { .. })));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.profiles, Some(PathBuf::from("/tmp/p.json")));
    }

    #[test]
    fn test_sort_key_value() {
        let cli = Cli::try_parse_from(["ssh-manager", "list", "--sort", "use-count"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List { sort: SortKey::UseCount, .. })));
    }
}
