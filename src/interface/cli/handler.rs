use crate::application::{BackupService, ConnectOutcome, ConnectionService, ProfileService};
use crate::config::AppConfig;
use crate::domain::{ConflictPolicy, DomainError, NewProfile, ProfileChanges, SortKey};
use crate::errors::Result;
use crate::interface::cli::commands::{AddArgs, BackupCommands, Commands, EditArgs};
use crate::interface::format;
use crate::interface::menu::InteractiveMenu;
use console::style;
use std::path::Path;
use std::sync::Arc;

pub struct CommandHandler {
    profile_service: Arc<ProfileService>,
    connection_service: Arc<ConnectionService>,
    backup_service: Arc<BackupService>,
    config: AppConfig,
}

impl CommandHandler {
    /// Create a new command handler with the provided services
    pub fn new(
        profile_service: Arc<ProfileService>,
        connection_service: Arc<ConnectionService>,
        backup_service: Arc<BackupService>,
        config: AppConfig,
    ) -> Self {
        Self {
            profile_service,
            connection_service,
            backup_service,
            config,
        }
    }

    /// Handle a CLI command; no command opens the menu
    pub async fn handle_command(&self, command: Option<Commands>) -> Result<()> {
        match command {
            Some(Commands::List { sort, tag }) => self.handle_list(sort, &tag).await,
            Some(Commands::Add(args)) => self.handle_add(args).await,
            Some(Commands::Edit(args)) => self.handle_edit(args).await,
            Some(Commands::Show { name }) => self.handle_show(&name).await,
            Some(Commands::Connect { name, dry_run }) => self.handle_connect(&name, dry_run).await,
            Some(Commands::Delete { name }) => self.handle_delete(&name).await,
            Some(Commands::Search { query, tag }) => self.handle_search(&query.join(" "), &tag).await,
            Some(Commands::Stats { name }) => self.handle_stats(name.as_deref()).await,
            Some(Commands::Export { file }) => self.handle_export(&file).await,
            Some(Commands::Import { file, overwrite }) => self.handle_import(&file, overwrite).await,
            Some(Commands::Backup(command)) => self.handle_backup(command).await,
            Some(Commands::Menu) | None => self.handle_menu().await,
        }
    }

    /// Print "did you mean" hints when `result` is a NotFound, then pass it on
    async fn suggest_on_missing<T>(&self, name: &str, result: std::result::Result<T, DomainError>) -> Result<T> {
        if let Err(DomainError::NotFound(_)) = &result {
            if let Ok(suggestions) = self.profile_service.suggest_similar(name).await {
                if !suggestions.is_empty() {
                    eprintln!("{} Did you mean: {}?", style("?").yellow().bold(), suggestions.join(", "));
                }
            }
        }
        Ok(result?)
    }

    /// Handle the 'list' command
    async fn handle_list(&self, sort: SortKey, tags: &[String]) -> Result<()> {
        let profiles = self.profile_service.list_profiles(sort, tags).await?;

        if profiles.is_empty() {
            if tags.is_empty() {
                println!("{} No profiles configured.", style("!").yellow().bold());
                println!("Use 'ssh-manager add <name> <host> <username>' to create your first profile.");
            } else {
                println!("{} No profiles tagged {}", style("!").yellow().bold(), tags.join(", "));
            }
            return Ok(());
        }

        print!("{}", format::profile_table(&profiles));
        println!("\n{} profile(s)", profiles.len());
        Ok(())
    }

    /// Handle the 'add' command
    async fn handle_add(&self, args: AddArgs) -> Result<()> {
        let mut fields = NewProfile::new(args.name, args.host, args.username).port(args.port);
        fields.private_key_path = args.key;
        fields.jump_host = args.jump;
        fields.description = args.description;
        fields.tags = args.tags;

        let profile = self.profile_service.add_profile(fields).await?;
        println!(
            "{} Added profile '{}' ({})",
            style("✓").green().bold(),
            style(&profile.name).green(),
            profile.address()
        );
        Ok(())
    }

    /// Handle the 'edit' command
    async fn handle_edit(&self, args: EditArgs) -> Result<()> {
        let name = args.name.clone();
        let changes = edit_changes(args);

        if changes.is_empty() {
            let result = self.profile_service.get_profile(&name).await;
            self.suggest_on_missing(&name, result).await?;
            println!("{} Nothing to change for '{}'", style("!").yellow().bold(), name);
            return Ok(());
        }

        let result = self.profile_service.update_profile(&name, changes).await;
        let profile = self.suggest_on_missing(&name, result).await?;
        println!("{} Updated profile '{}'", style("✓").green().bold(), style(&profile.name).green());
        Ok(())
    }

    /// Handle the 'show' command
    async fn handle_show(&self, name: &str) -> Result<()> {
        let result = self.profile_service.get_profile(name).await;
        let profile = self.suggest_on_missing(name, result).await?;
        print!("{}", format::profile_details(&profile));
        Ok(())
    }

    /// Handle the 'connect' command
    async fn handle_connect(&self, name: &str, dry_run: bool) -> Result<()> {
        let result = self.connection_service.connect(name, dry_run).await;
        match self.suggest_on_missing(name, result).await? {
            ConnectOutcome::DryRun(command) => {
                println!("{}", command);
            }
            ConnectOutcome::Finished { exit_code, usage_recorded, profile, .. } => {
                if !usage_recorded {
                    eprintln!("{} Usage of '{}' could not be saved", style("!").yellow().bold(), profile.name);
                }
                if exit_code == 0 {
                    println!("{} Connection to '{}' closed", style("✓").green().bold(), profile.name);
                } else {
                    println!(
                        "{} Connection to '{}' closed with exit code {}",
                        style("!").yellow().bold(),
                        profile.name,
                        exit_code
                    );
                }
            }
        }
        Ok(())
    }

    /// Handle the 'delete' command
    async fn handle_delete(&self, name: &str) -> Result<()> {
        let result = self.profile_service.remove_profile(name).await;
        let removed = self.suggest_on_missing(name, result).await?;
        println!("{} Removed profile '{}'", style("✓").green().bold(), removed.name);
        Ok(())
    }

    /// Handle the 'search' command
    async fn handle_search(&self, query: &str, tags: &[String]) -> Result<()> {
        let found = self.profile_service.search_profiles(query, tags).await?;

        if found.is_empty() {
            println!("{} No profiles found matching '{}'", style("!").yellow().bold(), query);
            return Ok(());
        }

        print!("{}", format::profile_table(&found));
        println!("\n{} profile(s) matching '{}'", found.len(), query);
        Ok(())
    }

    /// Handle the 'stats' command
    async fn handle_stats(&self, name: Option<&str>) -> Result<()> {
        match name {
            Some(name) => {
                let result = self.profile_service.get_profile(name).await;
                let profile = self.suggest_on_missing(name, result).await?;
                print!("{}", format::profile_usage(&profile));
            }
            None => {
                let stats = self.profile_service.stats().await?;
                print!("{}", format::stats_report(&stats));
            }
        }
        Ok(())
    }

    /// Handle the 'export' command
    async fn handle_export(&self, file: &Path) -> Result<()> {
        let count = self.backup_service.export(file).await?;
        println!("{} Exported {} profile(s) to {}", style("✓").green().bold(), count, file.display());
        Ok(())
    }

    /// Handle the 'import' command
    async fn handle_import(&self, file: &Path, overwrite: bool) -> Result<()> {
        let policy = if overwrite { ConflictPolicy::Overwrite } else { ConflictPolicy::Skip };
        let summary = self.backup_service.import(file, policy).await?;

        if let Some(backup) = &summary.backup {
            println!("{} Backup written to {}", style("→").cyan().bold(), backup.display());
        }
        let report = summary.report;
        println!(
            "{} Imported from {}: {} added, {} replaced, {} skipped",
            style("✓").green().bold(),
            file.display(),
            report.added,
            report.replaced,
            report.skipped
        );
        Ok(())
    }

    /// Handle the 'backup' subcommands
    async fn handle_backup(&self, command: BackupCommands) -> Result<()> {
        match command {
            BackupCommands::Create => {
                let path = self.backup_service.create_backup().await?;
                println!("{} Backup created: {}", style("✓").green().bold(), path.display());
            }
            BackupCommands::List => {
                let backups = self.backup_service.list_backups().await?;
                if backups.is_empty() {
                    println!("{} No backups in {}", style("!").yellow().bold(), self.backup_service.backup_dir().display());
                } else {
                    print!("{}", format::backup_list(&backups));
                }
            }
            BackupCommands::Clean { keep } => {
                let removed = self.backup_service.clean_backups(keep).await?;
                println!("{} Removed {} old backup(s)", style("✓").green().bold(), removed);
            }
        }
        Ok(())
    }

    async fn handle_menu(&self) -> Result<()> {
        InteractiveMenu::new(
            self.profile_service.clone(),
            self.connection_service.clone(),
            self.backup_service.clone(),
            self.config.clone(),
        )
        .run()
        .await
    }
}

/// Turn the edit flags into a partial update
fn edit_changes(args: EditArgs) -> ProfileChanges {
    let clearable = |value: Option<String>, clear: bool| if clear { Some(None) } else { value.map(Some) };

    ProfileChanges {
        name: args.rename,
        host: args.host,
        username: args.username,
        port: args.port,
        private_key_path: clearable(args.key, args.clear_key),
        jump_host: clearable(args.jump, args.clear_jump),
        description: clearable(args.description, args.clear_description),
        tags: if args.clear_tags { Some(Vec::new()) } else { args.tags },
    }
}
