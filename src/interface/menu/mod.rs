pub mod state;

pub use state::{MainOption, MenuEvent, MenuSession, MenuState, Notice, NoticeKind, Purpose};

use crate::application::{BackupService, ConnectOutcome, ConnectionService, ProfileService};
use crate::config::AppConfig;
use crate::domain::{ConflictPolicy, NewProfile, Profile, ProfileChanges, SortKey};
use crate::errors::{AppError, Result};
use crate::interface::format;
use crate::utils::expand_path;
use console::{style, Term};
use dialoguer::{Confirm, Input, Select};
use std::path::Path;
use std::sync::Arc;

const RESET_CONFIRMATION: &str = "DELETE ALL";

/// Terminal front end for [`MenuState`]
pub struct InteractiveMenu {
    profile_service: Arc<ProfileService>,
    connection_service: Arc<ConnectionService>,
    backup_service: Arc<BackupService>,
    config: AppConfig,
    term: Term,
}

impl InteractiveMenu {
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
            term: Term::stdout(),
        }
    }

    /// Run until the user exits. Domain errors are shown inline; terminal errors end the menu.
    pub async fn run(&self) -> Result<()> {
        if !self.term.is_term() {
            return Err(AppError::Prompt(
                "the interactive menu needs a terminal; run 'ssh-manager --help' for commands".to_string(),
            ));
        }

        let mut session = MenuSession::new();
        while !session.state().is_exit() {
            let state = session.state().clone();
            let event = match self.screen(&state, &mut session).await {
                Ok(event) => event,
                Err(AppError::Domain(e)) => MenuEvent::Failed(e.to_string()),
                Err(e) => return Err(e),
            };
            tracing::trace!(?state, ?event, "menu transition");
            session.apply(event);
        }

        println!("{}", style("Bye!").cyan());
        Ok(())
    }

    async fn screen(&self, state: &MenuState, session: &mut MenuSession) -> Result<MenuEvent> {
        match state {
            MenuState::Main => self.main_menu(session.take_notice()),
            MenuState::List => self.list().await,
            MenuState::Add => self.add().await,
            MenuState::Pick(purpose) => self.pick(*purpose).await,
            MenuState::Connect { name } => self.connect(name).await,
            MenuState::Edit { name } => self.edit(name).await,
            MenuState::Delete { name } => self.delete(name).await,
            MenuState::Search => self.search().await,
            MenuState::Stats => self.stats().await,
            MenuState::Transfer => self.transfer().await,
            MenuState::Settings => self.settings().await,
            MenuState::Exit => Ok(MenuEvent::Quit),
        }
    }

    fn header(&self, title: &str) -> Result<()> {
        self.term.clear_screen()?;
        println!("{}", style(format!("  {}  ", title)).bold().reverse());
        println!();
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        println!();
        println!("{}", style("Press Enter to continue...").dim());
        self.term.read_line()?;
        Ok(())
    }

    fn main_menu(&self, notice: Option<Notice>) -> Result<MenuEvent> {
        self.header("SSH Manager")?;

        if let Some(notice) = notice {
            let line = match notice.kind {
                NoticeKind::Success => style(format!("✓ {}", notice.text)).green(),
                NoticeKind::Info => style(format!("→ {}", notice.text)).cyan(),
                NoticeKind::Error => style(format!("✗ {}", notice.text)).red(),
            };
            println!("{}\n", line);
        }

        let labels: Vec<&str> = MainOption::ALL.iter().map(|option| option.label()).collect();
        let choice = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact_opt()?;

        Ok(match choice {
            Some(index) => MenuEvent::Chose(MainOption::ALL[index]),
            None => MenuEvent::Quit,
        })
    }

    /// Select one of `profiles` by name; `None` means back
    fn choose(&self, prompt: &str, profiles: &[Profile]) -> Result<Option<String>> {
        let mut items: Vec<String> = profiles
            .iter()
            .map(|p| format!("{}  {}", p.name, style(p.address()).dim()))
            .collect();
        items.push("← Back".to_string());

        let choice = Select::new().with_prompt(prompt).items(&items).default(0).interact_opt()?;
        Ok(choice.and_then(|index| profiles.get(index)).map(|p| p.name.clone()))
    }

    async fn list(&self) -> Result<MenuEvent> {
        self.header("Profiles")?;
        let profiles = self.profile_service.list_profiles(SortKey::LastUsed, &[]).await?;
        if profiles.is_empty() {
            return Ok(MenuEvent::Done(Notice::info("No profiles configured yet; choose 'Add new profile'")));
        }

        print!("{}", format::profile_table(&profiles));
        println!();
        Ok(match self.choose("Connect to", &profiles)? {
            Some(name) => MenuEvent::Picked(name),
            None => MenuEvent::Back,
        })
    }

    async fn pick(&self, purpose: Purpose) -> Result<MenuEvent> {
        self.header("Choose a profile")?;
        let profiles = self.profile_service.list_profiles(SortKey::Name, &[]).await?;
        if profiles.is_empty() {
            return Ok(MenuEvent::Done(Notice::info("No profiles configured yet")));
        }

        Ok(match self.choose(&format!("Profile to {}", purpose.verb()), &profiles)? {
            Some(name) => MenuEvent::Picked(name),
            None => MenuEvent::Back,
        })
    }

    async fn add(&self) -> Result<MenuEvent> {
        self.header("Add profile")?;

        let name: String = Input::new().with_prompt("Profile name").interact_text()?;
        let host: String = Input::new().with_prompt("Host").interact_text()?;
        let username: String = Input::new()
            .with_prompt("Username")
            .default(whoami::username())
            .interact_text()?;
        let port: u16 = Input::new().with_prompt("Port").default(22).interact_text()?;
        let key = optional_input("Private key path (empty for none)", None)?;
        if let Some(key) = &key {
            if !expand_path(Path::new(key)).exists() {
                println!("{} {} does not exist (yet)", style("!").yellow().bold(), key);
            }
        }
        let jump = optional_input("Jump host user@host[:port] (empty for none)", None)?;
        let description = optional_input("Description (empty for none)", None)?;
        let tags = optional_input("Tags, comma separated (empty for none)", None)?;

        let mut fields = NewProfile::new(name, host, username).port(port);
        fields.private_key_path = key;
        fields.jump_host = jump;
        fields.description = description;
        fields.tags = split_tags(tags.as_deref().unwrap_or_default());

        let profile = self.profile_service.add_profile(fields).await?;
        Ok(MenuEvent::Done(Notice::success(format!(
            "Added profile '{}' ({})",
            profile.name,
            profile.address()
        ))))
    }

    async fn connect(&self, name: &str) -> Result<MenuEvent> {
        self.header("Connect")?;
        let (profile, command) = self.connection_service.prepare(name).await?;
        println!("{} {}", style("Profile:").bold(), style(&profile.name).green());
        println!("{} {}\n", style("Command:").bold(), command);

        if !Confirm::new().with_prompt("Connect now?").default(true).interact()? {
            return Ok(MenuEvent::Back);
        }

        self.term.clear_screen()?;
        match self.connection_service.connect(name, false).await? {
            ConnectOutcome::Finished { exit_code: 0, profile, .. } => Ok(MenuEvent::Done(Notice::success(format!(
                "Session with '{}' closed",
                profile.name
            )))),
            ConnectOutcome::Finished { exit_code, profile, .. } => Ok(MenuEvent::Done(Notice::info(format!(
                "Session with '{}' ended with exit code {}",
                profile.name, exit_code
            )))),
            ConnectOutcome::DryRun(_) => Ok(MenuEvent::Back),
        }
    }

    async fn edit(&self, name: &str) -> Result<MenuEvent> {
        self.header(&format!("Edit '{}'", name))?;
        let current = self.profile_service.get_profile(name).await?;
        println!("{}", style("Press Enter to keep a value; clear a field to remove it.").dim());
        println!();

        let new_name: String = Input::new().with_prompt("Name").default(current.name.clone()).interact_text()?;
        let host: String = Input::new().with_prompt("Host").default(current.host.clone()).interact_text()?;
        let username: String = Input::new()
            .with_prompt("Username")
            .default(current.username.clone())
            .interact_text()?;
        let port: u16 = Input::new().with_prompt("Port").default(current.port).interact_text()?;
        let key = optional_input("Private key path", current.private_key_path.as_deref())?;
        let jump = optional_input("Jump host", current.jump_host.as_deref())?;
        let description = optional_input("Description", current.description.as_deref())?;
        let current_tags = current.tags.iter().cloned().collect::<Vec<_>>().join(", ");
        let tags = optional_input("Tags, comma separated", Some(&current_tags))?;

        let changed = |new: &Option<String>, old: &Option<String>| (new != old).then(|| new.clone());
        let new_tags = split_tags(tags.as_deref().unwrap_or_default());
        let changes = ProfileChanges {
            name: (new_name != current.name).then_some(new_name),
            host: (host != current.host).then_some(host),
            username: (username != current.username).then_some(username),
            port: (port != current.port).then_some(port),
            private_key_path: changed(&key, &current.private_key_path),
            jump_host: changed(&jump, &current.jump_host),
            description: changed(&description, &current.description),
            tags: (new_tags.join(",") != current.tags.iter().cloned().collect::<Vec<_>>().join(",")).then_some(new_tags),
        };

        if changes.is_empty() {
            return Ok(MenuEvent::Done(Notice::info(format!("No changes to '{}'", name))));
        }

        let updated = self.profile_service.update_profile(name, changes).await?;
        Ok(MenuEvent::Done(Notice::success(format!("Updated profile '{}'", updated.name))))
    }

    async fn delete(&self, name: &str) -> Result<MenuEvent> {
        self.header("Delete profile")?;
        let profile = self.profile_service.get_profile(name).await?;
        print!("{}", format::profile_details(&profile));
        println!();

        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{}'?", name))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(MenuEvent::Back);
        }

        self.profile_service.remove_profile(name).await?;
        Ok(MenuEvent::Done(Notice::success(format!("Removed profile '{}'", name))))
    }

    async fn search(&self) -> Result<MenuEvent> {
        self.header("Search")?;
        let query: String = Input::new()
            .with_prompt("Search (words, #tag)")
            .allow_empty(true)
            .interact_text()?;

        let found = self.profile_service.search_profiles(&query, &[]).await?;
        if found.is_empty() {
            return Ok(MenuEvent::Done(Notice::info(format!("No profiles match '{}'", query))));
        }

        print!("{}", format::profile_table(&found));
        println!();
        Ok(match self.choose("Connect to", &found)? {
            Some(name) => MenuEvent::Picked(name),
            None => MenuEvent::Back,
        })
    }

    async fn stats(&self) -> Result<MenuEvent> {
        self.header("Statistics")?;
        let stats = self.profile_service.stats().await?;
        print!("{}", format::stats_report(&stats));
        self.pause()?;
        Ok(MenuEvent::Back)
    }

    async fn transfer(&self) -> Result<MenuEvent> {
        self.header("Import / export / backup")?;
        let items = ["Export profiles", "Import profiles", "Create backup", "List backups", "← Back"];
        let choice = Select::new().items(&items).default(0).interact_opt()?;

        match choice {
            Some(0) => {
                let file: String = Input::new()
                    .with_prompt("Export to")
                    .default("ssh-profiles-export.json".to_string())
                    .interact_text()?;
                let path = expand_path(Path::new(&file));
                let count = self.backup_service.export(&path).await?;
                Ok(MenuEvent::Done(Notice::success(format!(
                    "Exported {} profile(s) to {}",
                    count,
                    path.display()
                ))))
            }
            Some(1) => {
                let file: String = Input::new().with_prompt("Import from").interact_text()?;
                let policies = ["Skip profiles whose name exists", "Overwrite profiles whose name exists"];
                let policy = match Select::new().items(&policies).default(0).interact_opt()? {
                    Some(1) => ConflictPolicy::Overwrite,
                    Some(_) => ConflictPolicy::Skip,
                    None => return Ok(MenuEvent::Back),
                };
                let summary = self.backup_service.import(&expand_path(Path::new(&file)), policy).await?;
                let report = summary.report;
                Ok(MenuEvent::Done(Notice::success(format!(
                    "Imported: {} added, {} replaced, {} skipped",
                    report.added, report.replaced, report.skipped
                ))))
            }
            Some(2) => {
                let path = self.backup_service.create_backup().await?;
                Ok(MenuEvent::Done(Notice::success(format!("Backup created: {}", path.display()))))
            }
            Some(3) => {
                let backups = self.backup_service.list_backups().await?;
                if backups.is_empty() {
                    println!("{} No backups yet", style("!").yellow().bold());
                } else {
                    print!("{}", format::backup_list(&backups));
                }
                self.pause()?;
                Ok(MenuEvent::Back)
            }
            _ => Ok(MenuEvent::Back),
        }
    }

    async fn settings(&self) -> Result<MenuEvent> {
        self.header("Settings")?;
        println!("{} {}", style("Settings file:").bold(), AppConfig::default_path().display());
        println!("{} {}", style("Backups:").bold(), self.backup_service.backup_dir().display());
        println!();
        println!("{}", style(self.config.to_toml()?).dim());

        let items = ["Clean old backups", "Reset all profiles", "← Back"];
        match Select::new().items(&items).default(0).interact_opt()? {
            Some(0) => {
                let removed = self.backup_service.clean_backups(None).await?;
                Ok(MenuEvent::Done(Notice::success(format!(
                    "Removed {} old backup(s), kept the newest {}",
                    removed,
                    self.backup_service.max_backups()
                ))))
            }
            Some(1) => {
                println!(
                    "{} This removes every profile. Type {} to confirm.",
                    style("!").red().bold(),
                    style(RESET_CONFIRMATION).bold()
                );
                let typed: String = Input::new().with_prompt("Confirm").allow_empty(true).interact_text()?;
                if typed.trim() != RESET_CONFIRMATION {
                    return Ok(MenuEvent::Done(Notice::info("Reset cancelled")));
                }
                let removed = self.profile_service.reset_all().await?;
                Ok(MenuEvent::Done(Notice::success(format!("Removed {} profile(s)", removed))))
            }
            _ => Ok(MenuEvent::Back),
        }
    }
}

/// Prompt for an optional value; an empty answer means none
fn optional_input(prompt: &str, current: Option<&str>) -> Result<Option<String>> {
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if let Some(current) = current.filter(|c| !c.is_empty()) {
        input = input.with_initial_text(current);
    }
    let value = input.interact_text()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
