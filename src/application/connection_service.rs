use crate::application::usage_tracker::UsageTracker;
use crate::domain::{
    CommandBuilder, DomainError, Event, EventBus, Profile, ProfileRepository, SshCommand, SshLauncher,
};
use std::sync::Arc;

/// Result of a connect request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Nothing was run; this is what would have been executed
    DryRun(SshCommand),
    /// The client ran and exited
    Finished {
        command: SshCommand,
        /// The profile as it stood after usage was recorded
        profile: Profile,
        exit_code: i32,
        /// False when the spawn succeeded but the counters could not be saved
        usage_recorded: bool,
    },
}

/// ConnectionService manages SSH connections
pub struct ConnectionService {
    profile_repository: Arc<dyn ProfileRepository>,
    usage_tracker: UsageTracker,
    launcher: Arc<dyn SshLauncher>,
    builder: CommandBuilder,
    event_bus: Arc<EventBus>,
}

impl ConnectionService {
    /// Create a new ConnectionService with the provided dependencies
    pub fn new(
        profile_repository: Arc<dyn ProfileRepository>,
        launcher: Arc<dyn SshLauncher>,
        builder: CommandBuilder,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            usage_tracker: UsageTracker::new(profile_repository.clone(), event_bus.clone()),
            profile_repository,
            launcher,
            builder,
            event_bus,
        }
    }

    /// Look up a profile and build the command that would connect to it
    pub async fn prepare(&self, name: &str) -> Result<(Profile, SshCommand), DomainError> {
        let profile = self.profile_repository.get(name).await?;
        let command = self.builder.command(&profile)?;
        Ok((profile, command))
    }

    /// Connect to a profile by name.
    ///
    /// A use is recorded once the client has been spawned, before waiting on
    /// it, whatever its exit status turns out to be.
    pub async fn connect(&self, name: &str, dry_run: bool) -> Result<ConnectOutcome, DomainError> {
        let (profile, command) = self.prepare(name).await?;

        if dry_run {
            tracing::debug!(name = %profile.name, command = %command, "dry run");
            return Ok(ConnectOutcome::DryRun(command));
        }

        let session = self.launcher.spawn(&command).await?;
        self.event_bus.publish(Event::ConnectionStarted(profile.clone()));

        let (profile, usage_recorded) = match self.usage_tracker.record_use(&profile.name).await {
            Ok(updated) => (updated, true),
            Err(e) => {
                tracing::warn!(name = %profile.name, error = %e, "could not record usage");
                (profile, false)
            }
        };

        let exit_code = session.wait().await?;
        self.event_bus.publish(Event::ConnectionEnded {
            name: profile.name.clone(),
            exit_code,
        });

        Ok(ConnectOutcome::Finished {
            command,
            profile,
            exit_code,
            usage_recorded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::profile_service::tests::MockProfileRepository;
    use crate::domain::events::tests::TestEventListener;
    use crate::domain::{NewProfile, SshSession};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockLauncher {
        exit_code: i32,
        fail_spawn: bool,
        spawned: Mutex<Vec<SshCommand>>,
    }

    impl MockLauncher {
        fn new(exit_code: i32) -> Self {
            Self {
                exit_code,
                fail_spawn: false,
                spawned: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail_spawn: true,
                ..Self::new(0)
            }
        }
    }

    struct MockSession(i32);

    #[async_trait]
    impl SshSession for MockSession {
        async fn wait(self: Box<Self>) -> Result<i32, DomainError> {
            Ok(self.0)
        }
    }

    #[async_trait]
    impl SshLauncher for MockLauncher {
        async fn spawn(&self, command: &SshCommand) -> Result<Box<dyn SshSession>, DomainError> {
            if self.fail_spawn {
                return Err(DomainError::Launch("ssh: not found".to_string()));
            }
            self.spawned.lock().unwrap().push(command.clone());
            Ok(Box::new(MockSession(self.exit_code)))
        }
    }

    async fn setup(
        launcher: MockLauncher,
    ) -> (ConnectionService, Arc<MockProfileRepository>, Arc<MockLauncher>, Arc<TestEventListener>) {
        let repository = Arc::new(MockProfileRepository::new());
        repository
            .add(NewProfile::new("api", "api.example.com", "dev").port(2222).private_key("~/.ssh/id"))
            .await
            .unwrap();
        let launcher = Arc::new(launcher);
        let event_listener = Arc::new(TestEventListener::new());
        let mut event_bus = EventBus::new();
        event_bus.register(event_listener.clone());
        let service = ConnectionService::new(
            repository.clone(),
            launcher.clone(),
            CommandBuilder::default(),
            Arc::new(event_bus),
        );
        (service, repository, launcher, event_listener)
    }

    #[tokio::test]
    async fn test_dry_run_records_nothing() {
        let (service, repository, launcher, _) = setup(MockLauncher::new(0)).await;

        let outcome = service.connect("api", true).await.unwrap();

        match outcome {
            ConnectOutcome::DryRun(command) => {
                assert_eq!(command.program, "ssh");
                assert_eq!(command.args, ["-p", "2222", "-i", "~/.ssh/id", "dev@api.example.com"]);
            }
            other => panic!("Expected dry run, got {:?}", other),
        }
        assert!(launcher.spawned.lock().unwrap().is_empty());
        assert_eq!(repository.get("api").await.unwrap().use_count, 0);
    }

    #[tokio::test]
    async fn test_connect_records_use_even_on_failed_exit() {
        let (service, repository, launcher, event_listener) = setup(MockLauncher::new(255)).await;

        let outcome = service.connect("api", false).await.unwrap();

        match outcome {
            ConnectOutcome::Finished { exit_code, usage_recorded, profile, .. } => {
                assert_eq!(exit_code, 255);
                assert!(usage_recorded);
                assert_eq!(profile.use_count, 1);
            }
            other => panic!("Expected finished session, got {:?}", other),
        }
        assert_eq!(launcher.spawned.lock().unwrap().len(), 1);
        assert_eq!(repository.get("api").await.unwrap().use_count, 1);
        assert!(matches!(
            event_listener.events().last(),
            Some(Event::ConnectionEnded { exit_code: 255, .. })
        ));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_not_a_use() {
        let (service, repository, _, _) = setup(MockLauncher::failing()).await;

        let result = service.connect("api", false).await;

        assert!(matches!(result, Err(DomainError::Launch(_))));
        assert_eq!(repository.get("api").await.unwrap().use_count, 0);
    }

    #[tokio::test]
    async fn test_unknown_profile() {
        let (service, _, launcher, _) = setup(MockLauncher::new(0)).await;

        assert!(matches!(service.connect("ghost", false).await, Err(DomainError::NotFound(_))));
        assert!(launcher.spawned.lock().unwrap().is_empty());
    }
}
