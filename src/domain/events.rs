use crate::domain::models::Profile;
use std::sync::Arc;

/// Domain events represent significant occurrences in the system
#[derive(Debug, Clone)]
pub enum Event {
    /// A profile was created
    ProfileCreated(Profile),
    /// A profile was updated; carries the name before the update
    ProfileUpdated { previous_name: String, profile: Profile },
    /// A profile was removed
    ProfileRemoved(Profile),
    /// Usage counters of a profile were bumped
    ProfileUsed(Profile),
    /// Profiles were merged in from a file
    ProfilesImported { added: usize, replaced: usize, skipped: usize },
    /// Every profile was removed
    ProfilesCleared(usize),
    /// An SSH client was spawned for a profile
    ConnectionStarted(Profile),
    /// The SSH client exited
    ConnectionEnded { name: String, exit_code: i32 },
}

/// Event listener trait for components that need to react to events
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &Event);
}

/// Event bus for publishing events to registered listeners
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Arc<dyn EventListener>>,
}

impl EventBus {
    /// Create a new empty event bus
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a new event listener
    pub fn register(&mut self, listener: Arc<dyn EventListener>) {
        self.listeners.push(listener);
    }

    /// Publish an event to all registered listeners
    pub fn publish(&self, event: Event) {
        for listener in &self.listeners {
            listener.on_event(&event);
        }
    }
}

/// Writes every event to the log
pub struct LoggingListener;

impl EventListener for LoggingListener {
    fn on_event(&self, event: &Event) {
        match event {
            Event::ProfileCreated(p) => tracing::info!(name = %p.name, id = %p.id, "profile created"),
            Event::ProfileUpdated { previous_name, profile } => {
                tracing::info!(name = %profile.name, previous = %previous_name, "profile updated")
            }
            Event::ProfileRemoved(p) => tracing::info!(name = %p.name, id = %p.id, "profile removed"),
            Event::ProfileUsed(p) => tracing::info!(name = %p.name, use_count = p.use_count, "profile used"),
            Event::ProfilesImported { added, replaced, skipped } => {
                tracing::info!(added, replaced, skipped, "profiles imported")
            }
            Event::ProfilesCleared(count) => tracing::info!(count, "all profiles removed"),
            Event::ConnectionStarted(p) => tracing::info!(name = %p.name, target = %p.address(), "ssh session started"),
            Event::ConnectionEnded { name, exit_code } => tracing::info!(%name, exit_code, "ssh session ended"),
        }
    }
}
