//! Screens of the interactive menu and the transitions between them.
//!
//! Nothing here touches the terminal or the store: the driver renders the
//! current [`MenuState`], turns the user's input into a [`MenuEvent`] and
//! asks [`MenuState::next`] where to go.

/// Why the user is picking a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Connect,
    Edit,
    Delete,
}

impl Purpose {
    pub fn verb(self) -> &'static str {
        match self {
            Purpose::Connect => "connect to",
            Purpose::Edit => "edit",
            Purpose::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuState {
    Main,
    List,
    Add,
    Pick(Purpose),
    Connect { name: String },
    Edit { name: String },
    Delete { name: String },
    Search,
    Stats,
    Transfer,
    Settings,
    Exit,
}

/// Entries of the main menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainOption {
    List,
    Add,
    Connect,
    Edit,
    Delete,
    Search,
    Stats,
    Transfer,
    Settings,
    Exit,
}

impl MainOption {
    pub const ALL: [MainOption; 10] = [
        MainOption::List,
        MainOption::Add,
        MainOption::Connect,
        MainOption::Edit,
        MainOption::Delete,
        MainOption::Search,
        MainOption::Stats,
        MainOption::Transfer,
        MainOption::Settings,
        MainOption::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MainOption::List => "List profiles",
            MainOption::Add => "Add new profile",
            MainOption::Connect => "Connect to profile",
            MainOption::Edit => "Edit profile",
            MainOption::Delete => "Delete profile",
            MainOption::Search => "Search profiles",
            MainOption::Stats => "Statistics",
            MainOption::Transfer => "Import / export / backup",
            MainOption::Settings => "Settings",
            MainOption::Exit => "Exit",
        }
    }

    fn target(self) -> MenuState {
        match self {
            MainOption::List => MenuState::List,
            MainOption::Add => MenuState::Add,
            MainOption::Connect => MenuState::Pick(Purpose::Connect),
            MainOption::Edit => MenuState::Pick(Purpose::Edit),
            MainOption::Delete => MenuState::Pick(Purpose::Delete),
            MainOption::Search => MenuState::Search,
            MainOption::Stats => MenuState::Stats,
            MainOption::Transfer => MenuState::Transfer,
            MainOption::Settings => MenuState::Settings,
            MainOption::Exit => MenuState::Exit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// One-line message shown above the main menu after a screen finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// A main menu entry was selected
    Chose(MainOption),
    /// A profile was selected from a list
    Picked(String),
    /// Leave the current screen without doing anything
    Back,
    /// The screen's action finished
    Done(Notice),
    /// The screen's action failed; the message is shown on the main menu
    Failed(String),
    /// Leave the menu entirely
    Quit,
}

impl MenuState {
    pub fn next(self, event: MenuEvent) -> MenuState {
        match (self, event) {
            (MenuState::Exit, _) => MenuState::Exit,
            (_, MenuEvent::Quit) => MenuState::Exit,
            (MenuState::Main, MenuEvent::Chose(option)) => option.target(),
            (MenuState::Pick(Purpose::Connect), MenuEvent::Picked(name)) => MenuState::Connect { name },
            (MenuState::Pick(Purpose::Edit), MenuEvent::Picked(name)) => MenuState::Edit { name },
            (MenuState::Pick(Purpose::Delete), MenuEvent::Picked(name)) => MenuState::Delete { name },
            // Picking from a listing or search result connects
            (MenuState::List | MenuState::Search, MenuEvent::Picked(name)) => MenuState::Connect { name },
            (_, MenuEvent::Back | MenuEvent::Done(_) | MenuEvent::Failed(_)) => MenuState::Main,
            (state, _) => state,
        }
    }

    pub fn is_exit(&self) -> bool {
        *self == MenuState::Exit
    }
}

/// Current screen plus the notice to show on the next main menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSession {
    state: MenuState,
    notice: Option<Notice>,
}

impl Default for MenuSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuSession {
    pub fn new() -> Self {
        Self {
            state: MenuState::Main,
            notice: None,
        }
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    /// Hand out the pending notice once
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn apply(&mut self, event: MenuEvent) {
        match &event {
            MenuEvent::Done(notice) => self.notice = Some(notice.clone()),
            MenuEvent::Failed(message) => self.notice = Some(Notice::error(message.clone())),
            _ => {}
        }
        let state = std::mem::replace(&mut self.state, MenuState::Exit);
        self.state = state.next(event);
    }
}
