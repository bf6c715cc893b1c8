use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 22;

/// A named SSH destination as stored in `profiles.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Opaque unique identifier, assigned at creation
    pub id: String,
    /// Unique human-chosen name, the lookup key on the command line
    pub name: String,
    /// Hostname or IP address
    pub host: String,
    /// Username for SSH login
    pub username: String,
    /// SSH port, defaults to 22
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to the private key, passed to the client as written
    #[serde(default)]
    pub private_key_path: Option<String>,
    /// Intermediate host in `user@host[:port]` form
    #[serde(default)]
    pub jump_host: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Lower-cased labels
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub use_count: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Profile {
    /// Build a stored record from validated input fields
    pub fn from_fields(fields: NewProfile, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            host: fields.host,
            username: fields.username,
            port: fields.port,
            private_key_path: fields.private_key_path,
            jump_host: fields.jump_host,
            description: fields.description,
            tags: fields.tags.into_iter().collect(),
            created_at,
            last_used: None,
            use_count: 0,
        }
    }

    /// `username@host`
    pub fn connection_string(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }

    /// `username@host:port`, the form shown in listings
    pub fn address(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Overlay the provided changes onto this record
    pub fn apply(&mut self, changes: ProfileChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(host) = changes.host {
            self.host = host;
        }
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(port) = changes.port {
            self.port = port;
        }
        if let Some(key) = changes.private_key_path {
            self.private_key_path = key;
        }
        if let Some(jump) = changes.jump_host {
            self.jump_host = jump;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags.into_iter().collect();
        }
    }
}

/// Fields supplied by the user when adding a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub name: String,
    pub host: String,
    pub username: String,
    pub port: u16,
    pub private_key_path: Option<String>,
    pub jump_host: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl NewProfile {
    pub fn new(name: impl Into<String>, host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            username: username.into(),
            port: DEFAULT_PORT,
            private_key_path: None,
            jump_host: None,
            description: None,
            tags: Vec::new(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn private_key(mut self, path: impl Into<String>) -> Self {
        self.private_key_path = Some(path.into());
        self
    }

    pub fn jump_host(mut self, jump: impl Into<String>) -> Self {
        self.jump_host = Some(jump.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// A partial update. `None` leaves a field alone; for optional fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub host: Option<String>,
    pub username: Option<String>,
    pub port: Option<u16>,
    pub private_key_path: Option<Option<String>>,
    pub jump_host: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}

/// Display ordering for a `list()` snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Store order, i.e. creation order
    #[default]
    Created,
    Name,
    /// Most recently used first, never-used last
    LastUsed,
    /// Highest use count first
    UseCount,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Created, SortKey::Name, SortKey::LastUsed, SortKey::UseCount];

    /// Stable sort, so ties keep store order
    pub fn apply(self, profiles: &mut [Profile]) {
        match self {
            SortKey::Created => {}
            SortKey::Name => profiles.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.name.cmp(&b.name))
            }),
            SortKey::LastUsed => profiles.sort_by(|a, b| b.last_used.cmp(&a.last_used)),
            SortKey::UseCount => profiles.sort_by(|a, b| b.use_count.cmp(&a.use_count)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Created => "created",
            SortKey::Name => "name",
            SortKey::LastUsed => "last-used",
            SortKey::UseCount => "use-count",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sort key '{}' (expected created, name, last-used or use-count)", s))
    }
}

/// RFC 3339 timestamps on write; naive local ISO-8601 also accepted on read.
pub(crate) mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(parsed.with_timezone(&Utc));
        }

        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|_| format!("invalid timestamp '{}'", raw))?;

        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| format!("timestamp '{}' does not exist in the local time zone", raw))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(de::Error::custom))
                .transpose()
        }
    }
}
