//! Field rules shared by `add`, `edit` and the load boundary.

use crate::domain::models::{NewProfile, Profile, ProfileChanges};
use crate::domain::services::Error;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

pub const MAX_NAME_LEN: usize = 64;
pub const MAX_TAG_LEN: usize = 32;

static JUMP_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s:]+@[^@\s:]+(?::(?P<port>\d{1,5}))?$").expect("jump host pattern is valid")
});

/// Lower-case tags and turn blank optionals into `None`.
///
/// Values are otherwise kept as typed; padded names, hosts and usernames are
/// rejected by validation rather than silently trimmed.
pub fn normalize_fields(mut fields: NewProfile) -> Result<NewProfile, Error> {
    fields.private_key_path = non_empty(fields.private_key_path);
    fields.jump_host = non_empty(fields.jump_host);
    fields.description = non_empty(fields.description);
    fields.tags = normalize_tags(fields.tags)?.into_iter().collect();
    Ok(fields)
}

/// Same normalisation as [`normalize_fields`] for the fields a change touches
pub fn normalize_changes(mut changes: ProfileChanges) -> Result<ProfileChanges, Error> {
    changes.private_key_path = changes.private_key_path.map(non_empty);
    changes.jump_host = changes.jump_host.map(non_empty);
    changes.description = changes.description.map(non_empty);
    changes.tags = changes
        .tags
        .map(|tags| normalize_tags(tags).map(|set| set.into_iter().collect()))
        .transpose()?;
    Ok(changes)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Lower-case, strip a leading `#`, reject blanks, whitespace and overlong tags
pub fn normalize_tags<I, S>(tags: I) -> Result<BTreeSet<String>, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized = BTreeSet::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        let tag = tag.strip_prefix('#').unwrap_or(tag).to_lowercase();
        if tag.is_empty() {
            return Err(Error::validation("tags", "tags cannot be empty"));
        }
        if tag.chars().any(char::is_whitespace) {
            return Err(Error::validation("tags", format!("tag '{}' contains whitespace", tag)));
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(Error::validation("tags", format!("tag '{}' is longer than {} characters", tag, MAX_TAG_LEN)));
        }
        normalized.insert(tag);
    }
    Ok(normalized)
}

/// Check every field of a complete record
pub fn validate_profile(profile: &Profile) -> Result<(), Error> {
    validate_name(&profile.name)?;
    validate_host(&profile.host)?;
    validate_username(&profile.username)?;
    validate_port(profile.port)?;
    if let Some(key) = &profile.private_key_path {
        if key.trim().is_empty() {
            return Err(Error::validation("private_key_path", "must not be empty when set"));
        }
    }
    if let Some(jump) = &profile.jump_host {
        validate_jump_host(jump)?;
    }
    for tag in &profile.tags {
        if tag.is_empty() || tag.chars().any(char::is_whitespace) || tag.chars().count() > MAX_TAG_LEN {
            return Err(Error::validation("tags", format!("invalid tag '{}'", tag)));
        }
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::validation("name", "profile name cannot be empty"));
    }
    if name.trim() != name {
        return Err(Error::validation("name", "profile name cannot start or end with whitespace"));
    }
    if name.chars().any(char::is_control) {
        return Err(Error::validation("name", "profile name cannot contain control characters"));
    }
    if name.starts_with('#') {
        return Err(Error::validation("name", "profile name cannot start with '#'"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::validation("name", format!("profile name is longer than {} characters", MAX_NAME_LEN)));
    }
    Ok(())
}

pub fn validate_host(host: &str) -> Result<(), Error> {
    if host.is_empty() {
        return Err(Error::validation("host", "host cannot be empty"));
    }
    if host.chars().any(char::is_whitespace) {
        return Err(Error::validation("host", "host cannot contain whitespace"));
    }
    if host.starts_with('-') {
        return Err(Error::validation("host", "host cannot start with '-'"));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), Error> {
    if username.is_empty() {
        return Err(Error::validation("username", "username cannot be empty"));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(Error::validation("username", "username cannot contain whitespace"));
    }
    if username.starts_with('-') {
        return Err(Error::validation("username", "username cannot start with '-'"));
    }
    if username.contains('@') {
        return Err(Error::validation("username", "username cannot contain '@'"));
    }
    Ok(())
}

pub fn validate_port(port: u16) -> Result<(), Error> {
    if port == 0 {
        return Err(Error::validation("port", "port must be between 1 and 65535"));
    }
    Ok(())
}

pub fn validate_jump_host(jump: &str) -> Result<(), Error> {
    if jump.starts_with('-') {
        return Err(Error::validation("jump_host", "jump host cannot start with '-'"));
    }
    let captures = JUMP_HOST
        .captures(jump)
        .ok_or_else(|| Error::validation("jump_host", format!("'{}' is not of the form user@host[:port]", jump)))?;

    if let Some(port) = captures.name("port") {
        match port.as_str().parse::<u16>() {
            Ok(port) if port > 0 => {}
            _ => return Err(Error::validation("jump_host", format!("invalid port in '{}'", jump))),
        }
    }
    Ok(())
}
