use crate::domain::models::{Profile, DEFAULT_PORT};
use crate::domain::services::Error;
use std::fmt;

pub const DEFAULT_SSH_PROGRAM: &str = "ssh";

/// A program plus a discrete argument list. Nothing is ever joined into a
/// shell string; `Display` is for showing the command to the user only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for SshCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
                write!(f, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Turns a profile into the arguments for the system SSH client
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SSH_PROGRAM)
    }
}

impl CommandBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    /// `-p <port>` unless 22, `-i <key>`, `-J <jump>`, then `user@host`
    pub fn build(&self, profile: &Profile) -> Result<Vec<String>, Error> {
        if profile.host.trim().is_empty() {
            return Err(Error::InvalidRecord(format!("profile '{}' has an empty host", profile.name)));
        }
        if profile.username.trim().is_empty() {
            return Err(Error::InvalidRecord(format!("profile '{}' has an empty username", profile.name)));
        }
        // A leading dash would be parsed by the client as an option
        if profile.host.starts_with('-') || profile.username.starts_with('-') {
            return Err(Error::InvalidRecord(format!(
                "profile '{}' has a host or username starting with '-'",
                profile.name
            )));
        }

        let mut args = Vec::new();

        if profile.port != DEFAULT_PORT {
            args.push("-p".to_string());
            args.push(profile.port.to_string());
        }

        if let Some(key) = &profile.private_key_path {
            args.push("-i".to_string());
            args.push(key.clone());
        }

        if let Some(jump) = &profile.jump_host {
            args.push("-J".to_string());
            args.push(jump.clone());
        }

        args.push(profile.connection_string());

        Ok(args)
    }

    /// [`build`](Self::build) with the configured program attached
    pub fn command(&self, profile: &Profile) -> Result<SshCommand, Error> {
        Ok(SshCommand {
            program: self.program.clone(),
            args: self.build(profile)?,
        })
    }
}
