use crate::domain::DomainError;
use thiserror::Error;

/// Process exit codes, one per error kind. Clap keeps 2 for usage errors.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    /// Reserved for failures outside the kinds below
    pub const GENERAL: i32 = 1;
    pub const VALIDATION: i32 = 3;
    pub const DUPLICATE_NAME: i32 = 4;
    pub const NOT_FOUND: i32 = 5;
    pub const CORRUPT_CONFIG: i32 = 6;
    pub const IO: i32 = 7;
    pub const INVALID_RECORD: i32 = 8;
    pub const LAUNCH: i32 = 9;
    pub const CONFIG: i32 = 10;
}

/// Unified error type for ssh-manager
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Terminal error: {0}")]
    Prompt(String),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Domain(error) => match error {
                DomainError::Validation { .. } => exit_codes::VALIDATION,
                DomainError::DuplicateName(_) => exit_codes::DUPLICATE_NAME,
                DomainError::NotFound(_) => exit_codes::NOT_FOUND,
                DomainError::CorruptConfig { .. } => exit_codes::CORRUPT_CONFIG,
                DomainError::Io { .. } => exit_codes::IO,
                DomainError::InvalidRecord(_) => exit_codes::INVALID_RECORD,
                DomainError::Launch(_) => exit_codes::LAUNCH,
            },
            AppError::Config(_) => exit_codes::CONFIG,
            AppError::Prompt(_) => exit_codes::IO,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError::Config(error.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(error: toml::ser::Error) -> Self {
        AppError::Config(format!("TOML error: {}", error))
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(error: dialoguer::Error) -> Self {
        AppError::Prompt(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::Prompt(error.to_string())
    }
}

// Result type alias for ssh-manager
pub type Result<T> = std::result::Result<T, AppError>;

// Helper functions for error context
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T, E: Into<AppError>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| match err.into() {
            AppError::Config(msg) => AppError::Config(format!("{}: {}", context(), msg)),
            AppError::Prompt(msg) => AppError::Prompt(format!("{}: {}", context(), msg)),
            // Domain errors already name their subject
            domain @ AppError::Domain(_) => domain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            AppError::from(DomainError::Validation { field: "port", message: "bad".into() }),
            AppError::from(DomainError::DuplicateName("a".into())),
            AppError::from(DomainError::NotFound("a".into())),
            AppError::from(DomainError::CorruptConfig { path: PathBuf::from("p"), message: "m".into() }),
            AppError::from(DomainError::Io {
                path: PathBuf::from("p"),
                source: std::io::ErrorKind::PermissionDenied.into(),
            }),
            AppError::from(DomainError::InvalidRecord("r".into())),
            AppError::from(DomainError::Launch("l".into())),
            AppError::Config("c".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(AppError::exit_code).collect();
        assert!(codes.iter().all(|&code| code != exit_codes::SUCCESS && code != 2));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_context_prefixes_message() {
        let result: std::result::Result<(), config::ConfigError> =
            Err(config::ConfigError::Message("missing".into()));
        let err = result.with_context(|| "loading settings".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: loading settings: missing");
        assert_eq!(err.exit_code(), exit_codes::CONFIG);
    }
}
