//! Unified error type for all logtree operations.

use std::path::PathBuf;

use crate::level::LevelValue;

/// Error type for logtree operations.
#[derive(Debug)]
pub enum Error {
    /// Level value is not a usable severity (zero or negative without inherit intent).
    InvalidLevel { name: String, value: LevelValue },
    /// Level registration collides with an existing name/value binding.
    LevelConflict {
        name: String,
        value: LevelValue,
        existing_name: String,
        existing_value: LevelValue,
    },
    /// Level name not recognized during resolution.
    UnknownLevel(String),
    /// Logger name could not be inferred and none was registered.
    UnresolvedName,
    /// I/O error.
    Io(std::io::Error),
    /// TOML config parsing error.
    ConfigParse(toml::de::Error),
    /// Config directory not found.
    ConfigDirNotFound,
    /// Cyclic include detected in config sources.
    CyclicInclude(PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel { name, value } => write!(
                f,
                "level '{name}' has value {value}, which is <= 0 and would inherit from the parent; levels must be > 0"
            ),
            Self::LevelConflict {
                name,
                value,
                existing_name,
                existing_value,
            } => write!(
                f,
                "cannot register level '{name}' = {value}: conflicts with existing '{existing_name}' = {existing_value}"
            ),
            Self::UnknownLevel(name) => write!(f, "unknown log level: '{name}'"),
            Self::UnresolvedName => write!(
                f,
                "cannot resolve logger name: none registered and inference found nothing"
            ),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
            Self::CyclicInclude(p) => write!(f, "cyclic include: {}", p.display()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}
