//! Centralized error types for the log bus
//!
//! All bus errors are represented by the `BusError` enum.
//! Use `Result<T>` as shorthand for `std::result::Result<T, BusError>`.
//!
//! Note that logging itself never returns an error: a `log` call either
//! completes or degrades (raw message text, empty callstack). These errors
//! only cover setup work such as opening sink files and loading config.

use std::fmt;
use std::path::PathBuf;

/// All bus errors
#[derive(Debug)]
pub enum BusError {
    // === Config ===
    /// Failed to read a config file
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse a config file
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },

    // === Sinks ===
    /// Failed to open a sink output file
    SinkOpen {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::error::Error for BusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigRead { source, .. } | Self::SinkOpen { source, .. } => Some(source),
            Self::ConfigParse { source, .. } => Some(source),
            Self::ConfigValidation { .. } => None,
        }
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigRead { path, .. } => {
                write!(f, "Cannot read config file: {}", path.display())
            }
            Self::ConfigParse { path, .. } => {
                write!(f, "Cannot parse config file: {}", path.display())
            }
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::SinkOpen { path, .. } => {
                write!(f, "Cannot open sink file: {}", path.display())
            }
        }
    }
}

/// Alias for Result with BusError
pub type Result<T> = std::result::Result<T, BusError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_includes_path() {
        let err = BusError::SinkOpen {
            path: PathBuf::from("/tmp/out.log"),
            source: std::io::Error::other("denied"),
        };
        assert!(err.to_string().contains("/tmp/out.log"));
    }

    #[test]
    fn test_source_chain() {
        let err = BusError::ConfigRead {
            path: PathBuf::from("cfg.toml"),
            source: std::io::Error::other("gone"),
        };
        assert!(err.source().is_some());

        let err = BusError::ConfigValidation {
            field: "bus.max_history",
            reason: "must be at least 1".to_string(),
        };
        assert!(err.source().is_none());
    }
}
