//! Configuration management
//!
//! All recognized options live in one serde-backed `Config`, loadable from a
//! TOML file. A missing file is not an error: defaults apply and a warning is
//! traced, so embedding applications work with zero configuration.

use crate::constants::{
    DEFAULT_CHANNEL_MIN_TABS, DEFAULT_FILE_NAME_MIN_TABS, DEFAULT_MAX_HISTORY,
    DEFAULT_MESSAGE_MIN_TABS, DEFAULT_METHOD_MIN_TABS, DEFAULT_SEVERITY_MIN_TABS,
    DEFAULT_TAB_SIZE, DEFAULT_TIME_MIN_TABS,
};
use crate::error::{BusError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

// =============================================================================
// Bus Configuration
// =============================================================================

/// Core dispatch options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// How many historical events to keep for replay to late-attached sinks
    pub max_history: usize,
    /// Mirror every event into the host logging facility
    pub mirror_to_host: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            mirror_to_host: true,
        }
    }
}

// =============================================================================
// File Sink Configuration
// =============================================================================

/// What to do when a sink's output file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExistingFileMode {
    /// Truncate and reuse the file
    #[default]
    Overwrite,
    /// Keep the existing file and write to an auto-suffixed sibling
    /// (`out.log.1`, `out.log.2`, ...)
    DoNotOverwrite,
}

/// When the structured sink writes callstack continuation lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IncludeCallstackMode {
    Never,
    #[default]
    WarningsAndErrorsOnly,
    Always,
}

/// Tab geometry for visually aligned structured output.
///
/// Column widths are in tabs. When no indentation is configured the sink
/// falls back to a single tab between columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Indentation {
    pub tab_size: usize,
    pub time_min_tabs: usize,
    pub message_min_tabs: usize,
    pub channel_min_tabs: usize,
    pub severity_min_tabs: usize,
    pub file_name_min_tabs: usize,
    pub method_min_tabs: usize,
}

impl Default for Indentation {
    fn default() -> Self {
        Self {
            tab_size: DEFAULT_TAB_SIZE,
            time_min_tabs: DEFAULT_TIME_MIN_TABS,
            message_min_tabs: DEFAULT_MESSAGE_MIN_TABS,
            channel_min_tabs: DEFAULT_CHANNEL_MIN_TABS,
            severity_min_tabs: DEFAULT_SEVERITY_MIN_TABS,
            file_name_min_tabs: DEFAULT_FILE_NAME_MIN_TABS,
            method_min_tabs: DEFAULT_METHOD_MIN_TABS,
        }
    }
}

/// Structured file sink options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredFileConfig {
    pub include_callstacks: IncludeCallstackMode,
    pub existing_file: ExistingFileMode,
    /// None disables visual alignment (single tab separators)
    pub indentation: Option<Indentation>,
}

impl Default for StructuredFileConfig {
    fn default() -> Self {
        Self {
            include_callstacks: IncludeCallstackMode::default(),
            existing_file: ExistingFileMode::default(),
            indentation: Some(Indentation::default()),
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bus: BusConfig,
    pub structured_file: StructuredFileConfig,
}

impl Config {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Config::default());
        }

        let text = fs::read_to_string(path).map_err(|source| BusError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| BusError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bus.max_history == 0 {
            return Err(BusError::ConfigValidation {
                field: "bus.max_history",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(indentation) = &self.structured_file.indentation {
            if indentation.tab_size == 0 {
                return Err(BusError::ConfigValidation {
                    field: "structured_file.indentation.tab_size",
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}
