//! Shared constants
//!
//! Central location for default values used across the crate.

/// Maximum number of historical events kept for replay to late sinks
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// Tab size assumed by the structured file sink when visually aligning columns
pub const DEFAULT_TAB_SIZE: usize = 8;

/// Default minimum column widths (in tabs) for the structured file sink
pub const DEFAULT_TIME_MIN_TABS: usize = 4;
pub const DEFAULT_MESSAGE_MIN_TABS: usize = 16;
pub const DEFAULT_CHANNEL_MIN_TABS: usize = 1;
pub const DEFAULT_SEVERITY_MIN_TABS: usize = 2;
pub const DEFAULT_FILE_NAME_MIN_TABS: usize = 16;
pub const DEFAULT_METHOD_MIN_TABS: usize = 8;

/// Tracing target used when mirroring events to the host facility
pub const HOST_TARGET: &str = "host";

/// Upper bound for the `.1`, `.2`, ... suffix search when a sink must not
/// overwrite an existing file
pub const FILE_SUFFIX_LIMIT: usize = 10_000;
