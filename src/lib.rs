//! logbus - process-local fan-out log bus with pluggable sinks
//!
//! One synchronized entry point receives log events, captures a filtered
//! call-site trace, keeps bounded history for late-subscriber replay, and
//! delivers each event to every registered sink backend in order:
//! - `LogBus` - the dispatch core (`LogBus::global()` for the shared bus)
//! - `Sink` - the backend contract; `MemorySink`, `FileSink`,
//!   `StructuredFileSink` ship in the box
//! - `ChannelLogger` - named channel with a per-severity mute mask
//! - `host` - bidirectional bridge to the host logging facility
//!
//! Logging is synchronous fire-and-forget: delivery to all sinks completes
//! before the call returns, re-entrant calls from inside a sink are dropped,
//! and nothing in the crate panics for a malformed log call.

pub mod bus;
pub mod callsite;
pub mod channel;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod host;
pub mod sinks;

pub use bus::LogBus;
pub use channel::{ChannelLogger, SeverityMask};
pub use config::{BusConfig, Config, ExistingFileMode, IncludeCallstackMode, Indentation};
pub use error::{BusError, Result};
pub use event::{LogEvent, Severity, SourceId};
pub use host::{on_host_log, HostLogKind};
pub use sinks::{FileSink, MemorySink, Sink, StructuredFileSink};

use std::fmt;

// Convenience wrappers over the global bus. Pure forwarding; the canonical
// entry point is `LogBus::log`.

pub fn log(message: &str) {
    LogBus::global().log("", None, Severity::Message, message, &[]);
}

pub fn log_fmt(message: &str, params: &[&dyn fmt::Display]) {
    LogBus::global().log("", None, Severity::Message, message, params);
}

pub fn log_channel(channel: &str, message: &str) {
    LogBus::global().log(channel, None, Severity::Message, message, &[]);
}

pub fn log_warning(message: &str) {
    LogBus::global().log("", None, Severity::Warning, message, &[]);
}

pub fn log_warning_channel(channel: &str, message: &str) {
    LogBus::global().log(channel, None, Severity::Warning, message, &[]);
}

pub fn log_error(message: &str) {
    LogBus::global().log("", None, Severity::Error, message, &[]);
}

pub fn log_error_channel(channel: &str, message: &str) {
    LogBus::global().log(channel, None, Severity::Error, message, &[]);
}

/// Initialize the host tracing facility for the process.
///
/// Call early, before any logging occurs. Set `verbose` to true for
/// debug-level output.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { "warn" };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .compact(),
        )
        .with(tracing_subscriber::EnvFilter::new(level))
        .try_init();
}
