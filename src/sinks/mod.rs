//! Sink backends
//!
//! A sink is a registered backend that durably or visibly records delivered
//! events. The bus delivers events synchronously, one at a time, in
//! registration order; sinks never see concurrent calls.

pub mod file;
pub mod memory;
pub mod structured;

pub use file::FileSink;
pub use memory::{MemorySink, SeverityCounts};
pub use structured::StructuredFileSink;

use crate::event::LogEvent;
use std::io;
use std::sync::Arc;

/// Contract every backend implements.
///
/// `receive` is side-effect only and must not call back into the bus
/// synchronously; a re-entrant log call made during delivery is silently
/// dropped by the dispatch guard. Logging from another thread is fine and
/// serializes through the bus lock as usual.
pub trait Sink: Send + Sync {
    /// Deliver one event. Errors are isolated per sink: a failing sink never
    /// prevents delivery to the remaining sinks.
    fn receive(&self, event: &Arc<LogEvent>) -> io::Result<()>;

    /// Capability tag used by `LogBus::find_sink` so collaborators can reuse
    /// an existing backend instead of creating duplicates
    fn tag(&self) -> &'static str {
        ""
    }

    /// Sinks reporting `false` are pruned from the registry before the next
    /// fan-out
    fn is_alive(&self) -> bool {
        true
    }
}
