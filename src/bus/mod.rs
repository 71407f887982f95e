//! Event distribution core
//!
//! - `LogBus` - the synchronized dispatch entry point
//! - `HistoryBuffer` - bounded FIFO of recent events for late-sink replay
//! - `SinkRegistry` - ordered set of registered backends

pub mod dispatch;
pub mod history;
pub mod registry;

pub use dispatch::LogBus;
pub use history::HistoryBuffer;
pub use registry::SinkRegistry;
