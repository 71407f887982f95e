//! Call-site capture and filtering
//!
//! Everything needed to turn an execution stack into a clean trace:
//! - `StackFrame` - one readable frame with cached formatting
//! - `FrameTable` - configurable allow/deny classification rules
//! - `capture`/`classify` - live capture and the pure filtering walk
//! - `parse_host_stack` - fallback parser for host-supplied stack text

pub mod capture;
pub mod frame;
pub mod table;

pub use capture::{capture, classify, parse_host_message, parse_host_stack, Capture, RawFrame};
pub use frame::StackFrame;
pub use table::{FrameAction, FrameRule, FrameTable};
