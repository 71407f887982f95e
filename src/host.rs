//! Host log bridge
//!
//! Two boundary calls connect the bus to the surrounding environment's own
//! logging facility (`tracing`):
//! - outbound: `forward` mirrors a dispatched event to the host so both
//!   systems can be used side by side,
//! - inbound: `on_host_log` turns a host-originated event (raw message plus
//!   textual stack) into a normal bus event via the fallback stack parser.
//!
//! A thread-local flag marks outbound forwarding so an inbound hook wired to
//! the host facility recognizes our own events and does not loop them back.

use crate::bus::LogBus;
use crate::callsite::{self, StackFrame};
use crate::constants::HOST_TARGET;
use crate::event::Severity;
use std::cell::Cell;
use tracing::{error, info, warn};

thread_local! {
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

/// Clears the forwarding flag when dropped, so a panicking subscriber
/// cannot leave the flag latched and silently drop later inbound events
struct ForwardGuard;

impl ForwardGuard {
    fn set() -> Self {
        FORWARDING.with(|flag| flag.set(true));
        ForwardGuard
    }
}

impl Drop for ForwardGuard {
    fn drop(&mut self) {
        FORWARDING.with(|flag| flag.set(false));
    }
}

/// Severity taxonomy of the host facility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostLogKind {
    Info,
    Warning,
    Error,
    Assert,
    Exception,
}

impl HostLogKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::Info => Severity::Message,
            Self::Warning => Severity::Warning,
            Self::Error | Self::Assert | Self::Exception => Severity::Error,
        }
    }
}

/// Mirror a dispatched event into the host facility.
///
/// Runs with the forwarding flag set so the event is recognized as ours on
/// any synchronous path back in.
pub fn forward(severity: Severity, channel: &str, message: &str) {
    let _guard = ForwardGuard::set();
    match severity {
        Severity::Message => info!(target: HOST_TARGET, channel, "{}", message),
        Severity::Warning => warn!(target: HOST_TARGET, channel, "{}", message),
        Severity::Error => error!(target: HOST_TARGET, channel, "{}", message),
    }
}

/// True while this thread is forwarding an event out to the host
pub(crate) fn is_forwarding() -> bool {
    FORWARDING.with(|flag| flag.get())
}

/// Inbound host callback: translate a host-originated event into a bus
/// event.
///
/// Host-internal errors carry no walkable stack, so the textual stack is
/// parsed best-effort; when the message itself names a `file(line)` location
/// a basic frame for it is appended as the originating call site. Events
/// this thread is currently forwarding out are dropped to break the loop.
pub fn on_host_log(bus: &LogBus, message: &str, stack_text: &str, kind: HostLogKind) {
    if is_forwarding() {
        return;
    }

    let mut callstack = callsite::parse_host_stack(stack_text);
    if let Some((file, line)) = callsite::parse_host_message(message) {
        // Innermost position in display order is the end of the list.
        callstack.push(StackFrame::basic(message, &file, line));
    }

    bus.log_host_event(kind.severity(), message, callstack);
}
