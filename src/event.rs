//! Log event types
//!
//! `LogEvent` is the immutable value passed to every sink: formatted message,
//! severity, channel, optional source handle, timestamp and captured
//! callstack. Formatting and timestamping happen exactly once, at
//! construction; after that the event is shared read-only via `Arc`.

use crate::callsite::StackFrame;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Message,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Message => "Message",
            Self::Warning => "Warning",
            Self::Error => "Error",
        };
        f.write_str(s)
    }
}

/// Opaque handle identifying the object a log event originated from.
///
/// The bus never interprets it; viewers can use it for cross-highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u64);

/// A single item of logging information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub message: String,
    pub severity: Severity,
    /// Empty string means "default/no channel"
    pub channel: String,
    pub source: Option<SourceId>,
    /// Monotonic seconds since the process clock base (not wall clock)
    pub timestamp: f64,
    /// Filtered call-site trace, outermost caller first; may be empty
    pub callstack: Vec<StackFrame>,
}

impl LogEvent {
    /// Build an event. The message template is formatted here, once;
    /// formatting failures degrade to the raw template text.
    pub fn new(
        channel: &str,
        source: Option<SourceId>,
        severity: Severity,
        message: &str,
        params: &[&dyn fmt::Display],
        callstack: Vec<StackFrame>,
    ) -> Self {
        Self {
            message: format_message(message, params),
            severity,
            channel: channel.to_string(),
            source,
            timestamp: elapsed_secs(),
            callstack,
        }
    }

    /// The call-site frame nearest the logging call (the innermost surviving
    /// frame), used by sinks that report a single originating location.
    pub fn origin(&self) -> Option<&StackFrame> {
        self.callstack.last()
    }
}

// =============================================================================
// Message formatting
// =============================================================================

/// Substitute positional `{0}`, `{1}`, ... placeholders from `params`.
///
/// Any malformed template, out-of-range index, or parameter left unused by
/// the template falls back to the raw template text. Never fails.
pub fn format_message(template: &str, params: &[&dyn fmt::Display]) -> String {
    if params.is_empty() {
        return template.to_string();
    }
    try_format(template, params).unwrap_or_else(|| template.to_string())
}

fn try_format(template: &str, params: &[&dyn fmt::Display]) -> Option<String> {
    use fmt::Write;

    let mut out = String::with_capacity(template.len() + 16);
    let mut used = vec![false; params.len()];
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some(d) if d.is_ascii_digit() => digits.push(d),
                        Some('}') => break,
                        _ => return None,
                    }
                }
                let index: usize = digits.parse().ok()?;
                let param = params.get(index)?;
                used[index] = true;
                write!(out, "{}", param).ok()?;
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return None;
                }
            }
            _ => out.push(c),
        }
    }

    // A template that ignores some of its parameters is treated as malformed.
    if used.iter().all(|u| *u) {
        Some(out)
    } else {
        None
    }
}

// =============================================================================
// Clock
// =============================================================================

struct ClockBase {
    started: Instant,
    wall: DateTime<Utc>,
}

static CLOCK: OnceLock<ClockBase> = OnceLock::new();

fn clock_base() -> &'static ClockBase {
    CLOCK.get_or_init(|| ClockBase {
        started: Instant::now(),
        wall: Utc::now(),
    })
}

/// Monotonic seconds since the clock base (first use of the bus)
pub fn elapsed_secs() -> f64 {
    clock_base().started.elapsed().as_secs_f64()
}

/// Derive the wall-clock time of a monotonic event timestamp.
///
/// Computed at render time; events themselves only store the monotonic value.
pub fn wall_time_of(timestamp: f64) -> DateTime<Utc> {
    let millis = (timestamp.max(0.0) * 1000.0) as i64;
    clock_base().wall + TimeDelta::milliseconds(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(template: &str, params: &[&dyn fmt::Display]) -> String {
        format_message(template, params)
    }

    #[test]
    fn test_format_single_param() {
        assert_eq!(fmt("Value: {0}", &[&42]), "Value: 42");
    }

    #[test]
    fn test_format_multiple_params_any_order() {
        assert_eq!(fmt("{1} then {0}", &[&"a", &"b"]), "b then a");
    }

    #[test]
    fn test_format_param_reuse() {
        assert_eq!(fmt("{0}{0}", &[&7]), "77");
    }

    #[test]
    fn test_format_no_params_passthrough() {
        assert_eq!(fmt("plain {0} text", &[]), "plain {0} text");
    }

    #[test]
    fn test_format_fewer_placeholders_than_params_falls_back() {
        // One placeholder, two parameters: the raw template ships as-is.
        assert_eq!(fmt("Value: {0}", &[&1, &2]), "Value: {0}");
    }

    #[test]
    fn test_format_out_of_range_index_falls_back() {
        assert_eq!(fmt("Value: {3}", &[&1]), "Value: {3}");
    }

    #[test]
    fn test_format_unclosed_brace_falls_back() {
        assert_eq!(fmt("Value: {0", &[&1]), "Value: {0");
        assert_eq!(fmt("Value: {x}", &[&1]), "Value: {x}");
    }

    #[test]
    fn test_format_escaped_braces() {
        assert_eq!(fmt("{{{0}}}", &[&5]), "{5}");
    }

    #[test]
    fn test_event_construction_formats_once() {
        let event = LogEvent::new(
            "net",
            Some(SourceId(9)),
            Severity::Warning,
            "retry {0}",
            &[&3],
            Vec::new(),
        );
        assert_eq!(event.message, "retry 3");
        assert_eq!(event.channel, "net");
        assert_eq!(event.source, Some(SourceId(9)));
        assert!(event.timestamp >= 0.0);
        assert!(event.origin().is_none());
    }

    #[test]
    fn test_timestamps_monotonic() {
        let a = elapsed_secs();
        let b = elapsed_secs();
        assert!(b >= a);
    }

    #[test]
    fn test_wall_time_tracks_offset() {
        let base = wall_time_of(0.0);
        let later = wall_time_of(1.5);
        assert_eq!((later - base).num_milliseconds(), 1500);
    }

    #[test]
    fn test_event_serializes() {
        let event = LogEvent::new("", None, Severity::Error, "boom", &[], Vec::new());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"Error\""));
        assert!(json.contains("boom"));

        let parsed: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.message, "boom");
        assert_eq!(parsed.severity, Severity::Error);
    }
}
