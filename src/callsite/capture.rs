//! Call-site capture
//!
//! Turns the current execution stack into a readable, filtered trace. Two
//! paths produce frames:
//! - the live path renders `std::backtrace::Backtrace` to text and parses the
//!   numbered frame / `at file:line` pairs,
//! - the fallback path parses a host-supplied textual stack with a regex,
//!   keeping unrecognized lines as opaque single-line entries.
//!
//! Classification itself is pure (`classify`) so the filtering semantics are
//! testable without walking a real stack.

use super::frame::StackFrame;
use super::table::{FrameAction, FrameTable};
use regex::Regex;
use std::backtrace::Backtrace;
use std::sync::OnceLock;

/// One unclassified frame, innermost-first as walked
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub declaring_type: String,
    pub method_name: String,
    pub parameter_sig: String,
    pub file_name: Option<String>,
    pub line_number: u32,
}

impl RawFrame {
    pub fn new(declaring_type: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            method_name: method_name.into(),
            parameter_sig: String::new(),
            file_name: None,
            line_number: 0,
        }
    }

    pub fn with_location(mut self, file_name: &str, line_number: u32) -> Self {
        self.file_name = Some(file_name.to_string());
        self.line_number = line_number;
        self
    }
}

/// Result of a capture
#[derive(Debug)]
pub enum Capture {
    /// The call originated purely from host-internal machinery; the event
    /// must be skipped entirely
    HostOnly,
    /// Surviving frames, outermost caller first
    Frames(Vec<StackFrame>),
}

/// Capture and filter the current call stack
pub fn capture(table: &FrameTable) -> Capture {
    let backtrace = Backtrace::force_capture();
    let raw = parse_backtrace(&backtrace.to_string());
    classify(table, &raw)
}

/// Filter raw frames through the table.
///
/// Walks innermost to outermost: a `HostOnly` match aborts the capture,
/// `Hide` drops the frame, and `ShowIfFirstIgnored` keeps only the first
/// table-matched frame of the capture. Survivors come back reversed, so the
/// outermost caller leads the trace.
pub fn classify(table: &FrameTable, frames: &[RawFrame]) -> Capture {
    let mut kept = Vec::new();
    let mut shown_ignored = false;

    for raw in frames {
        let mut action = table.classify(&raw.declaring_type, &raw.method_name);
        if action == FrameAction::HostOnly {
            return Capture::HostOnly;
        }
        if action == FrameAction::ShowIfFirstIgnored {
            action = if shown_ignored {
                FrameAction::Hide
            } else {
                shown_ignored = true;
                FrameAction::Show
            };
        }
        if action == FrameAction::Show {
            kept.push(StackFrame::new(
                raw.declaring_type.clone(),
                raw.method_name.clone(),
                raw.parameter_sig.clone(),
                raw.file_name.clone(),
                raw.line_number,
            ));
        }
    }

    // Processed innermost-first; presentation wants the caller on top.
    kept.reverse();
    Capture::Frames(kept)
}

// =============================================================================
// Backtrace text parsing (live path)
// =============================================================================

fn frame_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+:\s+(.+?)\s*$").expect("valid regex"))
}

fn location_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s+at\s+(.+?):(\d+)(?::\d+)?\s*$").expect("valid regex"))
}

fn symbol_hash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"::h[0-9a-f]{16}$").expect("valid regex"))
}

/// Parse the display output of `std::backtrace::Backtrace` into raw frames,
/// innermost first, skipping runtime plumbing
pub(crate) fn parse_backtrace(text: &str) -> Vec<RawFrame> {
    let mut frames: Vec<RawFrame> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = frame_line_re().captures(line) {
            let symbol = symbol_hash_re().replace(&caps[1], "").into_owned();
            if is_runtime_frame(&symbol) {
                // Push a placeholder so a following `at` line cannot attach
                // to the previous user frame.
                frames.push(RawFrame::new(String::new(), String::new()));
                continue;
            }
            let (declaring_type, method_name) = split_symbol(&symbol);
            frames.push(RawFrame::new(declaring_type, method_name));
        } else if let Some(caps) = location_line_re().captures(line) {
            if let Some(frame) = frames.last_mut() {
                if frame.file_name.is_none() {
                    frame.file_name = Some(caps[1].to_string());
                    frame.line_number = caps[2].parse().unwrap_or(0);
                }
            }
        }
    }

    frames
        .into_iter()
        .filter(|f| !f.method_name.is_empty())
        .collect()
}

/// Split a demangled symbol path into (declaring type, method name).
///
/// `<Type as Trait>::method` impl frames classify by the concrete type.
fn split_symbol(symbol: &str) -> (String, String) {
    let cleaned = match symbol.strip_prefix('<') {
        Some(rest) => match rest.split_once(">::") {
            Some((lhs, rhs)) => {
                let concrete = lhs.split(" as ").next().unwrap_or(lhs);
                format!("{}::{}", concrete, rhs)
            }
            None => rest.to_string(),
        },
        None => symbol.to_string(),
    };

    let mut parts = cleaned.rsplit("::");
    let method = parts.next().unwrap_or_default().to_string();
    let declaring = parts.next().unwrap_or_default().to_string();
    (declaring, method)
}

/// Frames belonging to the language runtime or the unwinder, never useful in
/// a user-facing trace
fn is_runtime_frame(symbol: &str) -> bool {
    const PREFIXES: &[&str] = &[
        "std::",
        "core::",
        "alloc::",
        "backtrace::",
        "test::",
        "__",
        "rust_",
    ];
    const EXACT: &[&str] = &["main", "_start", "start_thread", "clone", "clone3"];

    PREFIXES.iter().any(|p| symbol.starts_with(p)) || EXACT.iter().any(|e| symbol == *e)
}

// =============================================================================
// Host stack text parsing (fallback path)
// =============================================================================

fn host_frame_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.+)\.([^.(]+)\s*\(([^)]*)\)\s*\(at (.+):(\d+)\)\s*$").expect("valid regex")
    })
}

fn host_message_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+?)\((\d+)[,)]").expect("valid regex"))
}

/// Parse a host-supplied textual stack into best-effort frames.
///
/// Host stacks list the innermost call first; the result is reversed into
/// the crate-wide display order (outermost caller first). Lines that do not
/// match the `Type.method (args) (at file:line)` shape are kept as opaque
/// display-only entries.
pub fn parse_host_stack(text: &str) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match host_frame_re().captures(line) {
            Some(caps) => StackFrame::new(
                caps[1].to_string(),
                caps[2].trim().to_string(),
                caps[3].to_string(),
                Some(caps[4].to_string()),
                caps[5].parse().unwrap_or(0),
            ),
            None => StackFrame::opaque(line),
        })
        .collect();
    frames.reverse();
    frames
}

/// Extract `(file, line)` from a host diagnostic message such as
/// `src/game/player.rs(140,21): warning: ...`
pub fn parse_host_message(message: &str) -> Option<(String, u32)> {
    let caps = host_message_re().captures(message)?;
    let line = caps[2].parse().ok()?;
    Some((caps[1].to_string(), line))
}
