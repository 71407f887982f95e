//! Call-site stack frames
//!
//! A `StackFrame` is one readable entry of a captured trace. The formatted
//! representations are computed once at construction and never change, so
//! sinks can render frames repeatedly without re-deriving strings.

use serde::{Deserialize, Serialize};

/// Information about a particular frame of a callstack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackFrame {
    pub method_name: String,
    pub declaring_type: String,
    pub parameter_sig: String,
    pub file_name: Option<String>,
    /// 0 when unknown
    pub line_number: u32,
    formatted_method: String,
    formatted_file: String,
}

impl StackFrame {
    /// Frame with full symbol information
    pub fn new(
        declaring_type: impl Into<String>,
        method_name: impl Into<String>,
        parameter_sig: impl Into<String>,
        file_name: Option<String>,
        line_number: u32,
    ) -> Self {
        let declaring_type = declaring_type.into();
        let method_name = method_name.into();
        let parameter_sig = parameter_sig.into();
        let formatted_method = make_formatted_method(
            &declaring_type,
            &method_name,
            &parameter_sig,
            file_name.as_deref(),
            line_number,
        );
        let formatted_file = make_formatted_file(file_name.as_deref(), line_number);
        Self {
            method_name,
            declaring_type,
            parameter_sig,
            file_name,
            line_number,
            formatted_method,
            formatted_file,
        }
    }

    /// Opaque frame: a host stack line we could not parse. Only the display
    /// string survives.
    pub fn opaque(display: impl Into<String>) -> Self {
        Self {
            method_name: String::new(),
            declaring_type: String::new(),
            parameter_sig: String::new(),
            file_name: None,
            line_number: 0,
            formatted_method: display.into(),
            formatted_file: UNKNOWN_FILE.to_string(),
        }
    }

    /// Basic frame when all we have is a message and a source location
    pub fn basic(display: impl Into<String>, file_name: &str, line_number: u32) -> Self {
        Self {
            method_name: String::new(),
            declaring_type: String::new(),
            parameter_sig: String::new(),
            file_name: Some(file_name.to_string()),
            line_number,
            formatted_method: display.into(),
            formatted_file: make_formatted_file(Some(file_name), line_number),
        }
    }

    /// Human-readable "Type.method(sig) (at file:line)" string
    pub fn formatted_method_name(&self) -> &str {
        &self.formatted_method
    }

    /// Human-readable "file:line" string
    pub fn formatted_file_name(&self) -> &str {
        &self.formatted_file
    }
}

const UNKNOWN_FILE: &str = "<unknown>";

fn make_formatted_method(
    declaring_type: &str,
    method_name: &str,
    parameter_sig: &str,
    file_name: Option<&str>,
    line_number: u32,
) -> String {
    let prefix = if declaring_type.is_empty() {
        format!("{}({})", method_name, parameter_sig)
    } else {
        format!("{}.{}({})", declaring_type, method_name, parameter_sig)
    };
    match file_name {
        Some(file) => format!(
            "{} (at {}:{})",
            prefix,
            trim_source_path(file),
            line_number
        ),
        None => prefix,
    }
}

fn make_formatted_file(file_name: Option<&str>, line_number: u32) -> String {
    match file_name {
        Some(file) => format!("{}:{}", trim_source_path(file), line_number),
        None => UNKNOWN_FILE.to_string(),
    }
}

/// Trim an absolute path down to its project-relative part, starting at the
/// last `src` component. Paths without one are kept as-is.
fn trim_source_path(path: &str) -> &str {
    for (i, _) in path.rmatch_indices("src") {
        let component_start = i == 0 || matches!(path.as_bytes()[i - 1], b'/' | b'\\');
        let component_end = matches!(path.as_bytes().get(i + 3), Some(b'/') | Some(b'\\'));
        if component_start && component_end {
            return &path[i..];
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_method_with_location() {
        let frame = StackFrame::new(
            "Session",
            "connect",
            "addr",
            Some("/home/dev/proj/src/net/session.rs".to_string()),
            42,
        );
        assert_eq!(
            frame.formatted_method_name(),
            "Session.connect(addr) (at src/net/session.rs:42)"
        );
        assert_eq!(frame.formatted_file_name(), "src/net/session.rs:42");
    }

    #[test]
    fn test_formatted_method_without_location() {
        let frame = StackFrame::new("Session", "connect", "", None, 0);
        assert_eq!(frame.formatted_method_name(), "Session.connect()");
        assert_eq!(frame.formatted_file_name(), "<unknown>");
    }

    #[test]
    fn test_formatted_method_without_declaring_type() {
        let frame = StackFrame::new("", "main", "", None, 0);
        assert_eq!(frame.formatted_method_name(), "main()");
    }

    #[test]
    fn test_opaque_frame_keeps_display_string() {
        let frame = StackFrame::opaque("some unparseable line");
        assert_eq!(frame.formatted_method_name(), "some unparseable line");
        assert!(frame.method_name.is_empty());
        assert_eq!(frame.line_number, 0);
    }

    #[test]
    fn test_basic_frame() {
        let frame = StackFrame::basic("warning CS0618", "src/game/player.rs", 140);
        assert_eq!(frame.formatted_method_name(), "warning CS0618");
        assert_eq!(frame.formatted_file_name(), "src/game/player.rs:140");
    }

    #[test]
    fn test_trim_source_path() {
        assert_eq!(trim_source_path("/a/b/src/x.rs"), "src/x.rs");
        assert_eq!(trim_source_path("src/x.rs"), "src/x.rs");
        assert_eq!(trim_source_path("C:\\proj\\src\\x.rs"), "src\\x.rs");
        assert_eq!(trim_source_path("/a/b/x.rs"), "/a/b/x.rs");
        // "src" embedded in a longer component is not a match
        assert_eq!(trim_source_path("/a/mysrc/x.rs"), "/a/mysrc/x.rs");
        assert_eq!(trim_source_path("/a/srcx/x.rs"), "/a/srcx/x.rs");
        // A later non-component occurrence must not shadow a real one
        assert_eq!(trim_source_path("/a/src/b/mysrc/x.rs"), "src/b/mysrc/x.rs");
        // The last real component wins
        assert_eq!(trim_source_path("/a/src/b/src/x.rs"), "src/x.rs");
    }
}
