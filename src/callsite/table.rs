//! Frame classification table
//!
//! Decides which frames of a raw capture survive into the user-facing trace.
//! Rules are matched in order against the declaring-type name and optionally
//! the method name; the first match wins and unmatched frames are shown.

/// What to do with a frame matched by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    /// Keep the frame in the trace
    Show,
    /// Drop the frame
    Hide,
    /// Keep the frame only if no other matched frame has been shown yet in
    /// this capture, walking from the innermost caller outward. Keeps exactly
    /// one entry-point frame visible per call.
    ShowIfFirstIgnored,
    /// The whole call originated from host-internal plumbing: abort the
    /// capture and skip the event entirely (the host facility already
    /// records it).
    HostOnly,
}

/// One classification rule
#[derive(Debug, Clone)]
pub struct FrameRule {
    pub declaring_type: String,
    /// None matches every method of the declaring type
    pub method_name: Option<String>,
    pub action: FrameAction,
}

impl FrameRule {
    pub fn new(
        declaring_type: impl Into<String>,
        method_name: Option<&str>,
        action: FrameAction,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            method_name: method_name.map(str::to_string),
            action,
        }
    }

    pub fn hide(declaring_type: impl Into<String>, method_name: Option<&str>) -> Self {
        Self::new(declaring_type, method_name, FrameAction::Hide)
    }

    pub fn show_if_first(declaring_type: impl Into<String>, method_name: Option<&str>) -> Self {
        Self::new(declaring_type, method_name, FrameAction::ShowIfFirstIgnored)
    }

    pub fn host_only(declaring_type: impl Into<String>, method_name: Option<&str>) -> Self {
        Self::new(declaring_type, method_name, FrameAction::HostOnly)
    }

    fn matches(&self, declaring_type: &str, method_name: &str) -> bool {
        self.declaring_type == declaring_type
            && self
                .method_name
                .as_deref()
                .map(|m| m == method_name)
                .unwrap_or(true)
    }
}

/// Ordered allow/deny table for call-site frames
#[derive(Debug, Clone)]
pub struct FrameTable {
    rules: Vec<FrameRule>,
}

impl Default for FrameTable {
    fn default() -> Self {
        Self {
            rules: vec![
                // The stack walker itself never belongs in a trace.
                FrameRule::hide("capture", None),
                // Entry points into the bus. The first one stays visible so a
                // trace still pinpoints the emitting call when source for the
                // outer frames is unavailable; the rest of the chain is noise.
                FrameRule::show_if_first("LogBus", None),
                FrameRule::show_if_first("logbus", None),
                // Channel wrappers are pure forwarding shims.
                FrameRule::hide("ChannelLogger", None),
                // Events travelling out to the host facility must not come
                // back in through us.
                FrameRule::host_only("host", Some("forward")),
            ],
        }
    }
}

impl FrameTable {
    /// Table with no rules: every frame is shown
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rules(rules: Vec<FrameRule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: FrameRule) {
        self.rules.push(rule);
    }

    /// Classify one frame; first matching rule wins, default is `Show`
    pub fn classify(&self, declaring_type: &str, method_name: &str) -> FrameAction {
        self.rules
            .iter()
            .find(|r| r.matches(declaring_type, method_name))
            .map(|r| r.action)
            .unwrap_or(FrameAction::Show)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_frame_shows() {
        let table = FrameTable::empty();
        assert_eq!(table.classify("Anything", "anywhere"), FrameAction::Show);
    }

    #[test]
    fn test_type_wide_rule_matches_all_methods() {
        let table = FrameTable::with_rules(vec![FrameRule::hide("Plumbing", None)]);
        assert_eq!(table.classify("Plumbing", "a"), FrameAction::Hide);
        assert_eq!(table.classify("Plumbing", "b"), FrameAction::Hide);
        assert_eq!(table.classify("Other", "a"), FrameAction::Show);
    }

    #[test]
    fn test_method_specific_rule() {
        let table = FrameTable::with_rules(vec![FrameRule::host_only("host", Some("forward"))]);
        assert_eq!(table.classify("host", "forward"), FrameAction::HostOnly);
        assert_eq!(table.classify("host", "other"), FrameAction::Show);
    }

    #[test]
    fn test_first_match_wins() {
        let table = FrameTable::with_rules(vec![
            FrameRule::new("Logger", Some("log"), FrameAction::Show),
            FrameRule::hide("Logger", None),
        ]);
        assert_eq!(table.classify("Logger", "log"), FrameAction::Show);
        assert_eq!(table.classify("Logger", "log_warning"), FrameAction::Hide);
    }

    #[test]
    fn test_default_table_flags_host_forward() {
        let table = FrameTable::default();
        assert_eq!(table.classify("host", "forward"), FrameAction::HostOnly);
        assert_eq!(table.classify("LogBus", "log"), FrameAction::ShowIfFirstIgnored);
        assert_eq!(table.classify("capture", "capture"), FrameAction::Hide);
    }
}
