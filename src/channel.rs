//! Channel wrapper
//!
//! Thin convenience object binding a channel name and a per-severity mute
//! mask. Holds no dispatch logic: unmasked calls forward to the bus tagged
//! with the bound channel, masked calls are complete no-ops (no record, no
//! timestamp taken).

use crate::bus::LogBus;
use crate::event::{Severity, SourceId};
use std::fmt;
use std::sync::Arc;

/// Bitmask of severities a channel suppresses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityMask(u8);

impl SeverityMask {
    pub const NONE: SeverityMask = SeverityMask(0);

    fn bit(severity: Severity) -> u8 {
        match severity {
            Severity::Message => 1 << 0,
            Severity::Warning => 1 << 1,
            Severity::Error => 1 << 2,
        }
    }

    /// Mask with `severity` additionally suppressed
    #[must_use]
    pub fn hide(self, severity: Severity) -> Self {
        Self(self.0 | Self::bit(severity))
    }

    /// Mask with `severity` no longer suppressed
    #[must_use]
    pub fn show(self, severity: Severity) -> Self {
        Self(self.0 & !Self::bit(severity))
    }

    pub fn hides(self, severity: Severity) -> bool {
        self.0 & Self::bit(severity) != 0
    }
}

/// A named logging channel
pub struct ChannelLogger {
    bus: Arc<LogBus>,
    name: String,
    mask: SeverityMask,
}

impl ChannelLogger {
    /// Channel on the process-wide bus
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_bus(LogBus::global(), name)
    }

    /// Channel on an explicit bus
    pub fn with_bus(bus: Arc<LogBus>, name: impl Into<String>) -> Self {
        Self {
            bus,
            name: name.into(),
            mask: SeverityMask::NONE,
        }
    }

    #[must_use]
    pub fn with_mask(mut self, mask: SeverityMask) -> Self {
        self.mask = mask;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mask(&self) -> SeverityMask {
        self.mask
    }

    pub fn set_mask(&mut self, mask: SeverityMask) {
        self.mask = mask;
    }

    pub fn log(&self, message: &str) {
        self.emit(Severity::Message, None, message, &[]);
    }

    pub fn log_fmt(&self, message: &str, params: &[&dyn fmt::Display]) {
        self.emit(Severity::Message, None, message, params);
    }

    pub fn log_warning(&self, message: &str) {
        self.emit(Severity::Warning, None, message, &[]);
    }

    pub fn log_warning_fmt(&self, message: &str, params: &[&dyn fmt::Display]) {
        self.emit(Severity::Warning, None, message, params);
    }

    pub fn log_error(&self, message: &str) {
        self.emit(Severity::Error, None, message, &[]);
    }

    pub fn log_error_fmt(&self, message: &str, params: &[&dyn fmt::Display]) {
        self.emit(Severity::Error, None, message, params);
    }

    /// Variant carrying a source handle for viewer cross-highlighting
    pub fn log_from(&self, source: SourceId, severity: Severity, message: &str) {
        self.emit(severity, Some(source), message, &[]);
    }

    fn emit(
        &self,
        severity: Severity,
        source: Option<SourceId>,
        message: &str,
        params: &[&dyn fmt::Display],
    ) {
        if self.mask.hides(severity) {
            return;
        }
        self.bus.log(&self.name, source, severity, message, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusConfig;
    use crate::sinks::MemorySink;

    fn channel_on_fresh_bus(name: &str) -> (ChannelLogger, Arc<MemorySink>) {
        let bus = Arc::new(LogBus::new(&BusConfig {
            max_history: 100,
            mirror_to_host: false,
        }));
        let sink = Arc::new(MemorySink::new());
        bus.add_sink(sink.clone(), false);
        (ChannelLogger::with_bus(bus, name), sink)
    }

    #[test]
    fn test_forwards_with_channel_name() {
        let (channel, sink) = channel_on_fresh_bus("audio");
        channel.log("volume changed");
        channel.log_warning("clipping");

        let events = sink.snapshot();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.channel == "audio"));
        assert_eq!(events[1].severity, Severity::Warning);
    }

    #[test]
    fn test_fmt_variants_format() {
        let (channel, sink) = channel_on_fresh_bus("net");
        channel.log_error_fmt("lost {0} packets", &[&17]);

        assert_eq!(sink.snapshot()[0].message, "lost 17 packets");
    }

    #[test]
    fn test_masked_severity_is_complete_noop() {
        let (channel, sink) = {
            let (mut c, s) = channel_on_fresh_bus("spam");
            c.set_mask(SeverityMask::NONE.hide(Severity::Message));
            (c, s)
        };

        channel.log("dropped");
        channel.log_warning("kept");

        let events = sink.snapshot();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "kept");
    }

    #[test]
    fn test_mask_roundtrip() {
        let mask = SeverityMask::NONE
            .hide(Severity::Message)
            .hide(Severity::Error);
        assert!(mask.hides(Severity::Message));
        assert!(!mask.hides(Severity::Warning));
        assert!(mask.hides(Severity::Error));

        let mask = mask.show(Severity::Error);
        assert!(!mask.hides(Severity::Error));
    }

    #[test]
    fn test_source_handle_carried() {
        let (channel, sink) = channel_on_fresh_bus("world");
        channel.log_from(SourceId(77), Severity::Message, "spawned");

        assert_eq!(sink.snapshot()[0].source, Some(SourceId(77)));
    }
}
