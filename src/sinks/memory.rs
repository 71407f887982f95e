//! In-memory console sink
//!
//! The backend an interactive viewer consumes: keeps every delivered event,
//! the set of channels seen, and per-severity counts, and notifies change
//! listeners so a frontend can redraw. Kept separate from any frontend so
//! several viewers can share one backend and events are caught even with no
//! viewer attached.

use super::Sink;
use crate::event::{LogEvent, Severity};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io;
use std::sync::Arc;

/// Called with `Some(event)` per delivery and `None` when the sink is cleared
pub type ChangeListener = Box<dyn Fn(Option<&Arc<LogEvent>>) + Send + Sync>;

/// Per-severity totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub messages: usize,
    pub warnings: usize,
    pub errors: usize,
}

#[derive(Default)]
struct MemoryInner {
    events: Vec<Arc<LogEvent>>,
    channels: HashSet<String>,
    counts: SeverityCounts,
    listeners: Vec<ChangeListener>,
}

#[derive(Default)]
pub struct MemorySink {
    inner: Mutex<MemoryInner>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the buffered events, in delivery order
    pub fn snapshot(&self) -> Vec<Arc<LogEvent>> {
        self.inner.lock().events.clone()
    }

    /// Channels seen so far, sorted for stable presentation
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.inner.lock().channels.iter().cloned().collect();
        channels.sort();
        channels
    }

    pub fn counts(&self) -> SeverityCounts {
        self.inner.lock().counts
    }

    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }

    /// Drop all buffered events and counts, notifying listeners with `None`
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.events.clear();
        inner.channels.clear();
        inner.counts = SeverityCounts::default();
        for listener in &inner.listeners {
            listener(None);
        }
    }

    /// Subscribe to change notifications
    pub fn on_change(&self, listener: ChangeListener) {
        self.inner.lock().listeners.push(listener);
    }

    /// Format the buffered events as plain text, one line per event
    pub fn to_text(&self) -> String {
        self.inner
            .lock()
            .events
            .iter()
            .map(|e| format_event_text(e))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Export the buffered events as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        let inner = self.inner.lock();
        let events: Vec<&LogEvent> = inner.events.iter().map(|e| e.as_ref()).collect();
        serde_json::to_string(&events)
    }
}

impl Sink for MemorySink {
    fn receive(&self, event: &Arc<LogEvent>) -> io::Result<()> {
        let mut inner = self.inner.lock();

        if !event.channel.is_empty() && !inner.channels.contains(&event.channel) {
            inner.channels.insert(event.channel.clone());
        }
        match event.severity {
            Severity::Message => inner.counts.messages += 1,
            Severity::Warning => inner.counts.warnings += 1,
            Severity::Error => inner.counts.errors += 1,
        }
        inner.events.push(event.clone());

        for listener in &inner.listeners {
            listener(Some(event));
        }
        Ok(())
    }

    fn tag(&self) -> &'static str {
        "memory"
    }
}

/// Format one event as plain text
fn format_event_text(event: &LogEvent) -> String {
    if event.channel.is_empty() {
        format!("[{:.4}] {} {}", event.timestamp, event.severity, event.message)
    } else {
        format!(
            "[{:.4}] {} <{}> {}",
            event.timestamp, event.severity, event.channel, event.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_event(channel: &str, severity: Severity, message: &str) -> Arc<LogEvent> {
        Arc::new(LogEvent::new(channel, None, severity, message, &[], Vec::new()))
    }

    #[test]
    fn test_counts_by_severity() {
        let sink = MemorySink::new();
        sink.receive(&make_event("", Severity::Message, "a")).unwrap();
        sink.receive(&make_event("", Severity::Warning, "b")).unwrap();
        sink.receive(&make_event("", Severity::Warning, "c")).unwrap();
        sink.receive(&make_event("", Severity::Error, "d")).unwrap();

        assert_eq!(
            sink.counts(),
            SeverityCounts {
                messages: 1,
                warnings: 2,
                errors: 1
            }
        );
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn test_channels_collected_and_sorted() {
        let sink = MemorySink::new();
        sink.receive(&make_event("net", Severity::Message, "a")).unwrap();
        sink.receive(&make_event("", Severity::Message, "b")).unwrap();
        sink.receive(&make_event("audio", Severity::Message, "c")).unwrap();
        sink.receive(&make_event("net", Severity::Message, "d")).unwrap();

        assert_eq!(sink.channels(), vec!["audio", "net"]);
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let sink = MemorySink::new();
        for i in 0..5 {
            sink.receive(&make_event("", Severity::Message, &format!("m{}", i)))
                .unwrap();
        }
        let snapshot = sink.snapshot();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot[0].message, "m0");
        assert_eq!(snapshot[4].message, "m4");
    }

    #[test]
    fn test_listener_notified_per_event_and_on_clear() {
        let sink = MemorySink::new();
        let deliveries = Arc::new(AtomicUsize::new(0));
        let clears = Arc::new(AtomicUsize::new(0));

        let d = deliveries.clone();
        let c = clears.clone();
        sink.on_change(Box::new(move |event| match event {
            Some(_) => {
                d.fetch_add(1, Ordering::SeqCst);
            }
            None => {
                c.fetch_add(1, Ordering::SeqCst);
            }
        }));

        sink.receive(&make_event("", Severity::Message, "a")).unwrap();
        sink.receive(&make_event("", Severity::Message, "b")).unwrap();
        sink.clear();

        assert_eq!(deliveries.load(Ordering::SeqCst), 2);
        assert_eq!(clears.load(Ordering::SeqCst), 1);
        assert!(sink.is_empty());
        assert_eq!(sink.counts(), SeverityCounts::default());
        assert!(sink.channels().is_empty());
    }

    #[test]
    fn test_to_text_format() {
        let sink = MemorySink::new();
        sink.receive(&make_event("net", Severity::Warning, "lag spike")).unwrap();

        let text = sink.to_text();
        assert!(text.contains("Warning"));
        assert!(text.contains("<net>"));
        assert!(text.contains("lag spike"));
    }

    #[test]
    fn test_to_json_roundtrip() {
        let sink = MemorySink::new();
        sink.receive(&make_event("", Severity::Error, "boom")).unwrap();

        let json = sink.to_json().unwrap();
        let parsed: Vec<LogEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].message, "boom");
    }
}
