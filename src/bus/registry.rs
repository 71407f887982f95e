//! Sink registry
//!
//! Ordered collection of registered sinks. Registration order is the fan-out
//! order; identity is pointer identity of the shared sink allocation, so the
//! same instance can never end up registered twice.

use crate::sinks::Sink;
use std::sync::Arc;

#[derive(Default)]
pub struct SinkRegistry {
    sinks: Vec<Arc<dyn Sink>>,
}

/// Pointer identity, ignoring the vtable part of the fat pointer
fn same_sink(a: &Arc<dyn Sink>, b: &Arc<dyn Sink>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, sink: &Arc<dyn Sink>) -> bool {
        self.sinks.iter().any(|s| same_sink(s, sink))
    }

    /// Append a sink; returns false if the instance is already registered
    pub fn add(&mut self, sink: Arc<dyn Sink>) -> bool {
        if self.contains(&sink) {
            return false;
        }
        self.sinks.push(sink);
        true
    }

    pub fn remove(&mut self, sink: &Arc<dyn Sink>) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|s| !same_sink(s, sink));
        self.sinks.len() != before
    }

    /// First registered sink with a matching capability tag
    pub fn find(&self, tag: &str) -> Option<Arc<dyn Sink>> {
        self.sinks.iter().find(|s| s.tag() == tag).cloned()
    }

    /// Drop sinks whose backing resource reports itself dead
    pub fn prune(&mut self) {
        self.sinks.retain(|s| s.is_alive());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Sink>> {
        self.sinks.iter()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogEvent;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestSink {
        alive: AtomicBool,
        tag: &'static str,
    }

    impl TestSink {
        fn new(tag: &'static str) -> Arc<Self> {
            Arc::new(Self {
                alive: AtomicBool::new(true),
                tag,
            })
        }
    }

    impl Sink for TestSink {
        fn receive(&self, _event: &Arc<LogEvent>) -> io::Result<()> {
            Ok(())
        }
        fn tag(&self) -> &'static str {
            self.tag
        }
        fn is_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_add_rejects_duplicate_instance() {
        let mut registry = SinkRegistry::new();
        let sink = TestSink::new("a");
        assert!(registry.add(sink.clone()));
        assert!(!registry.add(sink.clone()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_instances_both_register() {
        let mut registry = SinkRegistry::new();
        registry.add(TestSink::new("a"));
        registry.add(TestSink::new("a"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_find_by_tag_returns_first_match() {
        let mut registry = SinkRegistry::new();
        let first = TestSink::new("file");
        registry.add(first.clone());
        registry.add(TestSink::new("file"));
        registry.add(TestSink::new("memory"));

        let found = registry.find("file").unwrap();
        let first: Arc<dyn Sink> = first;
        assert!(same_sink(&found, &first));
        assert!(registry.find("missing").is_none());
    }

    #[test]
    fn test_prune_drops_dead_sinks() {
        let mut registry = SinkRegistry::new();
        let dead = TestSink::new("a");
        let alive = TestSink::new("b");
        registry.add(dead.clone());
        registry.add(alive.clone());

        dead.alive.store(false, Ordering::SeqCst);
        registry.prune();

        assert_eq!(registry.len(), 1);
        assert!(registry.find("b").is_some());
        assert!(registry.find("a").is_none());
    }

    #[test]
    fn test_remove() {
        let mut registry = SinkRegistry::new();
        let sink = TestSink::new("a");
        registry.add(sink.clone());

        let handle: Arc<dyn Sink> = sink;
        assert!(registry.remove(&handle));
        assert!(!registry.remove(&handle));
        assert!(registry.is_empty());
    }
}
