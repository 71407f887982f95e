//! Bounded event history
//!
//! FIFO ring of the most recent events, used to replay continuity to sinks
//! that attach late. Pure data structure; the bus lock provides all
//! synchronization.

use crate::event::LogEvent;
use std::collections::VecDeque;
use std::sync::Arc;

pub struct HistoryBuffer {
    events: VecDeque<Arc<LogEvent>>,
    max_events: usize,
}

impl HistoryBuffer {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Append an event, evicting the oldest when at capacity
    pub fn push(&mut self, event: Arc<LogEvent>) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<LogEvent>> {
        self.events.iter()
    }

    /// Copy of the buffered events, oldest first
    pub fn snapshot(&self) -> Vec<Arc<LogEvent>> {
        self.events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn max_events(&self) -> usize {
        self.max_events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Severity;
    use proptest::prelude::*;

    fn make_event(message: &str) -> Arc<LogEvent> {
        Arc::new(LogEvent::new(
            "",
            None,
            Severity::Message,
            message,
            &[],
            Vec::new(),
        ))
    }

    #[test]
    fn test_push_evicts_oldest_first() {
        let mut history = HistoryBuffer::new(3);
        for i in 1..=4 {
            history.push(make_event(&format!("{}", i)));
        }
        assert_eq!(history.len(), 3);
        let messages: Vec<&str> = history.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_snapshot_order_matches_insertion() {
        let mut history = HistoryBuffer::new(10);
        history.push(make_event("a"));
        history.push(make_event("b"));
        let snapshot = history.snapshot();
        assert_eq!(snapshot[0].message, "a");
        assert_eq!(snapshot[1].message, "b");
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryBuffer::new(10);
        history.push(make_event("a"));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.max_events(), 10);
    }

    proptest! {
        #[test]
        fn prop_len_never_exceeds_cap_and_keeps_most_recent(
            total in 0usize..300,
            cap in 1usize..50,
        ) {
            let mut history = HistoryBuffer::new(cap);
            for i in 0..total {
                history.push(make_event(&format!("{}", i)));
            }

            prop_assert_eq!(history.len(), total.min(cap));

            let expected_first = total.saturating_sub(cap);
            for (offset, event) in history.iter().enumerate() {
                prop_assert_eq!(&event.message, &format!("{}", expected_first + offset));
            }
        }
    }
}
