//! Dispatch core
//!
//! The single synchronized entry point. One mutex serializes history
//! mutation and sink fan-out across threads, so events reach every sink in
//! strict global call order and sinks can assume single-threaded delivery.
//!
//! Re-entrancy is handled before the lock: a thread-local flag marks the
//! dispatching thread, and a log call made while it is set (a sink logging
//! from inside `receive`, a sink failure being reported, ...) is silently
//! dropped instead of deadlocking on the non-re-entrant mutex.

use crate::callsite::{self, Capture, FrameTable, StackFrame};
use crate::config::BusConfig;
use crate::constants::HOST_TARGET;
use crate::event::{LogEvent, Severity, SourceId};
use crate::host;
use crate::sinks::Sink;
use parking_lot::Mutex;
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::warn;

use super::history::HistoryBuffer;
use super::registry::SinkRegistry;

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Marks this thread as dispatching for its lifetime
struct DispatchGuard;

impl DispatchGuard {
    /// None if this thread is already inside a dispatch
    fn acquire() -> Option<Self> {
        DISPATCHING.with(|flag| {
            if flag.get() {
                None
            } else {
                flag.set(true);
                Some(DispatchGuard)
            }
        })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(false));
    }
}

struct BusInner {
    history: HistoryBuffer,
    sinks: SinkRegistry,
    table: FrameTable,
}

/// The log bus: event distribution core.
///
/// Normally used through the process-wide instance (`LogBus::global()`), but
/// directly constructible so tests and embedders can run isolated buses.
pub struct LogBus {
    inner: Mutex<BusInner>,
    mirror_to_host: AtomicBool,
}

static GLOBAL: OnceLock<Arc<LogBus>> = OnceLock::new();

impl LogBus {
    pub fn new(config: &BusConfig) -> Self {
        Self {
            inner: Mutex::new(BusInner {
                history: HistoryBuffer::new(config.max_history),
                sinks: SinkRegistry::new(),
                table: FrameTable::default(),
            }),
            mirror_to_host: AtomicBool::new(config.mirror_to_host),
        }
    }

    /// The process-wide bus, created with default config on first use
    pub fn global() -> Arc<LogBus> {
        GLOBAL
            .get_or_init(|| Arc::new(LogBus::new(&BusConfig::default())))
            .clone()
    }

    /// Like `global()`, with explicit config. First caller wins; a bus that
    /// already exists keeps its configuration.
    pub fn install(config: &BusConfig) -> Arc<LogBus> {
        GLOBAL.get_or_init(|| Arc::new(LogBus::new(config))).clone()
    }

    /// The canonical logging entry point.
    ///
    /// Builds the event (call-site capture, message formatting, timestamp),
    /// appends it to history and delivers it to every registered sink before
    /// returning. Never fails: malformed templates degrade to the raw text,
    /// re-entrant calls are dropped, and host-internal calls are skipped so
    /// the host's own record is not duplicated.
    pub fn log(
        &self,
        channel: &str,
        source: Option<SourceId>,
        severity: Severity,
        message: &str,
        params: &[&dyn fmt::Display],
    ) {
        let Some(_guard) = DispatchGuard::acquire() else {
            return;
        };
        let mut inner = self.inner.lock();

        let callstack = match callsite::capture(&inner.table) {
            Capture::HostOnly => return,
            Capture::Frames(frames) => frames,
        };

        let event = Arc::new(LogEvent::new(
            channel, source, severity, message, params, callstack,
        ));
        Self::dispatch_locked(&mut inner, &event);

        if self.mirror_to_host.load(Ordering::Relaxed) {
            host::forward(severity, channel, &event.message);
        }
    }

    /// Entry point for events arriving from the host facility. The callstack
    /// was parsed from host stack text; no mirror back out.
    pub(crate) fn log_host_event(
        &self,
        severity: Severity,
        message: &str,
        callstack: Vec<StackFrame>,
    ) {
        let Some(_guard) = DispatchGuard::acquire() else {
            return;
        };
        let mut inner = self.inner.lock();

        let event = Arc::new(LogEvent::new("", None, severity, message, &[], callstack));
        Self::dispatch_locked(&mut inner, &event);
    }

    fn dispatch_locked(inner: &mut BusInner, event: &Arc<LogEvent>) {
        inner.history.push(event.clone());

        // Drop dead sinks before they see another event.
        inner.sinks.prune();

        for sink in inner.sinks.iter() {
            if let Err(err) = sink.receive(event) {
                // One failing sink must not starve the rest. The failure goes
                // to the host facility; routing it through `log` here would
                // be dropped by the guard anyway.
                warn!(target: HOST_TARGET, "sink delivery failed: {}", err);
            }
        }
    }

    /// Register a sink. With `replay_history`, every buffered event is fed to
    /// the sink first so a late subscriber sees continuity. No-op if this
    /// instance is already registered.
    pub fn add_sink(&self, sink: Arc<dyn Sink>, replay_history: bool) {
        let mut inner = self.inner.lock();
        if inner.sinks.contains(&sink) {
            return;
        }
        if replay_history {
            // Replay is an in-progress dispatch: a sink logging from inside
            // `receive` here must be dropped by the guard, not left to
            // deadlock on the bus lock.
            let _guard = DispatchGuard::acquire();
            for event in inner.history.iter() {
                if let Err(err) = sink.receive(event) {
                    warn!(target: HOST_TARGET, "sink replay failed: {}", err);
                }
            }
        }
        inner.sinks.add(sink);
    }

    pub fn remove_sink(&self, sink: &Arc<dyn Sink>) -> bool {
        self.inner.lock().sinks.remove(sink)
    }

    /// First registered sink with the given capability tag
    pub fn find_sink(&self, tag: &str) -> Option<Arc<dyn Sink>> {
        self.inner.lock().sinks.find(tag)
    }

    pub fn sink_count(&self) -> usize {
        self.inner.lock().sinks.len()
    }

    /// Copy of the buffered history, oldest first (viewer boundary)
    pub fn snapshot(&self) -> Vec<Arc<LogEvent>> {
        self.inner.lock().history.snapshot()
    }

    pub fn history_len(&self) -> usize {
        self.inner.lock().history.len()
    }

    pub fn clear_history(&self) {
        self.inner.lock().history.clear();
    }

    pub fn mirror_to_host(&self) -> bool {
        self.mirror_to_host.load(Ordering::Relaxed)
    }

    pub fn set_mirror_to_host(&self, enabled: bool) {
        self.mirror_to_host.store(enabled, Ordering::Relaxed);
    }

    /// Replace the call-site classification table
    pub fn set_frame_table(&self, table: FrameTable) {
        self.inner.lock().table = table;
    }
}
