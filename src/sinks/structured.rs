//! Structured file sink
//!
//! One line per event with tab-padded columns:
//! `[timestamp] message channel severity file method`, where the timestamp is
//! the wall-clock time derived from the event's monotonic stamp and the
//! message has newlines collapsed to spaces. When the callstack inclusion
//! mode asks for it, indented `Callstack` continuation lines follow, then a
//! blank line terminates the record.

use super::file::open_log_file;
use super::Sink;
use crate::config::{IncludeCallstackMode, Indentation, StructuredFileConfig};
use crate::error::{BusError, Result};
use crate::event::{self, LogEvent, Severity};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const NO_CALLSTACK: &str = "<No callstack>";
const UNKNOWN_METHOD: &str = "<Unknown method>";

pub struct StructuredFileSink {
    path: PathBuf,
    include_callstacks: IncludeCallstackMode,
    indentation: Option<Indentation>,
    writer: Mutex<BufWriter<File>>,
}

impl StructuredFileSink {
    pub fn create(path: &Path, config: &StructuredFileConfig) -> Result<Self> {
        // The config may arrive hand-built rather than through
        // `Config::validate`; a zero tab size would divide by zero in `pad`.
        if let Some(indentation) = &config.indentation {
            if indentation.tab_size == 0 {
                return Err(BusError::ConfigValidation {
                    field: "structured_file.indentation.tab_size",
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        let (file, path) = open_log_file(path, config.existing_file)?;
        Ok(Self {
            path,
            include_callstacks: config.include_callstacks,
            indentation: config.indentation.clone(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// The path actually opened
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pad with at least one tab; with indentation configured, enough extra
    /// tabs to reach the column's minimum width
    fn pad(&self, s: &str, min_tabs: usize) -> String {
        let mut out = format!("{}\t", s);
        if let Some(indentation) = &self.indentation {
            let tab_count = (out.chars().count() + indentation.tab_size - 1) / indentation.tab_size;
            for _ in tab_count..min_tabs {
                out.push('\t');
            }
        }
        out
    }

    fn min_tabs(&self, pick: impl Fn(&Indentation) -> usize) -> usize {
        self.indentation.as_ref().map(pick).unwrap_or(1)
    }

    fn include_callstack(&self, event: &LogEvent) -> bool {
        if event.callstack.is_empty() {
            return false;
        }
        match self.include_callstacks {
            IncludeCallstackMode::Never => false,
            IncludeCallstackMode::WarningsAndErrorsOnly => event.severity != Severity::Message,
            IncludeCallstackMode::Always => true,
        }
    }
}

impl Sink for StructuredFileSink {
    fn receive(&self, event: &Arc<LogEvent>) -> io::Result<()> {
        let mut writer = self.writer.lock();

        let stamp = format!(
            "[{}]",
            event::wall_time_of(event.timestamp).format("%Y-%m-%d %H:%M:%S%.3f")
        );
        // The record is one physical line; multi-line messages are flattened.
        let message = event.message.replace("\r\n", " ").replace('\n', " ");

        let mut line = self.pad(&stamp, self.min_tabs(|i| i.time_min_tabs));
        line.push_str(&self.pad(&message, self.min_tabs(|i| i.message_min_tabs)));
        line.push_str(&self.pad(&event.channel, self.min_tabs(|i| i.channel_min_tabs)));
        line.push_str(&self.pad(
            &event.severity.to_string(),
            self.min_tabs(|i| i.severity_min_tabs),
        ));
        match event.origin() {
            Some(frame) => {
                line.push_str(&self.pad(
                    frame.formatted_file_name(),
                    self.min_tabs(|i| i.file_name_min_tabs),
                ));
                line.push_str(&self.pad(
                    frame.formatted_method_name(),
                    self.min_tabs(|i| i.method_min_tabs),
                ));
            }
            None => {
                line.push_str(&self.pad(NO_CALLSTACK, self.min_tabs(|i| i.file_name_min_tabs)));
                line.push_str(&self.pad(UNKNOWN_METHOD, self.min_tabs(|i| i.method_min_tabs)));
            }
        }
        writeln!(writer, "{}", line)?;

        if self.include_callstack(event) {
            for frame in &event.callstack {
                let mut line = self.pad("", self.min_tabs(|i| i.time_min_tabs));
                line.push_str(&self.pad("", self.min_tabs(|i| i.message_min_tabs)));
                line.push_str(&self.pad(&event.channel, self.min_tabs(|i| i.channel_min_tabs)));
                line.push_str(&self.pad("Callstack", self.min_tabs(|i| i.severity_min_tabs)));
                line.push_str(&self.pad(
                    frame.formatted_file_name(),
                    self.min_tabs(|i| i.file_name_min_tabs),
                ));
                line.push_str(&self.pad(
                    frame.formatted_method_name(),
                    self.min_tabs(|i| i.method_min_tabs),
                ));
                writeln!(writer, "{}", line)?;
            }
            writeln!(writer)?;
        }

        writer.flush()
    }

    fn tag(&self) -> &'static str {
        "structured-file"
    }
}
