//! Plain-text file sink
//!
//! Writes the message line, optionally one line per call-site frame, then a
//! blank line. Writes are synchronous and flushed per event so the file is
//! complete even if the process dies right after the log call; delivery
//! ordering is the bus ordering.

use super::Sink;
use crate::config::ExistingFileMode;
use crate::constants::FILE_SUFFIX_LIMIT;
use crate::error::{BusError, Result};
use crate::event::LogEvent;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct FileSink {
    path: PathBuf,
    include_callstacks: bool,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn create(path: &Path, include_callstacks: bool, mode: ExistingFileMode) -> Result<Self> {
        let (file, path) = open_log_file(path, mode)?;
        Ok(Self {
            path,
            include_callstacks,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// The path actually opened (differs from the requested path when
    /// `DoNotOverwrite` had to pick a suffixed sibling)
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn receive(&self, event: &Arc<LogEvent>) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", event.message)?;
        if self.include_callstacks && !event.callstack.is_empty() {
            for frame in &event.callstack {
                writeln!(writer, "{}", frame.formatted_method_name())?;
            }
            writeln!(writer)?;
        }
        writer.flush()
    }

    fn tag(&self) -> &'static str {
        "file"
    }
}

/// Open a sink output file honoring the existing-file policy.
///
/// `DoNotOverwrite` keeps an existing file untouched and picks the first free
/// `.1`, `.2`, ... sibling instead. Returns the file and the path actually
/// opened.
pub(crate) fn open_log_file(path: &Path, mode: ExistingFileMode) -> Result<(File, PathBuf)> {
    let sink_open = |path: &Path, source: io::Error| BusError::SinkOpen {
        path: path.to_path_buf(),
        source,
    };

    match mode {
        ExistingFileMode::Overwrite => {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .map_err(|e| sink_open(path, e))?;
            Ok((file, path.to_path_buf()))
        }
        ExistingFileMode::DoNotOverwrite => {
            // create_new keeps the check-and-open atomic.
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(file) => return Ok((file, path.to_path_buf())),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(sink_open(path, e)),
            }

            let name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "output.log".to_string());
            let dir = path.parent().unwrap_or_else(|| Path::new("."));

            for i in 1..FILE_SUFFIX_LIMIT {
                let candidate = dir.join(format!("{}.{}", name, i));
                match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                    Ok(file) => return Ok((file, candidate)),
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                    Err(e) => return Err(sink_open(&candidate, e)),
                }
            }

            Err(sink_open(
                path,
                io::Error::other("no free suffixed file name"),
            ))
        }
    }
}
