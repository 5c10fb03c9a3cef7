//! Destinations for response bodies and protocol trace events
//!
//! The transport engine reports what it sends and receives through
//! [`TraceSink`] and hands body bytes to a [`ResponseSink`]. With a trace
//! directory configured these land in files; otherwise [`DiscardSink`]
//! drops them.

use crate::error::{AppError, Result};
use chrono::Local;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Raw request and response header bytes
pub const HEADERS_FILE: &str = "headers.log";
/// Raw response body bytes
pub const BODY_FILE: &str = "body.bin";
/// Timestamped protocol trace
pub const TRACE_FILE: &str = "trace.log";

/// One protocol-level event observed during an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent<'a> {
    /// Informational text from the engine
    Text(&'a str),
    /// Outgoing header block
    HeaderOut(&'a [u8]),
    /// Incoming header block
    HeaderIn(&'a [u8]),
    /// Received payload bytes
    DataIn(&'a [u8]),
}

impl TraceEvent<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            TraceEvent::Text(_) => "Info",
            TraceEvent::HeaderOut(_) => "Send header",
            TraceEvent::HeaderIn(_) => "Recv header",
            TraceEvent::DataIn(_) => "Recv data",
        }
    }
}

/// Receives protocol trace events
pub trait TraceSink {
    fn trace(&mut self, event: TraceEvent<'_>) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Receives response body bytes
pub trait ResponseSink {
    fn write_body(&mut self, chunk: &[u8]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Accepts and drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl TraceSink for DiscardSink {
    fn trace(&mut self, _event: TraceEvent<'_>) -> Result<()> {
        Ok(())
    }
}

impl ResponseSink for DiscardSink {
    fn write_body(&mut self, _chunk: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Writes body bytes to `body.bin`
pub struct FileResponseSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ResponseSink for FileResponseSink {
    fn write_body(&mut self, chunk: &[u8]) -> Result<()> {
        self.writer
            .write_all(chunk)
            .map_err(|e| resource_error(&self.path, "write", e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| resource_error(&self.path, "flush", e))
    }
}

/// Writes header blocks to `headers.log` and a timestamped event log to
/// `trace.log`
pub struct FileTraceSink {
    headers_path: PathBuf,
    headers: BufWriter<File>,
    trace_path: PathBuf,
    trace: BufWriter<File>,
}

impl FileTraceSink {
    fn write_trace_line(&mut self, line: &str) -> Result<()> {
        let timestamp = Local::now().format("%H:%M:%S%.6f");
        writeln!(self.trace, "{} {}", timestamp, line)
            .map_err(|e| resource_error(&self.trace_path, "write", e))
    }

    fn write_headers(&mut self, bytes: &[u8]) -> Result<()> {
        self.headers
            .write_all(bytes)
            .map_err(|e| resource_error(&self.headers_path, "write", e))
    }
}

impl TraceSink for FileTraceSink {
    fn trace(&mut self, event: TraceEvent<'_>) -> Result<()> {
        match event {
            TraceEvent::Text(text) => {
                self.write_trace_line(&format!("== {}: {}", event.label(), text.trim_end()))
            }
            TraceEvent::HeaderOut(bytes) | TraceEvent::HeaderIn(bytes) => {
                self.write_headers(bytes)?;
                let arrow = if matches!(event, TraceEvent::HeaderOut(_)) { "=>" } else { "<=" };
                self.write_trace_line(&format!(
                    "{} {}, {} bytes",
                    arrow,
                    event.label(),
                    bytes.len()
                ))
            }
            TraceEvent::DataIn(bytes) => {
                self.write_trace_line(&format!("<= {}, {} bytes", event.label(), bytes.len()))
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both even if the first one fails
        let headers = self
            .headers
            .flush()
            .map_err(|e| resource_error(&self.headers_path, "flush", e));
        let trace = self
            .trace
            .flush()
            .map_err(|e| resource_error(&self.trace_path, "flush", e));
        headers.and(trace)
    }
}

/// A directory receiving trace output for one session
pub struct TraceDirectory;

impl TraceDirectory {
    /// Create `dir` if needed and open the three trace files, truncating
    /// any previous content
    pub fn open(dir: &Path) -> Result<(FileResponseSink, FileTraceSink)> {
        fs::create_dir_all(dir).map_err(|e| resource_error(dir, "create", e))?;

        let (body_path, body) = create_file(dir, BODY_FILE)?;
        let (headers_path, headers) = create_file(dir, HEADERS_FILE)?;
        let (trace_path, trace) = create_file(dir, TRACE_FILE)?;

        Ok((
            FileResponseSink {
                path: body_path,
                writer: body,
            },
            FileTraceSink {
                headers_path,
                headers,
                trace_path,
                trace,
            },
        ))
    }
}

fn create_file(dir: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    let path = dir.join(name);
    let file = File::create(&path).map_err(|e| resource_error(&path, "create", e))?;
    Ok((path, BufWriter::new(file)))
}

fn resource_error(path: &Path, action: &str, error: std::io::Error) -> AppError {
    AppError::resource(format!(
        "Failed to {} '{}': {}",
        action,
        path.display(),
        error
    ))
}
