//! Output destinations.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::LoggerError;

/// Sentinel output value routing entries to the console.
pub const STDOUT: &str = "stdout";
/// Sentinel output value routing entries to the error stream.
pub const STDERR: &str = "stderr";

/// Where a logger writes its entries.
#[derive(Debug, Clone)]
pub enum Sink {
    Stdout,
    Stderr,
    /// A file opened for appending, shared by every logger derived from the same root.
    File(Arc<File>),
    /// An in-memory buffer, for capturing output.
    Memory(MemorySink),
    /// Owned by a dispatcher the caller built; nothing to flush from here.
    External,
}

impl Sink {
    /// Resolves an output setting: the stream sentinels or a file path.
    ///
    /// Files are created if missing and appended to otherwise.
    pub fn open(output: &str) -> Result<Self, LoggerError> {
        match output {
            STDOUT => Ok(Sink::Stdout),
            STDERR => Ok(Sink::Stderr),
            path => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| LoggerError::OpenSink {
                        path: Path::new(path).to_path_buf(),
                        source,
                    })?;
                tracing::debug!(path, "opened log file");
                Ok(Sink::File(Arc::new(file)))
            }
        }
    }

    /// Flushes buffered output; file contents are synced to disk.
    pub fn sync(&self) -> io::Result<()> {
        match self {
            Sink::Stdout => io::stdout().flush(),
            Sink::Stderr => io::stderr().flush(),
            Sink::File(file) => file.sync_data(),
            Sink::Memory(_) | Sink::External => Ok(()),
        }
    }

    pub(crate) fn make_writer(&self) -> BoxMakeWriter {
        match self {
            Sink::Stdout => BoxMakeWriter::new(io::stdout),
            Sink::Stderr => BoxMakeWriter::new(io::stderr),
            Sink::File(file) => BoxMakeWriter::new(Arc::clone(file)),
            Sink::Memory(buf) => BoxMakeWriter::new(buf.clone()),
            Sink::External => BoxMakeWriter::new(io::sink),
        }
    }
}

/// Shared in-memory buffer receiving formatted entries.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Written lines, without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .map_err(|_| io::Error::other("memory sink poisoned"))?
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for MemorySink {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_sentinels() {
        assert!(matches!(Sink::open("stdout"), Ok(Sink::Stdout)));
        assert!(matches!(Sink::open("stderr"), Ok(Sink::Stderr)));
    }

    #[test]
    fn test_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let sink = Sink::open(path.to_str().unwrap()).unwrap();
        assert!(matches!(sink, Sink::File(_)));
        assert!(path.exists());
        sink.sync().unwrap();
    }

    #[test]
    fn test_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");
        match Sink::open(path.to_str().unwrap()) {
            Err(LoggerError::OpenSink { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected OpenSink error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_output_fails() {
        assert!(matches!(Sink::open(""), Err(LoggerError::OpenSink { .. })));
    }

    #[test]
    fn test_memory_sink_collects_lines() {
        let mut sink = MemorySink::new();
        sink.write_all(b"one\ntwo\n").unwrap();
        assert_eq!(sink.lines(), vec!["one", "two"]);
    }
}
