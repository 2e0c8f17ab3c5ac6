//! `Sinks` (A2): the report/error/log/debug writers threaded by reference
//! through elaboration, propagation, and rule checking. Replaces the
//! original tool's global process-wide streams (distilled spec §9) with a
//! value tests can substitute in-memory writers for.

use std::io::{self, Write};

/// Bundles the four output streams the pipeline writes to. Each is boxed as
/// `dyn Write` so the CLI can point them at files while tests point them at
/// `Vec<u8>` buffers.
pub struct Sinks {
    pub report: Box<dyn Write + Send>,
    pub error: Box<dyn Write + Send>,
    pub log: Box<dyn Write + Send>,
    pub debug: Box<dyn Write + Send>,
}

impl Sinks {
    pub fn new(
        report: Box<dyn Write + Send>,
        error: Box<dyn Write + Send>,
        log: Box<dyn Write + Send>,
        debug: Box<dyn Write + Send>,
    ) -> Self {
        Self { report, error, log, debug }
    }

    /// All four streams pointed at stdout/stderr, for quick CLI defaults.
    pub fn stdio() -> Self {
        Self {
            report: Box::new(io::stdout()),
            error: Box::new(io::stderr()),
            log: Box::new(io::stderr()),
            debug: Box::new(io::sink()),
        }
    }

    /// All four streams discarded; useful when only the in-memory return
    /// values (elaboration results, `Vec<Finding>`) matter.
    pub fn null() -> Self {
        Self {
            report: Box::new(io::sink()),
            error: Box::new(io::sink()),
            log: Box::new(io::sink()),
            debug: Box::new(io::sink()),
        }
    }

    /// All four streams captured into independent in-memory buffers, for
    /// tests that assert on emitted text.
    pub fn memory() -> (Self, MemorySinkHandles) {
        let report = SharedBuffer::default();
        let error = SharedBuffer::default();
        let log = SharedBuffer::default();
        let debug = SharedBuffer::default();
        let sinks = Self {
            report: Box::new(report.clone()),
            error: Box::new(error.clone()),
            log: Box::new(log.clone()),
            debug: Box::new(debug.clone()),
        };
        (sinks, MemorySinkHandles { report, error, log, debug })
    }
}

/// Handles retained by a test after [`Sinks::memory`] hands the writable
/// halves to a `Sinks` value.
pub struct MemorySinkHandles {
    pub report: SharedBuffer,
    pub error: SharedBuffer,
    pub log: SharedBuffer,
    pub debug: SharedBuffer,
}

#[derive(Clone, Default)]
pub struct SharedBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("buffer mutex poisoned")).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buffer mutex poisoned").write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sinks_capture_writes() {
        let (mut sinks, handles) = Sinks::memory();
        writeln!(sinks.error, "Overvoltage Error:Gate vs Source/Drain:").unwrap();
        assert!(handles.error.contents().contains("Overvoltage Error"));
        assert!(handles.report.contents().is_empty());
    }
}
