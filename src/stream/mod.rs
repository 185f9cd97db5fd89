//! The two destination channels (normal vs. error severity) with swappable
//! sinks and identity tokens.
//!
//! The managed handler records the token pair current when it was built;
//! comparing tokens later answers "have the streams been redirected since?"
//! without touching the sinks themselves. Redirection is how tests isolate
//! output — installing a fresh sink mints a fresh token.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError, atomic::AtomicU64, atomic::Ordering};

/// Identity tokens of the (normal, error) channel pair.
pub type StreamIds = (u64, u64);

struct Slot {
    id: u64,
    sink: Box<dyn Write + Send>,
}

/// Owns the process's two log destinations. Shared by every managed handler
/// in a hierarchy.
pub struct StreamHub {
    next_id: AtomicU64,
    normal: Mutex<Slot>,
    error: Mutex<Slot>,
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamHub {
    /// Starts on the real stdout/stderr.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(3),
            normal: Mutex::new(Slot {
                id: 1,
                sink: Box::new(io::stdout()),
            }),
            error: Mutex::new(Slot {
                id: 2,
                sink: Box::new(io::stderr()),
            }),
        }
    }

    fn mint_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Current identity token pair. Cheap enough to call on every emit.
    #[must_use]
    pub fn current_ids(&self) -> StreamIds {
        let normal = self.normal.lock().unwrap_or_else(PoisonError::into_inner).id;
        let error = self.error.lock().unwrap_or_else(PoisonError::into_inner).id;
        (normal, error)
    }

    /// Installs a replacement normal-severity sink and returns its token.
    pub fn redirect_normal(&self, sink: Box<dyn Write + Send>) -> u64 {
        let id = self.mint_id();
        let mut slot = self.normal.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Slot { id, sink };
        id
    }

    /// Installs a replacement error-severity sink and returns its token.
    pub fn redirect_error(&self, sink: Box<dyn Write + Send>) -> u64 {
        let id = self.mint_id();
        let mut slot = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Slot { id, sink };
        id
    }

    /// Restores the real stdout/stderr under fresh tokens.
    pub fn reset(&self) {
        self.redirect_normal(Box::new(io::stdout()));
        self.redirect_error(Box::new(io::stderr()));
    }

    pub(crate) fn write_normal(&self, line: &str) -> io::Result<()> {
        let mut slot = self.normal.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(slot.sink, "{line}")
    }

    pub(crate) fn write_error(&self, line: &str) -> io::Result<()> {
        let mut slot = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(slot.sink, "{line}")
    }

    /// Flushes both channels.
    ///
    /// # Errors
    /// Returns the first I/O error encountered.
    pub fn flush(&self) -> io::Result<()> {
        self.normal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sink
            .flush()?;
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sink
            .flush()
    }
}

/// Shared in-memory sink for isolated testing — install a clone as a channel
/// sink, keep a clone to read what was written.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// How many times `needle` appears in the captured output.
    #[must_use]
    pub fn occurrences(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
