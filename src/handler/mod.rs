//! The managed dual-stream handler plus the `Handler` trait that lets callers
//! attach their own backends without modifying logtree itself.

use chrono::{DateTime, Local};
use std::sync::Arc;

use crate::error::Error;
use crate::fmt::TagConfig;
use crate::level::{self, LevelValue};
use crate::stream::{StreamHub, StreamIds};

/// Carries all data a handler needs for one log line — avoids passing loose parameters.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    /// Name of the logger the record originated on, not the one emitting it.
    pub logger: &'a str,
    pub level: LevelValue,
    /// Canonical name resolved through the hierarchy's registry (lenient mode).
    pub level_name: String,
    pub message: &'a str,
    pub timestamp: DateTime<Local>,
}

/// `Send + Sync` bounds enable concurrent logging from multiple threads without locks on the trait object.
pub trait Handler: Send + Sync {
    /// Renders and delivers one record.
    ///
    /// # Errors
    /// I/O errors from the underlying sink. Emission paths ignore them; the
    /// result exists for custom handlers that flush eagerly.
    fn emit(&self, record: &Record<'_>) -> Result<(), Error>;

    /// Buffered handlers may lose tail data on abrupt exit without an explicit flush.
    ///
    /// # Errors
    /// I/O errors from the underlying sink.
    fn flush(&self) -> Result<(), Error>;
}

/// The handler the policy engine creates and owns. Routes by severity:
/// diagnostic levels (`<= DEBUG`) and alarming levels (`>= WARNING`) go to the
/// error channel, the stdout levels between them to the normal channel.
pub struct DualStreamHandler {
    streams: Arc<StreamHub>,
    built_ids: StreamIds,
    color_enabled: bool,
    tags: TagConfig,
}

impl DualStreamHandler {
    /// Captures the hub's identity tokens at build time; staleness checks
    /// compare against these.
    #[must_use]
    pub fn new(streams: Arc<StreamHub>, color_enabled: bool, tags: TagConfig) -> Self {
        let built_ids = streams.current_ids();
        Self {
            streams,
            built_ids,
            color_enabled,
            tags,
        }
    }

    /// Token pair recorded when this handler was built.
    #[must_use]
    pub const fn stream_ids(&self) -> StreamIds {
        self.built_ids
    }

    const fn routes_to_error(level: LevelValue) -> bool {
        level <= level::DEBUG || level >= level::WARNING
    }
}

impl Handler for DualStreamHandler {
    fn emit(&self, record: &Record<'_>) -> Result<(), Error> {
        let line = self.tags.render(record, self.color_enabled);
        if Self::routes_to_error(record.level) {
            self.streams.write_error(&line)?;
        } else {
            self.streams.write_normal(&line)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        self.streams.flush()?;
        Ok(())
    }
}

/// A node's attached handlers. The managed slot belongs to the policy engine;
/// user handlers are never removed or rebuilt by it.
#[derive(Default)]
pub(crate) struct HandlerSet {
    pub(crate) managed: Option<DualStreamHandler>,
    pub(crate) user: Vec<Box<dyn Handler>>,
}

impl HandlerSet {
    pub(crate) fn emit_all(&self, record: &Record<'_>) {
        // Handler bookkeeping must never turn a log call into an error.
        if let Some(managed) = &self.managed {
            let _ = managed.emit(record);
        }
        for handler in &self.user {
            let _ = handler.emit(record);
        }
    }

    pub(crate) fn flush_all(&self) -> Result<(), Error> {
        if let Some(managed) = &self.managed {
            managed.flush()?;
        }
        for handler in &self.user {
            handler.flush()?;
        }
        Ok(())
    }
}
