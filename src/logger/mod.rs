//! A named node in the logger tree: explicit level with inherit sentinel,
//! propagation flag, and the managed-handler policy that keeps exactly the
//! right handlers attached as state changes.

mod guard;

pub use guard::LevelGuard;

use chrono::Local;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use crate::error::Error;
use crate::handler::{DualStreamHandler, Handler, HandlerSet, Record};
use crate::hierarchy::{NodeOptions, Shared};
use crate::internal;
use crate::level::{self, LevelSpec, LevelValue};
use crate::stream::StreamIds;

/// One named logger. Created by the hierarchy, shared as `Arc<Logger>`; the
/// hierarchy's table is the sole owner, so a node lives until explicitly
/// removed regardless of caller clones.
pub struct Logger {
    name: String,
    level: AtomicI32,
    propagate: AtomicBool,
    disabled: AtomicBool,
    color_enabled: bool,
    parent: RwLock<Weak<Logger>>,
    handlers: Mutex<HandlerSet>,
    /// Stream identities the managed handler was built against. `None` means
    /// "unknown" and forces a freshness check to rebuild.
    last_streams: Mutex<Option<StreamIds>>,
    enabled_cache: Mutex<HashMap<LevelValue, bool>>,
    shared: Weak<Shared>,
}

impl Logger {
    pub(crate) fn from_options(
        name: &str,
        shared: Weak<Shared>,
        opts: &NodeOptions,
        propagate_default: bool,
        color_default: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            level: AtomicI32::new(opts.level),
            propagate: AtomicBool::new(opts.propagate.unwrap_or(propagate_default)),
            disabled: AtomicBool::new(opts.disabled),
            color_enabled: opts.color.unwrap_or(color_default),
            parent: RwLock::new(Weak::new()),
            handlers: Mutex::new(HandlerSet::default()),
            last_streams: Mutex::new(None),
            enabled_cache: Mutex::new(HashMap::new()),
            shared,
        }
    }

    /// Dot-separated hierarchical name; empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit level set on this node, `level::INHERIT` when unset.
    #[must_use]
    pub fn level(&self) -> LevelValue {
        self.level.load(Ordering::Relaxed)
    }

    /// Name of the explicit level, `"NOTSET"` when inheriting.
    #[must_use]
    pub fn level_name(&self) -> String {
        self.level_name_for(self.level())
    }

    /// Whether records forward to the parent instead of emitting locally.
    #[must_use]
    pub fn propagate(&self) -> bool {
        self.propagate.load(Ordering::Relaxed)
    }

    /// A disabled logger emits nothing and reports every level as not enabled.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    #[must_use]
    pub const fn color_enabled(&self) -> bool {
        self.color_enabled
    }

    /// Current parent, if the node is linked and the parent still exists.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<Self>> {
        self.parent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .upgrade()
    }

    pub(crate) fn set_parent(&self, parent: &Arc<Self>) {
        *self.parent.write().unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(parent);
    }

    pub(crate) fn parent_is(&self, candidate: &Arc<Self>) -> bool {
        self.parent().is_some_and(|p| Arc::ptr_eq(&p, candidate))
    }

    pub(crate) fn detach_parent(&self) {
        *self.parent.write().unwrap_or_else(PoisonError::into_inner) = Weak::new();
    }

    fn is_root(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.is_root_node(self))
    }

    fn resolve_spec(&self, spec: impl Into<LevelSpec>) -> Result<LevelValue, Error> {
        match (spec.into(), self.shared.upgrade()) {
            (LevelSpec::Value(value), _) => Ok(value),
            (spec @ LevelSpec::Name(_), Some(shared)) => shared
                .levels
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .resolve(spec),
            // Orphaned node (hierarchy dropped): built-in names still resolve.
            (spec @ LevelSpec::Name(_), None) => level::LevelRegistry::new().resolve(spec),
        }
    }

    fn level_name_for(&self, value: LevelValue) -> String {
        self.shared.upgrade().map_or_else(
            || level::LevelRegistry::new().name_of(value),
            |shared| {
                shared
                    .levels
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .name_of(value)
            },
        )
    }

    fn reject_non_severity(&self, value: LevelValue) -> Result<(), Error> {
        if value <= level::INHERIT {
            return Err(Error::InvalidLevel {
                name: self.level_name_for(value),
                value,
            });
        }
        Ok(())
    }

    /// Sets the explicit level. Accepts a name or a value; rejects zero and
    /// negatives — inheriting must go through [`Self::set_level_inherit`] so an
    /// explicit level cannot be lost by accident.
    ///
    /// # Errors
    /// `Error::UnknownLevel` for unrecognized names, `Error::InvalidLevel`
    /// for non-positive values.
    pub fn set_level(&self, spec: impl Into<LevelSpec>) -> Result<(), Error> {
        let value = self.resolve_spec(spec)?;
        self.reject_non_severity(value)?;
        self.apply_level(value);
        Ok(())
    }

    /// Explicit opt-in to the inherit sentinel: the node's effective level
    /// comes from the nearest ancestor afterwards.
    pub fn set_level_inherit(&self) {
        self.apply_level(level::INHERIT);
    }

    /// Sets the level only if it is strictly more verbose than the current
    /// *effective* level, so a caller asking for TRACE is never downgraded to
    /// DEBUG by a later, less verbose request.
    ///
    /// # Errors
    /// Same validation as [`Self::set_level`].
    pub fn set_level_minimum(&self, spec: impl Into<LevelSpec>) -> Result<(), Error> {
        let value = self.resolve_spec(spec)?;
        self.reject_non_severity(value)?;
        if self.minimum_applies(value) {
            self.apply_level(value);
        }
        Ok(())
    }

    /// The one comparison point for every `minimum` path: strictly more
    /// verbose than the current effective level, never the explicit level.
    pub(crate) fn minimum_applies(&self, value: LevelValue) -> bool {
        value < self.effective_level()
    }

    pub(crate) fn apply_level(&self, value: LevelValue) {
        self.level.store(value, Ordering::Relaxed);
        // A level change shifts what descendants inherit, so every node's
        // enabled cache is suspect, not just this one's.
        if let Some(shared) = self.shared.upgrade() {
            shared.clear_enabled_caches();
        } else {
            self.clear_enabled_cache();
        }
        self.ensure_handlers();
    }

    /// Flips propagation and immediately re-runs the handler policy so the
    /// node transitions between the propagating (no handler) and terminal
    /// (one handler) states.
    pub fn set_propagate(&self, propagate: bool) {
        self.propagate.store(propagate, Ordering::Relaxed);
        self.clear_enabled_cache();
        self.ensure_handlers();
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Relaxed);
        self.clear_enabled_cache();
    }

    /// Effective level: the first non-inherit explicit level walking from this
    /// node through its ancestors, else the hierarchy's configured default.
    #[must_use]
    pub fn effective_level(&self) -> LevelValue {
        let explicit = self.level();
        if explicit != level::INHERIT {
            return explicit;
        }
        let mut next = self.parent();
        while let Some(node) = next {
            let value = node.level();
            if value != level::INHERIT {
                return value;
            }
            next = node.parent();
        }
        self.shared
            .upgrade()
            .map_or(level::DETAIL, |shared| shared.fallback_level())
    }

    /// Name of the effective level.
    #[must_use]
    pub fn effective_level_name(&self) -> String {
        self.level_name_for(self.effective_level())
    }

    /// Whether a record at `level` would emit. Memoized per level value; the
    /// cache clears on level changes, propagation changes, and handler
    /// rebuilds. Unknown level names are simply not enabled.
    #[must_use]
    pub fn is_enabled_for(&self, level: impl Into<LevelSpec>) -> bool {
        self.resolve_spec(level)
            .is_ok_and(|value| self.enabled_for_value(value))
    }

    fn enabled_for_value(&self, value: LevelValue) -> bool {
        if self.disabled() {
            return false;
        }
        let mut cache = self
            .enabled_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(&hit) = cache.get(&value) {
            return hit;
        }
        let enabled = value >= self.effective_level();
        cache.insert(value, enabled);
        enabled
    }

    pub(crate) fn clear_enabled_cache(&self) {
        self.enabled_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Handler policy, re-evaluated on every emit attempt and on every
    /// propagation change:
    /// - the root always carries exactly one managed handler;
    /// - a propagating non-root node carries none;
    /// - a terminal node carries exactly one, rebuilt when the destination
    ///   streams' identity differs from the pair recorded at build time —
    ///   once per actual change, never on stable state.
    ///
    /// Never fails: at worst the previous handler keeps emitting.
    pub(crate) fn ensure_handlers(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let is_root = shared.is_root_node(self);
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);

        if !is_root && self.propagate() {
            if handlers.managed.take().is_some() {
                *self
                    .last_streams
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = None;
                self.clear_enabled_cache();
                internal::safe_trace(
                    "ensure_handlers",
                    &format!("removed managed handler on '{}'", self.name),
                );
            }
            return;
        }

        let current = shared.streams.current_ids();
        let known = *self
            .last_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if handlers.managed.is_none() || known != Some(current) {
            handlers.managed = Some(DualStreamHandler::new(
                Arc::clone(&shared.streams),
                self.color_enabled,
                shared.tags.clone(),
            ));
            *self
                .last_streams
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(current);
            self.clear_enabled_cache();
            internal::safe_trace(
                "ensure_handlers",
                &format!("rebuilt managed handler on '{}' for streams {current:?}", self.name),
            );
        }
    }

    /// Attaches a caller-owned handler. The policy engine never removes or
    /// rebuilds these.
    pub fn add_handler(&self, handler: Box<dyn Handler>) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .push(handler);
    }

    /// Whether the policy engine currently has a managed handler attached here.
    #[must_use]
    pub fn has_managed_handler(&self) -> bool {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .managed
            .is_some()
    }

    /// Number of caller-attached handlers.
    #[must_use]
    pub fn user_handler_count(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .len()
    }

    /// Stream identities the managed handler was last built against; `None`
    /// after a scoped override exits, before the next emit re-checks.
    #[must_use]
    pub fn stream_identity_cache(&self) -> Option<StreamIds> {
        *self
            .last_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Logs at a dynamically chosen level. An unrecognized name degrades to an
    /// ERROR record about the bad level rather than failing the call.
    pub fn log(&self, spec: impl Into<LevelSpec>, msg: &str) {
        match self.resolve_spec(spec) {
            Ok(value) => self.log_value(value, msg),
            Err(err) => self.log_value(level::ERROR, &err.to_string()),
        }
    }

    /// Most verbose level, for instrumenting the test suite itself.
    pub fn test(&self, msg: &str) {
        self.log_value(level::TEST, msg);
    }

    /// High-volume instrumentation, more verbose than debug.
    pub fn trace(&self, msg: &str) {
        self.log_value(level::TRACE, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log_value(level::DEBUG, msg);
    }

    /// More detailed than info; still normal program output.
    pub fn detail(&self, msg: &str) {
        self.log_value(level::DETAIL, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log_value(level::INFO, msg);
    }

    /// Less detailed than info, for quiet-but-not-silent operation.
    pub fn minimal(&self, msg: &str) {
        self.log_value(level::MINIMAL, msg);
    }

    pub fn warning(&self, msg: &str) {
        self.log_value(level::WARNING, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log_value(level::ERROR, msg);
    }

    pub fn critical(&self, msg: &str) {
        self.log_value(level::CRITICAL, msg);
    }

    fn log_value(&self, value: LevelValue, msg: &str) {
        if self.disabled() || !self.enabled_for_value(value) {
            return;
        }
        self.emit(value, msg);
    }

    /// Delivers one record to this node's handlers, then climbs the tree while
    /// propagation allows. Each visited node re-evaluates its handler policy
    /// first, so the record lands on exactly the handlers the state machine
    /// prescribes.
    fn emit(&self, value: LevelValue, msg: &str) {
        let level_name = self.level_name_for(value);
        let record = Record {
            logger: &self.name,
            level: value,
            level_name,
            message: msg,
            timestamp: Local::now(),
        };

        self.handle(&record);
        if !self.propagate() {
            return;
        }
        let mut next = self.parent();
        while let Some(node) = next {
            node.handle(&record);
            if !node.propagate() {
                break;
            }
            next = node.parent();
        }
    }

    fn handle(&self, record: &Record<'_>) {
        self.ensure_handlers();
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit_all(record);
    }

    /// Scoped level override: applies `spec` now, restores the prior explicit
    /// level when the returned guard drops — on every exit path, panics
    /// included.
    ///
    /// # Errors
    /// Same validation as [`Self::set_level`].
    pub fn use_level(&self, spec: impl Into<LevelSpec>) -> Result<LevelGuard<'_>, Error> {
        let value = self.resolve_spec(spec)?;
        self.reject_non_severity(value)?;
        let guard = LevelGuard::new(self, self.level(), None);
        self.apply_level(value);
        Ok(guard)
    }

    /// Scoped override that only takes effect when more verbose than the
    /// current effective level — same comparison as
    /// [`Self::set_level_minimum`].
    ///
    /// # Errors
    /// Same validation as [`Self::set_level`].
    pub fn use_level_minimum(&self, spec: impl Into<LevelSpec>) -> Result<LevelGuard<'_>, Error> {
        let value = self.resolve_spec(spec)?;
        self.reject_non_severity(value)?;
        let guard = LevelGuard::new(self, self.level(), None);
        if self.minimum_applies(value) {
            self.apply_level(value);
        }
        Ok(guard)
    }

    /// Scoped override of level and propagation together: the inherit sentinel
    /// turns propagation on (records flow to the parent), a concrete level
    /// turns it off (this node emits). The root's propagation is never
    /// touched. Both fields restore when the guard drops.
    ///
    /// # Errors
    /// `Error::UnknownLevel` for unrecognized names, `Error::InvalidLevel`
    /// for negative values. The inherit sentinel is accepted here.
    pub fn use_level_and_propagate(
        &self,
        spec: impl Into<LevelSpec>,
    ) -> Result<LevelGuard<'_>, Error> {
        let value = self.resolve_spec(spec)?;
        if value != level::INHERIT {
            self.reject_non_severity(value)?;
        }
        let prev_propagate = if self.is_root() {
            None
        } else {
            Some(self.propagate())
        };
        let guard = LevelGuard::new(self, self.level(), prev_propagate);
        self.apply_level(value);
        if prev_propagate.is_some() {
            self.set_propagate(value == level::INHERIT);
        }
        Ok(guard)
    }

    /// Restore path shared by all scope guards. Bypasses validation because
    /// the prior level may legitimately be the inherit sentinel, and
    /// invalidates the stream-identity cache: the caller's environment may
    /// swap the streams before the next log call, and a stale pair here is
    /// what caused repeated rebuild/duplicate-emission cascades.
    pub(crate) fn restore_scope(&self, prev_level: LevelValue, prev_propagate: Option<bool>) {
        self.level.store(prev_level, Ordering::Relaxed);
        if let Some(propagate) = prev_propagate {
            self.propagate.store(propagate, Ordering::Relaxed);
        }
        if let Some(shared) = self.shared.upgrade() {
            shared.clear_enabled_caches();
        } else {
            self.clear_enabled_cache();
        }
        *self
            .last_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        internal::safe_trace(
            "restore_scope",
            &format!("logger '{}' back to level {prev_level}", self.name),
        );
    }

    pub(crate) fn port_state_from(&self, other: &Self) {
        self.level.store(other.level(), Ordering::Relaxed);
        self.propagate.store(other.propagate(), Ordering::Relaxed);
        self.disabled.store(other.disabled(), Ordering::Relaxed);
    }

    pub(crate) fn take_handler_state(&self) -> (HandlerSet, Option<StreamIds>) {
        let set = std::mem::take(
            &mut *self.handlers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let ids = self
            .last_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        (set, ids)
    }

    pub(crate) fn install_handler_state(&self, set: HandlerSet, ids: Option<StreamIds>) {
        *self.handlers.lock().unwrap_or_else(PoisonError::into_inner) = set;
        *self
            .last_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = ids;
    }

    /// Flushes the managed handler and every user handler.
    ///
    /// # Errors
    /// Returns the first I/O error encountered.
    pub fn flush(&self) -> Result<(), Error> {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush_all()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("propagate", &self.propagate())
            .field("disabled", &self.disabled())
            .finish_non_exhaustive()
    }
}
