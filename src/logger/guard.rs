//! RAII guards for scoped level overrides. Drop order gives the stack-like
//! nesting the overrides require, and drop-on-unwind gives restore-on-panic.

use super::Logger;
use crate::level::LevelValue;

/// Restores a logger's explicit level (and optionally its propagation flag)
/// when dropped. Obtained from [`Logger::use_level`] and friends.
#[must_use = "the override ends as soon as the guard is dropped"]
pub struct LevelGuard<'a> {
    logger: &'a Logger,
    prev_level: LevelValue,
    prev_propagate: Option<bool>,
}

impl<'a> LevelGuard<'a> {
    pub(crate) const fn new(
        logger: &'a Logger,
        prev_level: LevelValue,
        prev_propagate: Option<bool>,
    ) -> Self {
        Self {
            logger,
            prev_level,
            prev_propagate,
        }
    }
}

impl Drop for LevelGuard<'_> {
    fn drop(&mut self) {
        self.logger.restore_scope(self.prev_level, self.prev_propagate);
    }
}
