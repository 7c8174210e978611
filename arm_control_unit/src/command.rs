//! Target intake.
//!
//! A single-slot mailbox shared between whoever produces end-effector
//! targets (CLI, planner thread, UI) and the control loop. The loop takes the
//! pending target at the top of each step, so profile replacement never
//! overlaps a tick.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arm_common::arm::geometry::Point2D;

/// Cloneable single-slot target handoff. Newer targets overwrite older ones
/// that have not been taken yet.
#[derive(Debug, Clone, Default)]
pub struct TargetMailbox {
    slot: Arc<Mutex<Option<Point2D>>>,
}

impl TargetMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking producer cannot leave a half-written `Option<Point2D>`.
    fn lock(&self) -> MutexGuard<'_, Option<Point2D>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Post a target, returning the one it displaced (if any).
    pub fn post(&self, target: Point2D) -> Option<Point2D> {
        self.lock().replace(target)
    }

    /// Take the pending target.
    pub fn take(&self) -> Option<Point2D> {
        self.lock().take()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }
}
