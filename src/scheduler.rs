//! # Refresh Scheduler
//!
//! Guard state for the periodic refresh loop.
//!
//! The scheduler makes the polling contract explicit instead of leaving it
//! to ad hoc timer wiring:
//!
//! - **Reentrancy**: a refresh cycle in flight must never interleave with
//!   another, because the reconciler mutates shared render state. A tick
//!   that lands mid-cycle is skipped, not queued.
//! - **Send suppression**: a send in progress pauses ticks entirely, so
//!   the view is not reconciled out from under a pending optimistic
//!   update. The timer resumes on completion, success or failure.
//! - **Shutdown**: a stopped scheduler ends the drive loop.
//!
//! The flags are atomics: the cooperative execution context is single
//! threaded, but user actions and the tick loop interleave at await
//! points and may live on different tasks.

use std::sync::atomic::{AtomicBool, Ordering};

/// Guard flags for the periodic refresh loop.
#[derive(Debug, Default)]
pub struct RefreshScheduler {
    in_cycle: AtomicBool,
    paused: AtomicBool,
    stopped: AtomicBool,
}

impl RefreshScheduler {
    /// A scheduler with no cycle running, unpaused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to start a refresh cycle. Returns `None` while paused,
    /// stopped, or while another cycle holds the guard; the returned
    /// [`CycleGuard`] releases the cycle on drop.
    pub fn try_begin_cycle(&self) -> Option<CycleGuard<'_>> {
        if self.paused.load(Ordering::SeqCst) || self.stopped.load(Ordering::SeqCst) {
            return None;
        }
        self.in_cycle
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(CycleGuard { scheduler: self })
    }

    /// Suppresses ticks until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Lifts a [`pause`](Self::pause).
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Whether ticks are currently suppressed.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Ends the drive loop permanently.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Releases the cycle-in-progress flag when the cycle ends, by any path.
#[derive(Debug)]
pub struct CycleGuard<'a> {
    scheduler: &'a RefreshScheduler,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.scheduler.in_cycle.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// TESTS
// ============================================================================
