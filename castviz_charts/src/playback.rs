// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer seam for playback animation.
//!
//! The charts never own a clock. The host provides a [`Scheduler`] that fires repeating timers and
//! feeds each firing back through `tick(handle)`; a tick whose handle is no longer current is
//! ignored, so a timer that fires after cancellation cannot advance playback.

extern crate alloc;

use alloc::vec::Vec;

/// Period of the playback timer in milliseconds.
pub const PLAYBACK_PERIOD_MS: u32 = 300;

/// Opaque handle of a scheduled repeating timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Host-provided timer service.
pub trait Scheduler {
    /// Starts a timer firing every `period_ms` milliseconds until cancelled.
    fn schedule_repeating(&mut self, period_ms: u32) -> TimerHandle;
    /// Cancels a timer. Cancelling an unknown or already-cancelled handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

/// A scheduler driven by hand: timers fire only when the host says so.
///
/// Useful for tests and for offline rendering, where "time" is a loop counter.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    active: Vec<(TimerHandle, u32)>,
    cancelled: Vec<TimerHandle>,
}

impl ManualScheduler {
    /// Creates a scheduler with no timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active timers and their periods.
    pub fn active(&self) -> &[(TimerHandle, u32)] {
        &self.active
    }

    /// Every handle cancelled so far, in cancellation order.
    pub fn cancelled(&self) -> &[TimerHandle] {
        &self.cancelled
    }

    /// Returns `true` if `handle` is still active.
    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.active.iter().any(|(h, _)| *h == handle)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, period_ms: u32) -> TimerHandle {
        self.next += 1;
        let handle = TimerHandle(self.next);
        self.active.push((handle, period_ms));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let before = self.active.len();
        self.active.retain(|(h, _)| *h != handle);
        if self.active.len() != before {
            self.cancelled.push(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn handles_are_unique_and_cancel_is_idempotent() {
        let mut s = ManualScheduler::new();
        let a = s.schedule_repeating(PLAYBACK_PERIOD_MS);
        let b = s.schedule_repeating(PLAYBACK_PERIOD_MS);
        assert_ne!(a, b);
        s.cancel(a);
        s.cancel(a);
        assert_eq!(s.cancelled(), &[a]);
        assert!(!s.is_active(a));
        assert!(s.is_active(b));
    }
}
