//! Time source used by every blocking wait in the stack.

use core::time::Duration;

/// Monotonic clock plus a blocking delay.
///
/// All timeouts in the crate are measured against `now()`, so a test can
/// substitute a clock that advances on every call and get deterministic,
/// instant timeouts.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin. Must never go backwards.
    fn now(&mut self) -> Duration;

    /// Block for `duration`.
    fn delay(&mut self, duration: Duration);
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now(&mut self) -> Duration {
        (**self).now()
    }

    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}

/// A point on a [`Clock`] after which a wait gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Duration,
}

impl Deadline {
    /// Deadline `timeout` from the clock's current reading.
    pub fn after<C: Clock>(clock: &mut C, timeout: Duration) -> Self {
        Self {
            at: clock.now().saturating_add(timeout),
        }
    }

    /// Whether the clock has reached the deadline.
    pub fn expired<C: Clock>(&self, clock: &mut C) -> bool {
        clock.now() >= self.at
    }
}
