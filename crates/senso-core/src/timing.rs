//! Millisecond clock and periodic timers.
//!
//! The clock is a free-running `u32` millisecond counter that wraps roughly
//! every 49.7 days. Every comparison goes through `wrapping_sub` so a timer
//! armed just before the wrap still fires on time just after it.

/// Milliseconds per second.
pub const MS_PER_SECOND: u32 = 1_000;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u32 = 60 * 60 * MS_PER_SECOND;

/// Milliseconds per day.
pub const MS_PER_DAY: u32 = 24 * MS_PER_HOUR;

/// Source of monotonic milliseconds since boot.
pub trait Clock {
    /// Current time in milliseconds. Wraps at `u32::MAX`.
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// A `(last fired, interval)` pair checked against a wrapping clock.
///
/// ```rust
/// use senso_core::timing::PeriodicTimer;
///
/// let mut tick = PeriodicTimer::new(1_000);
/// assert!(!tick.poll(999));
/// assert!(tick.poll(1_000));
/// assert!(!tick.poll(1_500));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTimer {
    last: u32,
    interval: u32,
}

impl PeriodicTimer {
    /// Timer armed at boot (time 0).
    pub const fn new(interval_ms: u32) -> Self {
        Self::starting_at(interval_ms, 0)
    }

    /// Timer armed at `now`.
    pub const fn starting_at(interval_ms: u32, now: u32) -> Self {
        Self {
            last: now,
            interval: interval_ms,
        }
    }

    pub const fn interval_ms(&self) -> u32 {
        self.interval
    }

    /// Milliseconds since the timer was last armed.
    pub const fn elapsed(&self, now: u32) -> u32 {
        now.wrapping_sub(self.last)
    }

    pub const fn is_due(&self, now: u32) -> bool {
        self.elapsed(now) >= self.interval
    }

    /// Milliseconds until the timer is due, 0 if it already is.
    pub const fn remaining(&self, now: u32) -> u32 {
        self.interval.saturating_sub(self.elapsed(now))
    }

    /// Re-arm from `now`. Late firings push the schedule back rather than
    /// catching up.
    pub fn rearm(&mut self, now: u32) {
        self.last = now;
    }

    /// Check and re-arm in one go. Returns `true` when the timer fired.
    pub fn poll(&mut self, now: u32) -> bool {
        if self.is_due(now) {
            self.rearm(now);
            true
        } else {
            false
        }
    }
}

#[cfg(any(test, feature = "sim"))]
pub use virtual_time::{VirtualClock, VirtualDelay};

#[cfg(any(test, feature = "sim"))]
mod virtual_time {
    use core::cell::Cell;

    use embedded_hal::delay::DelayNs;

    use super::Clock;

    const NANOS_PER_MS: u64 = 1_000_000;

    /// Clock that only moves when told to, or when a [`VirtualDelay`] sleeps.
    #[derive(Debug, Default)]
    pub struct VirtualClock {
        nanos: Cell<u64>,
    }

    impl VirtualClock {
        pub const fn new() -> Self {
            Self {
                nanos: Cell::new(0),
            }
        }

        /// Clock starting at an arbitrary millisecond value, e.g. just before
        /// the `u32` wrap.
        pub const fn starting_at(ms: u32) -> Self {
            Self {
                nanos: Cell::new(ms as u64 * NANOS_PER_MS),
            }
        }

        pub fn advance_ms(&self, ms: u32) {
            self.advance_ns(ms as u64 * NANOS_PER_MS);
        }

        pub fn advance_ns(&self, ns: u64) {
            self.nanos.set(self.nanos.get().wrapping_add(ns));
        }

        /// Jump to `ms` on the wrapped millisecond scale, moving forward only.
        pub fn advance_to(&self, ms: u32) {
            let delta = ms.wrapping_sub(self.now_ms());
            self.advance_ms(delta);
        }
    }

    impl Clock for VirtualClock {
        fn now_ms(&self) -> u32 {
            // Truncation reproduces the hardware counter wrap.
            (self.nanos.get() / NANOS_PER_MS) as u32
        }
    }

    /// Blocking delay that advances a [`VirtualClock`] instead of spinning.
    #[derive(Debug, Clone, Copy)]
    pub struct VirtualDelay<'a> {
        clock: &'a VirtualClock,
    }

    impl<'a> VirtualDelay<'a> {
        pub const fn new(clock: &'a VirtualClock) -> Self {
            Self { clock }
        }
    }

    impl DelayNs for VirtualDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.clock.advance_ns(ns as u64);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.clock.advance_ms(ms);
        }
    }
}
