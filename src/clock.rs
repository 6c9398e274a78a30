//! Monotonic time and sleeping

use nix::time::{ClockId, clock_gettime};
use std::time::Duration;

/// Source of monotonic time and the only place a run is allowed to sleep
pub trait Clock {
    /// Current `CLOCK_MONOTONIC` reading, the base systemd uses for
    /// `ActiveEnterTimestampMonotonic`
    fn monotonic_now(&self) -> Option<Duration>;

    /// Block the run for `duration`
    fn sleep(&self, duration: Duration);
}

/// Real clock backed by `clock_gettime(2)`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn monotonic_now(&self) -> Option<Duration> {
        let ts = clock_gettime(ClockId::CLOCK_MONOTONIC).ok()?;
        let secs = u64::try_from(ts.tv_sec()).ok()?;
        let nanos = u32::try_from(ts.tv_nsec()).ok()?;
        Some(Duration::new(secs, nanos))
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
