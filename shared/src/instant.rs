use std::time::Duration;

/// Monotonic point in time. Time-driven operations take `now` explicitly so
/// callers (and tests) control the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    inner: std::time::Instant,
}

impl Instant {
    pub fn now() -> Self {
        Self {
            inner: std::time::Instant::now(),
        }
    }

    /// Time elapsed between `self` and `now`, zero if `now` is earlier.
    pub fn elapsed(&self, now: &Instant) -> Duration {
        now.inner.saturating_duration_since(self.inner)
    }

    /// Time elapsed since `earlier`, zero if `earlier` is later.
    pub fn duration_since(&self, earlier: &Instant) -> Duration {
        self.inner.saturating_duration_since(earlier.inner)
    }

    pub fn add_millis(&mut self, millis: u32) {
        self.inner += Duration::from_millis(u64::from(millis));
    }

    pub fn add_duration(&mut self, duration: Duration) {
        self.inner += duration;
    }

    pub fn plus(&self, duration: Duration) -> Instant {
        Instant {
            inner: self.inner + duration,
        }
    }

    pub fn is_after(&self, other: &Instant) -> bool {
        self.inner > other.inner
    }
}
