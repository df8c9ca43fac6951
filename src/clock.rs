use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current time, in seconds since the UNIX epoch.
///
/// All time reads in this crate go through a `Clock`, so tests can pin the time and
/// deployments can correct for a known offset against a trusted time source.
pub trait Clock: Send + Sync {
    /// The current unix time, in seconds, with `offset` seconds added.
    fn now(&self, offset: i64) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self, offset: i64) -> i64 {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        secs.saturating_add(offset)
    }
}

/// A clock stopped at a fixed unix time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self, offset: i64) -> i64 {
        self.0.saturating_add(offset)
    }
}
