//! Time abstractions and the outbound date stamp.
//!
//! The index API versions every call with a `v=YYYYMMDD` parameter. Handlers
//! read the date through an injectable clock so tests can pin it.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use chrono::{DateTime, Utc};

/// Source of wall-clock time.
///
/// Production code uses `RealClock`, tests inject `TestClock`.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current system time.
    fn now_system(&self) -> SystemTime;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl RealClock {
    /// Creates a new real clock instance.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now_system(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually driven clock.
///
/// Clones share one reading, so a test can keep a handle and move the time
/// seen by an `AppState` built from another clone.
#[derive(Debug, Clone)]
pub struct TestClock {
    epoch_nanos: Arc<AtomicU64>,
}

impl TestClock {
    /// Creates a clock reading the current time.
    pub fn new() -> Self {
        Self::with_start_time(SystemTime::now())
    }

    /// Creates a clock reading `start`.
    pub fn with_start_time(start: SystemTime) -> Self {
        let since_epoch = start.duration_since(UNIX_EPOCH).unwrap_or_default();
        Self { epoch_nanos: Arc::new(AtomicU64::new(saturating_nanos(since_epoch))) }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.epoch_nanos.fetch_add(saturating_nanos(duration), Ordering::AcqRel);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now_system(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.epoch_nanos.load(Ordering::Acquire))
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Returns the clock's current UTC date as `YYYYMMDD`.
pub fn date_stamp(clock: &dyn Clock) -> String {
    format_date_stamp(DateTime::<Utc>::from(clock.now_system()))
}

/// Formats a timestamp as `YYYYMMDD`.
pub fn format_date_stamp(time: DateTime<Utc>) -> String {
    time.format("%Y%m%d").to_string()
}
