use chrono::{DateTime, Local, NaiveTime, Timelike, Utc};
use std::sync::{Arc, Mutex, PoisonError};

/// Clock trait for abstracting time operations
pub trait Clock: Send + Sync {
    /// Current instant, used for link-status bookkeeping
    fn now(&self) -> DateTime<Utc>;

    /// Wall-clock time of day the grow schedules are evaluated against.
    /// Schedules are written in the controller's local time.
    fn time_of_day(&self) -> NaiveTime;

    /// Milliseconds since Unix epoch
    fn now_epoch_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Production implementation of Clock using system time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn time_of_day(&self) -> NaiveTime {
        let now = Local::now().time();
        // Drop sub-minute precision; schedules are HH:MM
        now.with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now)
    }
}

/// Test implementation of Clock with fixed/controllable time.
///
/// Clones share the same instant, so a test can keep one handle and advance
/// time seen by a session holding another.
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    /// Create a new FixedClock with the given timestamp
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Arc::new(Mutex::new(timestamp)),
        }
    }

    /// Create a FixedClock from RFC3339 string
    pub fn from_rfc3339(timestamp_str: &str) -> Result<Self, chrono::ParseError> {
        let timestamp = DateTime::parse_from_rfc3339(timestamp_str)?.with_timezone(&Utc);
        Ok(Self::new(timestamp))
    }

    /// Update the fixed time
    pub fn set_time(&self, timestamp: DateTime<Utc>) {
        *self.timestamp.lock().unwrap_or_else(PoisonError::into_inner) = timestamp;
    }

    /// Advance time by the given number of seconds
    pub fn advance_seconds(&self, seconds: i64) {
        let mut timestamp = self.timestamp.lock().unwrap_or_else(PoisonError::into_inner);
        *timestamp += chrono::Duration::seconds(seconds);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.timestamp.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The fixed instant's UTC time of day
    fn time_of_day(&self) -> NaiveTime {
        self.now().time()
    }
}

/// Parse `HH:MM` into a time of day
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Minutes since midnight for a time of day
pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
