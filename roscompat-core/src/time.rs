//! Timestamps as reported by the clock reference.

use std::{
    ops::{Add, Sub},
    time::{Duration, SystemTime},
};

/// A point in time, in seconds and nanoseconds since the clock's epoch.
///
/// `sec` is an `i32` like the `builtin_interfaces/Time` and `ros::Time`
/// wire types, so it saturates in 2038.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    /// Seconds since epoch.
    pub sec: i32,

    /// Nanoseconds component.
    pub nanosec: u32,
}

impl Time {
    /// Creates a new Time instance.
    pub const fn new(sec: i32, nanosec: u32) -> Self {
        Self { sec, nanosec }
    }

    /// Creates a Time representing the epoch (0 seconds).
    pub const fn zero() -> Self {
        Self { sec: 0, nanosec: 0 }
    }

    /// Whether this is the zero time (simulated time before the first tick).
    pub fn is_zero(&self) -> bool {
        self.sec == 0 && self.nanosec == 0
    }

    /// Build from nanoseconds since epoch, saturating on overflow.
    pub fn from_nanos(nanos: u128) -> Self {
        let sec = nanos / 1_000_000_000;
        if sec > i32::MAX as u128 {
            return Self::new(i32::MAX, 999_999_999);
        }
        Self::new(sec as i32, (nanos % 1_000_000_000) as u32)
    }

    /// Nanoseconds since epoch. Negative seconds count as zero.
    pub fn as_nanos(&self) -> u128 {
        if self.sec < 0 {
            return 0;
        }
        self.sec as u128 * 1_000_000_000 + self.nanosec as u128
    }

    /// Seconds as a float.
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 * 1e-9
    }
}

impl From<Duration> for Time {
    fn from(d: Duration) -> Self {
        Time::from_nanos(d.as_nanos())
    }
}

impl From<Time> for Duration {
    fn from(t: Time) -> Self {
        Duration::from_nanos(t.as_nanos().min(u64::MAX as u128) as u64)
    }
}

impl From<SystemTime> for Time {
    fn from(t: SystemTime) -> Self {
        t.duration_since(SystemTime::UNIX_EPOCH)
            .map(Time::from)
            .unwrap_or_default()
    }
}

impl From<Time> for SystemTime {
    fn from(t: Time) -> Self {
        SystemTime::UNIX_EPOCH + Duration::from(t)
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    fn add(self, rhs: Duration) -> Time {
        Time::from_nanos(self.as_nanos() + rhs.as_nanos())
    }
}

impl Sub for Time {
    type Output = Duration;

    /// Elapsed time between two stamps; zero when `rhs` is later.
    fn sub(self, rhs: Time) -> Duration {
        let nanos = self.as_nanos().saturating_sub(rhs.as_nanos());
        Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
    }
}
