//! Nanosecond timestamps and signed durations used to key transform histories.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

const NANOS_PER_MICRO: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A point in time as a count of nanoseconds since an arbitrary epoch.
/// Times are totally ordered; subtracting two of them yields a signed [`Duration`].
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, Encode, Decode,
)]
#[serde(transparent)]
pub struct Time(pub u64);

/// A signed span of time in nanoseconds.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, Encode, Decode,
)]
#[serde(transparent)]
pub struct Duration(pub i64);

/// Default tolerance for history lookups: 2^32 - 1 seconds, practically unbounded.
pub const MAX_DURATION: Duration = Duration(4_294_967_295 * NANOS_PER_SEC);

impl Time {
    pub const MIN: Time = Time(0);
    pub const MAX: Time = Time(u64::MAX);

    pub const fn from_nanos(nanos: u64) -> Self {
        Time(nanos)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Time(secs.saturating_mul(NANOS_PER_SEC as u64))
    }

    pub fn as_nanos(&self) -> u64 {
        let Self(nanos) = self;
        *nanos
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }

    /// Saturating at both ends of the `u64` range.
    pub fn saturating_add(self, delta: Duration) -> Self {
        Time(self.0.saturating_add_signed(delta.0))
    }

    pub fn saturating_sub(self, delta: Duration) -> Self {
        if delta.0 >= 0 {
            Time(self.0.saturating_sub(delta.0 as u64))
        } else {
            Time(self.0.saturating_add(delta.0.unsigned_abs()))
        }
    }
}

impl Duration {
    pub const ZERO: Duration = Duration(0);
    pub const MAX: Duration = Duration(i64::MAX);

    pub const fn from_nanos(nanos: i64) -> Self {
        Duration(nanos)
    }

    pub const fn from_micros(micros: i64) -> Self {
        Duration(micros.saturating_mul(NANOS_PER_MICRO))
    }

    pub const fn from_millis(millis: i64) -> Self {
        Duration(millis.saturating_mul(NANOS_PER_MILLI))
    }

    pub const fn from_secs(secs: i64) -> Self {
        Duration(secs.saturating_mul(NANOS_PER_SEC))
    }

    pub fn as_nanos(&self) -> i64 {
        let Self(nanos) = self;
        *nanos
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

/// bridge the API with standard Durations.
impl From<std::time::Duration> for Duration {
    fn from(duration: std::time::Duration) -> Self {
        Duration(i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl From<i64> for Duration {
    fn from(nanos: i64) -> Self {
        Duration(nanos)
    }
}

impl From<u64> for Time {
    fn from(nanos: u64) -> Self {
        Time(nanos)
    }
}

impl From<Time> for u64 {
    fn from(val: Time) -> Self {
        let Time(nanos) = val;
        nanos
    }
}

impl Sub for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        let diff = self.0 as i128 - rhs.0 as i128;
        Duration(diff.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    fn add(self, rhs: Duration) -> Time {
        self.saturating_add(rhs)
    }
}

impl Sub<Duration> for Time {
    type Output = Time;

    fn sub(self, rhs: Duration) -> Time {
        self.saturating_sub(rhs)
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        *self = self.saturating_add(rhs);
    }
}

impl SubAssign<Duration> for Time {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = self.saturating_sub(rhs);
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

// a way to multiply a duration by a scalar.
// useful to compute sampling offsets for example.
impl Mul<u64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: u64) -> Duration {
        Duration(self.0.saturating_mul(i64::try_from(rhs).unwrap_or(i64::MAX)))
    }
}

impl Neg for Duration {
    type Output = Self;

    fn neg(self) -> Self {
        Duration(self.0.saturating_neg())
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Self(nanos) = *self;
        let sign = if nanos < 0 { "-" } else { "" };
        let abs = nanos.unsigned_abs();
        if abs >= 86_400_000_000_000 {
            write!(f, "{sign}{:.3} d", abs as f64 / 86_400_000_000_000.0)
        } else if abs >= 3_600_000_000_000 {
            write!(f, "{sign}{:.3} h", abs as f64 / 3_600_000_000_000.0)
        } else if abs >= 60_000_000_000 {
            write!(f, "{sign}{:.3} m", abs as f64 / 60_000_000_000.0)
        } else if abs >= 1_000_000_000 {
            write!(f, "{sign}{:.3} s", abs as f64 / 1_000_000_000.0)
        } else if abs >= 1_000_000 {
            write!(f, "{sign}{:.3} ms", abs as f64 / 1_000_000.0)
        } else if abs >= 1_000 {
            write!(f, "{sign}{:.3} µs", abs as f64 / 1_000.0)
        } else {
            write!(f, "{sign}{abs} ns")
        }
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Self(nanos) = *self;
        let secs = nanos / NANOS_PER_SEC as u64;
        let sub = nanos % NANOS_PER_SEC as u64;
        write!(f, "{secs}.{sub:09}")
    }
}

/// Where `time` sits between `start` (0.0) and `end` (1.0). Not clamped.
/// A zero-length span yields 0.0.
pub fn percent_of(start: Time, end: Time, time: Time) -> f64 {
    let span = (end - start).0;
    if span == 0 {
        return 0.0;
    }
    (time - start).0 as f64 / span as f64
}

/// The time at `fraction` of the way from `start` to `end`.
pub fn interpolate(start: Time, end: Time, fraction: f64) -> Time {
    let span = (end - start).0 as f64;
    start + Duration((span * fraction).round() as i64)
}
