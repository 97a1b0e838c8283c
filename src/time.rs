//! Exact rational media time.
//!
//! Video timestamps are counted in integer ticks of a per-asset timescale
//! (ticks per second). [`MediaTime`] keeps that representation intact so that
//! sampling arithmetic never passes through floating-point seconds, and
//! [`TimeRange`] describes a half-open window on the same timeline.
//!
//! # Example
//!
//! ```
//! use vidgif::{MediaTime, TimeRange};
//!
//! let duration = MediaTime::new(6000, 600); // 10 seconds
//! assert_eq!(duration.as_millis(), 10_000);
//!
//! let range = TimeRange::from_seconds(2.0, 4.0, 600)?;
//! assert!(range.contains(MediaTime::new(1200, 600)));
//! assert!(!range.contains(MediaTime::new(2400, 600)));
//! # Ok::<(), vidgif::VidgifError>(())
//! ```

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::error::VidgifError;

/// A point on a media timeline, expressed as `value / timescale` seconds.
///
/// `flags` and `epoch` are carried through unchanged so that timestamps
/// derived from an asset's duration can be handed back to the decoding
/// collaborator exactly as it produced them. Equality and ordering compare
/// the rational value only.
#[derive(Debug, Clone, Copy)]
pub struct MediaTime {
    /// Tick count.
    pub value: i64,
    /// Ticks per second. Must be positive for a valid time.
    pub timescale: i32,
    /// Validity and rounding flags (see [`MediaTime::VALID`]).
    pub flags: u32,
    /// Distinguishes otherwise identical times on looping timelines.
    pub epoch: i64,
}

impl MediaTime {
    /// The time holds a meaningful value.
    pub const VALID: u32 = 1 << 0;
    /// The value was rounded when converted from another representation.
    pub const HAS_BEEN_ROUNDED: u32 = 1 << 1;

    /// Zero seconds.
    pub const ZERO: MediaTime = MediaTime::new(0, 1);

    /// Create a valid time of `value` ticks at `timescale` ticks per second.
    pub const fn new(value: i64, timescale: i32) -> Self {
        Self {
            value,
            timescale,
            flags: Self::VALID,
            epoch: 0,
        }
    }

    /// Convert floating-point seconds to the nearest tick in `timescale`.
    ///
    /// Sets [`HAS_BEEN_ROUNDED`](MediaTime::HAS_BEEN_ROUNDED) when the
    /// conversion was inexact.
    pub fn from_seconds(seconds: f64, timescale: i32) -> Self {
        let exact = seconds * timescale as f64;
        let value = exact.round();
        let mut time = Self::new(value as i64, timescale);
        if value != exact {
            time.flags |= Self::HAS_BEEN_ROUNDED;
        }
        time
    }

    /// Convert a [`Duration`] to ticks in `timescale`, truncating sub-tick
    /// remainders.
    pub fn from_duration(duration: Duration, timescale: i32) -> Self {
        let ticks = duration.as_nanos() * timescale.max(0) as u128 / 1_000_000_000;
        Self::new(ticks.min(i64::MAX as u128) as i64, timescale)
    }

    /// Same timescale, flags, and epoch; different tick count.
    pub fn with_value(self, value: i64) -> Self {
        Self { value, ..self }
    }

    /// Replace the flags.
    pub fn with_flags(self, flags: u32) -> Self {
        Self { flags, ..self }
    }

    /// Replace the epoch.
    pub fn with_epoch(self, epoch: i64) -> Self {
        Self { epoch, ..self }
    }

    /// `true` when the timescale is positive and the `VALID` flag is set.
    pub fn is_valid(&self) -> bool {
        self.timescale > 0 && self.flags & Self::VALID != 0
    }

    /// `true` when the value is zero ticks.
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Seconds as a float. Only for display and delay computation.
    pub fn as_seconds(&self) -> f64 {
        if self.timescale == 0 {
            return 0.0;
        }
        self.value as f64 / self.timescale as f64
    }

    /// Whole milliseconds, truncated toward zero.
    pub fn as_millis(&self) -> i64 {
        if self.timescale == 0 {
            return 0;
        }
        (self.value as i128 * 1000 / self.timescale as i128) as i64
    }

    /// Convert to a [`Duration`]. Negative times clamp to zero.
    pub fn as_duration(&self) -> Duration {
        if self.timescale <= 0 || self.value <= 0 {
            return Duration::ZERO;
        }
        let nanos = self.value as u128 * 1_000_000_000 / self.timescale as u128;
        Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
    }

    /// Re-express this time in another timescale, truncating toward zero.
    pub fn convert_scale(&self, timescale: i32) -> Self {
        if self.timescale == timescale || self.timescale == 0 {
            return Self { timescale, ..*self };
        }
        let scaled = self.value as i128 * timescale as i128;
        let value = scaled / self.timescale as i128;
        let mut flags = self.flags;
        if scaled % self.timescale as i128 != 0 {
            flags |= Self::HAS_BEEN_ROUNDED;
        }
        Self {
            value: value as i64,
            timescale,
            flags,
            epoch: self.epoch,
        }
    }

    /// Cross-multiplied numerators for comparison at a common denominator.
    fn cross(&self, other: &Self) -> (i128, i128) {
        (
            self.value as i128 * other.timescale as i128,
            other.value as i128 * self.timescale as i128,
        )
    }
}

impl Default for MediaTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for MediaTime {
    fn eq(&self, other: &Self) -> bool {
        let (left, right) = self.cross(other);
        left == right
    }
}

impl Eq for MediaTime {}

impl PartialOrd for MediaTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MediaTime {
    fn cmp(&self, other: &Self) -> Ordering {
        let (left, right) = self.cross(other);
        left.cmp(&right)
    }
}

impl Display for MediaTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:.3}s ({}/{})", self.as_seconds(), self.value, self.timescale)
    }
}

/// A half-open window `[start, end)` on a media timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive start.
    pub start: MediaTime,
    /// Exclusive end.
    pub end: MediaTime,
}

impl TimeRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// Returns [`VidgifError::InvalidInput`] if `end` precedes `start` or
    /// either bound has a non-positive timescale.
    pub fn new(start: MediaTime, end: MediaTime) -> Result<Self, VidgifError> {
        if start.timescale <= 0 || end.timescale <= 0 {
            return Err(VidgifError::InvalidInput(
                "time range bounds need a positive timescale".to_string(),
            ));
        }
        if end < start {
            return Err(VidgifError::InvalidInput(format!(
                "time range end ({end}) precedes its start ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a range from floating-point seconds.
    ///
    /// # Errors
    ///
    /// Same as [`TimeRange::new`], plus non-finite or negative bounds.
    pub fn from_seconds(start: f64, end: f64, timescale: i32) -> Result<Self, VidgifError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 {
            return Err(VidgifError::InvalidInput(format!(
                "time range bounds must be finite and non-negative (got {start}..{end})"
            )));
        }
        Self::new(
            MediaTime::from_seconds(start, timescale),
            MediaTime::from_seconds(end, timescale),
        )
    }

    /// `start <= time < end`.
    pub fn contains(&self, time: MediaTime) -> bool {
        self.start <= time && time < self.end
    }

    /// `true` when the range covers no time at all.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Length of the range in seconds.
    pub fn duration_seconds(&self) -> f64 {
        (self.end.as_seconds() - self.start.as_seconds()).max(0.0)
    }

    /// Shorten the range so that it lasts at most `max_seconds`.
    ///
    /// The new end is expressed in the start's timescale.
    pub fn clamp_duration(&self, max_seconds: f64) -> Self {
        if !max_seconds.is_finite() || self.duration_seconds() <= max_seconds {
            return *self;
        }
        let span = MediaTime::from_seconds(max_seconds.max(0.0), self.start.timescale);
        let limit = self.start.with_value(self.start.value.saturating_add(span.value));
        Self {
            start: self.start,
            end: limit.min(self.end),
        }
    }
}
