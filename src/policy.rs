//! Device capability limits.
//!
//! How many frames a device can hold in memory, and how long a clip it can
//! sample at a given frame rate, are decided outside the engine. The planner
//! and the harvester receive those limits through a [`DevicePolicy`] value
//! instead of reading global state.

/// Frame ceiling used by [`FixedPolicy::default`].
pub const DEFAULT_MAX_FRAME_COUNT: usize = 300;

/// Capability limits consumed by the sampling engine.
pub trait DevicePolicy: Send + Sync {
    /// Maximum number of frames a single harvest may keep.
    fn max_frame_count(&self) -> usize;

    /// Maximum clip length, in seconds, that may be sampled at `frame_rate`.
    ///
    /// A non-finite or non-positive value means "no limit".
    fn max_duration_seconds(&self, frame_rate: f64) -> f64;
}

/// A policy with a fixed frame ceiling.
///
/// Unless overridden, the duration limit is derived from the frame ceiling:
/// `max_frame_count / frame_rate` seconds, so that a range sampled at full
/// rate never plans more frames than the harvester may keep.
///
/// # Example
///
/// ```
/// use vidgif::{DevicePolicy, FixedPolicy};
///
/// let policy = FixedPolicy::new(120);
/// assert_eq!(policy.max_frame_count(), 120);
/// assert_eq!(policy.max_duration_seconds(30.0), 4.0);
///
/// let capped = FixedPolicy::new(120).with_max_duration(3.0);
/// assert_eq!(capped.max_duration_seconds(10.0), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPolicy {
    max_frames: usize,
    max_duration: Option<f64>,
}

impl FixedPolicy {
    /// Create a policy that keeps at most `max_frames` frames.
    pub fn new(max_frames: usize) -> Self {
        Self {
            max_frames,
            max_duration: None,
        }
    }

    /// A policy without any limits.
    pub fn unlimited() -> Self {
        Self {
            max_frames: usize::MAX,
            max_duration: Some(f64::INFINITY),
        }
    }

    /// Use a fixed duration limit instead of the derived one.
    #[must_use]
    pub fn with_max_duration(mut self, seconds: f64) -> Self {
        self.max_duration = Some(seconds);
        self
    }
}

impl Default for FixedPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_COUNT)
    }
}

impl DevicePolicy for FixedPolicy {
    fn max_frame_count(&self) -> usize {
        self.max_frames
    }

    fn max_duration_seconds(&self, frame_rate: f64) -> f64 {
        match self.max_duration {
            Some(seconds) => seconds,
            None if frame_rate > 0.0 => self.max_frames as f64 / frame_rate,
            None => f64::INFINITY,
        }
    }
}
