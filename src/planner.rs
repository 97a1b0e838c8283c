//! Sampling planner.
//!
//! Turns a [`VideoInfo`] and a [`SamplingConfig`] into the ordered list of
//! timestamps to render. Planning is pure: no I/O, no shared state, and the
//! same inputs always produce the same plan.
//!
//! The timeline is divided into `total_frames = floor(duration × frame_rate)`
//! evenly spaced instants. Instant `i` (1-based) sits at
//! `duration.value × i / total_frames` ticks, computed in integer arithmetic
//! so long videos do not drift. Each instant is then kept or dropped
//! according to the config's selection rules.
//!
//! # Example
//!
//! ```
//! use vidgif::{MediaTime, SamplingConfig, VideoInfo, planner};
//!
//! let info = VideoInfo::new(MediaTime::new(6000, 600), 30.0, 640, 480);
//! let config = SamplingConfig::new()
//!     .with_target_frame_rate(10.0)
//!     .with_interval_frames(10);
//!
//! let plan = planner::plan(&info, &config)?;
//! assert_eq!(plan.len(), 11);
//! assert_eq!(plan.total_frames(), 100);
//! # Ok::<(), vidgif::VidgifError>(())
//! ```

use std::slice::Iter;

use crate::configuration::SamplingConfig;
use crate::error::VidgifError;
use crate::metadata::VideoInfo;
use crate::policy::DevicePolicy;
use crate::time::{MediaTime, TimeRange};

/// An ordered, strictly increasing list of timestamps to sample.
///
/// All timestamps share the timescale, flags, and epoch of the duration they
/// were derived from.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct TimestampPlan {
    timestamps: Vec<MediaTime>,
    total_frames: u64,
    frame_rate: f64,
}

impl TimestampPlan {
    /// A plan with no timestamps.
    pub fn empty(frame_rate: f64) -> Self {
        Self {
            timestamps: Vec::new(),
            total_frames: 0,
            frame_rate,
        }
    }

    /// The planned timestamps in ascending order.
    pub fn timestamps(&self) -> &[MediaTime] {
        &self.timestamps
    }

    /// Number of planned timestamps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// `true` when there is nothing to sample.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of candidate instants the timeline was divided into.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Frame rate the instants were spaced at.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// First planned timestamp.
    pub fn first(&self) -> Option<MediaTime> {
        self.timestamps.first().copied()
    }

    /// Last planned timestamp.
    pub fn last(&self) -> Option<MediaTime> {
        self.timestamps.last().copied()
    }

    /// Iterate over the planned timestamps.
    pub fn iter(&self) -> Iter<'_, MediaTime> {
        self.timestamps.iter()
    }

    /// Consume the plan, returning its timestamps.
    pub fn into_timestamps(self) -> Vec<MediaTime> {
        self.timestamps
    }
}

impl<'a> IntoIterator for &'a TimestampPlan {
    type Item = &'a MediaTime;
    type IntoIter = Iter<'a, MediaTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.timestamps.iter()
    }
}

/// Plan the timestamps to sample from `info` under `config`.
///
/// # Errors
///
/// Returns [`VidgifError::InvalidInput`] when the duration is zero, negative,
/// or has a non-positive timescale, or when the effective frame rate is zero
/// or not finite. A duration too short to hold a single instant at the
/// frame rate yields an empty plan, not an error.
pub fn plan(info: &VideoInfo, config: &SamplingConfig) -> Result<TimestampPlan, VidgifError> {
    let duration = info.duration;
    if duration.timescale <= 0 {
        return Err(VidgifError::InvalidInput(format!(
            "duration timescale must be positive (got {})",
            duration.timescale
        )));
    }
    if duration.value <= 0 {
        return Err(VidgifError::InvalidInput(format!(
            "cannot sample a video of duration {duration}"
        )));
    }

    let frame_rate = config.effective_frame_rate(info.frames_per_second);
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return Err(VidgifError::InvalidInput(format!(
            "frame rate must be positive (native {}, target {:?})",
            info.frames_per_second, config.target_frame_rate
        )));
    }

    let total_frames = (duration.value as f64 * frame_rate / duration.timescale as f64).floor();
    if total_frames > u32::MAX as f64 {
        return Err(VidgifError::InvalidInput(format!(
            "{total_frames} instants at {frame_rate} fps is too many to plan"
        )));
    }
    let total_frames = total_frames as u64;

    log::debug!(
        "Planning {} instants over {} at {:.3} fps (interval_frames={}, interval_millis={:?}, range={})",
        total_frames,
        duration,
        frame_rate,
        config.interval_frames,
        config.interval_millis,
        config.range.is_some(),
    );

    if total_frames == 0 {
        return Ok(TimestampPlan::empty(frame_rate));
    }

    let mut timestamps: Vec<MediaTime> = Vec::new();
    for index in 1..=total_frames {
        let value = (duration.value as i128 * index as i128 / total_frames as i128) as i64;
        let timestamp = duration.with_value(value);

        if !is_selected(index, timestamp, config) {
            continue;
        }

        // Coarse timescales can map neighbouring instants onto the same tick.
        if timestamps.last().is_some_and(|last| last.value >= value) {
            continue;
        }
        timestamps.push(timestamp);
    }

    log::debug!("Planned {} of {} instants", timestamps.len(), total_frames);

    Ok(TimestampPlan {
        timestamps,
        total_frames,
        frame_rate,
    })
}

/// Plan like [`plan`], first shortening the configured range to the longest
/// clip `policy` allows at the effective frame rate.
///
/// A config without a range is planned unchanged.
///
/// # Errors
///
/// Same as [`plan`].
pub fn plan_with_policy(
    info: &VideoInfo,
    config: &SamplingConfig,
    policy: &dyn DevicePolicy,
) -> Result<TimestampPlan, VidgifError> {
    match effective_range(info, config, policy) {
        Some(range) if config.range != Some(range) => {
            plan(info, &config.clone().with_range(range))
        }
        _ => plan(info, config),
    }
}

/// The range [`plan_with_policy`] actually samples: the configured range,
/// shortened to the policy's duration limit at the effective frame rate.
///
/// `None` when no range is configured.
pub fn effective_range(
    info: &VideoInfo,
    config: &SamplingConfig,
    policy: &dyn DevicePolicy,
) -> Option<TimeRange> {
    let range = config.range?;

    let frame_rate = config.effective_frame_rate(info.frames_per_second);
    let max_duration = policy.max_duration_seconds(frame_rate);
    if !max_duration.is_finite() || max_duration <= 0.0 {
        return Some(range);
    }

    let clamped = range.clamp_duration(max_duration);
    if clamped != range {
        log::debug!(
            "Clamping sample range {:.3}s..{:.3}s to {:.3}s for {:.3} fps",
            range.start.as_seconds(),
            range.end.as_seconds(),
            max_duration,
            frame_rate,
        );
    }
    Some(clamped)
}

fn is_selected(index: u64, timestamp: MediaTime, config: &SamplingConfig) -> bool {
    if let Some(range) = &config.range {
        return range.contains(timestamp);
    }

    let on_interval = if config.interval_frames > 0 {
        index % config.interval_frames == 0
    } else if let Some(millis) = config.interval_millis.filter(|&millis| millis > 0) {
        timestamp.as_millis() % millis == 0
    } else {
        false
    };

    on_interval || index == 1
}
