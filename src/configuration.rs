//! Sampling and harvest configuration.
//!
//! [`SamplingConfig`] describes which instants of a video to sample, and
//! [`HarvestOptions`] threads progress callbacks, worker counts, and output
//! size through a harvest without polluting every function signature.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use vidgif::{HarvestOptions, ProgressCallback, ProgressInfo, SamplingConfig, TimeRange};
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{:?}: {} done", info.operation, info.current);
//!     }
//! }
//!
//! let sampling = SamplingConfig::new()
//!     .with_target_frame_rate(10.0)
//!     .with_range(TimeRange::from_seconds(2.0, 4.0, 600)?);
//!
//! let options = HarvestOptions::new()
//!     .with_progress(Arc::new(LogProgress))
//!     .with_resolution(Some(320), None)
//!     .with_concurrency(4);
//! # Ok::<(), vidgif::VidgifError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::thread;

use crate::progress::{NoOpProgress, ProgressCallback};
use crate::time::TimeRange;

/// Millisecond interval used when none is configured: one frame per second.
pub const DEFAULT_INTERVAL_MILLIS: i64 = 1000;

/// Which instants of a video the planner selects.
///
/// Selection precedence, highest first:
///
/// 1. A [`range`](Self::with_range) includes exactly the instants inside it.
/// 2. Otherwise [`interval_frames`](Self::with_interval_frames) keeps every
///    Nth instant.
/// 3. Otherwise [`interval_millis`](Self::with_interval_millis) keeps the
///    instants that fall on a millisecond boundary multiple.
///
/// Without a range, the first instant is always kept.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Overrides the native frame rate. `None` or `0.0` means native.
    pub target_frame_rate: Option<f64>,
    /// Keep every Nth instant. `0` disables the frame interval.
    pub interval_frames: u64,
    /// Keep instants whose millisecond time is a multiple of this value.
    pub interval_millis: Option<i64>,
    /// Restrict sampling to this part of the timeline.
    pub range: Option<TimeRange>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            target_frame_rate: None,
            interval_frames: 0,
            interval_millis: Some(DEFAULT_INTERVAL_MILLIS),
            range: None,
        }
    }
}

impl SamplingConfig {
    /// Defaults: native frame rate, one-second interval, no range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample at `frames_per_second` instead of the native rate.
    /// Zero restores the native rate.
    #[must_use]
    pub fn with_target_frame_rate(mut self, frames_per_second: f64) -> Self {
        self.target_frame_rate = (frames_per_second > 0.0).then_some(frames_per_second);
        self
    }

    /// Keep every `every`th instant. Zero disables the frame interval.
    #[must_use]
    pub fn with_interval_frames(mut self, every: u64) -> Self {
        self.interval_frames = every;
        self
    }

    /// Keep instants on `millis` boundaries. Zero or negative disables the
    /// millisecond interval.
    #[must_use]
    pub fn with_interval_millis(mut self, millis: i64) -> Self {
        self.interval_millis = (millis > 0).then_some(millis);
        self
    }

    /// Restrict sampling to `range`.
    #[must_use]
    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Sample the whole timeline.
    #[must_use]
    pub fn without_range(mut self) -> Self {
        self.range = None;
        self
    }

    /// The frame rate the planner will use for a video whose native rate is
    /// `native`.
    pub fn effective_frame_rate(&self, native: f64) -> f64 {
        match self.target_frame_rate {
            Some(rate) if rate > 0.0 => rate,
            _ => native,
        }
    }
}

/// Output size for rendered frames.
///
/// When no dimensions are set the source resolution is used. Setting one
/// dimension together with
/// [`maintain_aspect_ratio`](FrameSize::maintain_aspect_ratio) computes the
/// other automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSize {
    /// Target width. `None` keeps the source width.
    pub width: Option<u32>,
    /// Target height. `None` keeps the source height.
    pub height: Option<u32>,
    /// When `true` and only one dimension is specified, the other is
    /// computed to preserve the source aspect ratio.
    pub maintain_aspect_ratio: bool,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            maintain_aspect_ratio: true,
        }
    }
}

impl FrameSize {
    /// Resolve the final `(width, height)` given the source size.
    pub fn resolve_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if self.maintain_aspect_ratio && source_width > 0 => {
                let ratio = w as f64 / source_width as f64;
                let h = (source_height as f64 * ratio).round() as u32;
                (w, h.max(1))
            }
            (Some(w), None) => (w, source_height),
            (None, Some(h)) if self.maintain_aspect_ratio && source_height > 0 => {
                let ratio = h as f64 / source_height as f64;
                let w = (source_width as f64 * ratio).round() as u32;
                (w.max(1), h)
            }
            (None, Some(h)) => (source_width, h),
            (None, None) => (source_width, source_height),
        }
    }
}

/// Configuration for harvest operations.
///
/// All fields have sensible defaults: no progress callback, one report per
/// response, source resolution, and one worker per available CPU.
#[derive(Clone)]
pub struct HarvestOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
    pub(crate) frame_size: FrameSize,
    pub(crate) concurrency: usize,
}

impl Debug for HarvestOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HarvestOptions")
            .field("has_progress", &true)
            .field("batch_size", &self.batch_size)
            .field("frame_size", &self.frame_size)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl HarvestOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
            frame_size: FrameSize::default(),
            concurrency: thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(1),
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires (every N responses).
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set a custom output resolution for rendered frames.
    #[must_use]
    pub fn with_resolution(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.frame_size.width = width;
        self.frame_size.height = height;
        self
    }

    /// Control whether aspect ratio is preserved when only one output
    /// dimension is specified. Defaults to `true`.
    #[must_use]
    pub fn with_maintain_aspect_ratio(mut self, maintain: bool) -> Self {
        self.frame_size.maintain_aspect_ratio = maintain;
        self
    }

    /// Set the complete frame size configuration.
    #[must_use]
    pub fn with_frame_size(mut self, frame_size: FrameSize) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// Number of render requests in flight at once. Clamped to at least 1.
    #[must_use]
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers.max(1);
        self
    }

    /// The configured frame size.
    pub fn frame_size(&self) -> &FrameSize {
        &self.frame_size
    }

    /// The configured worker count.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Render size for a source of `source_width` × `source_height`.
    pub fn target_size(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        self.frame_size
            .resolve_dimensions(source_width, source_height)
    }
}
