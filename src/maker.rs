//! The end-to-end pipeline for one source.
//!
//! [`GifMaker`] ties a [`VideoInfo`], a [`FrameRenderer`], and a
//! [`DevicePolicy`] together: it plans timestamps, harvests frames, arranges
//! them in the current [`PlayMode`], and exports a looping GIF.
//!
//! # Example
//!
//! ```no_run
//! # use vidgif::{FrameRenderer, MediaTime, RenderError, RenderedFrame};
//! # struct Solid;
//! # impl FrameRenderer for Solid {
//! #     fn render(&self, t: MediaTime, (w, h): (u32, u32)) -> Result<RenderedFrame, RenderError> {
//! #         Ok(RenderedFrame::new(image::DynamicImage::new_rgba8(w, h), t))
//! #     }
//! # }
//! use vidgif::{GifMaker, GifOptions, PlayMode, SamplingConfig, VideoInfo};
//!
//! let info = VideoInfo::new(MediaTime::new(6000, 600), 30.0, 320, 240);
//! let mut maker = GifMaker::new(info, Solid)
//!     .with_sampling(SamplingConfig::new().with_target_frame_rate(10.0).with_interval_frames(2))
//!     .with_play_mode(PlayMode::PingPong);
//!
//! let harvested = maker.harvest()?;
//! println!("{harvested} frames ready");
//! maker.export("clip.gif", None, &GifOptions::new().width(160))?;
//! # Ok::<(), vidgif::VidgifError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;
use std::sync::Arc;

use crate::arrange::{PlayMode, arrange};
use crate::configuration::{HarvestOptions, SamplingConfig};
use crate::error::VidgifError;
use crate::gif::{GifOptions, LoopAssembly, assemble};
use crate::harvest::{FrameHarvester, HarvestedFrame};
use crate::metadata::VideoInfo;
use crate::planner::{self, TimestampPlan};
use crate::policy::{DevicePolicy, FixedPolicy};
use crate::renderer::{AssetLoader, FrameRenderer};

/// Plans, harvests, arranges, and exports frames from a single source.
pub struct GifMaker<R: FrameRenderer> {
    info: VideoInfo,
    renderer: R,
    policy: Arc<dyn DevicePolicy>,
    sampling: SamplingConfig,
    play_mode: PlayMode,
    harvester: FrameHarvester,
    frames: Vec<HarvestedFrame>,
}

impl<R: FrameRenderer> Debug for GifMaker<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GifMaker")
            .field("info", &self.info)
            .field("sampling", &self.sampling)
            .field("play_mode", &self.play_mode)
            .field("harvester", &self.harvester)
            .field("frames", &self.frames.len())
            .finish()
    }
}

impl<R: FrameRenderer> GifMaker<R> {
    /// Create a maker for an already described source.
    pub fn new(info: VideoInfo, renderer: R) -> Self {
        Self {
            info,
            renderer,
            policy: Arc::new(FixedPolicy::default()),
            sampling: SamplingConfig::default(),
            play_mode: PlayMode::default(),
            harvester: FrameHarvester::default(),
            frames: Vec::new(),
        }
    }

    /// Describe `source` with `loader`, then create a maker for it.
    ///
    /// # Errors
    ///
    /// Propagates the loader's error, typically
    /// [`VidgifError::AssetLoadFailed`].
    pub fn open<L>(loader: &L, source: &str, renderer: R) -> Result<Self, VidgifError>
    where
        L: AssetLoader + ?Sized,
    {
        let info = loader.load(source)?;
        log::info!(
            "Opened {source}: {} at {:.3} fps, {}x{}",
            info.duration,
            info.frames_per_second,
            info.width,
            info.height,
        );
        Ok(Self::new(info, renderer))
    }

    /// Use `policy` for frame and duration limits.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn DevicePolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the sampling configuration.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Replace the harvest options. The generation counter is kept.
    #[must_use]
    pub fn with_harvest_options(mut self, options: HarvestOptions) -> Self {
        self.harvester = FrameHarvester::new(options).with_generations(self.harvester.generations());
        self
    }

    /// Harvest with `harvester`, sharing its options and generation counter.
    #[must_use]
    pub fn with_harvester(mut self, harvester: FrameHarvester) -> Self {
        self.harvester = harvester;
        self
    }

    /// Set the initial play mode.
    #[must_use]
    pub fn with_play_mode(mut self, mode: PlayMode) -> Self {
        self.play_mode = mode;
        self
    }

    /// The current source description.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// The current sampling configuration.
    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    /// Change the sampling configuration for the next harvest.
    pub fn set_sampling(&mut self, sampling: SamplingConfig) {
        self.sampling = sampling;
    }

    /// The harvester; clone it to supersede a harvest from another thread.
    pub fn harvester(&self) -> &FrameHarvester {
        &self.harvester
    }

    /// Switch to a new source.
    ///
    /// Any harvest still running on this maker is superseded and the
    /// previously harvested frames are dropped.
    pub fn replace_source(&mut self, info: VideoInfo, renderer: R) {
        self.harvester.supersede();
        self.frames.clear();
        self.info = info;
        self.renderer = renderer;
    }

    /// The current play mode.
    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    /// Advance the play mode (Forward → Backward → PingPong → Forward) and
    /// return the new mode.
    pub fn toggle_play_mode(&mut self) -> PlayMode {
        self.play_mode = self.play_mode.next();
        self.play_mode
    }

    /// Plan timestamps under the current sampling config and policy.
    ///
    /// # Errors
    ///
    /// See [`planner::plan`].
    pub fn plan(&self) -> Result<TimestampPlan, VidgifError> {
        planner::plan_with_policy(&self.info, &self.sampling, self.policy.as_ref())
    }

    /// Plan and harvest, replacing any previous frames. Returns the number
    /// of frames harvested.
    ///
    /// # Errors
    ///
    /// - Planning errors, see [`planner::plan`].
    /// - [`VidgifError::NoFramesHarvested`] if the plan is empty or every
    ///   render failed.
    /// - [`VidgifError::Superseded`] if the harvest was replaced while
    ///   running.
    pub fn harvest(&mut self) -> Result<usize, VidgifError> {
        let plan = self.plan()?;
        let target_size = self
            .harvester
            .options()
            .target_size(self.info.width, self.info.height);

        self.frames.clear();
        let report = self.harvester.harvest(
            &plan,
            self.policy.max_frame_count(),
            &self.renderer,
            target_size,
        )?;

        if report.is_empty() {
            return Err(VidgifError::NoFramesHarvested {
                requested: report.requested,
            });
        }
        if !report.failures.is_empty() {
            log::debug!(
                "{} of {} timestamps failed to render",
                report.failures.len(),
                report.requested,
            );
        }

        self.frames = report.frames;
        Ok(self.frames.len())
    }

    /// Harvested frames in timestamp order.
    pub fn frames(&self) -> &[HarvestedFrame] {
        &self.frames
    }

    /// Harvested frames in the current play mode's order.
    pub fn arranged(&self) -> Vec<HarvestedFrame> {
        arrange(&self.frames, self.play_mode)
    }

    /// Playback length used when an export gives none: the sampled range
    /// after the policy's duration limit, or the whole video.
    pub fn default_total_duration(&self) -> f64 {
        match planner::effective_range(&self.info, &self.sampling, self.policy.as_ref()) {
            Some(range) if !range.is_empty() => range.duration_seconds(),
            _ => self.info.duration_seconds(),
        }
    }

    /// Arrange the harvested frames and assemble a loop playing over
    /// `total_duration_seconds` (or [`default_total_duration`](Self::default_total_duration)).
    ///
    /// # Errors
    ///
    /// See [`assemble`].
    pub fn assemble(&self, total_duration_seconds: Option<f64>) -> Result<LoopAssembly, VidgifError> {
        let duration = total_duration_seconds.unwrap_or_else(|| self.default_total_duration());
        let images = self
            .arranged()
            .into_iter()
            .map(|frame| frame.image)
            .collect();
        assemble(images, duration)
    }

    /// Assemble and write a looping GIF to `path`, replacing any existing
    /// file.
    ///
    /// # Errors
    ///
    /// See [`assemble`] and [`LoopAssembly::save`].
    pub fn export<P: AsRef<Path>>(
        &self,
        path: P,
        total_duration_seconds: Option<f64>,
        options: &GifOptions,
    ) -> Result<LoopAssembly, VidgifError> {
        let assembly = self.assemble(total_duration_seconds)?;
        assembly.save(path.as_ref(), options)?;
        log::info!(
            "Exported {} frames ({}) to {}",
            assembly.len(),
            self.play_mode,
            path.as_ref().display(),
        );
        Ok(assembly)
    }
}
