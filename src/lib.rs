//! # vidgif
//!
//! Sample evenly spaced frames from a video and turn them into a looping
//! animated GIF.
//!
//! `vidgif` plans which instants of a video to sample, renders them through a
//! pluggable [`FrameRenderer`], reorders the harvested frames
//! (forward, backward, or ping-pong), and writes the result as an infinitely
//! looping GIF with a uniform frame delay.
//!
//! ## Quick Start
//!
//! ### Plan timestamps
//!
//! ```
//! use vidgif::{MediaTime, SamplingConfig, VideoInfo, planner};
//!
//! // A 10 second clip at 30 fps, sampled every third instant at 10 fps.
//! let info = VideoInfo::new(MediaTime::new(6000, 600), 30.0, 1280, 720);
//! let config = SamplingConfig::new()
//!     .with_target_frame_rate(10.0)
//!     .with_interval_frames(3);
//!
//! let plan = planner::plan(&info, &config)?;
//! assert_eq!(plan.len(), 34);
//! # Ok::<(), vidgif::VidgifError>(())
//! ```
//!
//! ### Harvest and export
//!
//! ```no_run
//! # use vidgif::{FrameRenderer, MediaTime, RenderError, RenderedFrame};
//! # struct Solid;
//! # impl FrameRenderer for Solid {
//! #     fn render(&self, t: MediaTime, (w, h): (u32, u32)) -> Result<RenderedFrame, RenderError> {
//! #         Ok(RenderedFrame::new(image::DynamicImage::new_rgba8(w, h), t))
//! #     }
//! # }
//! use vidgif::{GifMaker, GifOptions, PlayMode, VideoInfo};
//!
//! let info = VideoInfo::new(MediaTime::new(6000, 600), 30.0, 1280, 720);
//! let mut maker = GifMaker::new(info, Solid).with_play_mode(PlayMode::PingPong);
//!
//! maker.harvest()?;
//! maker.export("loop.gif", Some(3.0), &GifOptions::new().width(320))?;
//! # Ok::<(), vidgif::VidgifError>(())
//! ```
//!
//! ## Features
//!
//! - **Exact timing**: rational [`MediaTime`] arithmetic, so long videos do
//!   not drift
//! - **Selection rules**: every Nth instant, millisecond intervals, or a
//!   time range
//! - **Device limits**: frame and duration ceilings injected through
//!   [`DevicePolicy`]
//! - **Concurrent harvesting**: renders on a worker pool, results delivered
//!   in timestamp order
//! - **Supersession**: a newer harvest abandons an older one through
//!   [`GenerationCounter`]
//! - **Arrangement**: [`PlayMode`] forward, backward, and ping-pong orders
//! - **Looping GIF output**: to a writer, to memory, or to a file
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | `HarvestFuture` and `HarvestStream` via Tokio |
//! | `ffmpeg` | `FfmpegLoader` and `FfmpegRenderer` backed by FFmpeg |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! The default build is pure Rust. The `ffmpeg` feature needs the FFmpeg
//! development libraries installed on your system.

pub mod arrange;
pub mod configuration;
pub mod error;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
pub mod gif;
pub mod harvest;
pub mod maker;
pub mod metadata;
pub mod planner;
pub mod policy;
pub mod progress;
pub mod renderer;
#[cfg(feature = "async")]
pub mod stream;
pub mod time;

pub use self::arrange::{PlayMode, arrange, arrangement_order};
pub use self::configuration::{FrameSize, HarvestOptions, SamplingConfig};
pub use self::error::VidgifError;
#[cfg(feature = "ffmpeg")]
pub use self::ffmpeg::{
    FfmpegLoader, FfmpegLogLevel, FfmpegRenderer, get_ffmpeg_log_level, set_ffmpeg_log_level,
};
pub use self::gif::{GifOptions, LoopAssembly, assemble};
pub use self::harvest::{FrameHarvester, HarvestIterator, HarvestReport, HarvestedFrame};
pub use self::maker::GifMaker;
pub use self::metadata::VideoInfo;
pub use self::planner::{TimestampPlan, effective_range, plan, plan_with_policy};
pub use self::policy::{DevicePolicy, FixedPolicy};
pub use self::progress::{
    GenerationCounter, HarvestGeneration, OperationType, ProgressCallback, ProgressInfo,
};
pub use self::renderer::{AssetLoader, FrameRenderer, RenderError, RenderedFrame};
#[cfg(feature = "async")]
pub use self::stream::{HarvestFuture, HarvestStream};
pub use self::time::{MediaTime, TimeRange};
