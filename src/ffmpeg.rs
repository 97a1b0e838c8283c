//! FFmpeg-backed collaborators.
//!
//! [`FfmpegLoader`] describes a file as a [`VideoInfo`], and
//! [`FfmpegRenderer`] decodes the frame shown at an exact timestamp. Both open
//! the source themselves, so a renderer can be shared by every harvest
//! worker: each call owns its own demuxer and decoder.
//!
//! FFmpeg's console output is separate from the Rust-side `log` messages and
//! can be tuned with [`set_ffmpeg_log_level`].
//!
//! # Example
//!
//! ```no_run
//! use vidgif::{FfmpegLoader, FfmpegLogLevel, FfmpegRenderer, GifMaker, GifOptions};
//!
//! vidgif::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//!
//! let mut maker = GifMaker::open(&FfmpegLoader, "input.mp4", FfmpegRenderer::new("input.mp4"))?;
//! maker.harvest()?;
//! maker.export("input.gif", None, &GifOptions::new().width(320))?;
//! # Ok::<(), vidgif::VidgifError>(())
//! ```

use std::str::FromStr;

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::log::Level,
};
use image::{DynamicImage, RgbaImage};

use crate::error::VidgifError;
use crate::metadata::VideoInfo;
use crate::renderer::{AssetLoader, FrameRenderer, RenderError, RenderedFrame};
use crate::time::MediaTime;

/// Timescale FFmpeg reports container durations and seek targets in.
const AV_TIME_BASE: i32 = ffmpeg_sys_next::AV_TIME_BASE as i32;

/// FFmpeg internal log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only conditions the process cannot survive.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings. FFmpeg's default.
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl From<Level> for FfmpegLogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Quiet => FfmpegLogLevel::Quiet,
            Level::Panic => FfmpegLogLevel::Panic,
            Level::Fatal => FfmpegLogLevel::Fatal,
            Level::Error => FfmpegLogLevel::Error,
            Level::Warning => FfmpegLogLevel::Warning,
            Level::Info => FfmpegLogLevel::Info,
            Level::Verbose => FfmpegLogLevel::Verbose,
            Level::Debug => FfmpegLogLevel::Debug,
            Level::Trace => FfmpegLogLevel::Trace,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = VidgifError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Ok(FfmpegLogLevel::Quiet),
            "panic" => Ok(FfmpegLogLevel::Panic),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            other => Err(VidgifError::InvalidInput(format!(
                "unknown FFmpeg log level: {other}"
            ))),
        }
    }
}

/// Set what FFmpeg itself prints to stderr.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}

/// The current FFmpeg log level, if it maps to a known variant.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level().ok().map(FfmpegLogLevel::from)
}

/// Describes media files with FFmpeg.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegLoader;

impl AssetLoader for FfmpegLoader {
    fn load(&self, source: &str) -> Result<VideoInfo, VidgifError> {
        log::debug!("Probing {source}");
        let input = open_input(source).map_err(|error| VidgifError::AssetLoadFailed {
            location: source.to_string(),
            reason: error.to_string(),
        })?;
        describe(&input).map_err(|error| VidgifError::AssetLoadFailed {
            location: source.to_string(),
            reason: error.to_string(),
        })
    }
}

fn open_input(source: &str) -> Result<Input, VidgifError> {
    ffmpeg_next::init()
        .map_err(|error| VidgifError::FfmpegError(format!("initialisation failed: {error}")))?;
    Ok(ffmpeg_next::format::input(source)?)
}

fn describe(input: &Input) -> Result<VideoInfo, VidgifError> {
    let container_duration = MediaTime::new(input.duration().max(0), AV_TIME_BASE);

    let Some(stream) = input.streams().best(Type::Video) else {
        log::debug!("No video stream, duration {container_duration}");
        return Ok(VideoInfo::without_video(container_duration));
    };

    let time_base = stream.time_base();
    let duration = if stream.duration() > 0 && time_base.denominator() > 0 {
        MediaTime::new(
            stream.duration() * time_base.numerator() as i64,
            time_base.denominator(),
        )
    } else {
        container_duration
    };

    let decoder = CodecContext::from_parameters(stream.parameters())?
        .decoder()
        .video()?;

    let frames_per_second = rational_to_f64(stream.avg_frame_rate())
        .or_else(|| rational_to_f64(stream.rate()))
        .unwrap_or(0.0);

    let rotation = stream
        .metadata()
        .get("rotate")
        .and_then(|value| value.trim().parse::<i32>().ok())
        .unwrap_or(0);

    let info = VideoInfo::from_natural_size(
        duration,
        frames_per_second,
        decoder.width(),
        decoder.height(),
        rotation,
    );
    log::debug!(
        "Video stream {}: {}x{} natural, rotation {}, {:.3} fps, {}",
        stream.index(),
        decoder.width(),
        decoder.height(),
        info.rotation_degrees,
        frames_per_second,
        duration,
    );
    Ok(info)
}

fn rational_to_f64(rate: Rational) -> Option<f64> {
    (rate.numerator() > 0 && rate.denominator() > 0)
        .then(|| rate.numerator() as f64 / rate.denominator() as f64)
}

/// Decodes frames from a media file at exact timestamps.
///
/// Every call seeks to the keyframe before the target and decodes forward,
/// returning the last frame whose presentation time is at or before the
/// request. Frames are returned upright: the stream's rotation tag is
/// applied after scaling.
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    source: String,
}

impl FfmpegRenderer {
    /// Create a renderer for `source` (a path or URL).
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The path or URL this renderer decodes.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn decode_at(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, VidgifError> {
        let mut input = open_input(&self.source)?;
        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| VidgifError::InvalidInput("source has no video stream".to_string()))?;
        let stream_index = stream.index();
        let time_base = stream.time_base();
        let rotation = stream
            .metadata()
            .get("rotate")
            .and_then(|value| value.trim().parse::<i32>().ok())
            .unwrap_or(0)
            .rem_euclid(360);
        let mut decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        if time_base.numerator() <= 0 || time_base.denominator() <= 0 || timestamp.timescale <= 0 {
            return Err(VidgifError::InvalidInput(format!(
                "cannot map {timestamp} onto time base {time_base:?}"
            )));
        }
        let target_pts = (timestamp.value as i128 * time_base.denominator() as i128
            / (timestamp.timescale as i128 * time_base.numerator() as i128)) as i64;

        let seek_target = timestamp.convert_scale(AV_TIME_BASE).value;
        input.seek(seek_target, ..seek_target)?;

        let mut best: Option<(i64, VideoFrame)> = None;
        let mut decoded = VideoFrame::empty();

        'packets: for (stream, packet) in input.packets() {
            if stream.index() != stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(0);
                if pts <= target_pts || best.is_none() {
                    best = Some((pts, decoded.clone()));
                }
                if pts >= target_pts {
                    break 'packets;
                }
            }
        }

        if best.as_ref().is_none_or(|(pts, _)| *pts < target_pts) {
            decoder.send_eof()?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(0);
                if pts <= target_pts || best.is_none() {
                    best = Some((pts, decoded.clone()));
                }
            }
        }

        let Some((pts, frame)) = best else {
            return Err(VidgifError::FfmpegError(format!(
                "no frame decoded at {timestamp}"
            )));
        };

        let (out_width, out_height) = target_size;
        let (scaled_width, scaled_height) = if rotation == 90 || rotation == 270 {
            (out_height, out_width)
        } else {
            (out_width, out_height)
        };

        let mut scaler = ScalingContext::get(
            frame.format(),
            frame.width(),
            frame.height(),
            Pixel::RGBA,
            scaled_width,
            scaled_height,
            ScalingFlags::BILINEAR,
        )?;
        let mut rgba_frame = VideoFrame::empty();
        scaler.run(&frame, &mut rgba_frame)?;

        let buffer = frame_to_buffer(&rgba_frame, scaled_width, scaled_height);
        let image = RgbaImage::from_raw(scaled_width, scaled_height, buffer).ok_or_else(|| {
            VidgifError::FfmpegError("decoded frame has an unexpected size".to_string())
        })?;
        let image = match rotation {
            90 => DynamicImage::ImageRgba8(image).rotate90(),
            180 => DynamicImage::ImageRgba8(image).rotate180(),
            270 => DynamicImage::ImageRgba8(image).rotate270(),
            _ => DynamicImage::ImageRgba8(image),
        };

        let actual = MediaTime::new(pts * time_base.numerator() as i64, time_base.denominator())
            .convert_scale(timestamp.timescale);
        Ok(RenderedFrame::new(image, actual))
    }
}

impl FrameRenderer for FfmpegRenderer {
    fn render(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        self.decode_at(timestamp, target_size)
            .map_err(|error| RenderError::new(timestamp, error.to_string()))
    }
}

/// Copy plane 0 of a packed frame into a tightly packed buffer, dropping the
/// per-row padding FFmpeg may add.
fn frame_to_buffer(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let row_bytes = width as usize * 4;
    let data = frame.data(0);

    if stride == row_bytes {
        return data[..row_bytes * height as usize].to_vec();
    }
    let mut buffer = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        buffer.extend_from_slice(&data[start..start + row_bytes]);
    }
    buffer
}
