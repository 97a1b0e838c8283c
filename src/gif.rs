//! Looping GIF assembly.
//!
//! [`assemble`] turns an arranged frame sequence and a total playback
//! duration into a [`LoopAssembly`]: the frames, one uniform per-frame delay,
//! and an infinite loop count. The assembly can then be written to any
//! [`Write`] sink, to memory, or to a file.
//!
//! # Example
//!
//! ```no_run
//! use image::DynamicImage;
//! use vidgif::{GifOptions, VidgifError, gif};
//!
//! let frames = vec![DynamicImage::new_rgba8(64, 48); 10];
//! let assembly = gif::assemble(frames, 2.0)?;
//! assert_eq!(assembly.frame_delay_seconds(), 0.2);
//!
//! assembly.save("output.gif", &GifOptions::new().width(32))?;
//! # Ok::<(), VidgifError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use ::gif::{Encoder, Frame, Repeat};
use image::DynamicImage;
use image::imageops::FilterType;

use crate::configuration::FrameSize;
use crate::error::VidgifError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};

/// Quantizer speed used unless overridden (1 = best quality, 30 = fastest).
pub const DEFAULT_SPEED: i32 = 10;

/// Largest width or height a GIF logical screen can describe.
const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Configuration for GIF serialization.
#[derive(Clone)]
pub struct GifOptions {
    /// Output width in pixels. Height is computed to preserve aspect ratio.
    /// `None` keeps the frame size.
    pub width: Option<u32>,
    /// Palette quantizer speed, 1–30.
    pub speed: i32,
    progress: Arc<dyn ProgressCallback>,
}

impl Debug for GifOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GifOptions")
            .field("width", &self.width)
            .field("speed", &self.speed)
            .finish()
    }
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            width: None,
            speed: DEFAULT_SPEED,
            progress: Arc::new(NoOpProgress),
        }
    }
}

impl GifOptions {
    /// Create a new [`GifOptions`] with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale frames to `width` pixels wide, preserving aspect ratio.
    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the quantizer speed. Clamped to 1–30.
    #[must_use]
    pub fn speed(mut self, speed: i32) -> Self {
        self.speed = speed.clamp(1, 30);
        self
    }

    /// Receive one progress update per encoded frame.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }
}

/// Frames plus the timing needed to serialize them as a looping GIF.
#[derive(Debug, Clone)]
#[must_use]
pub struct LoopAssembly {
    frames: Vec<DynamicImage>,
    frame_delay_seconds: f64,
    loop_count: u16,
}

/// Build a [`LoopAssembly`] that plays `frames` over
/// `total_duration_seconds`, looping forever.
///
/// # Errors
///
/// - [`VidgifError::EmptyInput`] if `frames` is empty.
/// - [`VidgifError::InvalidInput`] if the duration is not a positive,
///   finite number.
pub fn assemble(
    frames: Vec<DynamicImage>,
    total_duration_seconds: f64,
) -> Result<LoopAssembly, VidgifError> {
    if frames.is_empty() {
        return Err(VidgifError::EmptyInput);
    }
    if !total_duration_seconds.is_finite() || total_duration_seconds <= 0.0 {
        return Err(VidgifError::InvalidInput(format!(
            "total duration must be positive (got {total_duration_seconds})"
        )));
    }

    let frame_delay_seconds = total_duration_seconds / frames.len() as f64;
    log::debug!(
        "Assembled {} frames over {:.3}s ({:.4}s per frame)",
        frames.len(),
        total_duration_seconds,
        frame_delay_seconds,
    );

    Ok(LoopAssembly {
        frames,
        frame_delay_seconds,
        loop_count: 0,
    })
}

impl LoopAssembly {
    /// The frames, in playback order.
    pub fn frames(&self) -> &[DynamicImage] {
        &self.frames
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; an assembly holds at least one frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Display time of every frame, in seconds.
    pub fn frame_delay_seconds(&self) -> f64 {
        self.frame_delay_seconds
    }

    /// Number of loops. `0` loops forever.
    pub fn loop_count(&self) -> u16 {
        self.loop_count
    }

    /// Per-frame delay as written to the GIF, in hundredths of a second.
    pub fn delay_centiseconds(&self) -> u16 {
        (self.frame_delay_seconds * 100.0)
            .round()
            .clamp(1.0, u16::MAX as f64) as u16
    }

    /// Consume the assembly, returning its frames.
    pub fn into_frames(self) -> Vec<DynamicImage> {
        self.frames
    }

    /// Encode the animation into `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`VidgifError::EncodingFailed`] if the frames differ in size,
    /// a dimension is zero or exceeds 65535, or the writer fails.
    pub fn write_to<W: Write>(&self, writer: W, options: &GifOptions) -> Result<W, VidgifError> {
        let (width, height) = self.output_dimensions(options)?;
        let speed = options.speed.clamp(1, 30);
        let delay = self.delay_centiseconds();

        log::debug!(
            "Encoding {} frames to GIF at {}x{} (delay={}cs, speed={})",
            self.frames.len(),
            width,
            height,
            delay,
            speed,
        );

        let mut encoder = Encoder::new(writer, width as u16, height as u16, &[])
            .map_err(|e| VidgifError::EncodingFailed(format!("Failed to create GIF encoder: {e}")))?;

        let repeat = match self.loop_count {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| VidgifError::EncodingFailed(format!("Failed to set GIF repeat: {e}")))?;

        let mut tracker = ProgressTracker::new(
            options.progress.clone(),
            OperationType::GifEncoding,
            Some(self.frames.len() as u64),
            1,
        );

        for (index, image) in self.frames.iter().enumerate() {
            let mut pixels = prepare_pixels(image, width, height, index)?;
            let mut gif_frame = Frame::from_rgba_speed(width as u16, height as u16, &mut pixels, speed);
            gif_frame.delay = delay;

            encoder.write_frame(&gif_frame).map_err(|e| {
                VidgifError::EncodingFailed(format!("Failed to write GIF frame {index}: {e}"))
            })?;
            tracker.advance(None);
        }
        tracker.finish();

        encoder
            .into_inner()
            .map_err(|e| VidgifError::EncodingFailed(format!("Failed to finalize GIF: {e}")))
    }

    /// Encode the animation into memory and return the GIF bytes.
    ///
    /// # Errors
    ///
    /// Same as [`write_to`](Self::write_to).
    pub fn to_bytes(&self, options: &GifOptions) -> Result<Vec<u8>, VidgifError> {
        self.write_to(Vec::new(), options)
    }

    /// Encode the animation to `path`, replacing any existing file.
    ///
    /// A partially written file is removed if encoding fails.
    ///
    /// # Errors
    ///
    /// Same as [`write_to`](Self::write_to), plus [`VidgifError::IoError`]
    /// if the old file cannot be removed or the new one created.
    pub fn save<P: AsRef<Path>>(&self, path: P, options: &GifOptions) -> Result<(), VidgifError> {
        let path = path.as_ref();
        if path.exists() {
            log::debug!("Removing existing output {}", path.display());
            fs::remove_file(path)?;
        }

        let file = File::create(path)?;
        let result = self
            .write_to(BufWriter::new(file), options)
            .and_then(|mut writer| writer.flush().map_err(VidgifError::from));

        if result.is_err() {
            let _ = fs::remove_file(path);
        }
        result
    }

    fn output_dimensions(&self, options: &GifOptions) -> Result<(u32, u32), VidgifError> {
        let first = &self.frames[0];
        let (source_width, source_height) = (first.width(), first.height());

        for (index, image) in self.frames.iter().enumerate().skip(1) {
            if image.width() != source_width || image.height() != source_height {
                return Err(VidgifError::EncodingFailed(format!(
                    "frame {index} is {}x{}, expected {source_width}x{source_height}",
                    image.width(),
                    image.height(),
                )));
            }
        }

        let size = FrameSize {
            width: options.width,
            ..FrameSize::default()
        };
        let (width, height) = size.resolve_dimensions(source_width, source_height);
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(VidgifError::EncodingFailed(format!(
                "{width}x{height} cannot be stored in a GIF"
            )));
        }
        Ok((width, height))
    }
}

/// Tightly packed RGBA pixels at the output size.
fn prepare_pixels(
    image: &DynamicImage,
    width: u32,
    height: u32,
    index: usize,
) -> Result<Vec<u8>, VidgifError> {
    let rgba = if image.width() == width && image.height() == height {
        image.to_rgba8()
    } else {
        image.resize_exact(width, height, FilterType::Triangle).to_rgba8()
    };

    let pixels = rgba.into_raw();
    if pixels.len() != width as usize * height as usize * 4 {
        return Err(VidgifError::EncodingFailed(format!(
            "frame {index} has an unexpected pixel buffer length"
        )));
    }
    Ok(pixels)
}
