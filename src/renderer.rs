//! Collaborator interfaces for decoding.
//!
//! The engine never decodes video itself. It asks a [`FrameRenderer`] for the
//! image at each planned timestamp and an [`AssetLoader`] for the
//! [`VideoInfo`] of a source. The `ffmpeg` feature provides implementations
//! of both in [`crate::ffmpeg`].

use std::sync::Arc;

use image::DynamicImage;
use thiserror::Error;

use crate::error::VidgifError;
use crate::metadata::VideoInfo;
use crate::time::MediaTime;

/// The image decoded for a requested timestamp.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    /// Decoded pixels at the requested target size.
    pub image: DynamicImage,
    /// Presentation time of the frame that was actually decoded.
    pub actual_time: MediaTime,
}

impl RenderedFrame {
    /// Pair an image with the time it was decoded at.
    pub fn new(image: DynamicImage, actual_time: MediaTime) -> Self {
        Self { image, actual_time }
    }
}

/// A single timestamp could not be rendered.
#[derive(Debug, Clone, Error)]
#[error("Failed to render frame at {timestamp}: {reason}")]
pub struct RenderError {
    /// The timestamp that was requested.
    pub timestamp: MediaTime,
    /// What went wrong.
    pub reason: String,
}

impl RenderError {
    /// Create a render error for `timestamp`.
    pub fn new(timestamp: MediaTime, reason: impl Into<String>) -> Self {
        Self {
            timestamp,
            reason: reason.into(),
        }
    }
}

/// Renders the frame at a timestamp.
///
/// Implementations must be [`Send`] and [`Sync`]: a single harvest calls
/// `render` from several worker threads at once. Renderers are expected to
/// return the frame at (or vanishingly close to) the requested time rather
/// than snapping to the nearest keyframe.
pub trait FrameRenderer: Send + Sync {
    /// Decode the frame displayed at `timestamp`, scaled to `target_size`
    /// (`(width, height)` in pixels).
    fn render(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError>;
}

impl<R: FrameRenderer + ?Sized> FrameRenderer for &R {
    fn render(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        (**self).render(timestamp, target_size)
    }
}

impl<R: FrameRenderer + ?Sized> FrameRenderer for Arc<R> {
    fn render(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        (**self).render(timestamp, target_size)
    }
}

impl<R: FrameRenderer + ?Sized> FrameRenderer for Box<R> {
    fn render(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        (**self).render(timestamp, target_size)
    }
}

/// Produces the metadata snapshot for a source.
pub trait AssetLoader {
    /// Load the [`VideoInfo`] for `source` (a path or URL).
    ///
    /// # Errors
    ///
    /// Returns [`VidgifError::AssetLoadFailed`] when the source cannot be
    /// opened or described.
    fn load(&self, source: &str) -> Result<VideoInfo, VidgifError>;
}
