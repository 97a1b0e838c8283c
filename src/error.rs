//! Error types for the `vidgif` crate.
//!
//! This module defines [`VidgifError`], the unified error type returned by all
//! fallible operations in the crate. Per-frame render failures are reported
//! separately as [`RenderError`](crate::RenderError) values; the harvester
//! absorbs them and only surfaces a batch that produced nothing.

use std::io::Error as IoError;

use image::ImageError;
use thiserror::Error;

use crate::renderer::RenderError;

/// The unified error type for all `vidgif` operations.
///
/// Whole-batch and whole-export failures are always returned as explicit
/// errors. Nothing in the crate retries automatically.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VidgifError {
    /// A zero duration, a zero frame rate, or another parameter the engine
    /// cannot work with.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The asset metadata collaborator failed to describe the source.
    #[error("Failed to load asset {location}: {reason}")]
    AssetLoadFailed {
        /// Path or URL that was passed to the loader.
        location: String,
        /// Underlying reason the load failed.
        reason: String,
    },

    /// A single frame could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Every planned timestamp failed to render or was discarded.
    #[error("No frames could be harvested ({requested} timestamps requested)")]
    NoFramesHarvested {
        /// Number of timestamps in the plan.
        requested: usize,
    },

    /// The harvest worker pool could not be started.
    #[error("Harvest failed: {0}")]
    HarvestFailed(String),

    /// The harvest was replaced by a newer one before it completed.
    #[error("Harvest generation {generation} was superseded")]
    Superseded {
        /// Generation id of the abandoned harvest.
        generation: u64,
    },

    /// A loop assembly was requested for zero frames.
    #[error("Cannot assemble an animation from zero frames")]
    EmptyInput,

    /// The GIF writer could not produce or finalize the output.
    #[error("GIF encoding failed: {0}")]
    EncodingFailed(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// An error originating from the FFmpeg libraries.
    #[cfg(feature = "ffmpeg")]
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),
}

#[cfg(feature = "ffmpeg")]
impl From<ffmpeg_next::Error> for VidgifError {
    fn from(error: ffmpeg_next::Error) -> Self {
        VidgifError::FfmpegError(error.to_string())
    }
}
