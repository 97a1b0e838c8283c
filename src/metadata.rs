//! Source video metadata.
//!
//! [`VideoInfo`] is the immutable snapshot an [`AssetLoader`](crate::AssetLoader)
//! produces when a source is opened. It is never edited field by field;
//! selecting a new source replaces it wholesale.

use crate::time::MediaTime;

/// Properties of a video asset that the sampling engine depends on.
///
/// # Example
///
/// ```
/// use vidgif::{MediaTime, VideoInfo};
///
/// let info = VideoInfo::new(MediaTime::new(6000, 600), 30.0, 1920, 1080);
/// assert_eq!(info.duration_seconds(), 10.0);
/// assert_eq!(info.estimated_frame_count(), 300);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoInfo {
    /// Total duration as an exact rational time.
    pub duration: MediaTime,
    /// Native frames per second. `0.0` when there is no decodable video track.
    pub frames_per_second: f64,
    /// Display width in pixels, after applying the orientation transform.
    pub width: u32,
    /// Display height in pixels, after applying the orientation transform.
    pub height: u32,
    /// Clockwise rotation (0, 90, 180, or 270) applied to the natural size.
    pub rotation_degrees: i32,
    /// Whether the asset has a video track at all.
    pub has_video_track: bool,
}

impl VideoInfo {
    /// Describe an upright video.
    pub fn new(duration: MediaTime, frames_per_second: f64, width: u32, height: u32) -> Self {
        Self {
            duration,
            frames_per_second,
            width,
            height,
            rotation_degrees: 0,
            has_video_track: frames_per_second > 0.0,
        }
    }

    /// Describe a video from its stored (natural) size and its display
    /// rotation, swapping width and height for quarter turns.
    pub fn from_natural_size(
        duration: MediaTime,
        frames_per_second: f64,
        natural_width: u32,
        natural_height: u32,
        rotation_degrees: i32,
    ) -> Self {
        let rotation = rotation_degrees.rem_euclid(360);
        let (width, height) = if rotation == 90 || rotation == 270 {
            (natural_height, natural_width)
        } else {
            (natural_width, natural_height)
        };
        Self {
            rotation_degrees: rotation,
            ..Self::new(duration, frames_per_second, width, height)
        }
    }

    /// Describe an asset without a decodable video track.
    pub fn without_video(duration: MediaTime) -> Self {
        Self {
            has_video_track: false,
            ..Self::new(duration, 0.0, 0, 0)
        }
    }

    /// Duration in floating-point seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_seconds()
    }

    /// Number of native frames across the whole duration.
    pub fn estimated_frame_count(&self) -> u64 {
        if self.frames_per_second <= 0.0 {
            return 0;
        }
        (self.duration_seconds() * self.frames_per_second).floor() as u64
    }

    /// `(width, height)` in display orientation.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
