//! Synthetic renderers and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use image::{DynamicImage, Rgba, RgbaImage};
use vidgif::{
    FrameRenderer, GenerationCounter, MediaTime, RenderError, RenderedFrame, VideoInfo,
};

/// Ten seconds at 30 fps, 64x48, in a 600 timescale.
pub fn ten_second_clip() -> VideoInfo {
    VideoInfo::new(MediaTime::new(6000, 600), 30.0, 64, 48)
}

/// A frame whose red channel encodes the low byte of the timestamp value.
pub fn solid_frame(timestamp: MediaTime, (width, height): (u32, u32)) -> DynamicImage {
    let shade = (timestamp.value % 256) as u8;
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([shade, 0, 255 - shade, 255]),
    ))
}

/// A solid image of the given color.
pub fn colored(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// Renders every timestamp instantly and counts the calls.
#[derive(Default)]
pub struct SolidRenderer {
    pub calls: AtomicUsize,
}

impl FrameRenderer for SolidRenderer {
    fn render(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RenderedFrame::new(solid_frame(timestamp, target_size), timestamp))
    }
}

/// Fails for every timestamp listed in `failures`.
pub struct FailingRenderer {
    pub failures: Vec<MediaTime>,
}

impl FailingRenderer {
    pub fn at(failures: Vec<MediaTime>) -> Self {
        Self { failures }
    }
}

impl FrameRenderer for FailingRenderer {
    fn render(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        if self.failures.contains(&timestamp) {
            return Err(RenderError::new(timestamp, "synthetic decode failure"));
        }
        Ok(RenderedFrame::new(solid_frame(timestamp, target_size), timestamp))
    }
}

/// Fails every request.
pub struct BrokenRenderer;

impl FrameRenderer for BrokenRenderer {
    fn render(
        &self,
        timestamp: MediaTime,
        _target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        Err(RenderError::new(timestamp, "no decoder"))
    }
}

/// Sleeps longer for earlier timestamps so responses arrive out of order.
pub struct ShuffledRenderer;

impl FrameRenderer for ShuffledRenderer {
    fn render(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        let delay = 12 - (timestamp.value / 600).clamp(0, 10) as u64;
        thread::sleep(Duration::from_millis(delay));
        Ok(RenderedFrame::new(solid_frame(timestamp, target_size), timestamp))
    }
}

/// Supersedes the running harvest from inside its first render.
pub struct SupersedingRenderer {
    pub generations: GenerationCounter,
    fired: AtomicBool,
}

impl SupersedingRenderer {
    pub fn new(generations: GenerationCounter) -> Self {
        Self {
            generations,
            fired: AtomicBool::new(false),
        }
    }
}

impl FrameRenderer for SupersedingRenderer {
    fn render(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.generations.advance();
        }
        Ok(RenderedFrame::new(solid_frame(timestamp, target_size), timestamp))
    }
}

/// Records the size of every request.
#[derive(Default)]
pub struct SizeRecorder {
    pub sizes: Mutex<Vec<(u32, u32)>>,
}

impl FrameRenderer for SizeRecorder {
    fn render(
        &self,
        timestamp: MediaTime,
        target_size: (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        self.sizes.lock().unwrap().push(target_size);
        Ok(RenderedFrame::new(solid_frame(timestamp, target_size), timestamp))
    }
}
