//! Async harvesting.
//!
//! This module provides [`HarvestFuture`] for running a full harvest without
//! blocking the async runtime, and [`HarvestStream`] for receiving frames
//! one at a time as they are rendered.
//!
//! Both use `tokio::task::spawn_blocking` internally: rendering happens on a
//! blocking thread and results come back through a join handle or a bounded
//! channel. Both must be created from within a Tokio runtime.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tokio_stream::StreamExt;
//!
//! # use vidgif::{FrameRenderer, MediaTime, RenderError, RenderedFrame};
//! # struct Solid;
//! # impl FrameRenderer for Solid {
//! #     fn render(&self, t: MediaTime, (w, h): (u32, u32)) -> Result<RenderedFrame, RenderError> {
//! #         Ok(RenderedFrame::new(image::DynamicImage::new_rgba8(w, h), t))
//! #     }
//! # }
//! use vidgif::{FrameHarvester, HarvestOptions, SamplingConfig, VideoInfo, VidgifError, planner};
//!
//! # async fn example() -> Result<(), VidgifError> {
//! let info = VideoInfo::new(MediaTime::new(6000, 600), 30.0, 320, 240);
//! let plan = planner::plan(&info, &SamplingConfig::new())?;
//! let harvester = FrameHarvester::new(HarvestOptions::new());
//!
//! let mut stream = harvester.stream(plan, 10, Arc::new(Solid), (160, 120));
//! while let Some(frame) = stream.next().await {
//!     println!("frame at {}", frame.requested);
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::stream::FusedStream;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tokio_stream::Stream;

use crate::error::VidgifError;
use crate::harvest::{FrameHarvester, HarvestReport, HarvestedFrame};
use crate::planner::TimestampPlan;
use crate::renderer::FrameRenderer;

/// Default bounded-channel capacity for [`HarvestStream`].
///
/// Kept small to avoid buffering too many decoded frames in memory.
const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// A future that resolves to the [`HarvestReport`] of a background harvest.
///
/// Resolves exactly once. Dropping the future does not stop the harvest;
/// call [`FrameHarvester::supersede`] for that.
pub struct HarvestFuture {
    handle: JoinHandle<Result<HarvestReport, VidgifError>>,
}

impl Future for HarvestFuture {
    type Output = Result<HarvestReport, VidgifError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|result| {
            result.unwrap_or_else(|error| {
                Err(VidgifError::HarvestFailed(format!(
                    "harvest task did not complete: {error}"
                )))
            })
        })
    }
}

/// A stream of harvested frames produced by a background render thread.
///
/// Frames arrive in timestamp order; failed renders are skipped. The stream
/// ends after `max_frames` frames, at the end of the plan, or when the
/// harvest is superseded. Dropping the stream closes the channel, which
/// stops the render thread at the next frame boundary.
pub struct HarvestStream {
    receiver: Receiver<HarvestedFrame>,
    finished: bool,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

impl Stream for HarvestStream {
    type Item = HarvestedFrame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        let polled = self.receiver.poll_recv(cx);
        if let Poll::Ready(None) = polled {
            self.finished = true;
        }
        polled
    }
}

impl FusedStream for HarvestStream {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

impl FrameHarvester {
    /// Run [`harvest`](Self::harvest) on a blocking thread.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn harvest_async<R>(
        &self,
        plan: TimestampPlan,
        max_frames: usize,
        renderer: Arc<R>,
        target_size: (u32, u32),
    ) -> HarvestFuture
    where
        R: FrameRenderer + ?Sized + 'static,
    {
        let harvester = self.clone();
        let handle = tokio::task::spawn_blocking(move || {
            harvester.harvest(&plan, max_frames, renderer.as_ref(), target_size)
        });
        HarvestFuture { handle }
    }

    /// Render the plan sequentially on a blocking thread and stream the
    /// frames back.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn stream<R>(
        &self,
        plan: TimestampPlan,
        max_frames: usize,
        renderer: Arc<R>,
        target_size: (u32, u32),
    ) -> HarvestStream
    where
        R: FrameRenderer + ?Sized + 'static,
    {
        self.stream_with_capacity(plan, max_frames, renderer, target_size, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Like [`stream`](Self::stream) with an explicit channel capacity
    /// (clamped to at least 1).
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn stream_with_capacity<R>(
        &self,
        plan: TimestampPlan,
        max_frames: usize,
        renderer: Arc<R>,
        target_size: (u32, u32),
        capacity: usize,
    ) -> HarvestStream
    where
        R: FrameRenderer + ?Sized + 'static,
    {
        let (sender, receiver) = tokio::sync::mpsc::channel(capacity.max(1));
        let harvester = self.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let frames = harvester.iter(&plan, max_frames, renderer.as_ref(), target_size);
            for frame in frames {
                if sender.blocking_send(frame).is_err() {
                    log::debug!("Harvest stream receiver dropped, stopping");
                    break;
                }
            }
        });

        HarvestStream {
            receiver,
            finished: false,
            handle,
        }
    }
}
