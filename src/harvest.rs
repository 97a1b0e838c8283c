//! Frame harvesting.
//!
//! [`FrameHarvester`] renders every timestamp of a [`TimestampPlan`] through a
//! [`FrameRenderer`] and collects the successes in timestamp order.
//!
//! Render requests run on a small rayon thread pool. Workers pull the next
//! plan index from a shared cursor and send exactly one response per index
//! (rendered, failed, or skipped) over a channel; the calling thread is the
//! only consumer. It restores timestamp order with a reorder buffer, accepts
//! successes until the frame ceiling is reached, and returns only after all
//! responses have arrived.
//!
//! Each harvest runs under a [`HarvestGeneration`]. Advancing the shared
//! [`GenerationCounter`] abandons it: in-flight renders drain, their results
//! are thrown away, and the harvest reports [`VidgifError::Superseded`].
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
//! use vidgif::{FrameHarvester, HarvestOptions, SamplingConfig, VideoInfo, planner};
//!
//! let info = VideoInfo::new(MediaTime::new(6000, 600), 30.0, 320, 240);
//! let plan = planner::plan(&info, &SamplingConfig::new().with_interval_frames(3))?;
//!
//! let harvester = FrameHarvester::new(HarvestOptions::new());
//! let report = harvester.harvest(&plan, 50, &Solid, (160, 120))?;
//! println!("{} frames, {} failures", report.len(), report.failures.len());
//! # Ok::<(), vidgif::VidgifError>(())
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;

use image::DynamicImage;
use rayon::ThreadPoolBuilder;

use crate::configuration::HarvestOptions;
use crate::error::VidgifError;
use crate::planner::TimestampPlan;
use crate::progress::{GenerationCounter, HarvestGeneration, OperationType, ProgressTracker};
use crate::renderer::{FrameRenderer, RenderError, RenderedFrame};
use crate::time::MediaTime;

/// A successfully rendered frame.
#[derive(Debug, Clone)]
pub struct HarvestedFrame {
    /// The planned timestamp.
    pub requested: MediaTime,
    /// The presentation time of the frame the renderer decoded.
    pub actual: MediaTime,
    /// Decoded pixels.
    pub image: DynamicImage,
}

impl HarvestedFrame {
    fn new(requested: MediaTime, rendered: RenderedFrame) -> Self {
        Self {
            requested,
            actual: rendered.actual_time,
            image: rendered.image,
        }
    }
}

/// The outcome of one harvest.
#[derive(Debug)]
#[must_use]
pub struct HarvestReport {
    /// Rendered frames in ascending requested-timestamp order.
    pub frames: Vec<HarvestedFrame>,
    /// Timestamps that failed to render, in timestamp order.
    pub failures: Vec<RenderError>,
    /// Timestamps skipped or thrown away after the frame ceiling was reached.
    pub discarded: usize,
    /// Number of timestamps in the plan.
    pub requested: usize,
    /// The generation this harvest ran under.
    pub generation: u64,
}

impl HarvestReport {
    fn empty(generation: u64) -> Self {
        Self {
            frames: Vec::new(),
            failures: Vec::new(),
            discarded: 0,
            requested: 0,
            generation,
        }
    }

    /// Number of harvested frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when no frame was harvested.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The harvested images, in timestamp order.
    pub fn into_images(self) -> Vec<DynamicImage> {
        self.frames.into_iter().map(|frame| frame.image).collect()
    }
}

/// Renders planned timestamps and collects the results in order.
///
/// Clones share the same [`GenerationCounter`], so any clone can supersede a
/// harvest running on another.
#[derive(Debug, Clone, Default)]
pub struct FrameHarvester {
    options: HarvestOptions,
    generations: GenerationCounter,
}

impl FrameHarvester {
    /// Create a harvester with its own generation counter.
    pub fn new(options: HarvestOptions) -> Self {
        Self {
            options,
            generations: GenerationCounter::new(),
        }
    }

    /// Share `generations` with other harvesters or callers.
    #[must_use]
    pub fn with_generations(mut self, generations: GenerationCounter) -> Self {
        self.generations = generations;
        self
    }

    /// The options this harvester renders with.
    pub fn options(&self) -> &HarvestOptions {
        &self.options
    }

    /// A handle to the generation counter.
    pub fn generations(&self) -> GenerationCounter {
        self.generations.clone()
    }

    /// Abandon every harvest currently running on this counter.
    pub fn supersede(&self) {
        self.generations.advance();
    }

    /// Render every planned timestamp and keep at most `max_frames`
    /// successes, earliest first.
    ///
    /// Failed renders are dropped and recorded in
    /// [`HarvestReport::failures`]. Once `max_frames` frames are accepted,
    /// no new render is started; remaining timestamps and late results count
    /// as [`discarded`](HarvestReport::discarded). The call returns after
    /// every timestamp has been accounted for.
    ///
    /// Starting a harvest supersedes any earlier harvest on the same
    /// generation counter.
    ///
    /// # Errors
    ///
    /// - [`VidgifError::Superseded`] if a newer generation began before the
    ///   harvest finished.
    /// - [`VidgifError::HarvestFailed`] if the worker pool cannot start.
    pub fn harvest<R>(
        &self,
        plan: &TimestampPlan,
        max_frames: usize,
        renderer: &R,
        target_size: (u32, u32),
    ) -> Result<HarvestReport, VidgifError>
    where
        R: FrameRenderer + ?Sized,
    {
        let generation = self.generations.begin();
        let timestamps = plan.timestamps();
        let requested = timestamps.len();

        log::debug!(
            "Harvesting {} timestamps at {}x{} (max_frames={}, generation={})",
            requested,
            target_size.0,
            target_size.1,
            max_frames,
            generation.id(),
        );

        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::FrameHarvest,
            Some(requested as u64),
            self.options.batch_size,
        );

        if requested == 0 {
            tracker.finish();
            return Ok(HarvestReport::empty(generation.id()));
        }

        let workers = self.options.concurrency.clamp(1, requested);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("vidgif-harvest-{index}"))
            .build()
            .map_err(|error| {
                VidgifError::HarvestFailed(format!("could not start {workers} workers: {error}"))
            })?;

        let cursor = AtomicUsize::new(0);
        let stop = AtomicBool::new(max_frames == 0);
        let (sender, receiver) = mpsc::channel::<Response>();
        let mut collector = Collector::new(timestamps, max_frames);

        pool.in_place_scope(|scope| {
            for _ in 0..workers {
                let sender = sender.clone();
                let cursor = &cursor;
                let stop = &stop;
                let generation = &generation;
                scope.spawn(move |_| {
                    loop {
                        let index = cursor.fetch_add(1, Ordering::Relaxed);
                        if index >= requested {
                            break;
                        }
                        let outcome = if stop.load(Ordering::Acquire) || !generation.is_current() {
                            Outcome::Skipped
                        } else {
                            match renderer.render(timestamps[index], target_size) {
                                Ok(frame) => Outcome::Rendered(frame),
                                Err(error) => Outcome::Failed(error),
                            }
                        };
                        if sender.send(Response { index, outcome }).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(sender);

            for _ in 0..requested {
                let Ok(response) = receiver.recv() else {
                    break;
                };
                tracker.advance(Some(timestamps[response.index].as_duration()));

                if !generation.is_current() {
                    stop.store(true, Ordering::Release);
                    collector.abandon();
                    continue;
                }
                if collector.accept(response) {
                    stop.store(true, Ordering::Release);
                }
            }
        });

        tracker.finish();

        if collector.abandoned {
            log::debug!("Harvest generation {} was superseded", generation.id());
            return Err(VidgifError::Superseded {
                generation: generation.id(),
            });
        }

        let report = collector.finish(generation.id());
        log::debug!(
            "Harvested {} frames ({} failed, {} discarded) from {} timestamps",
            report.frames.len(),
            report.failures.len(),
            report.discarded,
            report.requested,
        );
        Ok(report)
    }

    /// Lazily render the plan one timestamp at a time.
    ///
    /// The iterator yields successes in timestamp order, skips failures, and
    /// ends after `max_frames` frames, when the plan is exhausted, or when
    /// its generation is superseded.
    pub fn iter<'a, R>(
        &self,
        plan: &'a TimestampPlan,
        max_frames: usize,
        renderer: &'a R,
        target_size: (u32, u32),
    ) -> HarvestIterator<'a, R>
    where
        R: FrameRenderer + ?Sized,
    {
        HarvestIterator {
            renderer,
            timestamps: plan.iter(),
            target_size,
            remaining: max_frames,
            failures: Vec::new(),
            generation: self.generations.begin(),
        }
    }
}

struct Response {
    index: usize,
    outcome: Outcome,
}

enum Outcome {
    Rendered(RenderedFrame),
    Failed(RenderError),
    Skipped,
}

/// Consumer-side state. Only the collecting thread touches it.
struct Collector<'a> {
    timestamps: &'a [MediaTime],
    max_frames: usize,
    next_index: usize,
    pending: BTreeMap<usize, Outcome>,
    frames: Vec<HarvestedFrame>,
    failures: Vec<RenderError>,
    discarded: usize,
    abandoned: bool,
}

impl<'a> Collector<'a> {
    fn new(timestamps: &'a [MediaTime], max_frames: usize) -> Self {
        Self {
            timestamps,
            max_frames,
            next_index: 0,
            pending: BTreeMap::new(),
            frames: Vec::with_capacity(max_frames.min(timestamps.len())),
            failures: Vec::new(),
            discarded: 0,
            abandoned: false,
        }
    }

    fn is_full(&self) -> bool {
        self.frames.len() >= self.max_frames
    }

    /// Settle every response that is now in order. Returns `true` once the
    /// frame ceiling has been reached.
    fn accept(&mut self, response: Response) -> bool {
        self.pending.insert(response.index, response.outcome);

        while let Some(outcome) = self.pending.remove(&self.next_index) {
            let requested = self.timestamps[self.next_index];
            self.next_index += 1;

            if self.is_full() {
                self.discarded += 1;
                continue;
            }
            match outcome {
                Outcome::Rendered(frame) => {
                    self.frames.push(HarvestedFrame::new(requested, frame));
                }
                Outcome::Failed(error) => {
                    log::debug!("Dropping frame: {error}");
                    self.failures.push(error);
                }
                Outcome::Skipped => self.discarded += 1,
            }
        }

        self.is_full()
    }

    /// Drop everything collected so far; the buffer belongs to a stale
    /// generation.
    fn abandon(&mut self) {
        self.abandoned = true;
        self.pending.clear();
        self.frames.clear();
        self.failures.clear();
    }

    fn finish(self, generation: u64) -> HarvestReport {
        HarvestReport {
            frames: self.frames,
            failures: self.failures,
            discarded: self.discarded,
            requested: self.timestamps.len(),
            generation,
        }
    }
}

/// A lazy, sequential harvest created by [`FrameHarvester::iter`].
pub struct HarvestIterator<'a, R: FrameRenderer + ?Sized> {
    renderer: &'a R,
    timestamps: std::slice::Iter<'a, MediaTime>,
    target_size: (u32, u32),
    remaining: usize,
    failures: Vec<RenderError>,
    generation: HarvestGeneration,
}

impl<R: FrameRenderer + ?Sized> HarvestIterator<'_, R> {
    /// Render failures encountered so far.
    pub fn failures(&self) -> &[RenderError] {
        &self.failures
    }

    /// The generation this iterator renders under.
    pub fn generation(&self) -> &HarvestGeneration {
        &self.generation
    }
}

impl<R: FrameRenderer + ?Sized> Iterator for HarvestIterator<'_, R> {
    type Item = HarvestedFrame;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 && self.generation.is_current() {
            let requested = *self.timestamps.next()?;
            match self.renderer.render(requested, self.target_size) {
                Ok(frame) => {
                    self.remaining -= 1;
                    return Some(HarvestedFrame::new(requested, frame));
                }
                Err(error) => {
                    log::debug!("Dropping frame: {error}");
                    self.failures.push(error);
                }
            }
        }
        None
    }
}
