//! Progress reporting and harvest supersession.
//!
//! This module provides [`ProgressCallback`] for monitoring harvests and GIF
//! encoding, [`ProgressInfo`] for progress snapshots, and
//! [`GenerationCounter`] for abandoning a harvest when a newer one replaces
//! it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use vidgif::{HarvestOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! let options = HarvestOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Rendering planned timestamps.
    FrameHarvest,
    /// Writing frames into a GIF.
    GifEncoding,
}

/// A snapshot of operation progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many items (timestamps / frames) have been processed so far.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// The media timestamp of the item that was just processed.
    pub current_timestamp: Option<Duration>,
}

/// Trait for receiving progress updates.
///
/// Implementations must be [`Send`] and [`Sync`]; harvest progress is
/// reported from the collecting thread while workers render elsewhere.
/// Callbacks observe but cannot halt an operation. Use
/// [`GenerationCounter::advance`] to abandon a harvest.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals during an operation.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Hands out harvest generations and tracks which one is current.
///
/// Clones share state. Starting a harvest with [`begin`](Self::begin)
/// supersedes every harvest started before it; [`advance`](Self::advance)
/// supersedes all outstanding harvests without starting a new one.
///
/// # Example
///
/// ```
/// use vidgif::GenerationCounter;
///
/// let counter = GenerationCounter::new();
/// let first = counter.begin();
/// assert!(first.is_current());
///
/// let second = counter.begin();
/// assert!(!first.is_current());
/// assert!(second.is_current());
///
/// counter.advance();
/// assert!(!second.is_current());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Arc<AtomicU64>,
}

impl GenerationCounter {
    /// Create a counter. No generation is current until [`begin`](Self::begin).
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding all earlier ones.
    pub fn begin(&self) -> HarvestGeneration {
        let id = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        HarvestGeneration {
            id,
            current: Arc::clone(&self.current),
        }
    }

    /// Supersede every outstanding generation.
    pub fn advance(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }

    /// Id of the most recent generation.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}

/// The generation a single harvest runs under.
#[derive(Debug, Clone)]
pub struct HarvestGeneration {
    id: u64,
    current: Arc<AtomicU64>,
}

impl HarvestGeneration {
    /// Generation id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// `false` once a newer generation has begun or the counter advanced.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.id
    }
}

/// Internal helper that tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one completed item and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, timestamp: Option<Duration>) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(timestamp);
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report(None);
    }

    fn report(&self, timestamp: Option<Duration>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|total| {
                let remaining = total.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_timestamp: timestamp,
        };

        self.callback.on_progress(&info);
    }
}
