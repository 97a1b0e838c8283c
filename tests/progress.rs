//! Progress reporting and supersession integration tests.

mod common;

use std::sync::{Arc, Mutex};

use vidgif::{
    FrameHarvester, GenerationCounter, HarvestOptions, OperationType, ProgressCallback,
    ProgressInfo, SamplingConfig, plan,
};

use common::{SolidRenderer, ten_second_clip};

#[derive(Default)]
struct Recorder {
    infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for Recorder {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

// ── GenerationCounter ──────────────────────────────────────────────

#[test]
fn counter_starts_with_no_generation() {
    assert_eq!(GenerationCounter::new().current(), 0);
    assert_eq!(GenerationCounter::default().current(), 0);
}

#[test]
fn begin_hands_out_increasing_ids() {
    let counter = GenerationCounter::new();
    let first = counter.begin();
    let second = counter.begin();
    assert_eq!(first.id(), 1);
    assert_eq!(second.id(), 2);
    assert_eq!(counter.current(), 2);
}

#[test]
fn newer_generation_supersedes_older() {
    let counter = GenerationCounter::new();
    let first = counter.begin();
    assert!(first.is_current());

    let second = counter.begin();
    assert!(!first.is_current());
    assert!(second.is_current());
}

#[test]
fn advance_supersedes_everything() {
    let counter = GenerationCounter::new();
    let generation = counter.begin();
    counter.advance();
    assert!(!generation.is_current());
    assert_eq!(counter.current(), 2);
}

#[test]
fn clones_share_state() {
    let counter = GenerationCounter::new();
    let clone = counter.clone();
    let generation = counter.begin();

    clone.advance();
    assert!(!generation.is_current());
    assert_eq!(clone.current(), counter.current());
}

#[test]
fn generations_can_be_checked_from_other_threads() {
    let counter = GenerationCounter::new();
    let generation = counter.begin();

    let handle = std::thread::spawn(move || generation.is_current());
    assert!(handle.join().unwrap());
}

// ── Harvest progress ───────────────────────────────────────────────

#[test]
fn harvest_reports_every_response_and_finishes() {
    let recorder = Arc::new(Recorder::default());
    let harvester = FrameHarvester::new(HarvestOptions::new().with_progress(recorder.clone()));
    let plan = plan(&ten_second_clip(), &SamplingConfig::default()).unwrap();

    harvester
        .harvest(&plan, usize::MAX, &SolidRenderer::default(), (8, 6))
        .unwrap();

    let infos = recorder.infos.lock().unwrap();
    assert_eq!(infos.len(), plan.len() + 1);
    assert!(infos.iter().all(|info| info.operation == OperationType::FrameHarvest));
    assert!(infos.iter().all(|info| info.total == Some(plan.len() as u64)));

    let last = infos.last().unwrap();
    assert_eq!(last.current, plan.len() as u64);
    assert_eq!(last.percentage, Some(100.0));
    assert!(last.current_timestamp.is_none());
}

#[test]
fn batch_size_thins_out_reports() {
    let recorder = Arc::new(Recorder::default());
    let harvester = FrameHarvester::new(
        HarvestOptions::new()
            .with_progress(recorder.clone())
            .with_batch_size(5),
    );
    let plan = plan(&ten_second_clip(), &SamplingConfig::default()).unwrap();
    assert_eq!(plan.len(), 11);

    harvester
        .harvest(&plan, usize::MAX, &SolidRenderer::default(), (8, 6))
        .unwrap();

    // After 5 and 10 responses, then the final report.
    let currents: Vec<u64> = recorder
        .infos
        .lock()
        .unwrap()
        .iter()
        .map(|info| info.current)
        .collect();
    assert_eq!(currents, [5, 10, 11]);
}

#[test]
fn progress_counts_never_decrease() {
    let recorder = Arc::new(Recorder::default());
    let harvester = FrameHarvester::new(
        HarvestOptions::new()
            .with_progress(recorder.clone())
            .with_concurrency(4),
    );
    let plan = plan(
        &ten_second_clip(),
        &SamplingConfig::new().with_interval_frames(7),
    )
    .unwrap();

    harvester
        .harvest(&plan, usize::MAX, &SolidRenderer::default(), (4, 3))
        .unwrap();

    let infos = recorder.infos.lock().unwrap();
    assert!(infos.windows(2).all(|pair| pair[0].current <= pair[1].current));
}
