//! Benchmarks for planning, harvesting, arranging, and GIF encoding.
//!
//! Run with: cargo bench
//! Run with all features: cargo bench --all-features
//!
//! Every benchmark uses synthetic frames, so no fixture files are needed.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use vidgif::{
    FrameHarvester, FrameRenderer, HarvestOptions, MediaTime, PlayMode, RenderError,
    RenderedFrame, SamplingConfig, VideoInfo, arrange, assemble, plan,
};

#[cfg(feature = "async")]
use std::sync::Arc;
#[cfg(feature = "async")]
use tokio::runtime::Runtime;

struct GradientRenderer;

impl FrameRenderer for GradientRenderer {
    fn render(
        &self,
        timestamp: MediaTime,
        (width, height): (u32, u32),
    ) -> Result<RenderedFrame, RenderError> {
        let shade = (timestamp.value % 256) as u8;
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([shade, (x % 256) as u8, (y % 256) as u8, 255])
        });
        Ok(RenderedFrame::new(DynamicImage::ImageRgba8(image), timestamp))
    }
}

fn one_hour_clip() -> VideoInfo {
    VideoInfo::new(MediaTime::new(3600 * 600, 600), 30.0, 1280, 720)
}

fn one_minute_clip() -> VideoInfo {
    VideoInfo::new(MediaTime::new(60 * 600, 600), 30.0, 320, 180)
}

fn benchmark_planning(criterion: &mut Criterion) {
    let info = one_hour_clip();

    criterion.bench_function("plan one hour (1s interval)", |bencher| {
        bencher.iter(|| plan(black_box(&info), &SamplingConfig::default()).unwrap());
    });

    criterion.bench_function("plan one hour (every 10th instant)", |bencher| {
        let config = SamplingConfig::new().with_interval_frames(10);
        bencher.iter(|| plan(black_box(&info), &config).unwrap());
    });
}

fn benchmark_harvest(criterion: &mut Criterion) {
    let info = one_minute_clip();
    let plan = plan(&info, &SamplingConfig::new().with_interval_frames(6)).unwrap();

    let mut group = criterion.benchmark_group("harvest 300 frames");
    for workers in [1, 4] {
        let harvester = FrameHarvester::new(HarvestOptions::new().with_concurrency(workers));
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |bencher, _| {
            bencher.iter(|| {
                harvester
                    .harvest(&plan, usize::MAX, &GradientRenderer, (160, 90))
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn benchmark_arrange(criterion: &mut Criterion) {
    let frames: Vec<u64> = (0..300).collect();

    let mut group = criterion.benchmark_group("arrange 300 frames");
    for mode in PlayMode::ALL {
        group.bench_function(mode.to_string(), |bencher| {
            bencher.iter(|| arrange(black_box(&frames), mode));
        });
    }
    group.finish();
}

fn benchmark_encoding(criterion: &mut Criterion) {
    let frames: Vec<DynamicImage> = (0..20)
        .map(|index| {
            GradientRenderer
                .render(MediaTime::new(index * 30, 600), (96, 54))
                .unwrap()
                .image
        })
        .collect();

    let mut group = criterion.benchmark_group("encode 20 frames");
    group.sample_size(10);
    for speed in [10, 30] {
        let options = vidgif::GifOptions::new().speed(speed);
        group.bench_with_input(BenchmarkId::new("speed", speed), &speed, |bencher, _| {
            bencher.iter(|| {
                assemble(frames.clone(), 2.0)
                    .unwrap()
                    .to_bytes(&options)
                    .unwrap()
            });
        });
    }
    group.finish();
}

#[cfg(feature = "async")]
fn benchmark_async(criterion: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let info = one_minute_clip();
    let plan = plan(&info, &SamplingConfig::default()).unwrap();
    let renderer = Arc::new(GradientRenderer);

    let mut group = criterion.benchmark_group("async");
    group.bench_function("harvest_async", |bencher| {
        bencher.iter(|| {
            rt.block_on(async {
                FrameHarvester::default()
                    .harvest_async(plan.clone(), usize::MAX, renderer.clone(), (160, 90))
                    .await
                    .unwrap()
            })
        });
    });
    group.finish();
}

#[cfg(not(feature = "async"))]
fn benchmark_async(_criterion: &mut Criterion) {}

criterion::criterion_group!(
    benches,
    benchmark_planning,
    benchmark_harvest,
    benchmark_arrange,
    benchmark_encoding,
    benchmark_async,
);
criterion::criterion_main!(benches);
