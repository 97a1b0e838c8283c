//! Sampling planner integration tests.

mod common;

use vidgif::{
    FixedPolicy, MediaTime, SamplingConfig, TimeRange, VideoInfo, VidgifError, planner,
};

use common::ten_second_clip;

fn values(plan: &vidgif::TimestampPlan) -> Vec<i64> {
    plan.iter().map(|time| time.value).collect()
}

fn assert_strictly_increasing(plan: &vidgif::TimestampPlan) {
    for pair in plan.timestamps().windows(2) {
        assert!(pair[0] < pair[1], "{} is not before {}", pair[0], pair[1]);
    }
}

// ── Default selection ──────────────────────────────────────────────

#[test]
fn default_config_samples_whole_seconds_plus_first_instant() {
    let plan = planner::plan(&ten_second_clip(), &SamplingConfig::new()).unwrap();

    assert_eq!(plan.total_frames(), 300);
    assert_eq!(plan.len(), 11);
    assert_eq!(plan.first(), Some(MediaTime::new(20, 600)));
    assert_eq!(
        values(&plan)[1..],
        [600, 1200, 1800, 2400, 3000, 3600, 4200, 4800, 5400, 6000]
    );
}

#[test]
fn target_rate_respaces_instants() {
    let config = SamplingConfig::new().with_target_frame_rate(10.0);
    let plan = planner::plan(&ten_second_clip(), &config).unwrap();

    assert_eq!(plan.total_frames(), 100);
    assert_eq!(plan.frame_rate(), 10.0);
    assert_eq!(plan.len(), 11);
    assert_eq!(plan.first(), Some(MediaTime::new(60, 600)));
    assert_eq!(plan.last(), Some(MediaTime::new(6000, 600)));
}

#[test]
fn zero_target_rate_uses_native_rate() {
    let config = SamplingConfig::new().with_target_frame_rate(0.0);
    let plan = planner::plan(&ten_second_clip(), &config).unwrap();
    assert_eq!(plan.total_frames(), 300);
}

// ── Interval rules ─────────────────────────────────────────────────

#[test]
fn frame_interval_keeps_every_nth_instant() {
    let config = SamplingConfig::new().with_interval_frames(5);
    let plan = planner::plan(&ten_second_clip(), &config).unwrap();

    assert_eq!(plan.len(), 61);
    assert_eq!(values(&plan)[..3], [20, 100, 200]);
}

#[test]
fn frame_interval_takes_priority_over_millis() {
    let config = SamplingConfig::new()
        .with_target_frame_rate(10.0)
        .with_interval_frames(25)
        .with_interval_millis(100);
    let plan = planner::plan(&ten_second_clip(), &config).unwrap();

    assert_eq!(values(&plan), [60, 1500, 3000, 4500, 6000]);
}

#[test]
fn millisecond_interval_selects_boundaries() {
    let config = SamplingConfig::new()
        .with_target_frame_rate(10.0)
        .with_interval_millis(500);
    let plan = planner::plan(&ten_second_clip(), &config).unwrap();

    assert_eq!(plan.len(), 21);
    assert!(plan.iter().skip(1).all(|time| time.as_millis() % 500 == 0));
}

#[test]
fn no_interval_keeps_only_first_instant() {
    let config = SamplingConfig::new()
        .with_target_frame_rate(10.0)
        .with_interval_millis(0);
    let plan = planner::plan(&ten_second_clip(), &config).unwrap();

    assert_eq!(values(&plan), [60]);
}

// ── Range rules ────────────────────────────────────────────────────

#[test]
fn range_selects_half_open_window() {
    let config = SamplingConfig::new()
        .with_target_frame_rate(10.0)
        .with_range(TimeRange::from_seconds(2.0, 4.0, 600).unwrap());
    let plan = planner::plan(&ten_second_clip(), &config).unwrap();

    assert_eq!(plan.len(), 20);
    assert_eq!(plan.first(), Some(MediaTime::new(1200, 600)));
    assert_eq!(plan.last(), Some(MediaTime::new(2340, 600)));
}

#[test]
fn range_overrides_interval_and_first_instant() {
    let config = SamplingConfig::new()
        .with_target_frame_rate(10.0)
        .with_interval_frames(7)
        .with_range(TimeRange::from_seconds(5.0, 6.0, 600).unwrap());
    let plan = planner::plan(&ten_second_clip(), &config).unwrap();

    assert_eq!(plan.len(), 10);
    assert!(plan.iter().all(|time| time.value >= 3000 && time.value < 3600));
}

#[test]
fn empty_range_plans_nothing() {
    let range = TimeRange::from_seconds(3.0, 3.0, 600).unwrap();
    let config = SamplingConfig::new().with_range(range);
    let plan = planner::plan(&ten_second_clip(), &config).unwrap();
    assert!(plan.is_empty());
}

// ── Policy clamping ────────────────────────────────────────────────

#[test]
fn policy_shortens_long_ranges() {
    let config = SamplingConfig::new()
        .with_target_frame_rate(10.0)
        .with_range(TimeRange::from_seconds(2.0, 4.0, 600).unwrap());
    let policy = FixedPolicy::new(10);

    let plan = planner::plan_with_policy(&ten_second_clip(), &config, &policy).unwrap();

    assert_eq!(plan.len(), 10);
    assert_eq!(plan.last(), Some(MediaTime::new(1740, 600)));
}

#[test]
fn policy_leaves_short_ranges_alone() {
    let config = SamplingConfig::new()
        .with_target_frame_rate(10.0)
        .with_range(TimeRange::from_seconds(2.0, 4.0, 600).unwrap());
    let policy = FixedPolicy::new(300);

    let clamped = planner::plan_with_policy(&ten_second_clip(), &config, &policy).unwrap();
    let plain = planner::plan(&ten_second_clip(), &config).unwrap();
    assert_eq!(clamped, plain);
}

#[test]
fn policy_ignores_configs_without_range() {
    let config = SamplingConfig::new().with_interval_frames(1);
    let policy = FixedPolicy::new(5);

    let plan = planner::plan_with_policy(&ten_second_clip(), &config, &policy).unwrap();
    assert_eq!(plan.len(), 300);
}

#[test]
fn effective_range_matches_clamped_plan() {
    let config = SamplingConfig::new()
        .with_target_frame_rate(10.0)
        .with_range(TimeRange::from_seconds(2.0, 10.0, 600).unwrap());
    let policy = FixedPolicy::new(10);

    let range = planner::effective_range(&ten_second_clip(), &config, &policy).unwrap();
    assert_eq!(range.start, MediaTime::new(1200, 600));
    assert_eq!(range.end, MediaTime::new(1800, 600));

    let plan = planner::plan_with_policy(&ten_second_clip(), &config, &policy).unwrap();
    assert!(plan.iter().all(|&time| range.contains(time)));
}

#[test]
fn effective_range_is_none_without_range() {
    let range = planner::effective_range(
        &ten_second_clip(),
        &SamplingConfig::new(),
        &FixedPolicy::new(1),
    );
    assert!(range.is_none());
}

// ── Timing precision ───────────────────────────────────────────────

#[test]
fn timestamps_keep_duration_timescale_and_epoch() {
    let duration = MediaTime::new(6000, 600).with_epoch(3);
    let info = VideoInfo::new(duration, 30.0, 64, 48);
    let plan = planner::plan(&info, &SamplingConfig::new().with_interval_frames(10)).unwrap();

    assert!(plan.iter().all(|time| time.timescale == 600 && time.epoch == 3));
}

#[test]
fn long_videos_end_exactly_on_duration() {
    let duration = MediaTime::new(3600 * 90_000, 90_000);
    let info = VideoInfo::new(duration, 25.0, 64, 48);
    let plan = planner::plan(&info, &SamplingConfig::new().with_interval_frames(1)).unwrap();

    assert_eq!(plan.total_frames(), 90_000);
    assert_eq!(plan.len(), 90_000);
    assert_eq!(plan.last(), Some(duration));
    assert_strictly_increasing(&plan);
}

#[test]
fn coarse_timescale_skips_duplicate_ticks() {
    let info = VideoInfo::new(MediaTime::new(2, 1), 30.0, 64, 48);
    let plan = planner::plan(&info, &SamplingConfig::new().with_interval_frames(1)).unwrap();

    assert_eq!(values(&plan), [0, 1, 2]);
    assert_strictly_increasing(&plan);
}

#[test]
fn planning_is_deterministic() {
    let config = SamplingConfig::new()
        .with_target_frame_rate(12.5)
        .with_interval_frames(3);
    let first = planner::plan(&ten_second_clip(), &config).unwrap();
    let second = planner::plan(&ten_second_clip(), &config).unwrap();
    assert_eq!(first, second);
    assert_strictly_increasing(&first);
}

// ── Degenerate inputs ──────────────────────────────────────────────

#[test]
fn zero_duration_is_rejected() {
    let info = VideoInfo::new(MediaTime::new(0, 600), 30.0, 64, 48);
    let result = planner::plan(&info, &SamplingConfig::new());
    assert!(matches!(result, Err(VidgifError::InvalidInput(_))));
}

#[test]
fn zero_frame_rate_is_rejected() {
    let info = VideoInfo::without_video(MediaTime::new(6000, 600));
    let result = planner::plan(&info, &SamplingConfig::new());
    assert!(matches!(result, Err(VidgifError::InvalidInput(_))));
}

#[test]
fn target_rate_rescues_unknown_native_rate() {
    let info = VideoInfo::without_video(MediaTime::new(6000, 600));
    let config = SamplingConfig::new().with_target_frame_rate(2.0);
    let plan = planner::plan(&info, &config).unwrap();
    assert_eq!(plan.total_frames(), 20);
}

#[test]
fn duration_shorter_than_one_instant_plans_nothing() {
    let info = VideoInfo::new(MediaTime::new(10, 600), 30.0, 64, 48);
    let plan = planner::plan(&info, &SamplingConfig::new()).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.total_frames(), 0);
}
