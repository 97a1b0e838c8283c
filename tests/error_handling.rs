//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

mod common;

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};

use vidgif::{
    FrameHarvester, MediaTime, RenderError, SamplingConfig, TimeRange, VideoInfo, VidgifError,
    assemble, plan,
};

use common::{BrokenRenderer, colored, ten_second_clip};

// ── Display messages ───────────────────────────────────────────────

#[test]
fn render_error_names_the_timestamp() {
    let error = RenderError::new(MediaTime::new(900, 600), "decoder stalled");
    let message = error.to_string();
    assert!(
        message.starts_with("Failed to render frame at 1.500s"),
        "unexpected message: {message}"
    );
    assert!(message.contains("decoder stalled"));
}

#[test]
fn render_error_converts_transparently() {
    let render = RenderError::new(MediaTime::new(1, 1), "boom");
    let expected = render.to_string();
    let error: VidgifError = render.into();
    assert!(matches!(error, VidgifError::Render(_)));
    assert_eq!(error.to_string(), expected);
}

#[test]
fn no_frames_harvested_mentions_request_count() {
    let error = VidgifError::NoFramesHarvested { requested: 7 };
    assert_eq!(
        error.to_string(),
        "No frames could be harvested (7 timestamps requested)"
    );
}

#[test]
fn superseded_mentions_generation() {
    let error = VidgifError::Superseded { generation: 3 };
    assert_eq!(error.to_string(), "Harvest generation 3 was superseded");
}

#[test]
fn asset_load_failure_mentions_location() {
    let error = VidgifError::AssetLoadFailed {
        location: "clip.mov".to_string(),
        reason: "no such file".to_string(),
    };
    let message = error.to_string();
    assert!(message.contains("clip.mov"));
    assert!(message.contains("no such file"));
}

#[test]
fn io_errors_convert_with_source() {
    let error: VidgifError = IoError::new(ErrorKind::PermissionDenied, "read-only").into();
    assert!(matches!(error, VidgifError::IoError(_)));
    assert!(error.to_string().starts_with("I/O error"));
    assert!(error.source().is_some());
}

// ── Failure conditions ─────────────────────────────────────────────

#[test]
fn planning_zero_duration_is_invalid_input() {
    let info = VideoInfo::new(MediaTime::new(0, 600), 30.0, 64, 48);
    let result = plan(&info, &SamplingConfig::default());
    assert!(matches!(result, Err(VidgifError::InvalidInput(_))));
}

#[test]
fn planning_without_video_track_is_invalid_input() {
    let info = VideoInfo::without_video(MediaTime::new(6000, 600));
    let result = plan(&info, &SamplingConfig::default());
    assert!(matches!(result, Err(VidgifError::InvalidInput(_))));
}

#[test]
fn reversed_range_is_rejected_up_front() {
    let result = TimeRange::from_seconds(5.0, 2.0, 600);
    let message = result.unwrap_err().to_string();
    assert!(message.starts_with("Invalid input"), "unexpected: {message}");
}

#[test]
fn failing_renders_are_not_errors() {
    let plan = plan(&ten_second_clip(), &SamplingConfig::default()).unwrap();
    let report = FrameHarvester::default()
        .harvest(&plan, usize::MAX, &BrokenRenderer, (8, 6))
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(report.failures.len(), plan.len());
    assert!(report.failures.iter().all(|error| error.reason == "no decoder"));
}

#[test]
fn empty_assembly_is_an_error() {
    let error = assemble(Vec::new(), 1.0).unwrap_err();
    assert_eq!(error.to_string(), "Cannot assemble an animation from zero frames");
}

#[test]
fn assembly_rejects_zero_duration() {
    let error = assemble(vec![colored(2, 2, [0, 0, 0, 255])], 0.0).unwrap_err();
    assert!(matches!(error, VidgifError::InvalidInput(_)));
}
