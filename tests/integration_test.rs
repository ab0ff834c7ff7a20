//! End-to-end tests of the posture pipeline over synthetic streams

mod test_helpers;

use presenter_posture::{
    config::Config,
    frame::KeypointIndex,
    io::{JsonLinesSink, JsonLinesSource},
    pipeline::{FrameReport, IterSource, PosturePipeline},
};
use std::io::{BufReader, Write};
use test_helpers::{frame, tilt_sequence, PoseBuilder};

fn pipeline() -> PosturePipeline {
    PosturePipeline::new(Config::default()).unwrap()
}

#[test]
fn test_leaning_flips_once_window_average_exceeds_threshold() {
    let tilts = [2.0, 3.0, 1.0, 20.0, 22.0, 21.0, 20.0, 22.0, 21.0, 20.0, 22.0, 21.0];
    let mut pipeline = pipeline();

    let verdicts: Vec<bool> = tilt_sequence(7, &tilts)
        .iter()
        .map(|f| pipeline.process_frame(f).annotations.annotations[&7].is_leaning)
        .collect();

    // Upright for the first three frames
    assert!(!verdicts[2]);
    // While tilted samples are a minority the Hampel filter holds them at the
    // median; the seventh sample makes them the majority and the average 20.4
    assert_eq!(verdicts.iter().position(|&v| v), Some(6));
    assert!(verdicts[6..].iter().all(|&v| v));
    let smoothed = pipeline.leaning().track_state(7).unwrap().smoothed_angle().unwrap();
    assert!(smoothed > 15.0);
}

#[test]
fn test_single_upside_down_frame_does_not_flip_leaning() {
    let mut pipeline = pipeline();
    for index in 0..20 {
        pipeline.process_frame(&frame(index, vec![PoseBuilder::upright().detection(7)]));
    }

    // Pose glitch: hips reported above the shoulders, about 180 degrees of tilt
    let mut glitch = PoseBuilder::upright();
    glitch
        .set(KeypointIndex::LeftHip, 112.0, 20.0)
        .set(KeypointIndex::RightHip, 88.0, 20.0);
    let report = pipeline.process_frame(&frame(20, vec![glitch.detection(7)]));

    assert!(!report.annotations.annotations[&7].is_leaning);
    let state = pipeline.leaning().track_state(7).unwrap();
    assert!(state.angle_history().latest().unwrap().abs() > 170.0);
    assert!(state.smoothed_angle().unwrap().abs() < 1e-9);

    let report = pipeline.process_frame(&frame(21, vec![PoseBuilder::upright().detection(7)]));
    assert!(!report.annotations.annotations[&7].is_leaning);
}

#[test]
fn test_short_window_absorbs_right_angle_glitch() {
    let mut config = Config::default();
    config.thresholds.leaning_window_size = 5;
    let mut pipeline = PosturePipeline::new(config).unwrap();
    for index in 0..10 {
        pipeline.process_frame(&frame(index, vec![PoseBuilder::upright().detection(3)]));
    }

    let report = pipeline.process_frame(&frame(10, vec![PoseBuilder::upright().tilted(90.0).detection(3)]));
    assert!(!report.annotations.annotations[&3].is_leaning);
}

#[test]
fn test_tracks_are_classified_independently() {
    let mut pipeline = pipeline();
    let detections = vec![
        PoseBuilder::upright().arms_folded().detection(1),
        PoseBuilder::upright().hand_on_face().detection(2),
        PoseBuilder::upright().tilted(30.0).detection(3),
        PoseBuilder::upright().detection(4),
    ];

    let report = pipeline.process_frame(&frame(0, detections));
    let annotations = &report.annotations.annotations;

    assert!(annotations[&1].arms_folded);
    assert!(!annotations[&1].touching_face);
    assert!(annotations[&2].touching_face);
    assert!(!annotations[&2].arms_folded);
    assert!(annotations[&3].is_leaning);
    assert!(!annotations[&4].any());
    assert_eq!(report.annotations.summary.active_tracks, 4);
}

#[test]
fn test_missing_hips_leave_history_untouched() {
    let mut pipeline = pipeline();
    for index in 0..4 {
        pipeline.process_frame(&frame(index, vec![PoseBuilder::upright().tilted(25.0).detection(9)]));
    }
    let before = pipeline.leaning().track_state(9).unwrap().angle_history().len();

    let hidden = PoseBuilder::upright().tilted(25.0).hide(KeypointIndex::LeftHip).detection(9);
    let report = pipeline.process_frame(&frame(4, vec![hidden]));

    assert!(report.annotations.annotations[&9].is_leaning);
    assert_eq!(pipeline.leaning().track_state(9).unwrap().angle_history().len(), before);
}

#[test]
fn test_stale_track_is_evicted_and_restarts_fresh() {
    let mut pipeline = pipeline();
    pipeline.process_frame(&frame(0, vec![PoseBuilder::upright().tilted(25.0).detection(5)]));

    for index in 1..=30 {
        pipeline.process_frame(&frame(index, vec![PoseBuilder::upright().detection(6)]));
    }
    assert!(pipeline.leaning().track_state(5).is_some());

    pipeline.process_frame(&frame(31, vec![PoseBuilder::upright().detection(6)]));
    assert!(pipeline.leaning().track_state(5).is_none());

    let report = pipeline.process_frame(&frame(32, vec![PoseBuilder::upright().detection(5)]));
    assert!(!report.annotations.annotations[&5].is_leaning);
    assert_eq!(pipeline.leaning().track_state(5).unwrap().angle_history().len(), 1);
}

#[test]
fn test_repeated_track_id_keeps_later_detection() {
    let mut pipeline = pipeline();
    let detections = vec![
        PoseBuilder::upright().detection(8),
        PoseBuilder::upright().arms_folded().detection(8),
    ];

    let report = pipeline.process_frame(&frame(0, detections));

    assert_eq!(report.annotations.annotations.len(), 1);
    assert!(report.annotations.annotations[&8].arms_folded);
}

#[test]
fn test_session_statistics_accumulate() {
    let mut pipeline = pipeline();
    let mut sink: Vec<FrameReport> = Vec::new();
    let frames = (0..4).map(|index| {
        let pose = if index % 2 == 0 {
            PoseBuilder::upright().arms_folded()
        } else {
            PoseBuilder::upright()
        };
        frame(index, vec![pose.detection(2)])
    });

    pipeline.run(&mut IterSource(frames), &mut sink).unwrap();

    let tally = pipeline.stats().tally(2).unwrap();
    assert_eq!(tally.total_frames, 4);
    assert_eq!(tally.arms_folded_frames, 2);
    assert_eq!(tally.arms_folded_percent(), 50.0);

    let legend = &sink[3].overlay.legend;
    assert_eq!(legend.len(), 2);
    assert!(legend[1].text.contains("50.00%"));
}

#[test]
fn test_legend_stays_bounded_under_track_churn() {
    let mut config = Config::default();
    config.thresholds.track_timeout_frames = 5;
    config.display.stats_retention_frames = 20;
    let mut pipeline = PosturePipeline::new(config).unwrap();
    let mut sink: Vec<FrameReport> = Vec::new();

    // A new tracking id every frame
    let frames = (0..500).map(|index| frame(index, vec![PoseBuilder::upright().detection(i64::try_from(index).unwrap())]));
    pipeline.run(&mut IterSource(frames), &mut sink).unwrap();

    // Header plus the ids seen in the last six frames
    assert_eq!(sink[499].overlay.legend.len(), 1 + 6);
    assert_eq!(pipeline.stats().tallies().count(), 21);
    assert!(pipeline.leaning().track_count() <= 6);
}

#[test]
fn test_json_lines_file_round_trip() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    for f in tilt_sequence(7, &[0.0, 0.0, 30.0]) {
        writeln!(input, "{}", serde_json::to_string(&f).unwrap()).unwrap();
    }
    writeln!(input, "{{\"index\": \"broken\"}}").unwrap();
    input.flush().unwrap();

    let output = tempfile::NamedTempFile::new().unwrap();
    let mut source = JsonLinesSource::new(BufReader::new(input.reopen().unwrap()));
    let mut sink = JsonLinesSink::new(output.reopen().unwrap());

    let processed = pipeline().run(&mut source, &mut sink).unwrap();
    assert_eq!(processed, 3);
    assert_eq!(source.skipped(), 1);

    let written = std::fs::read_to_string(output.path()).unwrap();
    let reports: Vec<FrameReport> = written.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[2].annotations.summary.frame_index, 2);
    assert!(!reports[2].annotations.annotations[&7].is_leaning);
    assert_eq!(reports[0].overlay.labels[0].lines[0].text, "ID 7 BBox 0.90");
}
