// Integration tests for violation detection
//
// These tests verify the debounce behavior of the violation detector
// over whole frame sequences, and the frame monitor's end-to-end path
// from video frames through the classifier to the observable state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use interview_proctor::classifier::{
    ClassificationResult, FaceObservation, FrameClassifierAdapter, ScriptedScanner,
};
use interview_proctor::config::ProctorConfig;
use interview_proctor::media::{MediaStream, VideoFrame};
use interview_proctor::proctor::{FrameMonitor, ProctorShared, ViolationDetector, ViolationKind};
use tokio::sync::Mutex;

fn no_face() -> ClassificationResult {
    ClassificationResult { faces: vec![] }
}

fn attentive() -> ClassificationResult {
    ClassificationResult {
        faces: vec![FaceObservation::default()],
    }
}

fn gazing_away() -> ClassificationResult {
    let mut scores = HashMap::new();
    scores.insert("eyeLookInRight".to_string(), 0.8f32);
    ClassificationResult {
        faces: vec![FaceObservation { scores }],
    }
}

#[test]
fn test_one_increment_per_separated_run() {
    let mut detector = ViolationDetector::new(ProctorConfig::default());

    // Three violation runs, each long enough to alert, separated by
    // full decay back to zero.
    for run in 0..3 {
        for _ in 0..6 {
            detector.observe(&no_face());
        }
        assert_eq!(detector.total(), run + 1, "each run should count once");

        for _ in 0..6 {
            detector.observe(&attentive());
        }
        assert_eq!(detector.streak(), 0);
        assert_eq!(detector.current(), None, "label should clear at zero");
    }

    assert_eq!(detector.total(), 3);
}

#[test]
fn test_brief_clean_frame_does_not_double_count() {
    let mut detector = ViolationDetector::new(ProctorConfig::default());

    // Six violating frames, one clean frame, one violating frame: the
    // streak dips 6 -> 5 -> 6 inside a single episode.
    for _ in 0..6 {
        detector.observe(&no_face());
    }
    let dip = detector.observe(&attentive());
    assert!(dip.alerting, "alert should stay active through the dip");

    let back = detector.observe(&no_face());
    assert!(back.alerting);
    assert_eq!(back.total, 1, "the dip must not produce a second count");
}

#[test]
fn test_five_frames_never_alert() {
    let mut detector = ViolationDetector::new(ProctorConfig::default());

    for _ in 0..5 {
        let update = detector.observe(&no_face());
        assert!(!update.alerting);
    }
    assert_eq!(detector.total(), 0);
}

#[test]
fn test_label_follows_signal_within_one_episode() {
    let mut detector = ViolationDetector::new(ProctorConfig::default());

    for _ in 0..6 {
        detector.observe(&no_face());
    }
    assert_eq!(detector.current(), Some(ViolationKind::NoFace));

    // The kind changes but the episode continues.
    let update = detector.observe(&gazing_away());
    assert_eq!(update.label, Some(ViolationKind::LookingAway));
    assert_eq!(update.total, 1, "label change is not a new violation");
}

#[tokio::test]
async fn test_monitor_reports_a_no_face_episode() {
    // Script: six empty frames (no face), then an attentive face forever.
    let mut script: Vec<Vec<HashMap<String, f32>>> = vec![vec![]; 6];
    script.push(vec![HashMap::new()]);

    let scanner = Arc::new(Mutex::new(Some(FrameClassifierAdapter::new(Box::new(
        ScriptedScanner::from_frames(script),
    )))));
    let shared = Arc::new(ProctorShared::new());

    let (mut stream, feed) = MediaStream::manual(16000, 1);
    let video = stream.take_video().unwrap();
    let monitor = FrameMonitor::spawn(
        video,
        scanner,
        ProctorConfig::default(),
        Arc::clone(&shared),
    );

    for i in 0..6u64 {
        feed.video
            .send(VideoFrame {
                data: Vec::new(),
                width: 640,
                height: 480,
                timestamp_ms: (i + 1) * 33,
            })
            .await
            .unwrap();
    }

    // The sixth frame crosses the threshold.
    let mut alerted = false;
    for _ in 0..100 {
        if shared.violation_count() == 1 {
            alerted = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(alerted, "six no-face frames should produce one violation");
    assert_eq!(
        shared.current_alert().await,
        Some(ViolationKind::NoFace),
        "alert label should be exposed"
    );

    let events = shared.events().await;
    assert_eq!(events.len(), 1, "one alert onset should be logged");
    assert_eq!(events[0].kind, ViolationKind::NoFace);

    monitor.signal_stop();
    drop(stream);
    drop(feed);
    tokio::time::timeout(Duration::from_secs(1), monitor.join())
        .await
        .expect("monitor should join after its video track closes");
}

#[tokio::test]
async fn test_monitor_skips_stalled_frames() {
    // Script's first entry reports no face; if the repeated timestamp
    // were evaluated again the streak would grow.
    let script: Vec<Vec<HashMap<String, f32>>> = vec![vec![]];

    let scanner = Arc::new(Mutex::new(Some(FrameClassifierAdapter::new(Box::new(
        ScriptedScanner::from_frames(script),
    )))));
    let shared = Arc::new(ProctorShared::new());

    let (mut stream, feed) = MediaStream::manual(16000, 1);
    let video = stream.take_video().unwrap();
    let monitor = FrameMonitor::spawn(
        video,
        scanner,
        ProctorConfig::default(),
        Arc::clone(&shared),
    );

    // Seven frames that all carry the same timestamp: only the first
    // advances the detector, so no alert can form.
    for _ in 0..7 {
        feed.video
            .send(VideoFrame {
                data: Vec::new(),
                width: 640,
                height: 480,
                timestamp_ms: 1000,
            })
            .await
            .unwrap();
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        shared.violation_count(),
        0,
        "a stalled video track must not accumulate streak"
    );

    monitor.signal_stop();
    drop(stream);
    drop(feed);
    tokio::time::timeout(Duration::from_secs(1), monitor.join())
        .await
        .expect("monitor should join");
}
