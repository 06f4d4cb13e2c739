use std::collections::HashMap;

use crate::error::ClassifierError;
use crate::media::VideoFrame;

/// One detected face with its named blendshape scores
///
/// Score names follow the landmark capability's vocabulary
/// (e.g. `eyeLookInLeft`). Values are normalized to [0, 1].
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct FaceObservation {
    pub scores: HashMap<String, f32>,
}

impl FaceObservation {
    /// Look up a score by name. Absent names read as 0.0 so a capability
    /// that omits a blendshape never breaks evaluation.
    pub fn score(&self, name: &str) -> f32 {
        self.scores.get(name).copied().unwrap_or(0.0)
    }
}

/// Result of classifying a single video frame
#[derive(Debug, Clone, Default)]
pub struct ClassificationResult {
    pub faces: Vec<FaceObservation>,
}

/// Face/landmark classifier capability
///
/// Implementations:
/// - Scripted: replays a pre-recorded score script (testing/demo)
/// - Production landmark models bind behind this same trait
#[async_trait::async_trait]
pub trait FaceScanner: Send {
    /// Classify one frame. Never called concurrently; the adapter owns
    /// the scanner exclusively.
    async fn detect(&mut self, frame: &VideoFrame) -> Result<ClassificationResult, ClassifierError>;

    /// Scanner name for logging
    fn name(&self) -> &str;
}

/// Wraps a scanner and skips frames whose timestamp has not advanced,
/// so a stalled video track never burns classifier calls.
pub struct FrameClassifierAdapter {
    scanner: Box<dyn FaceScanner>,
    last_timestamp_ms: Option<u64>,
}

impl FrameClassifierAdapter {
    pub fn new(scanner: Box<dyn FaceScanner>) -> Self {
        Self {
            scanner,
            last_timestamp_ms: None,
        }
    }

    /// Evaluate a frame, returning `None` when the frame's timestamp equals
    /// the previously evaluated one (video has not advanced).
    pub async fn evaluate(
        &mut self,
        frame: &VideoFrame,
    ) -> Result<Option<ClassificationResult>, ClassifierError> {
        if self.last_timestamp_ms == Some(frame.timestamp_ms) {
            return Ok(None);
        }

        let result = self.scanner.detect(frame).await?;
        self.last_timestamp_ms = Some(frame.timestamp_ms);
        Ok(Some(result))
    }

    pub fn scanner_name(&self) -> &str {
        self.scanner.name()
    }
}
