use std::collections::HashMap;

use tracing::info;

use super::adapter::{ClassificationResult, FaceObservation, FaceScanner};
use crate::error::ClassifierError;
use crate::media::VideoFrame;

/// Scanner that replays a pre-recorded score script
///
/// The script is a JSON array of frames; each frame is an array of faces;
/// each face is a map of blendshape scores. An empty inner array means no
/// face was visible on that frame. Past the end of the script the final
/// entry repeats, like a camera that keeps showing the same scene. Note
/// that an empty script therefore replays "no face" forever.
pub struct ScriptedScanner {
    frames: Vec<Vec<HashMap<String, f32>>>,
    cursor: usize,
}

impl ScriptedScanner {
    /// Load a script from disk. This is the one-time asynchronous
    /// initialization that gates session start; it can fail.
    pub async fn load(path: &str) -> Result<Self, ClassifierError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ClassifierError::Load(format!("{}: {}", path, e)))?;

        let frames: Vec<Vec<HashMap<String, f32>>> = serde_json::from_str(&raw)
            .map_err(|e| ClassifierError::Load(format!("{}: {}", path, e)))?;

        info!(path = %path, frames = frames.len(), "Loaded classifier script");

        Ok(Self { frames, cursor: 0 })
    }

    /// Build directly from in-memory frames (tests)
    pub fn from_frames(frames: Vec<Vec<HashMap<String, f32>>>) -> Self {
        Self { frames, cursor: 0 }
    }
}

#[async_trait::async_trait]
impl FaceScanner for ScriptedScanner {
    async fn detect(
        &mut self,
        _frame: &VideoFrame,
    ) -> Result<ClassificationResult, ClassifierError> {
        let entry = if self.cursor < self.frames.len() {
            let entry = self.frames[self.cursor].clone();
            self.cursor += 1;
            entry
        } else {
            self.frames.last().cloned().unwrap_or_default()
        };

        Ok(ClassificationResult {
            faces: entry
                .into_iter()
                .map(|scores| FaceObservation { scores })
                .collect(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> VideoFrame {
        VideoFrame {
            data: Vec::new(),
            width: 640,
            height: 480,
            timestamp_ms: 0,
        }
    }

    #[tokio::test]
    async fn replays_frames_in_order_then_holds_last() {
        let mut scanner = ScriptedScanner::from_frames(vec![
            vec![],
            vec![HashMap::new(), HashMap::new()],
        ]);

        let first = scanner.detect(&frame()).await.unwrap();
        assert_eq!(first.faces.len(), 0);

        let second = scanner.detect(&frame()).await.unwrap();
        assert_eq!(second.faces.len(), 2);

        let held = scanner.detect(&frame()).await.unwrap();
        assert_eq!(held.faces.len(), 2, "script should hold its final entry");
    }

    #[tokio::test]
    async fn load_fails_on_missing_file() {
        let result = ScriptedScanner::load("/nonexistent/script.json").await;
        assert!(matches!(result, Err(ClassifierError::Load(_))));
    }
}
