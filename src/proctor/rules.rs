use std::fmt;

use serde::Serialize;

use crate::classifier::ClassificationResult;
use crate::config::ProctorConfig;

/// A detected proctoring violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    #[serde(rename = "NO FACE DETECTED")]
    NoFace,
    #[serde(rename = "MULTIPLE PEOPLE DETECTED")]
    MultiplePeople,
    #[serde(rename = "LOOKING AWAY")]
    LookingAway,
    #[serde(rename = "SUSPICIOUS: USING DEVICE")]
    UsingDevice,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViolationKind::NoFace => "NO FACE DETECTED",
            ViolationKind::MultiplePeople => "MULTIPLE PEOPLE DETECTED",
            ViolationKind::LookingAway => "LOOKING AWAY",
            ViolationKind::UsingDevice => "SUSPICIOUS: USING DEVICE",
        };
        f.write_str(label)
    }
}

/// Classify one frame's result against the rule set.
///
/// Rules apply in a fixed order, first match wins:
/// 1. zero faces -> NoFace
/// 2. more than one face -> MultiplePeople
/// 3. one face: lateral gaze past threshold -> LookingAway, then the
///    downward check runs unconditionally and overrides to UsingDevice.
pub fn classify_frame(result: &ClassificationResult, config: &ProctorConfig) -> Option<ViolationKind> {
    match result.faces.len() {
        0 => Some(ViolationKind::NoFace),
        1 => {
            let face = &result.faces[0];
            let mut verdict = None;

            if face.score("eyeLookInLeft") > config.lateral_gaze_threshold
                || face.score("eyeLookInRight") > config.lateral_gaze_threshold
            {
                verdict = Some(ViolationKind::LookingAway);
            }
            if face.score("eyeLookDownLeft") > config.downward_gaze_threshold {
                verdict = Some(ViolationKind::UsingDevice);
            }

            verdict
        }
        _ => Some(ViolationKind::MultiplePeople),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FaceObservation;
    use std::collections::HashMap;

    fn face(pairs: &[(&str, f32)]) -> FaceObservation {
        let mut scores = HashMap::new();
        for (name, value) in pairs {
            scores.insert(name.to_string(), *value);
        }
        FaceObservation { scores }
    }

    fn result(faces: Vec<FaceObservation>) -> ClassificationResult {
        ClassificationResult { faces }
    }

    #[test]
    fn zero_faces_is_no_face() {
        let config = ProctorConfig::default();
        assert_eq!(
            classify_frame(&result(vec![]), &config),
            Some(ViolationKind::NoFace)
        );
    }

    #[test]
    fn two_faces_is_multiple_people() {
        let config = ProctorConfig::default();
        let r = result(vec![face(&[]), face(&[])]);
        assert_eq!(classify_frame(&r, &config), Some(ViolationKind::MultiplePeople));
    }

    #[test]
    fn multiple_faces_wins_over_gaze() {
        // Face-count rules run before any gaze rule is consulted.
        let config = ProctorConfig::default();
        let r = result(vec![face(&[("eyeLookDownLeft", 0.9)]), face(&[])]);
        assert_eq!(classify_frame(&r, &config), Some(ViolationKind::MultiplePeople));
    }

    #[test]
    fn lateral_gaze_past_threshold_is_looking_away() {
        let config = ProctorConfig::default();
        let left = result(vec![face(&[("eyeLookInLeft", 0.7)])]);
        let right = result(vec![face(&[("eyeLookInRight", 0.61)])]);
        assert_eq!(classify_frame(&left, &config), Some(ViolationKind::LookingAway));
        assert_eq!(classify_frame(&right, &config), Some(ViolationKind::LookingAway));
    }

    #[test]
    fn downward_gaze_overrides_lateral() {
        let config = ProctorConfig::default();
        let r = result(vec![face(&[
            ("eyeLookInLeft", 0.9),
            ("eyeLookDownLeft", 0.5),
        ])]);
        assert_eq!(classify_frame(&r, &config), Some(ViolationKind::UsingDevice));
    }

    #[test]
    fn scores_at_threshold_are_clean() {
        let config = ProctorConfig::default();
        let r = result(vec![face(&[
            ("eyeLookInLeft", 0.6),
            ("eyeLookInRight", 0.6),
            ("eyeLookDownLeft", 0.45),
        ])]);
        assert_eq!(classify_frame(&r, &config), None);
    }

    #[test]
    fn missing_blendshapes_are_clean() {
        let config = ProctorConfig::default();
        let r = result(vec![face(&[])]);
        assert_eq!(classify_frame(&r, &config), None);
    }

    #[test]
    fn labels_render_their_display_strings() {
        assert_eq!(ViolationKind::NoFace.to_string(), "NO FACE DETECTED");
        assert_eq!(
            ViolationKind::MultiplePeople.to_string(),
            "MULTIPLE PEOPLE DETECTED"
        );
        assert_eq!(ViolationKind::LookingAway.to_string(), "LOOKING AWAY");
        assert_eq!(
            ViolationKind::UsingDevice.to_string(),
            "SUSPICIOUS: USING DEVICE"
        );
    }
}
