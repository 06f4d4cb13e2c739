use crate::classifier::ClassificationResult;
use crate::config::ProctorConfig;

use super::rules::{classify_frame, ViolationKind};

/// Outcome of feeding one frame to the detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorUpdate {
    /// Currently exposed alert label, if any
    pub label: Option<ViolationKind>,
    /// Whether the detector is inside an alerting episode
    pub alerting: bool,
    /// True exactly on the frame that opened a new episode
    pub new_violation: bool,
    /// Running violation total for the session
    pub total: u32,
}

/// Debounces noisy per-frame signals into alert episodes.
///
/// A streak counter rises by one per violating frame and falls by one
/// (floored at zero) per clean frame. Once the streak exceeds the
/// threshold an episode opens: the total increments once, the label is
/// exposed, and both stay latched until the streak decays all the way
/// back to zero. Re-crossing the threshold inside an episode never
/// counts again.
pub struct ViolationDetector {
    config: ProctorConfig,
    streak: u32,
    alerting: bool,
    current: Option<ViolationKind>,
    total: u32,
}

impl ViolationDetector {
    pub fn new(config: ProctorConfig) -> Self {
        Self {
            config,
            streak: 0,
            alerting: false,
            current: None,
            total: 0,
        }
    }

    /// Feed one frame's classification result.
    pub fn observe(&mut self, result: &ClassificationResult) -> DetectorUpdate {
        let label = classify_frame(result, &self.config);

        if label.is_some() {
            self.streak += 1;
        } else {
            self.streak = self.streak.saturating_sub(1);
        }

        let mut new_violation = false;
        if self.streak > self.config.streak_threshold {
            if !self.alerting {
                self.alerting = true;
                self.total += 1;
                new_violation = true;
            }
            // The exposed label tracks the newest signal even when the
            // violation kind changes mid-episode.
            if let Some(kind) = label {
                self.current = Some(kind);
            }
        } else if self.streak == 0 {
            self.alerting = false;
            self.current = None;
        }

        DetectorUpdate {
            label: self.current,
            alerting: self.alerting,
            new_violation,
            total: self.total,
        }
    }

    /// Clear all episode state for a fresh session.
    pub fn reset(&mut self) {
        self.streak = 0;
        self.alerting = false;
        self.current = None;
        self.total = 0;
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn current(&self) -> Option<ViolationKind> {
        self.current
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }
}
