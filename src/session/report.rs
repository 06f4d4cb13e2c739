use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::proctor::ViolationEvent;

/// Lifecycle of the single interview session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Active,
    Ended,
}

/// What the candidate-facing side of the session is doing
///
/// Mutually exclusive and independent of the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    Idle,
    Recording,
    Processing,
    Speaking,
}

/// One utterance of the conversation
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSegment {
    /// Speaker tag ("user" or "ai") when the backend provides one
    pub role: Option<String>,

    /// Utterance text
    pub text: String,

    /// When this segment was received
    pub at: DateTime<Utc>,
}

/// Frozen summary of an ended session, held until acknowledged
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: u64,

    /// Violations counted over the whole session
    pub total_violations: u32,

    /// Alert onsets in arrival order
    pub events: Vec<ViolationEvent>,

    /// Conversation as received
    pub transcript: Vec<TranscriptSegment>,
}

/// Point-in-time view of the engine for the status surface
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub session: SessionStatus,
    pub activity: ActivityState,
    pub violation_count: u32,

    /// Currently exposed alert label, if any
    pub alert: Option<String>,

    pub remaining_seconds: u64,
    pub remaining_display: String,

    /// Most recent utterance text shown to the candidate
    pub current_text: Option<String>,

    pub classifier_ready: bool,
    pub transport_connected: bool,
}

/// Render remaining time the way the session screen shows it ("9:05").
pub fn format_remaining(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
