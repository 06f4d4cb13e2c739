//! Interview session management
//!
//! This module provides the engine that coordinates one session:
//! - Session lifecycle (idle, active, ended) and its commands
//! - The countdown timer that bounds the interview
//! - Recording, dialogue exchange, and reply playback sequencing
//! - The frozen end-of-session report

pub mod orchestrator;
pub mod report;
pub mod timer;

pub use orchestrator::{InterviewEngine, SessionEvent};
pub use report::{
    format_remaining, ActivityState, SessionReport, SessionStatus, StatusSnapshot,
    TranscriptSegment,
};
pub use timer::{Countdown, SessionTimer, Tick};
