pub mod classifier;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod proctor;
pub mod resume;
pub mod session;
pub mod transport;

pub use classifier::{
    ClassificationResult, FaceObservation, FaceScanner, FrameClassifierAdapter, ScriptedScanner,
};
pub use config::Config;
pub use error::{ProctorError, Result};
pub use http::{create_router, AppState};
pub use media::{
    AudioArtifact, AudioChunk, AudioSink, ClockSink, DeviceManager, InstantSink, MediaStream,
    RecordingController, SyntheticDevices, VideoFrame,
};
pub use proctor::{classify_frame, ProctorShared, ViolationDetector, ViolationKind};
pub use resume::ResumeStore;
pub use session::{
    ActivityState, InterviewEngine, SessionReport, SessionStatus, StatusSnapshot,
    TranscriptSegment,
};
pub use transport::{route_frame, DialogueChannel, Inbound};
