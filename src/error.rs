//! Error types for the interview proctor engine

use thiserror::Error;

/// Main error type for engine operations
///
/// Classifier errors stay at their boundary (the loader and the frame
/// monitor log them); they never cross into engine results.
#[derive(Error, Debug)]
pub enum ProctorError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Resume error: {0}")]
    Resume(String),

    #[error("Recording error: {0}")]
    Recording(String),
}

/// Face classifier errors
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to load classifier assets: {0}")]
    Load(String),
}

/// Capture device errors
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Camera/microphone permission denied")]
    PermissionDenied,

    #[error("Failed to acquire media stream: {0}")]
    Acquisition(String),
}

/// Dialogue channel errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to connect to dialogue backend: {0}")]
    Connect(String),

    #[error("Channel disconnected")]
    Disconnected,

    #[error("Failed to send frame: {0}")]
    Send(String),
}

/// Session command gating errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Interviewer is not ready yet")]
    NotReady,

    #[error("A session is already in progress")]
    AlreadyActive,

    #[error("No active session")]
    NotActive,

    #[error("No report awaiting acknowledgement")]
    NothingToAcknowledge,

    #[error("Session is busy: {0}")]
    Busy(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, ProctorError>;
