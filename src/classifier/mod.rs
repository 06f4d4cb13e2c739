pub mod adapter;
pub mod scripted;

pub use adapter::{ClassificationResult, FaceObservation, FaceScanner, FrameClassifierAdapter};
pub use scripted::ScriptedScanner;
