pub mod detector;
pub mod monitor;
pub mod rules;

pub use detector::{DetectorUpdate, ViolationDetector};
pub use monitor::{FrameMonitor, ProctorShared, SharedScanner, ViolationEvent};
pub use rules::{classify_frame, ViolationKind};
