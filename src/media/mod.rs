pub mod device;
pub mod playback;
pub mod recorder;

pub use device::{AudioChunk, DeviceManager, MediaFeed, MediaStream, SyntheticDevices, VideoFrame};
pub use playback::{AudioSink, ClockSink, InstantSink};
pub use recorder::{AudioArtifact, RecordingController};
