use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::config::CaptureConfig;
use crate::error::DeviceError;

/// One camera frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Raw pixel data (layout is the capture backend's concern)
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Microphone sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// An acquired camera + microphone stream
///
/// Exclusively owned by the session for its lifetime. The video track is
/// taken once (by the frame monitor); the audio track hands out broadcast
/// subscriptions (to the recorder). Dropping the stream stops the
/// producing capture task.
pub struct MediaStream {
    video_rx: Option<mpsc::Receiver<VideoFrame>>,
    audio_tx: broadcast::Sender<AudioChunk>,
    sample_rate: u32,
    channels: u16,
    stopped: Arc<AtomicBool>,
}

impl MediaStream {
    /// Take the video track. Yields `None` on the second call.
    pub fn take_video(&mut self) -> Option<mpsc::Receiver<VideoFrame>> {
        self.video_rx.take()
    }

    /// Subscribe to the audio track.
    pub fn subscribe_audio(&self) -> broadcast::Receiver<AudioChunk> {
        self.audio_tx.subscribe()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Build a stream whose tracks are fed by the caller (tests and demos).
    pub fn manual(sample_rate: u32, channels: u16) -> (Self, MediaFeed) {
        let (video_tx, video_rx) = mpsc::channel(32);
        let (audio_tx, _) = broadcast::channel(64);

        let stream = Self {
            video_rx: Some(video_rx),
            audio_tx: audio_tx.clone(),
            sample_rate,
            channels,
            stopped: Arc::new(AtomicBool::new(false)),
        };

        (
            stream,
            MediaFeed {
                video: video_tx,
                audio: audio_tx,
            },
        )
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Caller-side handles for a manual stream
pub struct MediaFeed {
    pub video: mpsc::Sender<VideoFrame>,
    pub audio: broadcast::Sender<AudioChunk>,
}

/// Capture device boundary
///
/// Acquisition may suspend on a permission prompt and may fail with
/// `PermissionDenied`. Real camera/microphone backends bind behind this
/// trait; the synthetic implementation drives tests and headless runs.
#[async_trait::async_trait]
pub trait DeviceManager: Send + Sync {
    /// Acquire camera + microphone matching the requested constraints.
    async fn acquire(&self, config: &CaptureConfig) -> Result<MediaStream, DeviceError>;

    /// Manager name for logging
    fn name(&self) -> &str;
}

/// Device manager that fabricates silent frames at a fixed cadence
pub struct SyntheticDevices {
    deny_permission: bool,
}

impl SyntheticDevices {
    pub fn new() -> Self {
        Self {
            deny_permission: false,
        }
    }

    /// A manager whose permission prompt is always refused.
    pub fn denied() -> Self {
        Self {
            deny_permission: true,
        }
    }
}

impl Default for SyntheticDevices {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DeviceManager for SyntheticDevices {
    async fn acquire(&self, config: &CaptureConfig) -> Result<MediaStream, DeviceError> {
        if self.deny_permission {
            return Err(DeviceError::PermissionDenied);
        }

        let (video_tx, video_rx) = mpsc::channel(32);
        let (audio_tx, _) = broadcast::channel(64);
        let stopped = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&stopped);
        let audio_feed = audio_tx.clone();
        let config = config.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(config.frame_interval_ms));
            let samples_per_tick = (config.sample_rate as u64 * config.frame_interval_ms / 1000)
                as usize
                * config.channels as usize;
            let mut elapsed_ms = 0u64;

            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }

                elapsed_ms += config.frame_interval_ms;

                let frame = VideoFrame {
                    data: Vec::new(),
                    width: config.width,
                    height: config.height,
                    timestamp_ms: elapsed_ms,
                };
                if video_tx.send(frame).await.is_err() {
                    break;
                }

                let chunk = AudioChunk {
                    samples: vec![0; samples_per_tick],
                    sample_rate: config.sample_rate,
                    channels: config.channels,
                    timestamp_ms: elapsed_ms,
                };
                // No subscribers is fine; the track is simply unobserved.
                let _ = audio_feed.send(chunk);
            }

            debug!("Synthetic capture task stopped");
        });

        info!(
            width = config.width,
            height = config.height,
            "Synthetic media stream acquired"
        );

        Ok(MediaStream {
            video_rx: Some(video_rx),
            audio_tx,
            sample_rate: config.sample_rate,
            channels: config.channels,
            stopped,
        })
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> CaptureConfig {
        CaptureConfig {
            frame_interval_ms: 5,
            ..CaptureConfig::default()
        }
    }

    #[tokio::test]
    async fn synthetic_frames_have_advancing_timestamps() {
        let devices = SyntheticDevices::new();
        let mut stream = devices.acquire(&fast_config()).await.unwrap();
        let mut video = stream.take_video().unwrap();

        let first = video.recv().await.unwrap();
        let second = video.recv().await.unwrap();
        assert!(second.timestamp_ms > first.timestamp_ms);
        assert_eq!(first.width, 640);
        assert_eq!(first.height, 480);
    }

    #[tokio::test]
    async fn denied_manager_refuses_acquisition() {
        let devices = SyntheticDevices::denied();
        let result = devices.acquire(&fast_config()).await;
        assert!(matches!(result, Err(DeviceError::PermissionDenied)));
    }

    #[tokio::test]
    async fn dropping_the_stream_ends_the_video_track() {
        let devices = SyntheticDevices::new();
        let mut stream = devices.acquire(&fast_config()).await.unwrap();
        let mut video = stream.take_video().unwrap();
        video.recv().await.unwrap();

        drop(stream);

        // The producer notices the stop flag within a tick and closes
        // its side of the channel.
        let closed = tokio::time::timeout(Duration::from_secs(1), async {
            while video.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok(), "video track should close after drop");
    }

    #[tokio::test]
    async fn video_track_can_only_be_taken_once() {
        let (mut stream, _feed) = MediaStream::manual(16000, 1);
        assert!(stream.take_video().is_some());
        assert!(stream.take_video().is_none());
    }
}
