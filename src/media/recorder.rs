use std::io::Cursor;

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{ProctorError, Result};

use super::device::MediaStream;

/// Finalized audio bytes with their declared container type
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub data: Vec<u8>,
    pub media_type: String,
}

/// Toggle-driven microphone recorder
///
/// `start` subscribes to the stream's audio track and buffers chunks in a
/// background task; `stop` drains the task and finalizes everything
/// captured into a single WAV artifact. Exactly one artifact per
/// recording.
pub struct RecordingController {
    capture: Option<CaptureTask>,
}

struct CaptureTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Vec<i16>>,
    sample_rate: u32,
    channels: u16,
}

impl RecordingController {
    pub fn new() -> Self {
        Self { capture: None }
    }

    pub fn is_recording(&self) -> bool {
        self.capture.is_some()
    }

    /// Begin buffering the stream's audio track.
    pub fn start(&mut self, stream: &MediaStream) -> Result<()> {
        if self.capture.is_some() {
            return Err(ProctorError::Recording("already recording".to_string()));
        }

        let mut audio_rx = stream.subscribe_audio();
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut samples: Vec<i16> = Vec::new();

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        // Chunks already queued on the track belong to
                        // this recording.
                        loop {
                            match audio_rx.try_recv() {
                                Ok(chunk) => samples.extend_from_slice(&chunk.samples),
                                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                                    warn!("Recorder lagged behind capture, dropped {} chunks", missed);
                                }
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                    chunk = audio_rx.recv() => match chunk {
                        Ok(chunk) => samples.extend_from_slice(&chunk.samples),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!("Recorder lagged behind capture, dropped {} chunks", missed);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }

            samples
        });

        self.capture = Some(CaptureTask {
            stop: stop_tx,
            handle,
            sample_rate: stream.sample_rate(),
            channels: stream.channels(),
        });

        info!("Recording started");
        Ok(())
    }

    /// Stop buffering and finalize the captured samples into one WAV
    /// artifact.
    pub async fn stop(&mut self) -> Result<AudioArtifact> {
        let capture = self
            .capture
            .take()
            .ok_or_else(|| ProctorError::Recording("not recording".to_string()))?;

        let _ = capture.stop.send(());
        let samples = capture
            .handle
            .await
            .map_err(|e| ProctorError::Recording(format!("Capture task failed: {}", e)))?;

        info!("Recording stopped: {} samples buffered", samples.len());

        finalize_wav(&samples, capture.sample_rate, capture.channels)
    }

    /// Abandon an in-flight recording without producing an artifact.
    pub fn abort(&mut self) {
        if let Some(capture) = self.capture.take() {
            let _ = capture.stop.send(());
            capture.handle.abort();
            info!("Recording aborted");
        }
    }
}

impl Default for RecordingController {
    fn default() -> Self {
        Self::new()
    }
}

fn finalize_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Result<AudioArtifact> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| ProctorError::Recording(format!("Failed to start WAV writer: {}", e)))?;

        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| ProctorError::Recording(format!("Failed to write sample: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| ProctorError::Recording(format!("Failed to finalize WAV: {}", e)))?;
    }

    Ok(AudioArtifact {
        data: cursor.into_inner(),
        media_type: "audio/wav".to_string(),
    })
}
