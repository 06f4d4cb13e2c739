use std::time::Duration;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::time::sleep;
use tracing::debug;

use crate::error::Result;

use super::recorder::AudioArtifact;

/// Plays a reply clip, resolving on natural completion
#[async_trait::async_trait]
pub trait AudioSink: Send + Sync {
    async fn play(&self, artifact: &AudioArtifact) -> Result<()>;

    /// Sink name for logging
    fn name(&self) -> &str;
}

/// Sink that clocks out each clip's real duration
///
/// The engine itself has no speaker; what the session needs is accurate
/// completion timing. The clip duration comes from a container probe
/// (the backend ships MP3 or WAV), falling back to a byte-rate estimate
/// for unprobeable payloads so playback always completes.
pub struct ClockSink;

impl ClockSink {
    pub fn new() -> Self {
        Self
    }

    fn probe_duration(data: &[u8]) -> Option<Duration> {
        let cursor = std::io::Cursor::new(data.to_vec());
        let stream = MediaSourceStream::new(Box::new(cursor), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .ok()?;
        let mut format = probed.format;

        let (sample_rate, time_base, n_frames) = {
            let track = format.default_track()?;
            (
                track.codec_params.sample_rate,
                track.codec_params.time_base,
                track.codec_params.n_frames,
            )
        };

        if let (Some(time_base), Some(n_frames)) = (time_base, n_frames) {
            let time = time_base.calc_time(n_frames);
            return Some(Duration::from_secs_f64(time.seconds as f64 + time.frac));
        }

        // Streamed containers report no frame count; walk the packets.
        let sample_rate = sample_rate?;
        let mut total_frames: u64 = 0;
        while let Ok(packet) = format.next_packet() {
            total_frames = total_frames.saturating_add(packet.dur());
        }
        if total_frames == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(
            total_frames as f64 / sample_rate as f64,
        ))
    }

    fn estimate_duration(data: &[u8]) -> Duration {
        // Assume a 128 kbps stream when the container gives no answer.
        let secs = data.len() as f64 * 8.0 / 128_000.0;
        Duration::from_secs_f64(secs.max(0.5))
    }
}

impl Default for ClockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AudioSink for ClockSink {
    async fn play(&self, artifact: &AudioArtifact) -> Result<()> {
        let duration = Self::probe_duration(&artifact.data)
            .unwrap_or_else(|| Self::estimate_duration(&artifact.data));

        debug!(
            media_type = %artifact.media_type,
            secs = duration.as_secs_f64(),
            "Playing reply clip"
        );
        sleep(duration).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "clock"
    }
}

/// Sink that completes immediately (tests)
pub struct InstantSink;

#[async_trait::async_trait]
impl AudioSink for InstantSink {
    async fn play(&self, _artifact: &AudioArtifact) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "instant"
    }
}
