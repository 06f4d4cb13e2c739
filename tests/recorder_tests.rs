// Integration tests for toggle-driven recording
//
// These drive the recorder through a manually fed media stream and
// verify that one start/stop cycle yields exactly one well-formed WAV
// artifact containing the captured samples.

use std::io::Cursor;
use std::time::Duration;

use anyhow::Result;
use interview_proctor::media::{AudioChunk, MediaStream, RecordingController};

fn chunk_at(start: i16, timestamp_ms: u64) -> AudioChunk {
    AudioChunk {
        samples: (start..start + 160).collect(),
        sample_rate: 16000,
        channels: 1,
        timestamp_ms,
    }
}

#[tokio::test]
async fn test_recording_round_trips_fed_samples() -> Result<()> {
    let (stream, feed) = MediaStream::manual(16000, 1);
    let mut recorder = RecordingController::new();

    recorder.start(&stream)?;
    assert!(recorder.is_recording());

    let mut expected: Vec<i16> = Vec::new();
    for i in 0..3i16 {
        let chunk = chunk_at(i * 160, i as u64 * 10);
        expected.extend_from_slice(&chunk.samples);
        feed.audio.send(chunk).unwrap();
    }

    // Give the capture task a moment to drain the channel.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let artifact = recorder.stop().await?;
    assert!(!recorder.is_recording());
    assert_eq!(artifact.media_type, "audio/wav");

    let reader = hound::WavReader::new(Cursor::new(artifact.data))?;
    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.spec().channels, 1);

    let decoded: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(decoded, expected, "decoded samples should match the feed");
    Ok(())
}

#[tokio::test]
async fn test_stop_captures_chunks_still_queued() -> Result<()> {
    let (stream, feed) = MediaStream::manual(16000, 1);
    let mut recorder = RecordingController::new();

    recorder.start(&stream)?;

    // No pause between the sends and the stop; whatever the capture
    // task has not consumed yet is still sitting on the track.
    let mut expected: Vec<i16> = Vec::new();
    for i in 0..5i16 {
        let chunk = chunk_at(i * 160, 1000 + i as u64);
        expected.extend_from_slice(&chunk.samples);
        feed.audio.send(chunk).unwrap();
    }

    let artifact = recorder.stop().await?;

    let reader = hound::WavReader::new(Cursor::new(artifact.data))?;
    let decoded: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(
        decoded, expected,
        "chunks queued before stop belong to the artifact"
    );
    Ok(())
}

#[tokio::test]
async fn test_stop_without_audio_yields_an_empty_wav() -> Result<()> {
    let (stream, _feed) = MediaStream::manual(16000, 1);
    let mut recorder = RecordingController::new();

    recorder.start(&stream)?;
    let artifact = recorder.stop().await?;

    let reader = hound::WavReader::new(Cursor::new(artifact.data))?;
    assert_eq!(reader.len(), 0, "no chunks means an empty container");
    Ok(())
}

#[tokio::test]
async fn test_double_start_is_rejected() -> Result<()> {
    let (stream, _feed) = MediaStream::manual(16000, 1);
    let mut recorder = RecordingController::new();

    recorder.start(&stream)?;
    let err = recorder
        .start(&stream)
        .expect_err("second start while recording should fail");
    assert!(err.to_string().contains("already recording"));

    recorder.abort();
    Ok(())
}

#[tokio::test]
async fn test_abort_discards_the_recording() -> Result<()> {
    let (stream, feed) = MediaStream::manual(16000, 1);
    let mut recorder = RecordingController::new();

    recorder.start(&stream)?;
    feed.audio.send(chunk_at(0, 0)).unwrap();

    recorder.abort();
    assert!(!recorder.is_recording());

    let err = recorder
        .stop()
        .await
        .expect_err("nothing should be stoppable after abort");
    assert!(err.to_string().contains("not recording"));
    Ok(())
}
