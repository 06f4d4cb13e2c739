use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::classifier::{FaceScanner, FrameClassifierAdapter};
use crate::config::Config;
use crate::error::{DeviceError, ProctorError, Result, SessionError};
use crate::media::{AudioArtifact, AudioSink, DeviceManager, MediaStream, RecordingController};
use crate::proctor::{FrameMonitor, ProctorShared, SharedScanner};
use crate::transport::{DialogueChannel, Inbound};

use super::report::{
    format_remaining, ActivityState, SessionReport, SessionStatus, StatusSnapshot,
    TranscriptSegment,
};
use super::timer::SessionTimer;

/// A happening the engine reacts to, consumed in arrival order by the
/// single event-loop task
#[derive(Debug)]
pub enum SessionEvent {
    /// The countdown reached zero
    TimerExpired,
    /// The backend sent utterance text
    TranscriptReceived {
        content: String,
        role: Option<String>,
    },
    /// The backend sent a synthesized reply clip
    ReplyAudioReceived(Vec<u8>),
    /// A reply clip finished playing; the values identify which one
    PlaybackFinished(Uuid, u64),
}

/// Everything owned by one live session, torn down as a unit
struct ActiveSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    stream: MediaStream,
    monitor: FrameMonitor,
    timer: SessionTimer,
    recorder: RecordingController,
    playback: Option<JoinHandle<()>>,
    playback_gen: u64,
    transcript: Vec<TranscriptSegment>,
}

struct EngineState {
    status: SessionStatus,
    activity: ActivityState,
    session: Option<ActiveSession>,
    report: Option<SessionReport>,
    current_text: Option<String>,
    /// Guards the unlocked window while devices are being acquired
    starting: bool,
}

impl EngineState {
    fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            activity: ActivityState::Idle,
            session: None,
            report: None,
            current_text: None,
            starting: false,
        }
    }
}

/// The interview session engine
///
/// One instance per process. Owns the classifier handle, the capture
/// device boundary, the dialogue channel, and at most one session at a
/// time. Commands mutate state under a single lock; asynchronous
/// happenings arrive as `SessionEvent`s on the event loop, so no two
/// handlers ever run concurrently.
pub struct InterviewEngine {
    config: Config,
    devices: Box<dyn DeviceManager>,
    sink: Arc<dyn AudioSink>,
    channel: Arc<DialogueChannel>,
    scanner: SharedScanner,
    classifier_ready: Arc<AtomicBool>,
    proctor: Arc<ProctorShared>,
    events_tx: mpsc::Sender<SessionEvent>,
    state: Mutex<EngineState>,
}

impl InterviewEngine {
    /// Build the engine and start its event loop. `inbound` is the
    /// routed event stream from the dialogue channel.
    pub fn new(
        config: Config,
        devices: Box<dyn DeviceManager>,
        sink: Arc<dyn AudioSink>,
        channel: Arc<DialogueChannel>,
        inbound: mpsc::Receiver<Inbound>,
    ) -> Arc<Self> {
        let (events_tx, events_rx) = mpsc::channel(64);

        let engine = Arc::new(Self {
            config,
            devices,
            sink,
            channel,
            scanner: Arc::new(Mutex::new(None)),
            classifier_ready: Arc::new(AtomicBool::new(false)),
            proctor: Arc::new(ProctorShared::new()),
            events_tx: events_tx.clone(),
            state: Mutex::new(EngineState::new()),
        });

        Self::spawn_inbound_pump(events_tx, inbound);
        Arc::clone(&engine).spawn_event_loop(events_rx);

        engine
    }

    /// Install the loaded classifier. Until this runs, session start is
    /// rejected with `NotReady`.
    pub async fn install_scanner(&self, scanner: Box<dyn FaceScanner>) {
        info!("Classifier installed: {}", scanner.name());
        let mut slot = self.scanner.lock().await;
        *slot = Some(FrameClassifierAdapter::new(scanner));
        self.classifier_ready.store(true, Ordering::SeqCst);
    }

    pub fn classifier_ready(&self) -> bool {
        self.classifier_ready.load(Ordering::SeqCst)
    }

    /// Start a session: acquire camera + microphone, reset proctoring
    /// state, start the countdown, and spawn the frame monitor.
    pub async fn start_session(&self, duration_minutes: Option<u64>) -> Result<Uuid> {
        {
            let mut state = self.state.lock().await;

            if !self.classifier_ready() {
                return Err(SessionError::NotReady.into());
            }
            match state.status {
                SessionStatus::Active => return Err(SessionError::AlreadyActive.into()),
                SessionStatus::Ended => {
                    return Err(SessionError::Busy(
                        "previous session awaiting acknowledgement".to_string(),
                    )
                    .into())
                }
                SessionStatus::Idle => {}
            }
            if state.starting {
                return Err(SessionError::Busy("session is starting".to_string()).into());
            }
            state.starting = true;
        }

        // Acquisition can suspend on a permission prompt; the state lock
        // is not held while it pends.
        let acquired = self.devices.acquire(&self.config.capture).await;

        let mut state = self.state.lock().await;
        state.starting = false;

        let mut stream = match acquired {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Media acquisition failed: {}", e);
                return Err(e.into());
            }
        };

        let video = stream
            .take_video()
            .ok_or_else(|| DeviceError::Acquisition("video track unavailable".to_string()))?;

        self.proctor.reset().await;

        let monitor = FrameMonitor::spawn(
            video,
            Arc::clone(&self.scanner),
            self.config.proctor.clone(),
            Arc::clone(&self.proctor),
        );

        let minutes = duration_minutes.unwrap_or(self.config.session.duration_minutes);
        let timer = SessionTimer::start(
            minutes.saturating_mul(60),
            Duration::from_millis(self.config.session.timer_tick_millis),
            self.events_tx.clone(),
        );

        let id = Uuid::new_v4();
        info!("Interview session started: {} ({} min)", id, minutes);

        state.session = Some(ActiveSession {
            id,
            started_at: Utc::now(),
            stream,
            monitor,
            timer,
            recorder: RecordingController::new(),
            playback: None,
            playback_gen: 0,
            transcript: Vec::new(),
        });
        state.status = SessionStatus::Active;
        state.activity = ActivityState::Idle;
        state.current_text = None;
        state.report = None;

        Ok(id)
    }

    /// One button, two meanings: start recording when idle, stop and
    /// ship the utterance when recording. A no-op while processing or
    /// speaking.
    pub async fn toggle_speak(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.status != SessionStatus::Active {
            return Err(SessionError::NotActive.into());
        }

        match state.activity {
            ActivityState::Idle => {
                let session = state.session.as_mut().ok_or(SessionError::NotActive)?;
                session.recorder.start(&session.stream)?;
                state.activity = ActivityState::Recording;
                state.current_text = Some("Listening...".to_string());
                Ok(())
            }
            ActivityState::Recording => {
                let session = state.session.as_mut().ok_or(SessionError::NotActive)?;
                let id = session.id;
                let mut recorder = std::mem::take(&mut session.recorder);
                state.activity = ActivityState::Processing;
                drop(state);

                let outcome = async {
                    let artifact = recorder.stop().await?;
                    info!(
                        "Utterance finalized ({} bytes), handing to dialogue channel",
                        artifact.data.len()
                    );
                    self.channel
                        .send_artifact(artifact)
                        .await
                        .map_err(ProctorError::from)
                }
                .await;

                // The session may have been torn down, or a reply may
                // have started speaking, while the lock was released;
                // only this session's Processing state is ours to clear.
                let mut state = self.state.lock().await;
                if state.session.as_ref().map(|s| s.id) == Some(id)
                    && state.activity == ActivityState::Processing
                {
                    state.activity = ActivityState::Idle;
                }
                outcome
            }
            ActivityState::Processing | ActivityState::Speaking => {
                debug!("Speak toggle ignored while {:?}", state.activity);
                Ok(())
            }
        }
    }

    /// End the session. Every owned resource is released before the
    /// Ended state becomes observable. A no-op when nothing is active.
    pub async fn end_session(&self) -> Result<()> {
        let session = {
            let mut state = self.state.lock().await;
            if state.status != SessionStatus::Active {
                debug!("End requested with no active session");
                return Ok(());
            }
            state.session.take()
        };

        let Some(session) = session else {
            return Ok(());
        };

        let ActiveSession {
            id,
            started_at,
            stream,
            monitor,
            timer,
            mut recorder,
            playback,
            transcript,
            ..
        } = session;

        timer.stop();
        recorder.abort();
        if let Some(handle) = playback {
            handle.abort();
        }

        monitor.signal_stop();
        // Releasing the stream closes the video track, letting the
        // monitor's pending receive resolve before the join.
        drop(stream);
        monitor.join().await;

        let ended_at = Utc::now();
        let mut state = self.state.lock().await;
        state.report = Some(SessionReport {
            session_id: id,
            started_at,
            ended_at,
            duration_secs: (ended_at - started_at).num_seconds().max(0) as u64,
            total_violations: self.proctor.violation_count(),
            events: self.proctor.events().await,
            transcript,
        });
        state.status = SessionStatus::Ended;
        state.activity = ActivityState::Idle;

        info!("Interview session ended: {}", id);
        Ok(())
    }

    /// Dismiss the frozen report, returning the engine to idle.
    pub async fn acknowledge_report(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.status != SessionStatus::Ended {
            return Err(SessionError::NothingToAcknowledge.into());
        }

        state.status = SessionStatus::Idle;
        state.report = None;
        state.current_text = None;
        drop(state);

        self.proctor.reset().await;
        info!("Session report acknowledged");
        Ok(())
    }

    /// The frozen report of the last ended session, if any.
    pub async fn report(&self) -> Option<SessionReport> {
        self.state.lock().await.report.clone()
    }

    /// Point-in-time view for the status surface.
    pub async fn status(&self) -> StatusSnapshot {
        let state = self.state.lock().await;

        let remaining = state
            .session
            .as_ref()
            .map(|s| s.timer.remaining_seconds())
            .unwrap_or(0);

        StatusSnapshot {
            session: state.status,
            activity: state.activity,
            violation_count: self.proctor.violation_count(),
            alert: self.proctor.current_alert().await.map(|k| k.to_string()),
            remaining_seconds: remaining,
            remaining_display: format_remaining(remaining),
            current_text: state.current_text.clone(),
            classifier_ready: self.classifier_ready(),
            transport_connected: self.channel.is_connected(),
        }
    }

    fn spawn_inbound_pump(events: mpsc::Sender<SessionEvent>, mut inbound: mpsc::Receiver<Inbound>) {
        tokio::spawn(async move {
            while let Some(message) = inbound.recv().await {
                let event = match message {
                    Inbound::Transcript { content, role } => {
                        SessionEvent::TranscriptReceived { content, role }
                    }
                    Inbound::ReplyAudio(data) => SessionEvent::ReplyAudioReceived(data),
                    Inbound::Closed => {
                        warn!("Dialogue channel disconnected");
                        continue;
                    }
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }
        });
    }

    fn spawn_event_loop(self: Arc<Self>, mut events_rx: mpsc::Receiver<SessionEvent>) {
        tokio::spawn(async move {
            info!("Engine event loop started");
            while let Some(event) = events_rx.recv().await {
                self.handle_event(event).await;
            }
            info!("Engine event loop stopped");
        });
    }

    async fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::TimerExpired => {
                info!("Interview time is up, ending session");
                if let Err(e) = self.end_session().await {
                    error!("Failed to end session on timer expiry: {}", e);
                }
            }
            SessionEvent::TranscriptReceived { content, role } => {
                self.on_transcript(content, role).await;
            }
            SessionEvent::ReplyAudioReceived(data) => {
                self.on_reply_audio(data).await;
            }
            SessionEvent::PlaybackFinished(id, gen) => {
                self.on_playback_finished(id, gen).await;
            }
        }
    }

    async fn on_transcript(&self, content: String, role: Option<String>) {
        let mut state = self.state.lock().await;

        if let Some(session) = state.session.as_mut() {
            session.transcript.push(TranscriptSegment {
                role,
                text: content.clone(),
                at: Utc::now(),
            });
        }
        state.current_text = Some(content);
    }

    async fn on_reply_audio(&self, data: Vec<u8>) {
        let mut state = self.state.lock().await;

        if state.status != SessionStatus::Active {
            debug!("Reply audio with no active session, dropping {} bytes", data.len());
            return;
        }
        let was_recording = state.activity == ActivityState::Recording;
        let Some(session) = state.session.as_mut() else {
            return;
        };

        // A reply clip cuts off an utterance still being captured; the
        // microphone never keeps buffering behind the Speaking state.
        if was_recording {
            session.recorder.abort();
        }

        // A newer clip replaces one still playing.
        if let Some(previous) = session.playback.take() {
            previous.abort();
        }
        session.playback_gen += 1;
        let id = session.id;
        let gen = session.playback_gen;

        let artifact = AudioArtifact {
            data,
            media_type: "audio/mpeg".to_string(),
        };
        let sink = Arc::clone(&self.sink);
        let events = self.events_tx.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = sink.play(&artifact).await {
                warn!("Playback failed: {}", e);
            }
            let _ = events.send(SessionEvent::PlaybackFinished(id, gen)).await;
        });

        session.playback = Some(handle);
        state.activity = ActivityState::Speaking;
    }

    async fn on_playback_finished(&self, id: Uuid, gen: u64) {
        let mut state = self.state.lock().await;

        if state.status != SessionStatus::Active {
            return;
        }
        let Some(session) = state.session.as_mut() else {
            return;
        };
        if session.id != id || session.playback_gen != gen {
            // A newer clip or a later session superseded this completion.
            return;
        }

        session.playback = None;
        state.activity = ActivityState::Idle;
    }
}
