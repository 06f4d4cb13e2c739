use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::classifier::FrameClassifierAdapter;
use crate::config::ProctorConfig;
use crate::media::VideoFrame;

use super::detector::{DetectorUpdate, ViolationDetector};
use super::rules::ViolationKind;

/// Shared handle to the classifier, populated once loading succeeds
pub type SharedScanner = Arc<Mutex<Option<FrameClassifierAdapter>>>;

/// One alert onset, kept for the session report
#[derive(Debug, Clone, Serialize)]
pub struct ViolationEvent {
    pub kind: ViolationKind,
    pub at: DateTime<Utc>,
}

/// Proctoring state observable while the monitor runs
pub struct ProctorShared {
    /// Currently exposed alert label
    alert: Mutex<Option<ViolationKind>>,

    /// Violations counted this session
    violation_count: AtomicU32,

    /// Alert onsets in arrival order
    events: Mutex<Vec<ViolationEvent>>,
}

impl ProctorShared {
    pub fn new() -> Self {
        Self {
            alert: Mutex::new(None),
            violation_count: AtomicU32::new(0),
            events: Mutex::new(Vec::new()),
        }
    }

    async fn apply(&self, update: &DetectorUpdate) {
        {
            let mut alert = self.alert.lock().await;
            *alert = update.label;
        }

        if update.new_violation {
            self.violation_count.store(update.total, Ordering::SeqCst);
            if let Some(kind) = update.label {
                let mut events = self.events.lock().await;
                events.push(ViolationEvent {
                    kind,
                    at: Utc::now(),
                });
            }
        }
    }

    pub async fn current_alert(&self) -> Option<ViolationKind> {
        *self.alert.lock().await
    }

    pub fn violation_count(&self) -> u32 {
        self.violation_count.load(Ordering::SeqCst)
    }

    pub async fn events(&self) -> Vec<ViolationEvent> {
        self.events.lock().await.clone()
    }

    /// Clear all observable state for a fresh session
    pub async fn reset(&self) {
        *self.alert.lock().await = None;
        self.violation_count.store(0, Ordering::SeqCst);
        self.events.lock().await.clear();
    }
}

impl Default for ProctorShared {
    fn default() -> Self {
        Self::new()
    }
}

/// The per-frame evaluation loop for one session
///
/// Consumes the video track, runs each advancing frame through the
/// classifier and the violation detector, and publishes the outcome to
/// `ProctorShared`. Stopped from exactly one place (session teardown):
/// signal, release the video track, then join.
pub struct FrameMonitor {
    active: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FrameMonitor {
    pub fn spawn(
        mut frames: mpsc::Receiver<VideoFrame>,
        scanner: SharedScanner,
        config: ProctorConfig,
        shared: Arc<ProctorShared>,
    ) -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let active_flag = Arc::clone(&active);

        let handle = tokio::spawn(async move {
            info!("Frame monitor started");

            let mut detector = ViolationDetector::new(config);

            while let Some(frame) = frames.recv().await {
                if !active_flag.load(Ordering::SeqCst) {
                    break;
                }

                let mut guard = scanner.lock().await;
                let adapter = match guard.as_mut() {
                    Some(adapter) => adapter,
                    None => {
                        warn!("Frame arrived before the classifier was ready");
                        continue;
                    }
                };

                match adapter.evaluate(&frame).await {
                    Ok(Some(result)) => {
                        let update = detector.observe(&result);
                        drop(guard);

                        if update.new_violation {
                            if let Some(kind) = update.label {
                                warn!(violation = %kind, total = update.total, "Violation detected");
                            }
                        }

                        shared.apply(&update).await;
                    }
                    Ok(None) => {
                        // Video has not advanced; nothing to evaluate.
                    }
                    Err(e) => {
                        warn!("Classifier error on frame: {}", e);
                    }
                }
            }

            info!("Frame monitor stopped");
        });

        Self {
            active,
            handle: Some(handle),
        }
    }

    /// Signal the loop to stop at the next frame boundary.
    pub fn signal_stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Wait for the loop task to finish. Call after releasing the video
    /// track so the pending receive resolves.
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Frame monitor task panicked: {}", e);
            }
        }
    }
}
