use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::orchestrator::SessionEvent;

/// Outcome of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; seconds left
    Running(u64),
    /// Reached zero on this tick; fires at most once per start
    Expired,
    /// Stopped; ticks do nothing
    Halted,
}

/// Pure countdown state, one decrement per tick
pub struct Countdown {
    remaining: u64,
    running: bool,
}

impl Countdown {
    pub fn start(duration_secs: u64) -> Self {
        Self {
            remaining: duration_secs,
            running: true,
        }
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Halted;
        }

        if self.remaining > 0 {
            self.remaining -= 1;
        }

        if self.remaining == 0 {
            self.running = false;
            return Tick::Expired;
        }

        Tick::Running(self.remaining)
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Countdown driven on a real-time cadence for one session
///
/// Fires exactly one `TimerExpired` event when the countdown reaches
/// zero. `stop` halts without firing; the task is aborted so no tick can
/// race past the stop.
pub struct SessionTimer {
    remaining: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SessionTimer {
    pub fn start(duration_secs: u64, tick: Duration, events: mpsc::Sender<SessionEvent>) -> Self {
        let remaining = Arc::new(AtomicU64::new(duration_secs));
        let running = Arc::new(AtomicBool::new(true));

        let remaining_out = Arc::clone(&remaining);
        let running_out = Arc::clone(&running);

        let handle = tokio::spawn(async move {
            let mut countdown = Countdown::start(duration_secs);
            let mut ticker = tokio::time::interval(tick);
            // The first interval tick completes immediately; skip it so
            // the first decrement lands one period after start.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if !running_out.load(Ordering::SeqCst) {
                    break;
                }

                match countdown.tick() {
                    Tick::Running(left) => {
                        remaining_out.store(left, Ordering::SeqCst);
                    }
                    Tick::Expired => {
                        remaining_out.store(0, Ordering::SeqCst);
                        running_out.store(false, Ordering::SeqCst);
                        info!("Session timer expired");
                        let _ = events.send(SessionEvent::TimerExpired).await;
                        break;
                    }
                    Tick::Halted => break,
                }
            }
        });

        Self {
            remaining,
            running,
            handle,
        }
    }

    /// Halt the countdown without firing. Safe to call more than once.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.handle.abort();
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
