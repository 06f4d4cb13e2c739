use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info};

use crate::error::TransportError;
use crate::media::AudioArtifact;

use super::messages::{route_frame, Inbound};

/// Persistent duplex channel to the dialogue backend
///
/// Opened once at process start and held for the process lifetime; there
/// is no reconnect. The socket is split into a writer task fed by an
/// outbound queue and a reader task that routes frames to the engine.
/// Once either side observes a failure the channel is marked
/// disconnected and outbound sends are rejected, never silently dropped.
pub struct DialogueChannel {
    outbound: mpsc::Sender<Message>,
    connected: Arc<AtomicBool>,
    send_handle: JoinHandle<()>,
    recv_handle: JoinHandle<()>,
}

impl DialogueChannel {
    /// Connect and split. Returns the channel plus the stream of routed
    /// inbound events; the engine consumes the receiver.
    pub async fn connect(url: &str) -> Result<(Self, mpsc::Receiver<Inbound>), TransportError> {
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        info!("Connected to dialogue backend: {}", url);

        let (mut write, mut read) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::channel::<Message>(32);
        let (in_tx, in_rx) = mpsc::channel::<Inbound>(32);
        let connected = Arc::new(AtomicBool::new(true));

        let send_flag = Arc::clone(&connected);
        let send_handle = tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                if let Err(e) = write.send(message).await {
                    error!("Failed to send frame: {}", e);
                    send_flag.store(false, Ordering::SeqCst);
                    break;
                }
            }
        });

        let recv_flag = Arc::clone(&connected);
        let recv_handle = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        error!("Failed to read frame: {}", e);
                        break;
                    }
                };

                match route_frame(message) {
                    Some(Inbound::Closed) => {
                        info!("Dialogue channel closed by backend");
                        break;
                    }
                    Some(event) => {
                        if in_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    None => {}
                }
            }

            recv_flag.store(false, Ordering::SeqCst);
            let _ = in_tx.send(Inbound::Closed).await;
        });

        Ok((
            Self {
                outbound: out_tx,
                connected,
                send_handle,
                recv_handle,
            },
            in_rx,
        ))
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Ship one finalized artifact as a single binary frame. The artifact
    /// is consumed; on a downed channel the send is rejected so the
    /// caller knows the utterance was lost.
    pub async fn send_artifact(&self, artifact: AudioArtifact) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }

        self.outbound
            .send(Message::Binary(artifact.data))
            .await
            .map_err(|_| TransportError::Send("outbound writer stopped".to_string()))
    }

    /// Tear down the writer and reader tasks (process shutdown).
    pub fn shutdown(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.send_handle.abort();
        self.recv_handle.abort();
    }
}
