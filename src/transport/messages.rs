use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

/// Text payload sent by the dialogue backend
#[derive(Debug, Serialize, Deserialize)]
pub struct BackendMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    /// Speaker tag ("user" or "ai"); the backend includes it on echoes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// An inbound happening on the dialogue channel
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Bot or echoed-user utterance text
    Transcript {
        content: String,
        role: Option<String>,
    },
    /// Synthesized reply audio, ready for playback
    ReplyAudio(Vec<u8>),
    /// The backend closed the channel
    Closed,
}

/// Route one wire frame purely by its framing: text frames carry typed
/// JSON, binary frames are always playable audio.
pub fn route_frame(message: Message) -> Option<Inbound> {
    match message {
        Message::Text(text) => match serde_json::from_str::<BackendMessage>(&text) {
            Ok(msg) if msg.kind == "transcript" => Some(Inbound::Transcript {
                content: msg.content,
                role: msg.role,
            }),
            Ok(msg) => {
                debug!("Ignoring backend message type: {}", msg.kind);
                None
            }
            Err(e) => {
                warn!("Unparseable text frame: {}", e);
                None
            }
        },
        Message::Binary(data) => Some(Inbound::ReplyAudio(data)),
        Message::Close(_) => Some(Inbound::Closed),
        _ => None,
    }
}
