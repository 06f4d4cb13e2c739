pub mod channel;
pub mod messages;

pub use channel::DialogueChannel;
pub use messages::{route_frame, BackendMessage, Inbound};
