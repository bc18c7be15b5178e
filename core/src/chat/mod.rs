/// Staff chat subsystem
///
/// Conversation and message stores, the realtime gateway channel, and the
/// orchestrating client. Business rules (authorization, ordering, id
/// generation) live behind the backend; this is view-facing state.
pub mod channel;
pub mod client;
pub mod conversations;
pub mod messages;
pub mod types;
pub mod view;

pub use channel::{ChannelState, RealtimeChannel};
pub use client::ChatClient;
pub use view::ChatViewState;
