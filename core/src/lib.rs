/// CareLink — hospital EMR client core
///
/// Typed client SDK for a multi-tenant hospital EMR/pharmacy backend:
/// per-namespace REST clients, the staff chat subsystem (stores plus a
/// reconnecting realtime channel), and the render state terminal views
/// consume. All authoritative state lives behind the backend API.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;

pub use chat::{ChannelState, ChatClient};
pub use config::Config;
pub use error::{ClientError, Result};
pub use session::Session;
