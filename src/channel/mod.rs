//! Control-channel protocol for the screen shield.
//!
//! This module describes the request/reply and push messages exchanged with
//! the host application, and the reply handles that guarantee every request
//! is answered exactly once.

pub mod messenger;
pub mod responder;
pub mod types;

/// Default name of the control channel.
pub const CHANNEL_NAME: &str = "security_channel";

// Re-export commonly used types
pub use messenger::{HostMessenger, NullMessenger};
pub use responder::Responder;
pub use types::{Method, MethodCall, PushMessage, Reply, RECORDING_CHANGED};
