//! Transparency module for the screen shield.
//!
//! Tracks what the shield did in this process, so the host can show users
//! when their screen was covered or reported as recorded.

pub mod log;

// Re-export commonly used types
pub use log::{create_shared_log, ActivityLog, ActivityStats, SharedActivityLog};
