//! Capture-state detection for the screen shield.
//!
//! This module provides the capture-state signal sources and the recording
//! detector that relays their changes to the host.

pub mod detector;
pub mod host;
pub mod noop;
pub mod types;

// Re-export commonly used types
pub use detector::{MonitorStart, RecordingDetector};
pub use host::HostCaptureSignal;
pub use noop::NoopCaptureSignal;
pub use types::{CaptureNotifier, CaptureSignal, SubscriptionToken};
