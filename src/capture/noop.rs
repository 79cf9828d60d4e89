//! Capture signal for platforms without capture-state support.
//!
//! This exists so the shield runs unchanged on targets (or OS versions) that
//! cannot tell whether the screen is being recorded.

use crate::capture::types::{CaptureNotifier, CaptureSignal, SubscriptionToken};

/// A capture signal that is never captured and never notifies.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCaptureSignal;

impl NoopCaptureSignal {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureSignal for NoopCaptureSignal {
    fn is_supported(&self) -> bool {
        false
    }

    fn is_captured(&self) -> bool {
        false
    }

    fn subscribe(&self, _notifier: CaptureNotifier) -> Option<SubscriptionToken> {
        None
    }

    fn unsubscribe(&self, _token: SubscriptionToken) {}
}
