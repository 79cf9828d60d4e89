//! Capture-state signal abstractions.
//!
//! A capture-state signal tells whether the screen is being recorded or
//! mirrored. Platforms without the capability report `false` and refuse
//! subscriptions; that is a normal outcome, not an error.

use std::sync::Arc;

/// Source of the platform's capture-state signal.
pub trait CaptureSignal: Send + Sync {
    /// Whether this platform exposes a capture-state signal at all.
    fn is_supported(&self) -> bool;

    /// Current capture state. Always `false` when unsupported.
    fn is_captured(&self) -> bool;

    /// Register for change notifications.
    ///
    /// Returns `None` when the platform has nothing to subscribe to.
    fn subscribe(&self, notifier: CaptureNotifier) -> Option<SubscriptionToken>;

    /// Release a registration made by [`CaptureSignal::subscribe`].
    fn unsubscribe(&self, token: SubscriptionToken);
}

/// Registration handle returned by [`CaptureSignal::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(pub u64);

/// Callback a capture source fires when the capture state changes.
///
/// Each firing carries the capture state read at the moment the signal
/// fired, so changes queued behind other work keep their order and values.
#[derive(Clone)]
pub struct CaptureNotifier {
    notify: Arc<dyn Fn(bool) + Send + Sync>,
}

impl CaptureNotifier {
    pub fn new(notify: impl Fn(bool) + Send + Sync + 'static) -> Self {
        Self {
            notify: Arc::new(notify),
        }
    }

    /// Fire the notification with the current capture state.
    pub fn notify(&self, captured: bool) {
        (self.notify)(captured);
    }
}

impl std::fmt::Debug for CaptureNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CaptureNotifier")
    }
}
