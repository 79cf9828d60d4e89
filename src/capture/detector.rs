//! Recording detector.
//!
//! Relays capture-state changes to the host. The detector keeps no state of
//! its own beyond the subscription token, and registers at most once no
//! matter how often monitoring is requested.

use crate::capture::types::{CaptureNotifier, CaptureSignal, SubscriptionToken};
use crate::channel::PushMessage;
use std::sync::Arc;

/// Outcome of a monitoring-start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStart {
    /// A new subscription was registered.
    Registered,
    /// A subscription already existed; nothing was registered.
    AlreadyRegistered,
    /// The platform has no capture-state signal.
    Unsupported,
}

pub struct RecordingDetector {
    signal: Arc<dyn CaptureSignal>,
    subscription: Option<SubscriptionToken>,
}

impl RecordingDetector {
    pub fn new(signal: Arc<dyn CaptureSignal>) -> Self {
        Self {
            signal,
            subscription: None,
        }
    }

    /// Query the capture state once.
    pub fn check(&self) -> bool {
        self.signal.is_supported() && self.signal.is_captured()
    }

    pub fn is_supported(&self) -> bool {
        self.signal.is_supported()
    }

    /// Whether a subscription is registered.
    pub fn is_monitoring(&self) -> bool {
        self.subscription.is_some()
    }

    /// Register for capture-state changes unless already registered.
    pub fn start(&mut self, notifier: CaptureNotifier) -> MonitorStart {
        if self.subscription.is_some() {
            return MonitorStart::AlreadyRegistered;
        }
        if !self.signal.is_supported() {
            return MonitorStart::Unsupported;
        }
        match self.signal.subscribe(notifier) {
            Some(token) => {
                self.subscription = Some(token);
                MonitorStart::Registered
            }
            None => MonitorStart::Unsupported,
        }
    }

    /// Build the push for a fired signal.
    ///
    /// `captured` is the state the signal carried when it fired. Returns
    /// `None` if no subscription is registered, which covers notifications
    /// racing a teardown.
    pub fn on_signal(&self, captured: bool) -> Option<PushMessage> {
        self.subscription?;
        Some(PushMessage::recording_changed(captured))
    }
}

impl Drop for RecordingDetector {
    fn drop(&mut self) {
        if let Some(token) = self.subscription.take() {
            self.signal.unsubscribe(token);
        }
    }
}

impl std::fmt::Debug for RecordingDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingDetector")
            .field("supported", &self.signal.is_supported())
            .field("subscription", &self.subscription)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{HostCaptureSignal, NoopCaptureSignal};

    #[test]
    fn test_start_registers_once() {
        let signal = Arc::new(HostCaptureSignal::new());
        let mut detector = RecordingDetector::new(signal.clone());

        assert_eq!(
            detector.start(CaptureNotifier::new(|_| {})),
            MonitorStart::Registered
        );
        assert_eq!(
            detector.start(CaptureNotifier::new(|_| {})),
            MonitorStart::AlreadyRegistered
        );
        assert_eq!(signal.observer_count(), 1);
    }

    #[test]
    fn test_unsupported_start() {
        let mut detector = RecordingDetector::new(Arc::new(NoopCaptureSignal));
        assert_eq!(
            detector.start(CaptureNotifier::new(|_| {})),
            MonitorStart::Unsupported
        );
        assert!(!detector.is_monitoring());
        assert!(detector.on_signal(true).is_none());
        assert!(!detector.check());
    }

    #[test]
    fn test_on_signal_pushes_fired_state() {
        let signal = Arc::new(HostCaptureSignal::new());
        let mut detector = RecordingDetector::new(signal.clone());
        assert!(detector.on_signal(true).is_none());

        detector.start(CaptureNotifier::new(|_| {}));
        signal.set_captured(true);
        signal.set_captured(false);

        // The push reflects the fired value, not the state read later.
        let push = detector.on_signal(true).unwrap();
        assert_eq!(push.recording_value(), Some(true));
    }

    #[test]
    fn test_drop_releases_subscription() {
        let signal = Arc::new(HostCaptureSignal::new());
        {
            let mut detector = RecordingDetector::new(signal.clone());
            detector.start(CaptureNotifier::new(|_| {}));
            assert_eq!(signal.observer_count(), 1);
        }
        assert_eq!(signal.observer_count(), 0);
    }
}
