//! Capture signal driven by the native host shim.
//!
//! The platform layer observes the OS capture-state notification and forwards
//! each new value through [`HostCaptureSignal::set_captured`]. Observers are
//! only notified when the value actually changes.

use crate::capture::types::{CaptureNotifier, CaptureSignal, SubscriptionToken};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

pub struct HostCaptureSignal {
    supported: bool,
    captured: AtomicBool,
    next_token: AtomicU64,
    observers: Mutex<Vec<(SubscriptionToken, CaptureNotifier)>>,
}

impl HostCaptureSignal {
    /// A signal on a platform that supports capture-state detection.
    pub fn new() -> Self {
        Self::with_support(true)
    }

    /// A signal on an OS version without capture-state detection.
    pub fn unsupported() -> Self {
        Self::with_support(false)
    }

    fn with_support(supported: bool) -> Self {
        Self {
            supported,
            captured: AtomicBool::new(false),
            next_token: AtomicU64::new(1),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Record the capture state reported by the OS.
    ///
    /// Returns `true` if the value changed and observers were notified.
    /// Ignored when the platform is unsupported.
    pub fn set_captured(&self, captured: bool) -> bool {
        if !self.supported {
            return false;
        }

        let previous = self.captured.swap(captured, Ordering::SeqCst);
        if previous == captured {
            return false;
        }

        // Notify outside the lock; a notifier may re-enter the signal.
        let notifiers: Vec<CaptureNotifier> = self
            .observers()
            .iter()
            .map(|(_, notifier)| notifier.clone())
            .collect();
        for notifier in notifiers {
            notifier.notify(captured);
        }
        true
    }

    /// Number of live registrations.
    pub fn observer_count(&self) -> usize {
        self.observers().len()
    }

    fn observers(&self) -> MutexGuard<'_, Vec<(SubscriptionToken, CaptureNotifier)>> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for HostCaptureSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSignal for HostCaptureSignal {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn is_captured(&self) -> bool {
        self.supported && self.captured.load(Ordering::SeqCst)
    }

    fn subscribe(&self, notifier: CaptureNotifier) -> Option<SubscriptionToken> {
        if !self.supported {
            return None;
        }
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::SeqCst));
        self.observers().push((token, notifier));
        Some(token)
    }

    fn unsubscribe(&self, token: SubscriptionToken) {
        self.observers().retain(|(t, _)| *t != token);
    }
}

impl std::fmt::Debug for HostCaptureSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCaptureSignal")
            .field("supported", &self.supported)
            .field("captured", &self.captured.load(Ordering::SeqCst))
            .field("observers", &self.observer_count())
            .finish()
    }
}
