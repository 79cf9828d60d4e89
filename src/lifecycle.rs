//! App lifecycle transitions.
//!
//! The host forwards the OS foreground/background notifications through a
//! [`LifecycleObserver`]; they are queued onto the control thread like any
//! other event.

use crate::runtime::ShieldEvent;
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

/// Whether the app is in front of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppPhase {
    Foreground,
    Background,
}

/// An OS lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleTransition {
    /// The app is about to leave the foreground.
    WillResignActive,
    /// The app is back in the foreground.
    DidBecomeActive,
}

impl LifecycleTransition {
    /// Phase the app is in once the transition is handled.
    pub fn phase_after(&self) -> AppPhase {
        match self {
            LifecycleTransition::WillResignActive => AppPhase::Background,
            LifecycleTransition::DidBecomeActive => AppPhase::Foreground,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LifecycleTransition::WillResignActive => "willResignActive",
            LifecycleTransition::DidBecomeActive => "didBecomeActive",
        }
    }
}

impl std::fmt::Display for LifecycleTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Forwards lifecycle notifications to the control thread.
///
/// Cheap to clone and safe to call from any thread.
#[derive(Debug, Clone)]
pub struct LifecycleObserver {
    sender: Sender<ShieldEvent>,
}

impl LifecycleObserver {
    pub(crate) fn new(sender: Sender<ShieldEvent>) -> Self {
        Self { sender }
    }

    pub fn will_resign_active(&self) -> bool {
        self.deliver(LifecycleTransition::WillResignActive)
    }

    pub fn did_become_active(&self) -> bool {
        self.deliver(LifecycleTransition::DidBecomeActive)
    }

    /// Queue a transition. Returns `false` once the runtime has stopped.
    pub fn deliver(&self, transition: LifecycleTransition) -> bool {
        self.sender.send(ShieldEvent::Lifecycle(transition)).is_ok()
    }
}
