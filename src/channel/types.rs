//! Message types exchanged over the control channel.
//!
//! The transport itself belongs to the host. These types only describe what
//! travels over it: method calls from the host, replies to those calls, and
//! unsolicited pushes back to the host.

use serde::{Deserialize, Serialize};

/// Name of the push sent whenever the capture state changes.
pub const RECORDING_CHANGED: &str = "onScreenRecordingChanged";

/// Methods the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    EnableScreenSecurity,
    DisableScreenSecurity,
    CheckScreenRecording,
    PreventAppSwitcherSnapshot,
    StartScreenRecordingMonitoring,
}

impl Method {
    /// Every known method, in channel-table order.
    pub const ALL: [Method; 5] = [
        Method::EnableScreenSecurity,
        Method::DisableScreenSecurity,
        Method::CheckScreenRecording,
        Method::PreventAppSwitcherSnapshot,
        Method::StartScreenRecordingMonitoring,
    ];

    /// Resolve a wire name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// The wire name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            Method::EnableScreenSecurity => "enableScreenSecurity",
            Method::DisableScreenSecurity => "disableScreenSecurity",
            Method::CheckScreenRecording => "checkScreenRecording",
            Method::PreventAppSwitcherSnapshot => "preventAppSwitcherSnapshot",
            Method::StartScreenRecordingMonitoring => "startScreenRecordingMonitoring",
        }
    }

    /// One-line description for listings.
    pub fn description(&self) -> &'static str {
        match self {
            Method::EnableScreenSecurity => "Arm the secured cover for background transitions",
            Method::DisableScreenSecurity => "Disarm and destroy the secured cover",
            Method::CheckScreenRecording => "Report whether the screen is captured right now",
            Method::PreventAppSwitcherSnapshot => "Acknowledge; handled by the platform default",
            Method::StartScreenRecordingMonitoring => {
                "Push onScreenRecordingChanged on every capture change"
            }
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A method call as received from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    /// None of the known methods take arguments; kept for protocol parity.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: serde_json::Value::Null,
        }
    }

    /// The known method this call names, if any.
    pub fn resolve(&self) -> Option<Method> {
        Method::from_name(&self.method)
    }
}

impl From<Method> for MethodCall {
    fn from(method: Method) -> Self {
        Self::new(method.name())
    }
}

impl From<&str> for MethodCall {
    fn from(method: &str) -> Self {
        Self::new(method)
    }
}

/// Reply to a method call.
///
/// `NotImplemented` is a protocol marker for unknown methods, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Reply {
    Bool(bool),
    NotImplemented,
}

impl Reply {
    /// The boolean payload, or `None` for the not-implemented marker.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Reply::Bool(value) => Some(*value),
            Reply::NotImplemented => None,
        }
    }
}

impl From<bool> for Reply {
    fn from(value: bool) -> Self {
        Reply::Bool(value)
    }
}

/// An unsolicited message from the controller to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub method: String,
    pub arguments: serde_json::Value,
}

impl PushMessage {
    /// Push announcing the new capture state.
    pub fn recording_changed(is_recording: bool) -> Self {
        Self {
            method: RECORDING_CHANGED.to_string(),
            arguments: serde_json::Value::Bool(is_recording),
        }
    }

    /// The capture state carried by a recording-changed push.
    pub fn recording_value(&self) -> Option<bool> {
        if self.method == RECORDING_CHANGED {
            self.arguments.as_bool()
        } else {
            None
        }
    }
}
