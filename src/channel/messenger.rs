//! Outbound push sink.

use crate::channel::types::PushMessage;
use crossbeam_channel::Sender;

/// Where the controller sends unsolicited messages.
///
/// Implementations must not block; the controller calls this on the control
/// thread.
pub trait HostMessenger: Send {
    fn invoke_method(&self, push: PushMessage);
}

impl HostMessenger for Sender<PushMessage> {
    fn invoke_method(&self, push: PushMessage) {
        if self.try_send(push).is_err() {
            tracing::warn!("host push channel full or closed, push dropped");
        }
    }
}

/// Discards every push.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMessenger;

impl HostMessenger for NullMessenger {
    fn invoke_method(&self, _push: PushMessage) {}
}
