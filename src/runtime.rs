//! The control thread.
//!
//! All shield state lives on one thread. Method calls, lifecycle transitions
//! and capture signals are queued onto its inbox from whatever thread they
//! arrive on, applied in order, and cover animations are advanced between
//! events.

use crate::capture::{CaptureNotifier, CaptureSignal};
use crate::channel::{HostMessenger, MethodCall, Reply, Responder};
use crate::config::Config;
use crate::controller::{SecurityController, ShieldStatus};
use crate::lifecycle::{LifecycleObserver, LifecycleTransition};
use crate::presentation::CoverRenderer;
use crate::transparency::{create_shared_log, SharedActivityLog};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long the control thread sleeps between checks while nothing animates.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// An event queued onto the control thread.
#[derive(Debug)]
pub enum ShieldEvent {
    /// A control-channel call awaiting its reply.
    Call(MethodCall, Responder),
    /// An OS lifecycle notification.
    Lifecycle(LifecycleTransition),
    /// The capture-state signal fired with this state.
    CaptureChanged(bool),
    /// A request for a status snapshot.
    Status(Sender<ShieldStatus>),
    Shutdown,
}

/// Errors from the runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to spawn control thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("runtime has stopped")]
    Stopped,
    #[error("timed out waiting for the control thread")]
    Timeout,
}

/// Owner of the control thread.
pub struct ShieldRuntime {
    sender: Sender<ShieldEvent>,
    running: Arc<AtomicBool>,
    activity: SharedActivityLog,
    thread_handle: Option<JoinHandle<()>>,
}

impl ShieldRuntime {
    /// Start the control thread with a fresh controller.
    pub fn spawn(
        config: &Config,
        capture: Arc<dyn CaptureSignal>,
        renderer: Box<dyn CoverRenderer>,
        messenger: Box<dyn HostMessenger>,
    ) -> Result<Self, RuntimeError> {
        let (sender, receiver) = unbounded();
        let activity = create_shared_log();

        let controller = SecurityController::new(
            config,
            capture,
            renderer,
            messenger,
            capture_notifier(sender.clone()),
        )
        .with_activity_log(activity.clone());

        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        let frame_interval = config.frame_interval;

        let handle = thread::Builder::new()
            .name("shield-control".to_string())
            .spawn(move || {
                run_loop(controller, receiver, frame_interval);
                r.store(false, Ordering::SeqCst);
            })?;

        tracing::debug!(channel = %config.channel_name, "control thread started");

        Ok(Self {
            sender,
            running,
            activity,
            thread_handle: Some(handle),
        })
    }

    /// A cloneable handle for talking to the control thread.
    pub fn handle(&self) -> ShieldHandle {
        ShieldHandle {
            sender: self.sender.clone(),
        }
    }

    pub fn activity(&self) -> &SharedActivityLog {
        &self.activity
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the control thread and wait for it to exit.
    ///
    /// Calls still queued are answered `false`.
    pub fn stop(&mut self) {
        let _ = self.sender.send(ShieldEvent::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::error!("control thread panicked");
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Drop for ShieldRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Cloneable access to a running shield.
#[derive(Debug, Clone)]
pub struct ShieldHandle {
    sender: Sender<ShieldEvent>,
}

impl ShieldHandle {
    /// Queue a call. The reply arrives on the returned receiver.
    ///
    /// A call made after shutdown is answered `false` immediately.
    pub fn call(&self, call: impl Into<MethodCall>) -> Receiver<Reply> {
        let call = call.into();
        let (responder, rx) = Responder::channel(call.method.clone());
        // On failure the event comes back in the error and its responder
        // answers `false` as it drops.
        let _ = self.sender.send(ShieldEvent::Call(call, responder));
        rx
    }

    /// Queue a call and wait for its reply.
    pub fn call_blocking(
        &self,
        call: impl Into<MethodCall>,
        timeout: Duration,
    ) -> Result<Reply, RuntimeError> {
        self.call(call)
            .recv_timeout(timeout)
            .map_err(|_| RuntimeError::Timeout)
    }

    /// Ask the control thread for a status snapshot.
    pub fn status(&self, timeout: Duration) -> Result<ShieldStatus, RuntimeError> {
        let (tx, rx) = bounded(1);
        self.sender
            .send(ShieldEvent::Status(tx))
            .map_err(|_| RuntimeError::Stopped)?;
        rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => RuntimeError::Timeout,
            RecvTimeoutError::Disconnected => RuntimeError::Stopped,
        })
    }

    /// Observer the host feeds OS lifecycle notifications into.
    pub fn lifecycle(&self) -> LifecycleObserver {
        LifecycleObserver::new(self.sender.clone())
    }
}

fn capture_notifier(sender: Sender<ShieldEvent>) -> CaptureNotifier {
    CaptureNotifier::new(move |captured| {
        let _ = sender.send(ShieldEvent::CaptureChanged(captured));
    })
}

fn run_loop(
    mut controller: SecurityController,
    receiver: Receiver<ShieldEvent>,
    frame_interval: Duration,
) {
    let mut animating = false;

    loop {
        let wait = if animating { frame_interval } else { IDLE_POLL };
        match receiver.recv_timeout(wait) {
            Ok(ShieldEvent::Shutdown) => break,
            Ok(event) => apply(&mut controller, event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        animating = controller.tick(Instant::now());
    }

    // Whatever is still queued gets an answer before the inbox closes.
    for event in receiver.try_iter() {
        if let ShieldEvent::Call(_, responder) = event {
            responder.send(Reply::Bool(false));
        }
    }
    tracing::debug!("control thread stopped");
}

fn apply(controller: &mut SecurityController, event: ShieldEvent) {
    match event {
        ShieldEvent::Call(call, responder) => controller.respond(&call, responder),
        ShieldEvent::Lifecycle(transition) => {
            controller.handle_lifecycle(transition, Instant::now())
        }
        ShieldEvent::CaptureChanged(captured) => controller.on_capture_signal(captured),
        ShieldEvent::Status(reply) => {
            let _ = reply.send(controller.status());
        }
        ShieldEvent::Shutdown => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::NoopCaptureSignal;
    use crate::channel::NullMessenger;
    use crate::presentation::NullRenderer;

    const WAIT: Duration = Duration::from_secs(2);

    fn runtime() -> ShieldRuntime {
        ShieldRuntime::spawn(
            &Config::default(),
            Arc::new(NoopCaptureSignal),
            Box::new(NullRenderer),
            Box::new(NullMessenger),
        )
        .unwrap()
    }

    #[test]
    fn test_call_round_trip() {
        let runtime = runtime();
        let handle = runtime.handle();

        assert_eq!(
            handle.call_blocking("enableScreenSecurity", WAIT).unwrap(),
            Reply::Bool(true)
        );
        assert_eq!(
            handle.call_blocking("bogus", WAIT).unwrap(),
            Reply::NotImplemented
        );
        assert_eq!(runtime.activity().stats().calls_handled, 2);
    }

    #[test]
    fn test_calls_after_stop_answer_false() {
        let mut runtime = runtime();
        let handle = runtime.handle();
        runtime.stop();

        assert!(!runtime.is_running());
        assert_eq!(
            handle.call_blocking("enableScreenSecurity", WAIT).unwrap(),
            Reply::Bool(false)
        );
        assert!(matches!(handle.status(WAIT), Err(RuntimeError::Stopped)));
        assert!(!handle.lifecycle().will_resign_active());
    }
}
