//! The security controller state machine.
//!
//! The controller owns the security state, the presentation surface and the
//! recording detector. It runs on the control thread only, so none of its
//! state needs locking: calls, lifecycle transitions and capture signals are
//! all applied here in arrival order.
//!
//! # States
//!
//! `Unsecured`/`Secured` is the enablement flag, crossed with the app phase
//! (`Foreground`/`Background`) and the last known capture state. Enabling
//! only arms the secured cover; covers change opacity on lifecycle
//! transitions.

use crate::capture::{CaptureNotifier, CaptureSignal, MonitorStart, RecordingDetector};
use crate::channel::{HostMessenger, Method, MethodCall, Reply, Responder};
use crate::config::Config;
use crate::lifecycle::{AppPhase, LifecycleTransition};
use crate::presentation::{CoverLayer, CoverRenderer, PresentationSurface};
use crate::transparency::{create_shared_log, SharedActivityLog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Process-wide security state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityState {
    /// Whether the secured cover is armed for background transitions.
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    Unsecured,
    Secured,
}

/// Fade durations applied on lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverTiming {
    pub blur_fade_in: Duration,
    pub blur_fade_out: Duration,
    pub secured_fade_out: Duration,
}

impl From<&Config> for CoverTiming {
    fn from(config: &Config) -> Self {
        Self {
            blur_fade_in: config.blur_fade_in,
            blur_fade_out: config.blur_fade_out,
            secured_fade_out: config.secured_fade_out,
        }
    }
}

/// Opacity state of one cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverStatus {
    pub opacity: f32,
    pub fade_target: Option<f32>,
}

impl From<&CoverLayer> for CoverStatus {
    fn from(layer: &CoverLayer) -> Self {
        Self {
            opacity: layer.opacity(),
            fade_target: layer.fade_target(),
        }
    }
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldStatus {
    pub instance_id: Uuid,
    pub mode: SecurityMode,
    pub phase: AppPhase,
    pub recording: bool,
    pub capture_supported: bool,
    pub monitoring: bool,
    pub secured_cover: Option<CoverStatus>,
    pub blur_cover: Option<CoverStatus>,
    pub observed_at: DateTime<Utc>,
}

pub struct SecurityController {
    instance_id: Uuid,
    state: SecurityState,
    phase: AppPhase,
    recording: bool,
    timing: CoverTiming,
    surface: PresentationSurface,
    detector: RecordingDetector,
    notifier: CaptureNotifier,
    messenger: Box<dyn HostMessenger>,
    activity: SharedActivityLog,
}

impl SecurityController {
    /// Create a controller in the `Unsecured, Foreground, Idle` state.
    ///
    /// `notifier` is handed to the capture signal when monitoring starts; it
    /// must route back to [`SecurityController::on_capture_signal`] on the
    /// control thread.
    pub fn new(
        config: &Config,
        capture: Arc<dyn CaptureSignal>,
        renderer: Box<dyn CoverRenderer>,
        messenger: Box<dyn HostMessenger>,
        notifier: CaptureNotifier,
    ) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            state: SecurityState::default(),
            phase: AppPhase::Foreground,
            recording: false,
            timing: CoverTiming::from(config),
            surface: PresentationSurface::new(
                renderer,
                config.secured_content(),
                config.background_content(),
            ),
            detector: RecordingDetector::new(capture),
            notifier,
            messenger,
            activity: create_shared_log(),
        }
    }

    /// Use a shared activity log instead of a private one.
    pub fn with_activity_log(mut self, activity: SharedActivityLog) -> Self {
        self.activity = activity;
        self
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn state(&self) -> SecurityState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn mode(&self) -> SecurityMode {
        if self.state.enabled {
            SecurityMode::Secured
        } else {
            SecurityMode::Unsecured
        }
    }

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    /// Last capture state observed through a check or a signal.
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_monitoring(&self) -> bool {
        self.detector.is_monitoring()
    }

    pub fn surface(&self) -> &PresentationSurface {
        &self.surface
    }

    pub fn activity(&self) -> &SharedActivityLog {
        &self.activity
    }

    /// Answer a control-channel call through its responder.
    pub fn respond(&mut self, call: &MethodCall, responder: Responder) {
        let reply = self.handle_call(call);
        responder.send(reply);
    }

    /// Dispatch a control-channel call.
    pub fn handle_call(&mut self, call: &MethodCall) -> Reply {
        self.activity.record_call();

        let Some(method) = call.resolve() else {
            self.activity.record_unknown_call();
            tracing::warn!(method = %call.method, "unknown method, replying not implemented");
            return Reply::NotImplemented;
        };

        let result = match method {
            Method::EnableScreenSecurity => self.enable_screen_security(),
            Method::DisableScreenSecurity => self.disable_screen_security(),
            Method::CheckScreenRecording => self.check_screen_recording(),
            Method::PreventAppSwitcherSnapshot => self.prevent_app_switcher_snapshot(),
            Method::StartScreenRecordingMonitoring => self.start_screen_recording_monitoring(),
        };
        Reply::Bool(result)
    }

    /// Arm the secured cover, constructing it if absent.
    pub fn enable_screen_security(&mut self) -> bool {
        self.surface.ensure_secured_cover();
        self.state.enabled = true;
        self.activity.record_security_enable();
        tracing::info!("screen security enabled");
        true
    }

    /// Disarm and destroy the secured cover.
    pub fn disable_screen_security(&mut self) -> bool {
        self.surface.remove_secured_cover();
        self.state.enabled = false;
        tracing::info!("screen security disabled");
        true
    }

    /// Read the capture state once. `false` without platform support.
    pub fn check_screen_recording(&mut self) -> bool {
        let recording = self.detector.check();
        self.recording = recording;
        tracing::debug!(recording, "capture state checked");
        recording
    }

    /// Register for capture changes. Always acknowledges.
    pub fn start_screen_recording_monitoring(&mut self) -> bool {
        match self.detector.start(self.notifier.clone()) {
            MonitorStart::Registered => tracing::info!("screen recording monitoring started"),
            MonitorStart::AlreadyRegistered => {
                tracing::debug!("screen recording monitoring already running")
            }
            MonitorStart::Unsupported => {
                tracing::info!("capture-state signal unsupported, monitoring not started")
            }
        }
        true
    }

    /// The platform's own snapshot handling covers this; acknowledge only.
    pub fn prevent_app_switcher_snapshot(&mut self) -> bool {
        true
    }

    /// Apply an OS lifecycle transition.
    pub fn handle_lifecycle(&mut self, transition: LifecycleTransition, now: Instant) {
        tracing::debug!(%transition, enabled = self.state.enabled, "lifecycle transition");
        match transition {
            LifecycleTransition::WillResignActive => {
                // Blur first; the armed cover snaps visible right after it.
                self.surface
                    .show_blur_cover_animated(self.timing.blur_fade_in, now);
                self.activity.record_background_cover();
                if self.state.enabled {
                    self.surface.show_secured_cover_instant();
                    self.activity.record_secured_reveal();
                }
            }
            LifecycleTransition::DidBecomeActive => {
                self.surface
                    .hide_blur_cover_animated(self.timing.blur_fade_out, now, true);
                self.surface
                    .hide_secured_cover_animated(self.timing.secured_fade_out, now);
            }
        }
        self.phase = transition.phase_after();
    }

    /// The capture signal fired with `captured`: push it to the host.
    pub fn on_capture_signal(&mut self, captured: bool) {
        let Some(push) = self.detector.on_signal(captured) else {
            return;
        };
        if let Some(recording) = push.recording_value() {
            self.recording = recording;
            if recording {
                tracing::info!("screen recording started");
            } else {
                tracing::info!("screen recording stopped");
            }
        }
        self.messenger.invoke_method(push);
        self.activity.record_capture_push();
    }

    /// Advance cover animations. Returns `true` while any fade runs.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.surface.tick(now)
    }

    pub fn status(&self) -> ShieldStatus {
        ShieldStatus {
            instance_id: self.instance_id,
            mode: self.mode(),
            phase: self.phase,
            recording: self.recording,
            capture_supported: self.detector.is_supported(),
            monitoring: self.detector.is_monitoring(),
            secured_cover: self.surface.secured_cover().map(CoverStatus::from),
            blur_cover: self.surface.blur_cover().map(CoverStatus::from),
            observed_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for SecurityController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityController")
            .field("instance_id", &self.instance_id)
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("recording", &self.recording)
            .field("surface", &self.surface)
            .field("detector", &self.detector)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{HostCaptureSignal, NoopCaptureSignal};
    use crate::channel::PushMessage;
    use crate::presentation::{LayerKind, RecordingRenderer, OPAQUE, TRANSPARENT};
    use crossbeam_channel::{unbounded, Receiver};
    use std::sync::Mutex;

    const LONG: Duration = Duration::from_secs(1);

    struct Harness {
        controller: SecurityController,
        renderer: RecordingRenderer,
        pushes: Receiver<PushMessage>,
        signal: Arc<HostCaptureSignal>,
        pending: Arc<Mutex<Vec<bool>>>,
    }

    impl Harness {
        fn new(signal: HostCaptureSignal) -> Self {
            let signal = Arc::new(signal);
            let renderer = RecordingRenderer::new();
            let (tx, pushes) = unbounded();
            // Signals are queued here and drained by `pump`, like the runtime does.
            let pending = Arc::new(Mutex::new(Vec::new()));
            let p = pending.clone();
            let notifier = CaptureNotifier::new(move |captured| p.lock().unwrap().push(captured));
            let controller = SecurityController::new(
                &Config::default(),
                signal.clone(),
                Box::new(renderer.clone()),
                Box::new(tx),
                notifier,
            );
            Self {
                controller,
                renderer,
                pushes,
                signal,
                pending,
            }
        }

        fn call(&mut self, method: &str) -> Reply {
            self.controller.handle_call(&MethodCall::new(method))
        }

        fn pump(&mut self) {
            let fired = std::mem::take(&mut *self.pending.lock().unwrap());
            for captured in fired {
                self.controller.on_capture_signal(captured);
            }
        }

        fn pushes(&self) -> Vec<bool> {
            self.pushes
                .try_iter()
                .filter_map(|p| p.recording_value())
                .collect()
        }
    }

    #[test]
    fn test_initial_state() {
        let h = Harness::new(HostCaptureSignal::new());
        assert_eq!(h.controller.mode(), SecurityMode::Unsecured);
        assert_eq!(h.controller.phase(), AppPhase::Foreground);
        assert!(!h.controller.is_recording());
        assert!(h.controller.surface().secured_cover().is_none());
        assert!(h.controller.surface().blur_cover().is_none());
    }

    #[test]
    fn test_enable_does_not_show_cover() {
        let mut h = Harness::new(HostCaptureSignal::new());

        assert_eq!(h.call("enableScreenSecurity"), Reply::Bool(true));

        assert!(h.controller.is_enabled());
        let cover = h.controller.surface().secured_cover().unwrap();
        assert_eq!(cover.opacity(), TRANSPARENT);
        assert!(cover.fade_target().is_none());
    }

    #[test]
    fn test_enable_twice_keeps_one_cover() {
        let mut h = Harness::new(HostCaptureSignal::new());

        assert_eq!(h.call("enableScreenSecurity"), Reply::Bool(true));
        assert_eq!(h.call("enableScreenSecurity"), Reply::Bool(true));

        assert_eq!(h.renderer.attach_count(LayerKind::Secured), 1);
        assert!(h.controller.surface().secured_cover().is_some());
    }

    #[test]
    fn test_disable_destroys_cover() {
        let mut h = Harness::new(HostCaptureSignal::new());
        h.call("enableScreenSecurity");

        assert_eq!(h.call("disableScreenSecurity"), Reply::Bool(true));

        assert!(!h.controller.is_enabled());
        assert!(h.controller.surface().secured_cover().is_none());
        assert!(!h.renderer.is_attached(LayerKind::Secured));
    }

    #[test]
    fn test_background_when_secured_snaps_cover_visible() {
        let mut h = Harness::new(HostCaptureSignal::new());
        let t0 = Instant::now();
        h.call("enableScreenSecurity");

        h.controller
            .handle_lifecycle(LifecycleTransition::WillResignActive, t0);

        let secured = h.controller.surface().secured_cover().unwrap();
        assert_eq!(secured.opacity(), OPAQUE);
        assert!(secured.fade_target().is_none());

        let blur = h.controller.surface().blur_cover().unwrap();
        assert!(blur.is_fading_in());
        assert_eq!(blur.opacity(), TRANSPARENT);
        assert_eq!(h.controller.phase(), AppPhase::Background);

        // The blur layer was attached before the secured cover was revealed.
        let ops = h.renderer.ops();
        let blur_at = ops
            .iter()
            .position(|op| *op == crate::presentation::RenderOp::Attach(LayerKind::BackgroundBlur))
            .unwrap();
        let reveal_at = ops
            .iter()
            .position(|op| *op == crate::presentation::RenderOp::Opacity(LayerKind::Secured, OPAQUE))
            .unwrap();
        assert!(blur_at < reveal_at);
    }

    #[test]
    fn test_background_when_unsecured_shows_only_blur() {
        let mut h = Harness::new(HostCaptureSignal::new());
        let t0 = Instant::now();
        h.call("enableScreenSecurity");
        h.call("disableScreenSecurity");

        h.controller
            .handle_lifecycle(LifecycleTransition::WillResignActive, t0);
        h.controller.tick(t0 + LONG);

        assert!(h.controller.surface().secured_cover().is_none());
        assert_eq!(h.controller.surface().blur_cover().unwrap().opacity(), OPAQUE);
    }

    #[test]
    fn test_foreground_clears_covers() {
        for enabled in [true, false] {
            let mut h = Harness::new(HostCaptureSignal::new());
            let t0 = Instant::now();
            if enabled {
                h.call("enableScreenSecurity");
            }

            h.controller
                .handle_lifecycle(LifecycleTransition::WillResignActive, t0);
            h.controller.tick(t0 + Duration::from_millis(50));
            let t1 = t0 + Duration::from_millis(100);
            h.controller
                .handle_lifecycle(LifecycleTransition::DidBecomeActive, t1);
            assert!(!h.controller.tick(t1 + LONG));

            assert!(h.controller.surface().blur_cover().is_none());
            assert!(!h.renderer.is_attached(LayerKind::BackgroundBlur));
            if let Some(secured) = h.controller.surface().secured_cover() {
                assert_eq!(secured.opacity(), TRANSPARENT);
            }
            assert_eq!(h.controller.is_enabled(), enabled);
            assert_eq!(h.controller.phase(), AppPhase::Foreground);
        }
    }

    #[test]
    fn test_secured_cover_fades_over_configured_duration() {
        let mut h = Harness::new(HostCaptureSignal::new());
        let t0 = Instant::now();
        h.call("enableScreenSecurity");
        h.controller
            .handle_lifecycle(LifecycleTransition::WillResignActive, t0);

        let t1 = t0 + LONG;
        h.controller
            .handle_lifecycle(LifecycleTransition::DidBecomeActive, t1);
        h.controller.tick(t1 + Duration::from_millis(250));

        // Blur (200ms) is gone, secured (300ms) is still fading.
        assert!(h.controller.surface().blur_cover().is_none());
        let secured = h.controller.surface().secured_cover().unwrap();
        assert!(secured.is_fading_out());
        assert!(secured.opacity() > TRANSPARENT);
    }

    #[test]
    fn test_background_during_secured_fade_out_restores_cover() {
        let mut h = Harness::new(HostCaptureSignal::new());
        let t0 = Instant::now();
        h.call("enableScreenSecurity");
        h.controller
            .handle_lifecycle(LifecycleTransition::WillResignActive, t0);

        let t1 = t0 + LONG;
        h.controller
            .handle_lifecycle(LifecycleTransition::DidBecomeActive, t1);
        h.controller.tick(t1 + Duration::from_millis(100));
        assert!(h.controller.surface().secured_cover().unwrap().is_fading_out());

        // Leave again before the 300ms fade finishes.
        let t2 = t1 + Duration::from_millis(150);
        h.controller
            .handle_lifecycle(LifecycleTransition::WillResignActive, t2);
        let secured = h.controller.surface().secured_cover().unwrap();
        assert_eq!(secured.opacity(), OPAQUE);
        assert!(secured.fade_target().is_none());

        // The abandoned fade-out never lands.
        h.controller.tick(t2 + LONG);
        assert_eq!(h.controller.surface().secured_cover().unwrap().opacity(), OPAQUE);
        assert_eq!(h.renderer.last_opacity(LayerKind::Secured), Some(OPAQUE));
        assert_eq!(h.controller.surface().blur_cover().unwrap().opacity(), OPAQUE);
    }

    #[test]
    fn test_check_recording_independent_of_enabled() {
        let mut h = Harness::new(HostCaptureSignal::new());
        h.signal.set_captured(true);

        for method in [
            "enableScreenSecurity",
            "disableScreenSecurity",
            "enableScreenSecurity",
            "enableScreenSecurity",
        ] {
            h.call(method);
            assert_eq!(h.call("checkScreenRecording"), Reply::Bool(true));
        }

        h.signal.set_captured(false);
        assert_eq!(h.call("checkScreenRecording"), Reply::Bool(false));
    }

    #[test]
    fn test_check_recording_unsupported_is_false() {
        let signal: Arc<dyn CaptureSignal> = Arc::new(NoopCaptureSignal);
        let mut controller = SecurityController::new(
            &Config::default(),
            signal,
            Box::new(RecordingRenderer::new()),
            Box::new(crate::channel::NullMessenger),
            CaptureNotifier::new(|_| {}),
        );
        assert_eq!(
            controller.handle_call(&MethodCall::new("checkScreenRecording")),
            Reply::Bool(false)
        );
    }

    #[test]
    fn test_unknown_method_not_implemented() {
        let mut h = Harness::new(HostCaptureSignal::new());
        let reply = h.call("takeScreenshot");
        assert_eq!(reply, Reply::NotImplemented);
        assert_eq!(reply.as_bool(), None);
        assert_eq!(h.controller.activity().stats().unknown_calls, 1);
    }

    #[test]
    fn test_prevent_snapshot_acknowledges() {
        let mut h = Harness::new(HostCaptureSignal::new());
        assert_eq!(h.call("preventAppSwitcherSnapshot"), Reply::Bool(true));
        assert!(!h.controller.is_enabled());
    }

    #[test]
    fn test_monitoring_pushes_changes() {
        let mut h = Harness::new(HostCaptureSignal::new());
        assert_eq!(h.call("startScreenRecordingMonitoring"), Reply::Bool(true));

        h.signal.set_captured(true);
        h.pump();
        h.signal.set_captured(false);
        h.pump();

        assert_eq!(h.pushes(), vec![true, false]);
        assert!(!h.controller.is_recording());
    }

    #[test]
    fn test_queued_signals_keep_their_values() {
        let mut h = Harness::new(HostCaptureSignal::new());
        h.call("startScreenRecordingMonitoring");

        // A recording starts and stops before the controller gets to run.
        h.signal.set_captured(true);
        h.signal.set_captured(false);
        h.pump();

        assert_eq!(h.pushes(), vec![true, false]);
        assert!(!h.controller.is_recording());
    }

    #[test]
    fn test_repeated_monitoring_start_pushes_once() {
        let mut h = Harness::new(HostCaptureSignal::new());
        for _ in 0..3 {
            assert_eq!(h.call("startScreenRecordingMonitoring"), Reply::Bool(true));
        }

        h.signal.set_captured(true);
        h.pump();

        assert_eq!(h.signal.observer_count(), 1);
        assert_eq!(h.pushes(), vec![true]);
    }

    #[test]
    fn test_monitoring_unsupported_never_pushes() {
        let mut h = Harness::new(HostCaptureSignal::unsupported());
        assert_eq!(h.call("startScreenRecordingMonitoring"), Reply::Bool(true));
        assert!(!h.controller.is_monitoring());

        h.signal.set_captured(true);
        h.pump();
        h.controller.on_capture_signal(true);

        assert!(h.pushes().is_empty());
    }

    #[test]
    fn test_respond_answers_through_responder() {
        let mut h = Harness::new(HostCaptureSignal::new());
        let call = MethodCall::new("enableScreenSecurity");
        let (responder, rx) = Responder::channel(call.method.clone());

        h.controller.respond(&call, responder);

        assert_eq!(rx.try_recv().unwrap(), Reply::Bool(true));
    }

    #[test]
    fn test_status_snapshot() {
        let mut h = Harness::new(HostCaptureSignal::new());
        h.call("enableScreenSecurity");
        h.call("startScreenRecordingMonitoring");
        h.controller
            .handle_lifecycle(LifecycleTransition::WillResignActive, Instant::now());

        let status = h.controller.status();
        assert_eq!(status.mode, SecurityMode::Secured);
        assert_eq!(status.phase, AppPhase::Background);
        assert!(status.monitoring);
        assert!(status.capture_supported);
        assert_eq!(status.secured_cover.unwrap().opacity, OPAQUE);
        assert_eq!(status.blur_cover.unwrap().fade_target, Some(OPAQUE));
        assert_eq!(status.instance_id, h.controller.instance_id());
    }
}
