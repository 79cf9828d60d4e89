//! Screen Shield - privacy overlay core for mobile apps.
//!
//! This library hides an app's content while it is backgrounded, and tells
//! the host application when the screen is being recorded or mirrored.
//!
//! # What it does
//!
//! - **Secured cover**: once armed, an opaque cover snaps over the app the
//!   instant it leaves the foreground
//! - **Background blur**: every background transition raises a blurred
//!   branding cover, armed or not
//! - **Recording detection**: the capture state can be queried, and changes
//!   are pushed to the host as `onScreenRecordingChanged`
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Control thread                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  host calls ──┐                                               │
//! │  lifecycle ───┼──▶ ShieldEvent inbox ──▶ SecurityController   │
//! │  capture ─────┘                              │       │        │
//! │                                              ▼       ▼        │
//! │                              PresentationSurface   pushes ──▶ host
//! │                              (secured + blur covers)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use screen_shield::{
//!     capture::HostCaptureSignal, channel::NullMessenger, presentation::NullRenderer,
//!     Config, ShieldRuntime,
//! };
//!
//! let runtime = ShieldRuntime::spawn(
//!     &Config::default(),
//!     Arc::new(HostCaptureSignal::new()),
//!     Box::new(NullRenderer),
//!     Box::new(NullMessenger),
//! )
//! .expect("Failed to start shield");
//!
//! let shield = runtime.handle();
//! let reply = shield.call_blocking("enableScreenSecurity", Duration::from_secs(1));
//! shield.lifecycle().will_resign_active();
//! ```

pub mod capture;
pub mod channel;
pub mod config;
pub mod controller;
pub mod directive;
pub mod lifecycle;
pub mod presentation;
pub mod runtime;
pub mod transparency;

// Re-export key types at crate root for convenience
pub use capture::{CaptureSignal, HostCaptureSignal, NoopCaptureSignal, RecordingDetector};
pub use channel::{HostMessenger, Method, MethodCall, PushMessage, Reply, Responder};
pub use config::{Config, ConfigError};
pub use controller::{SecurityController, SecurityMode, SecurityState, ShieldStatus};
pub use lifecycle::{AppPhase, LifecycleObserver, LifecycleTransition};
pub use presentation::{CoverRenderer, PresentationSurface};
pub use runtime::{RuntimeError, ShieldEvent, ShieldHandle, ShieldRuntime};
pub use transparency::{ActivityLog, ActivityStats, SharedActivityLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Declaration of what the shield does and does not do.
pub const SHIELD_DECLARATION: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                 SCREEN SHIELD - WHAT IT DOES                     ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  ✓ WHAT IT DOES:                                                 ║
║    • Covers the app when it leaves the foreground                ║
║    • Snaps an opaque cover on instantly while security is armed  ║
║    • Reports when the screen is recorded or mirrored             ║
║                                                                  ║
║  ✗ WHAT IT DOES NOT DO:                                          ║
║    • Block screenshots beyond what the platform itself offers    ║
║    • Act as DRM or hardware-level capture prevention             ║
║    • Encrypt content or enforce access control                   ║
║    • Store anything: all state lives in memory                   ║
║                                                                  ║
║  You can view this session's activity with:                     ║
║    screen-shield run   (summary printed on exit)                 ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
