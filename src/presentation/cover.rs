//! Cover layers and their opacity animations.
//!
//! A cover is a full-screen, input-transparent layer with static content.
//! Its opacity is either settled or moving along a linear fade. A layer runs
//! at most one fade: starting another fade or snapping the opacity replaces
//! the running one, and its completion goes with it. Each replacement bumps
//! the layer's generation, which identifies the animation currently in charge.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const TRANSPARENT: f32 = 0.0;
pub const OPAQUE: f32 = 1.0;

/// Which cover a layer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Opaque cover shown while security is armed.
    Secured,
    /// Blurred branding cover shown during background transitions.
    BackgroundBlur,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Secured => write!(f, "secured"),
            LayerKind::BackgroundBlur => write!(f, "background-blur"),
        }
    }
}

/// Blur material behind the background cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurStyle {
    SystemMaterialDark,
    /// Fallback for platforms without material blurs.
    Dark,
}

impl BlurStyle {
    pub fn for_platform(material_supported: bool) -> Self {
        if material_supported {
            BlurStyle::SystemMaterialDark
        } else {
            BlurStyle::Dark
        }
    }
}

/// Static content drawn on a cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverContent {
    pub glyph: String,
    pub caption: String,
    /// `None` for the opaque secured cover.
    pub blur: Option<BlurStyle>,
}

impl CoverContent {
    /// Black cover with the lock glyph and a caption.
    pub fn secured(glyph: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            caption: caption.into(),
            blur: None,
        }
    }

    /// Blur cover with the lock glyph and the app's name.
    pub fn background(glyph: impl Into<String>, app_name: impl Into<String>, style: BlurStyle) -> Self {
        Self {
            glyph: glyph.into(),
            caption: app_name.into(),
            blur: Some(style),
        }
    }
}

/// What happens when a fade reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Keep,
    Destroy,
}

/// A linear opacity transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub from: f32,
    pub to: f32,
    pub started: Instant,
    pub duration: Duration,
}

impl Fade {
    pub fn new(from: f32, to: f32, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    /// Opacity at `now`, clamped to the fade's endpoints.
    pub fn value_at(&self, now: Instant) -> f32 {
        if self.is_finished(now) {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();
        let progress = (elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * progress
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.duration.is_zero() || now.saturating_duration_since(self.started) >= self.duration
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveFade {
    fade: Fade,
    completion: Completion,
}

/// Result of advancing a cover's animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Nothing is animating.
    Idle,
    /// Opacity moved; the fade continues.
    Moved(f32),
    /// The fade reached its target with this completion.
    Finished(Completion),
}

/// A single cover layer.
#[derive(Debug, Clone)]
pub struct CoverLayer {
    kind: LayerKind,
    content: CoverContent,
    opacity: f32,
    generation: u64,
    active: Option<ActiveFade>,
}

impl CoverLayer {
    /// A new, fully transparent layer.
    pub fn new(kind: LayerKind, content: CoverContent) -> Self {
        Self {
            kind,
            content,
            opacity: TRANSPARENT,
            generation: 0,
            active: None,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn content(&self) -> &CoverContent {
        &self.content
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Target of the running fade, if any.
    pub fn fade_target(&self) -> Option<f32> {
        self.active.map(|a| a.fade.to)
    }

    pub fn is_fading_in(&self) -> bool {
        self.fade_target() == Some(OPAQUE)
    }

    pub fn is_fading_out(&self) -> bool {
        self.fade_target() == Some(TRANSPARENT)
    }

    /// Whether the layer is already at (or heading to) `target`.
    pub fn settles_at(&self, target: f32) -> bool {
        match self.active {
            Some(active) => active.fade.to == target,
            None => self.opacity == target,
        }
    }

    /// Whether the running fade will destroy the layer when it finishes.
    pub fn pending_destroy(&self) -> bool {
        matches!(
            self.active,
            Some(ActiveFade {
                completion: Completion::Destroy,
                ..
            })
        )
    }

    /// Jump to `opacity` with no animation, cancelling any fade.
    pub fn snap(&mut self, opacity: f32) {
        self.generation += 1;
        self.active = None;
        self.opacity = opacity;
    }

    /// Start fading from the current opacity to `target`.
    ///
    /// Supersedes any running fade. Returns the new generation.
    pub fn fade_to(
        &mut self,
        target: f32,
        duration: Duration,
        now: Instant,
        completion: Completion,
    ) -> u64 {
        self.generation += 1;
        self.active = Some(ActiveFade {
            fade: Fade::new(self.opacity, target, now, duration),
            completion,
        });
        self.generation
    }

    /// Advance the running fade to `now`.
    pub fn step(&mut self, now: Instant) -> Step {
        let Some(active) = self.active else {
            return Step::Idle;
        };

        self.opacity = active.fade.value_at(now);
        if !active.fade.is_finished(now) {
            return Step::Moved(self.opacity);
        }

        // Only the current fade is ever stored, so its completion applies.
        self.active = None;
        Step::Finished(active.completion)
    }
}
