//! The presentation surface owning both cover layers.
//!
//! Each operation touches only its own layer and is a no-op when that layer
//! is already in (or heading to) the requested state. Time is passed in by
//! the caller, and [`PresentationSurface::tick`] advances running fades.

use crate::presentation::cover::{
    Completion, CoverContent, CoverLayer, LayerKind, Step, OPAQUE, TRANSPARENT,
};
use crate::presentation::renderer::CoverRenderer;
use std::time::{Duration, Instant};

pub struct PresentationSurface {
    renderer: Box<dyn CoverRenderer>,
    secured_content: CoverContent,
    background_content: CoverContent,
    secured: Option<CoverLayer>,
    blur: Option<CoverLayer>,
}

impl PresentationSurface {
    pub fn new(
        renderer: Box<dyn CoverRenderer>,
        secured_content: CoverContent,
        background_content: CoverContent,
    ) -> Self {
        Self {
            renderer,
            secured_content,
            background_content,
            secured: None,
            blur: None,
        }
    }

    pub fn secured_cover(&self) -> Option<&CoverLayer> {
        self.secured.as_ref()
    }

    pub fn blur_cover(&self) -> Option<&CoverLayer> {
        self.blur.as_ref()
    }

    /// Whether any fade is still running.
    pub fn is_animating(&self) -> bool {
        [&self.secured, &self.blur]
            .into_iter()
            .flatten()
            .any(|layer| layer.fade_target().is_some())
    }

    /// Create the secured cover, transparent, if it does not exist.
    ///
    /// Returns `true` if a cover was created.
    pub fn ensure_secured_cover(&mut self) -> bool {
        if self.secured.is_some() {
            return false;
        }
        let layer = CoverLayer::new(LayerKind::Secured, self.secured_content.clone());
        self.renderer.attach(layer.kind(), layer.content());
        self.secured = Some(layer);
        true
    }

    /// Destroy the secured cover. Returns `true` if one existed.
    pub fn remove_secured_cover(&mut self) -> bool {
        if self.secured.take().is_none() {
            return false;
        }
        self.renderer.detach(LayerKind::Secured);
        true
    }

    /// Make the secured cover fully opaque with no animation.
    pub fn show_secured_cover_instant(&mut self) {
        let Some(layer) = self.secured.as_mut() else {
            return;
        };
        if layer.opacity() == OPAQUE && layer.fade_target().is_none() {
            return;
        }
        layer.snap(OPAQUE);
        self.renderer.set_opacity(LayerKind::Secured, OPAQUE);
    }

    /// Fade the secured cover out. The cover itself is kept.
    pub fn hide_secured_cover_animated(&mut self, duration: Duration, now: Instant) {
        let Some(layer) = self.secured.as_mut() else {
            return;
        };
        if layer.settles_at(TRANSPARENT) {
            return;
        }
        layer.fade_to(TRANSPARENT, duration, now, Completion::Keep);
        if duration.is_zero() {
            advance(&mut self.secured, self.renderer.as_mut(), now);
        }
    }

    /// Create the blur cover if needed and fade it in.
    pub fn show_blur_cover_animated(&mut self, duration: Duration, now: Instant) {
        if self.blur.is_none() {
            let layer = CoverLayer::new(LayerKind::BackgroundBlur, self.background_content.clone());
            self.renderer.attach(layer.kind(), layer.content());
            self.blur = Some(layer);
        }

        let Some(layer) = self.blur.as_mut() else {
            return;
        };
        // A pending destroy means the cover is leaving; reverse it.
        if layer.settles_at(OPAQUE) {
            return;
        }
        layer.fade_to(OPAQUE, duration, now, Completion::Keep);
        if duration.is_zero() {
            advance(&mut self.blur, self.renderer.as_mut(), now);
        }
    }

    /// Fade the blur cover out, destroying it afterwards if asked.
    pub fn hide_blur_cover_animated(&mut self, duration: Duration, now: Instant, then_destroy: bool) {
        let Some(layer) = self.blur.as_mut() else {
            return;
        };
        let completion = if then_destroy {
            Completion::Destroy
        } else {
            Completion::Keep
        };
        if layer.settles_at(TRANSPARENT) && (layer.pending_destroy() || !then_destroy) {
            return;
        }
        layer.fade_to(TRANSPARENT, duration, now, completion);
        if duration.is_zero() {
            advance(&mut self.blur, self.renderer.as_mut(), now);
        }
    }

    /// Advance running fades to `now`. Returns `true` while any fade runs.
    pub fn tick(&mut self, now: Instant) -> bool {
        advance(&mut self.secured, self.renderer.as_mut(), now);
        advance(&mut self.blur, self.renderer.as_mut(), now);
        self.is_animating()
    }
}

fn advance(slot: &mut Option<CoverLayer>, renderer: &mut dyn CoverRenderer, now: Instant) {
    let Some(layer) = slot.as_mut() else {
        return;
    };
    let kind = layer.kind();
    match layer.step(now) {
        Step::Idle => {}
        Step::Moved(opacity) => renderer.set_opacity(kind, opacity),
        Step::Finished(completion) => {
            renderer.set_opacity(kind, layer.opacity());
            if completion == Completion::Destroy {
                renderer.detach(kind);
                *slot = None;
            }
        }
    }
}

impl std::fmt::Debug for PresentationSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationSurface")
            .field("secured", &self.secured)
            .field("blur", &self.blur)
            .finish()
    }
}
