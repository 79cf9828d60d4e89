//! Rendering seam between the shield and the host UI toolkit.
//!
//! The shield decides which covers exist and how opaque they are; drawing
//! them is the host's job. Every layer is full-screen and passes input
//! through.

use crate::presentation::cover::{CoverContent, LayerKind};
use std::sync::{Arc, Mutex};

/// Host-side drawing of cover layers.
pub trait CoverRenderer: Send {
    /// Add a layer above the app's content, fully transparent.
    fn attach(&mut self, layer: LayerKind, content: &CoverContent);

    /// Apply a new opacity to an attached layer.
    fn set_opacity(&mut self, layer: LayerKind, opacity: f32);

    /// Remove a layer.
    fn detach(&mut self, layer: LayerKind);
}

/// Draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl CoverRenderer for NullRenderer {
    fn attach(&mut self, _layer: LayerKind, _content: &CoverContent) {}
    fn set_opacity(&mut self, _layer: LayerKind, _opacity: f32) {}
    fn detach(&mut self, _layer: LayerKind) {}
}

/// Logs every operation; opacity updates at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRenderer;

impl CoverRenderer for TracingRenderer {
    fn attach(&mut self, layer: LayerKind, content: &CoverContent) {
        tracing::info!(%layer, glyph = %content.glyph, caption = %content.caption, "cover attached");
    }

    fn set_opacity(&mut self, layer: LayerKind, opacity: f32) {
        tracing::trace!(%layer, opacity, "cover opacity");
    }

    fn detach(&mut self, layer: LayerKind) {
        tracing::info!(%layer, "cover detached");
    }
}

/// A renderer call, as captured by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    Attach(LayerKind),
    Opacity(LayerKind, f32),
    Detach(LayerKind),
}

/// Records renderer calls for inspection.
///
/// Clones share the same log, so a host can keep one clone while the
/// runtime owns the other.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    ops: Arc<Mutex<Vec<RenderOp>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded so far.
    pub fn ops(&self) -> Vec<RenderOp> {
        self.lock().clone()
    }

    /// Number of times `layer` was attached.
    pub fn attach_count(&self, layer: LayerKind) -> usize {
        self.lock()
            .iter()
            .filter(|op| **op == RenderOp::Attach(layer))
            .count()
    }

    /// Whether `layer` is currently attached.
    pub fn is_attached(&self, layer: LayerKind) -> bool {
        self.lock()
            .iter()
            .rev()
            .find_map(|op| match op {
                RenderOp::Attach(l) if *l == layer => Some(true),
                RenderOp::Detach(l) if *l == layer => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Last opacity applied to `layer`.
    pub fn last_opacity(&self, layer: LayerKind) -> Option<f32> {
        self.lock().iter().rev().find_map(|op| match op {
            RenderOp::Opacity(l, opacity) if *l == layer => Some(*opacity),
            _ => None,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RenderOp>> {
        self.ops.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CoverRenderer for RecordingRenderer {
    fn attach(&mut self, layer: LayerKind, _content: &CoverContent) {
        self.lock().push(RenderOp::Attach(layer));
    }

    fn set_opacity(&mut self, layer: LayerKind, opacity: f32) {
        self.lock().push(RenderOp::Opacity(layer, opacity));
    }

    fn detach(&mut self, layer: LayerKind) {
        self.lock().push(RenderOp::Detach(layer));
    }
}
