//! Presentation surface for the screen shield.
//!
//! This module owns the two cover layers (the opaque secured cover and the
//! blurred background cover), their opacity animations, and the renderer
//! seam through which the host draws them.

pub mod cover;
pub mod renderer;
pub mod surface;

// Re-export commonly used types
pub use cover::{BlurStyle, Completion, CoverContent, CoverLayer, Fade, LayerKind, OPAQUE, TRANSPARENT};
pub use renderer::{CoverRenderer, NullRenderer, RecordingRenderer, RenderOp, TracingRenderer};
pub use surface::PresentationSurface;
