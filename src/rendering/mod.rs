//! Rendering: CPU canvas, scene painter and the wgpu presenter.

mod canvas;
mod scene;
mod system;

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::params::OverlayStyle;
use crate::session::RenderState;
use crate::water::FloaterField;

// Re-export public types
pub use canvas::{Canvas, Mask, Shadow};
pub use scene::paint_scene;
pub use system::{OverlayUniforms, RenderSystem};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to save frame: {0}")]
    SaveFrame(#[from] image::ImageError),
}

/// Canvas sized for the overlay window at `scale` device pixels per point
pub fn overlay_canvas(style: &OverlayStyle, scale: f32) -> Canvas {
    let size = (style.window_size() * scale).round();
    Canvas::new(size.x as u32, size.y as u32, scale)
}

/// Render one frame headlessly and write it as a PNG
pub fn save_frame(
    path: &Path,
    state: &RenderState,
    style: &OverlayStyle,
    floaters: &FloaterField,
    scale: f32,
) -> Result<(), RenderError> {
    let mut canvas = overlay_canvas(style, scale);
    paint_scene(&mut canvas, state, style, floaters);
    canvas.to_image().save(path)?;
    info!("Saved frame at {:.1}s to {}", state.elapsed, path.display());
    Ok(())
}
