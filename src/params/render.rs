//! Overlay geometry and palette.

use glam::{Vec2, Vec3};

/// RGB triple, device colour space, components in [0, 1]
pub type Rgb = Vec3;

/// Look of the water bar overlay
///
/// All lengths are in points (logical pixels); the renderer scales them by
/// the window's scale factor.
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    /// Vessel width (points)
    pub bar_width: f32,

    /// Vessel height (points)
    pub bar_height: f32,

    /// Radius of the vessel's rounded ends (points)
    pub corner_radius: f32,

    /// Transparent padding around the vessel, room for the glow (points)
    pub glow_pad: f32,

    /// Distance from the bottom-right screen corner (points)
    pub edge_margin: f32,

    /// Period of the opacity "breathing" (seconds)
    pub breath_period_secs: f64,

    /// Relative breathing amplitude (0.03 = ±3%)
    pub breath_depth: f32,

    /// Number of drifting particles near the meniscus
    pub floater_count: usize,

    /// Water colour at the start of the session
    pub color_start: Rgb,

    /// Water colour at the end of the session
    pub color_end: Rgb,

    /// Base opacity at the start of the session
    pub opacity_start: f32,

    /// Base opacity at the end of the session
    pub opacity_end: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            bar_width: 140.0,
            bar_height: 20.0,
            corner_radius: 8.0,
            glow_pad: 12.0,
            edge_margin: 12.0,
            breath_period_secs: 7.0,
            breath_depth: 0.03,
            floater_count: 4,
            // Soft light blue water
            color_start: Vec3::new(0.50, 0.72, 0.92),
            color_end: Vec3::new(0.42, 0.62, 0.85),
            opacity_start: 0.55,
            opacity_end: 0.30,
        }
    }
}

impl OverlayStyle {
    /// Window size: bar plus glow padding on every side (points)
    pub fn window_size(&self) -> Vec2 {
        Vec2::new(
            self.bar_width + self.glow_pad * 2.0,
            self.bar_height + self.glow_pad * 2.0,
        )
    }
}
