//! Water scene math: colour, surface geometry and floaters.
//!
//! Pure functions of elapsed time, progress and the overlay style. Coordinates
//! are in points with the origin at the bottom-left of the window (y up).

mod floaters;
mod surface;

use std::f64::consts::TAU;

use glam::{Vec2, Vec3};

use crate::params::{OverlayStyle, Rgb};

pub use floaters::{drift, Floater, FloaterField};
pub use surface::{meniscus_x, ripple_lines, rounded_rect, surface_y, water_outline, Ripple};

/// Below this level the fill is too thin to draw
pub const MIN_VISIBLE_LEVEL: f64 = 0.005;

/// Axis-aligned rectangle, y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn mid_x(&self) -> f32 {
        (self.min.x + self.max.x) * 0.5
    }

    pub fn mid_y(&self) -> f32 {
        (self.min.y + self.max.y) * 0.5
    }
}

/// The vessel rectangle inside the window
pub fn bar_rect(style: &OverlayStyle) -> Rect {
    Rect::new(style.glow_pad, style.glow_pad, style.bar_width, style.bar_height)
}

/// Water colour and opacity for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl Appearance {
    /// Interpolate start → end by `progress`, then apply the breathing factor
    pub fn at(progress: f64, elapsed: f64, style: &OverlayStyle) -> Self {
        let base = Self::without_breath(progress, style);
        let breath = breath_factor(elapsed, style);
        Self {
            rgb: base.rgb,
            alpha: (base.alpha * breath).clamp(0.0, 1.0),
        }
    }

    /// Colour and opacity as a pure function of progress
    pub fn without_breath(progress: f64, style: &OverlayStyle) -> Self {
        let p = progress.clamp(0.0, 1.0) as f32;
        Self {
            rgb: style.color_start.lerp(style.color_end, p),
            alpha: style.opacity_start + (style.opacity_end - style.opacity_start) * p,
        }
    }

    /// Colour scaled per channel, each channel capped at 1
    pub fn tint(&self, scale: Vec3) -> Rgb {
        (self.rgb * scale).min(Vec3::ONE)
    }
}

/// Slow opacity modulation, `1 ± breath_depth`
pub fn breath_factor(elapsed: f64, style: &OverlayStyle) -> f32 {
    let phase = (elapsed * TAU / style.breath_period_secs).sin() as f32;
    1.0 + style.breath_depth * phase
}
