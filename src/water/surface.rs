//! Wavy water boundary and internal ripples.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use super::Rect;

/// Vertical step when tracing the meniscus (points)
const MENISCUS_STEP: f32 = 0.5;

/// Horizontal step when tracing the surface and ripples (points)
const SURFACE_STEP: f32 = 1.0;

/// Vertical spacing between ripple lines (points)
const RIPPLE_SPACING: f32 = 4.5;

/// Ripple line opacity relative to the water alpha
const RIPPLE_ALPHA: f32 = 0.07;

/// x of the meniscus at height `y_rel` above the bar bottom
///
/// Two superimposed waves simulate surface tension along the right edge.
pub fn meniscus_x(surface_x: f32, y_rel: f32, t: f64) -> f32 {
    let y = y_rel as f64;
    let wave = 1.2 * (y / 4.0 + t * 1.1).sin() + 0.6 * (y / 2.5 + t * 0.7 + 1.3).sin();
    surface_x + wave as f32
}

/// y of the water surface at window x
///
/// Three waves with unrelated spatial and temporal frequencies, so the
/// pattern never visibly repeats.
pub fn surface_y(top: f32, x: f32, t: f64) -> f32 {
    let x = x as f64;
    let wave = 1.2 * (x / 14.0 + t * 0.6).sin()
        + 0.5 * (x / 7.0 + t * 1.3 + 2.0).sin()
        + 0.3 * (x / 4.0 + t * 0.4 + 4.5).sin();
    top + wave as f32
}

/// Closed polygon of the water body
///
/// Runs along the bottom (slightly outside the bar), up the meniscus, then
/// right to left along the surface. The caller clips it to the vessel.
pub fn water_outline(bar: &Rect, surface_x: f32, t: f64) -> Vec<Vec2> {
    let mut points = vec![
        Vec2::new(bar.min.x - 1.0, bar.min.y - 1.0),
        Vec2::new(surface_x + 3.0, bar.min.y - 1.0),
    ];

    let mut y = bar.min.y;
    while y <= bar.max.y {
        points.push(Vec2::new(meniscus_x(surface_x, y - bar.min.y, t), y));
        y += MENISCUS_STEP;
    }

    let mut x = surface_x;
    while x >= bar.min.x - 1.0 {
        points.push(Vec2::new(x, surface_y(bar.max.y, x, t)));
        x -= SURFACE_STEP;
    }

    points
}

/// A light streak inside the water
#[derive(Debug, Clone, PartialEq)]
pub struct Ripple {
    pub points: Vec<Vec2>,
    /// Opacity, fades towards the surface
    pub alpha: f32,
}

/// Horizontal ripple strokes at regular heights, each phase-shifted by its y
pub fn ripple_lines(bar: &Rect, surface_x: f32, t: f64, alpha: f32) -> Vec<Ripple> {
    let mut ripples = Vec::new();

    let mut ry = bar.min.y + 4.0;
    while ry < bar.max.y - 2.0 {
        let depth = (ry - bar.min.y) / bar.height();
        let ripple_alpha = alpha * RIPPLE_ALPHA * (1.0 - depth * 0.5);

        let mut points = Vec::new();
        let mut rx = bar.min.x;
        while rx <= surface_x {
            let (x, y) = (rx as f64, ry as f64);
            let offset = 0.7 * (x / 11.0 + t * 0.4 + y * 0.3).sin()
                + 0.3 * (x / 5.0 + t * 0.7 + y * 0.5).sin();
            points.push(Vec2::new(rx, ry + offset as f32));
            rx += SURFACE_STEP;
        }

        ripples.push(Ripple {
            points,
            alpha: ripple_alpha,
        });
        ry += RIPPLE_SPACING;
    }

    ripples
}

/// Closed polygon approximating a rounded rectangle
pub fn rounded_rect(rect: &Rect, radius: f32, segments_per_corner: usize) -> Vec<Vec2> {
    let radius = radius.min(rect.width() * 0.5).min(rect.height() * 0.5).max(0.0);
    let segments = segments_per_corner.max(1);

    // Corner centres, counter-clockwise from bottom-right
    let corners = [
        (Vec2::new(rect.max.x - radius, rect.min.y + radius), -FRAC_PI_2),
        (Vec2::new(rect.max.x - radius, rect.max.y - radius), 0.0),
        (Vec2::new(rect.min.x + radius, rect.max.y - radius), FRAC_PI_2),
        (Vec2::new(rect.min.x + radius, rect.min.y + radius), 2.0 * FRAC_PI_2),
    ];

    let mut points = Vec::with_capacity(4 * (segments + 1));
    for (centre, start_angle) in corners {
        for i in 0..=segments {
            let angle = start_angle + FRAC_PI_2 * i as f32 / segments as f32;
            points.push(centre + radius * Vec2::new(angle.cos(), angle.sin()));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> Rect {
        Rect::new(12.0, 12.0, 140.0, 20.0)
    }

    #[test]
    fn test_meniscus_stays_near_surface() {
        for i in 0..200 {
            let t = i as f64 * 0.13;
            let x = meniscus_x(80.0, (i % 20) as f32, t);
            assert!((x - 80.0).abs() <= 1.8 + 1e-4);
        }
    }

    #[test]
    fn test_surface_wave_amplitude() {
        let mut lowest = f32::MAX;
        let mut highest = f32::MIN;
        for i in 0..2000 {
            let y = surface_y(32.0, (i % 140) as f32 + 12.0, i as f64 * 0.05);
            lowest = lowest.min(y);
            highest = highest.max(y);
        }
        assert!(lowest >= 30.0 - 1e-4);
        assert!(highest <= 34.0 + 1e-4);
        // Actually waves, not flat
        assert!(highest - lowest > 1.0);
    }

    #[test]
    fn test_outline_shape() {
        let bar = bar();
        let outline = water_outline(&bar, 100.0, 3.0);

        assert_eq!(outline[0], Vec2::new(11.0, 11.0));
        assert_eq!(outline[1], Vec2::new(103.0, 11.0));
        // 41 meniscus points (0.0..=20.0 step 0.5) + 90 surface points (100..=11)
        assert_eq!(outline.len(), 2 + 41 + 90);
        assert_eq!(outline.last().unwrap().x, 11.0);
    }

    #[test]
    fn test_ripples_fade_towards_surface() {
        let bar = bar();
        let ripples = ripple_lines(&bar, 120.0, 1.0, 0.5);

        // Rows at +4, +8.5, +13, +17.5 (must stay below max - 2)
        assert_eq!(ripples.len(), 4);
        for pair in ripples.windows(2) {
            assert!(pair[1].alpha < pair[0].alpha);
        }
        assert!(ripples[0].alpha <= 0.5 * 0.07);
        for ripple in &ripples {
            assert_eq!(ripple.points.first().unwrap().x, bar.min.x);
            assert!(ripple.points.last().unwrap().x <= 120.0);
        }
    }

    #[test]
    fn test_no_ripple_points_when_empty() {
        let bar = bar();
        let ripples = ripple_lines(&bar, bar.min.x - 0.5, 0.0, 0.5);
        assert!(ripples.iter().all(|r| r.points.is_empty()));
    }

    #[test]
    fn test_rounded_rect_bounds() {
        let rect = bar();
        let points = rounded_rect(&rect, 8.0, 6);
        assert_eq!(points.len(), 28);
        for p in &points {
            assert!(p.x >= rect.min.x - 1e-4 && p.x <= rect.max.x + 1e-4);
            assert!(p.y >= rect.min.y - 1e-4 && p.y <= rect.max.y + 1e-4);
        }
        // Corners are cut
        assert!(!points.contains(&rect.min));
    }
}
