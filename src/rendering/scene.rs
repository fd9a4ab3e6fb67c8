//! Paints one frame of the water bar onto a canvas.

use glam::{Vec3, Vec4};

use super::canvas::{Canvas, Shadow};
use crate::params::OverlayStyle;
use crate::session::RenderState;
use crate::water::{
    bar_rect, ripple_lines, rounded_rect, water_outline, Appearance, FloaterField,
    MIN_VISIBLE_LEVEL,
};

/// Segments per rounded corner of the vessel
const CORNER_SEGMENTS: usize = 8;

/// Gradient stop positions from the bottom of the bar to just above the surface
const GRADIENT_STOPS: [f32; 3] = [0.0, 0.55, 1.0];

/// Draw the full scene for `state`, replacing the canvas contents
pub fn paint_scene(
    canvas: &mut Canvas,
    state: &RenderState,
    style: &OverlayStyle,
    floaters: &FloaterField,
) {
    canvas.clear();

    let t = state.elapsed;
    let look = Appearance::at(state.progress, t, style);
    let (rgb, alpha) = (look.rgb, look.alpha);

    let bar = bar_rect(style);
    let vessel = rounded_rect(&bar, style.corner_radius, CORNER_SEGMENTS);
    let vessel_mask = canvas.polygon_mask(&vessel);

    // Soft glow
    canvas.fill_with_shadow(
        &vessel_mask,
        rgb.extend(alpha * 0.04),
        Shadow {
            blur: 10.0,
            color: rgb.extend(alpha * 0.15),
        },
    );

    // Vessel outline, visible enough to gauge the remaining time
    let outline = canvas.stroke_mask(&vessel, 0.75, true);
    canvas.fill(&outline, rgb.extend(alpha * 0.22));

    if state.level <= MIN_VISIBLE_LEVEL {
        return;
    }

    let surface_x = bar.min.x + state.level as f32 * bar.width();

    let mut water = canvas.polygon_mask(&water_outline(&bar, surface_x, t));
    water.intersect(&vessel_mask);

    // Vertical gradient: dark depths, bright middle, surface sheen
    let colors = [
        (rgb * Vec3::new(0.7, 0.7, 0.8)).extend(alpha * 0.30),
        rgb.extend(alpha * 0.42),
        look.tint(Vec3::new(1.15, 1.1, 1.05)).extend(alpha * 0.35),
    ];
    let (start_y, end_y) = (bar.min.y, bar.max.y + 2.0);
    canvas.fill_with(&water, |p| {
        let u = (p.y - start_y) / (end_y - start_y);
        (0.0..=1.0).contains(&u).then(|| gradient(&colors, u))
    });

    // Internal ripples, light refracting through the water
    for ripple in ripple_lines(&bar, surface_x, t, alpha) {
        let mut stroke = canvas.stroke_mask(&ripple.points, 0.5, false);
        stroke.intersect(&water);
        canvas.fill(&stroke, Vec4::new(1.0, 1.0, 1.0, ripple.alpha));
    }

    // Floaters near the water's edge
    let dot = look.tint(Vec3::new(1.2, 1.15, 1.1)).extend(alpha * 0.5);
    for position in floaters.positions(t, &bar, surface_x) {
        let mask = canvas.disc_mask(position, 1.0);
        canvas.fill_with_shadow(
            &mask,
            dot,
            Shadow {
                blur: 2.5,
                color: dot,
            },
        );
    }
}

/// Piecewise-linear three-stop gradient at `u` in [0, 1]
fn gradient(colors: &[Vec4; 3], u: f32) -> Vec4 {
    let [s0, s1, s2] = GRADIENT_STOPS;
    if u <= s1 {
        colors[0].lerp(colors[1], (u - s0) / (s1 - s0))
    } else {
        colors[1].lerp(colors[2], (u - s1) / (s2 - s1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::Rect;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn render(progress: f64) -> Canvas {
        let style = OverlayStyle::default();
        let size = style.window_size();
        let mut canvas = Canvas::new(size.x as u32, size.y as u32, 1.0);
        let floaters = FloaterField::new(style.floater_count, &mut StdRng::seed_from_u64(3));
        let state = RenderState::at(progress * 100.0, 100.0);
        paint_scene(&mut canvas, &state, &style, &floaters);
        canvas
    }

    /// Alpha at a scene point
    fn alpha_at(canvas: &Canvas, x: f32, y: f32) -> f32 {
        let p = canvas.to_device(glam::Vec2::new(x, y));
        canvas.pixel(p.x as u32, p.y as u32).w
    }

    #[test]
    fn test_gradient_stops() {
        let colors = [Vec4::ZERO, Vec4::splat(0.5), Vec4::ONE];
        assert_eq!(gradient(&colors, 0.0), Vec4::ZERO);
        assert_eq!(gradient(&colors, 0.55), Vec4::splat(0.5));
        assert_eq!(gradient(&colors, 1.0), Vec4::ONE);
    }

    #[test]
    fn test_full_bar_has_water_everywhere() {
        let canvas = render(0.0);
        let bar = Rect::new(12.0, 12.0, 140.0, 20.0);
        // Centre of the bar and near its right end are both under water
        assert!(alpha_at(&canvas, bar.mid_x(), bar.mid_y()) > 0.1);
        assert!(alpha_at(&canvas, bar.max.x - 10.0, bar.mid_y()) > 0.1);
    }

    #[test]
    fn test_water_drains_from_the_right() {
        let canvas = render(0.5);
        // Meniscus at x = 12 + 70 = 82
        let wet = alpha_at(&canvas, 40.0, 22.0);
        let dry = alpha_at(&canvas, 120.0, 22.0);
        assert!(wet > 0.1);
        assert!(dry < wet * 0.5);
    }

    #[test]
    fn test_empty_bar_keeps_vessel_only() {
        let canvas = render(1.0);
        let inside = alpha_at(&canvas, 80.0, 22.0);
        // Only the faint glow fill remains inside the vessel
        assert!(inside < 0.05);

        // The outline is still drawn
        let mut outline_alpha: f32 = 0.0;
        for y in 0..canvas.height() {
            outline_alpha = outline_alpha.max(canvas.pixel(80, y).w);
        }
        assert!(outline_alpha > 0.02);
    }

    #[test]
    fn test_window_corners_nearly_transparent() {
        let canvas = render(0.3);
        // At most a trace of the glow reaches the window corners
        assert!(canvas.pixel(0, 0).w < 1e-3);
        assert!(canvas.pixel(canvas.width() - 1, canvas.height() - 1).w < 1e-3);
    }
}
