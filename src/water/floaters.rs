//! Particles drifting near the meniscus.

use glam::Vec2;
use rand::Rng;

use super::Rect;

/// Seeds are drawn uniformly from `0..SEED_RANGE`
const SEED_RANGE: f64 = 100.0;

/// Band-limited pseudo-noise in [-1, 1]
///
/// Three sines at unrelated rates; the seed shifts their phases so each
/// floater wanders differently but smoothly.
pub fn drift(t: f64, seed: f64) -> f64 {
    (t * 0.7 + seed).sin() * 0.5
        + (t * 1.3 + seed * 2.1).sin() * 0.3
        + (t * 2.9 + seed * 0.7).sin() * 0.2
}

/// Phase seeds of one particle, fixed for its lifetime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Floater {
    pub seed_x: f64,
    pub seed_bob: f64,
}

impl Floater {
    /// Position at time `t`, or `None` while drifted outside the water
    pub fn position(&self, t: f64, bar: &Rect, surface_x: f32) -> Option<Vec2> {
        let bob = drift(t * 0.5, self.seed_bob) as f32;
        let y = bar.mid_y() + bob * (bar.height() * 0.3);
        let nx = drift(t * 0.12, self.seed_x) as f32;
        let x = surface_x - 8.0 + nx * 5.0;

        (x > bar.min.x + 2.0 && x < surface_x + 1.0).then_some(Vec2::new(x, y))
    }
}

/// The fixed set of floaters for a window
#[derive(Debug, Clone)]
pub struct FloaterField {
    floaters: Vec<Floater>,
}

impl FloaterField {
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> Self {
        let floaters = (0..count)
            .map(|_| Floater {
                seed_x: rng.gen_range(0.0..SEED_RANGE),
                seed_bob: rng.gen_range(0.0..SEED_RANGE),
            })
            .collect();
        Self { floaters }
    }

    pub fn floaters(&self) -> &[Floater] {
        &self.floaters
    }

    /// Positions of the floaters currently inside the water
    pub fn positions(&self, t: f64, bar: &Rect, surface_x: f32) -> Vec<Vec2> {
        self.floaters
            .iter()
            .filter_map(|f| f.position(t, bar, surface_x))
            .collect()
    }
}
