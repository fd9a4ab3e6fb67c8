//! Software rasteriser for the overlay.
//!
//! Shapes become anti-aliased coverage masks first, then get filled with a
//! colour or a per-pixel paint. Clipping is mask intersection. Pixels are
//! stored premultiplied.
//!
//! Shape coordinates are scene points (origin bottom-left, y up); the canvas
//! maps them to device pixels (origin top-left, y down) with its scale factor.

use glam::{Vec2, Vec4};
use image::RgbaImage;

/// Vertical samples per pixel row when scan-converting polygons
const SUBSAMPLES: usize = 4;

/// Per-pixel coverage in [0, 1]
#[derive(Debug, Clone)]
pub struct Mask {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl Mask {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.coverage[(y * self.width + x) as usize]
    }

    /// Keep only what is covered by both masks
    pub fn intersect(&mut self, other: &Mask) {
        for (c, o) in self.coverage.iter_mut().zip(&other.coverage) {
            *c *= o;
        }
    }

    /// Approximate Gaussian blur: three box passes per axis
    pub fn blurred(&self, sigma_px: f32) -> Mask {
        let radius = ((4.0 * sigma_px * sigma_px + 1.0).sqrt() * 0.5).floor() as usize;
        if radius == 0 {
            return self.clone();
        }

        let (w, h) = (self.width as usize, self.height as usize);
        let mut data = self.coverage.clone();
        let mut scratch = vec![0.0; data.len()];
        for _ in 0..3 {
            box_pass(&data, &mut scratch, w, h, radius, 1, w);
            box_pass(&scratch, &mut data, h, w, radius, w, 1);
        }

        Mask {
            width: self.width,
            height: self.height,
            coverage: data,
        }
    }

    fn add_span(&mut self, row: usize, x0: f32, x1: f32, weight: f32) {
        let width = self.width as f32;
        let x0 = x0.clamp(0.0, width);
        let x1 = x1.clamp(0.0, width);
        if x1 <= x0 {
            return;
        }

        let offset = row * self.width as usize;
        let first = x0.floor() as usize;
        let last = (x1.floor() as usize).min(self.width as usize - 1);
        if first >= last {
            self.coverage[offset + first] += (x1 - x0) * weight;
            return;
        }

        self.coverage[offset + first] += (first as f32 + 1.0 - x0) * weight;
        for px in first + 1..last {
            self.coverage[offset + px] += weight;
        }
        self.coverage[offset + last] += (x1 - last as f32).min(1.0) * weight;
    }

    fn saturate(&mut self) {
        for c in &mut self.coverage {
            *c = c.clamp(0.0, 1.0);
        }
    }
}

/// Sliding-window box filter along one axis
///
/// `lines` runs of `len` samples; consecutive samples are `stride` apart and
/// consecutive lines `line_step` apart.
fn box_pass(
    src: &[f32],
    dst: &mut [f32],
    len: usize,
    lines: usize,
    radius: usize,
    stride: usize,
    line_step: usize,
) {
    let norm = 1.0 / (2 * radius + 1) as f32;
    for line in 0..lines {
        let base = line * line_step;
        let at = |i: isize| -> f32 {
            if i < 0 || i >= len as isize {
                0.0
            } else {
                src[base + i as usize * stride]
            }
        };

        let mut sum: f32 = (-(radius as isize)..=radius as isize).map(&at).sum();
        for i in 0..len {
            dst[base + i * stride] = sum * norm;
            sum += at(i as isize + radius as isize + 1) - at(i as isize - radius as isize);
        }
    }
}

/// Drop shadow in Core Graphics terms: blur radius in points, and a colour
/// whose alpha multiplies the alpha of what is drawn
#[derive(Debug, Clone, Copy)]
pub struct Shadow {
    pub blur: f32,
    pub color: Vec4,
}

/// RGBA pixel buffer at device resolution
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    scale: f32,
    pixels: Vec<Vec4>,
}

impl Canvas {
    /// New transparent canvas; `scale` is device pixels per point
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale,
            pixels: vec![Vec4::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Vec4::ZERO);
    }

    /// Premultiplied pixel at device coordinates
    pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Scene point to device pixel
    pub fn to_device(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.scale, self.height as f32 - p.y * self.scale)
    }

    /// Centre of a device pixel in scene points
    pub fn to_scene(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / self.scale,
            (self.height as f32 - (y as f32 + 0.5)) / self.scale,
        )
    }

    /// Coverage of a closed polygon (even-odd rule)
    pub fn polygon_mask(&self, points: &[Vec2]) -> Mask {
        let mut mask = Mask::empty(self.width, self.height);
        if points.len() < 3 {
            return mask;
        }

        let device: Vec<Vec2> = points.iter().map(|&p| self.to_device(p)).collect();
        let weight = 1.0 / SUBSAMPLES as f32;
        let mut crossings = Vec::new();

        for row in 0..self.height as usize {
            for k in 0..SUBSAMPLES {
                let sy = row as f32 + (k as f32 + 0.5) * weight;

                crossings.clear();
                for (i, a) in device.iter().enumerate() {
                    let b = device[(i + 1) % device.len()];
                    if (a.y <= sy) != (b.y <= sy) {
                        crossings.push(a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x));
                    }
                }
                crossings.sort_by(f32::total_cmp);

                for span in crossings.chunks_exact(2) {
                    mask.add_span(row, span[0], span[1], weight);
                }
            }
        }

        mask.saturate();
        mask
    }

    /// Coverage of a stroked polyline, `width` in points
    pub fn stroke_mask(&self, points: &[Vec2], width: f32, closed: bool) -> Mask {
        let mut mask = Mask::empty(self.width, self.height);
        if points.len() < 2 {
            return mask;
        }

        let width_px = width * self.scale;
        // Hairlines keep a one-pixel footprint and fade by their width instead
        let half = (width_px * 0.5).max(0.5);
        let strength = (width_px / (2.0 * half)).min(1.0);

        let device: Vec<Vec2> = points.iter().map(|&p| self.to_device(p)).collect();
        let segments = if closed { device.len() } else { device.len() - 1 };

        for i in 0..segments {
            let a = device[i];
            let b = device[(i + 1) % device.len()];
            let lo = a.min(b) - Vec2::splat(half + 1.0);
            let hi = a.max(b) + Vec2::splat(half + 1.0);

            let Some((x0, x1, y0, y1)) = self.clamp_box(lo, hi) else {
                continue;
            };
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let d = distance_to_segment(p, a, b);
                    let c = (half + 0.5 - d).clamp(0.0, 1.0) * strength;
                    let idx = (y * self.width + x) as usize;
                    mask.coverage[idx] = mask.coverage[idx].max(c);
                }
            }
        }

        mask
    }

    /// Coverage of a filled circle, centre and radius in points
    pub fn disc_mask(&self, centre: Vec2, radius: f32) -> Mask {
        let mut mask = Mask::empty(self.width, self.height);
        let c = self.to_device(centre);
        let r = radius * self.scale;

        let reach = Vec2::splat(r + 1.0);
        if let Some((x0, x1, y0, y1)) = self.clamp_box(c - reach, c + reach) {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                    mask.coverage[(y * self.width + x) as usize] = (r + 0.5 - d).clamp(0.0, 1.0);
                }
            }
        }

        mask
    }

    /// Composite a straight-alpha colour through `mask` (source-over)
    pub fn fill(&mut self, mask: &Mask, color: Vec4) {
        self.fill_with(mask, |_| Some(color));
    }

    /// Composite a per-pixel straight-alpha paint through `mask`
    ///
    /// The paint receives the pixel centre in scene points; `None` leaves the
    /// pixel untouched.
    pub fn fill_with<F>(&mut self, mask: &Mask, mut paint: F)
    where
        F: FnMut(Vec2) -> Option<Vec4>,
    {
        for y in 0..self.height {
            for x in 0..self.width {
                let coverage = mask.get(x, y);
                if coverage <= 0.0 {
                    continue;
                }
                if let Some(color) = paint(self.to_scene(x, y)) {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    /// Fill with a drop shadow underneath, like a shadowed Core Graphics fill
    pub fn fill_with_shadow(&mut self, mask: &Mask, color: Vec4, shadow: Shadow) {
        let glow = mask.blurred(shadow.blur * 0.5 * self.scale);
        let mut shadow_color = shadow.color;
        shadow_color.w *= color.w;
        self.fill(&glow, shadow_color);
        self.fill(mask, color);
    }

    fn blend(&mut self, x: u32, y: u32, color: Vec4, coverage: f32) {
        let alpha = (color.w * coverage).clamp(0.0, 1.0);
        let src = (color.truncate() * alpha).extend(alpha);
        let dst = &mut self.pixels[(y * self.width + x) as usize];
        *dst = src + *dst * (1.0 - alpha);
    }

    fn clamp_box(&self, lo: Vec2, hi: Vec2) -> Option<(u32, u32, u32, u32)> {
        if hi.x < 0.0 || hi.y < 0.0 || lo.x >= self.width as f32 || lo.y >= self.height as f32 {
            return None;
        }
        let x0 = lo.x.max(0.0) as u32;
        let y0 = lo.y.max(0.0) as u32;
        let x1 = (hi.x as u32).min(self.width.saturating_sub(1));
        let y1 = (hi.y as u32).min(self.height.saturating_sub(1));
        Some((x0, x1, y0, y1))
    }

    /// Premultiplied RGBA8, row-major from the top, for texture upload
    pub fn premultiplied_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| p.to_array().map(to_u8))
            .collect()
    }

    /// Straight-alpha image, for saving to disk
    pub fn to_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width, self.height);
        for (pixel, p) in image.pixels_mut().zip(&self.pixels) {
            let rgb = if p.w > 0.0 {
                p.truncate() / p.w
            } else {
                p.truncate()
            };
            *pixel = image::Rgba(rgb.extend(p.w).to_array().map(to_u8));
        }
        image
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(x, y),
            Vec2::new(x + size, y),
            Vec2::new(x + size, y + size),
            Vec2::new(x, y + size),
        ]
    }

    #[test]
    fn test_coordinate_flip() {
        let canvas = Canvas::new(20, 10, 2.0);
        // Scene origin is the bottom-left corner
        assert_eq!(canvas.to_device(Vec2::ZERO), Vec2::new(0.0, 10.0));
        assert_eq!(canvas.to_device(Vec2::new(10.0, 5.0)), Vec2::new(20.0, 0.0));
        assert_eq!(canvas.to_scene(0, 9), Vec2::new(0.25, 0.25));
    }

    #[test]
    fn test_polygon_mask_pixel_aligned() {
        let canvas = Canvas::new(10, 10, 1.0);
        let mask = canvas.polygon_mask(&square(2.0, 2.0, 4.0));

        // Scene y 2..6 is device rows 4..8
        assert_eq!(mask.get(3, 5), 1.0);
        assert_eq!(mask.get(5, 7), 1.0);
        assert_eq!(mask.get(1, 5), 0.0);
        assert_eq!(mask.get(3, 3), 0.0);
        assert_eq!(mask.get(3, 8), 0.0);
    }

    #[test]
    fn test_polygon_mask_partial_coverage() {
        let canvas = Canvas::new(10, 10, 1.0);
        let mask = canvas.polygon_mask(&square(2.5, 2.0, 4.0));
        assert!((mask.get(2, 5) - 0.5).abs() < 1e-5);
        assert!((mask.get(6, 5) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_intersect_clips() {
        let canvas = Canvas::new(10, 10, 1.0);
        let mut a = canvas.polygon_mask(&square(0.0, 0.0, 6.0));
        let b = canvas.polygon_mask(&square(4.0, 4.0, 6.0));
        a.intersect(&b);

        assert_eq!(a.get(5, 5), 1.0);
        assert_eq!(a.get(2, 8), 0.0);
        assert_eq!(a.get(8, 2), 0.0);
    }

    #[test]
    fn test_fill_source_over() {
        let mut canvas = Canvas::new(4, 4, 1.0);
        let mask = canvas.polygon_mask(&square(0.0, 0.0, 4.0));

        canvas.fill(&mask, Vec4::new(1.0, 0.0, 0.0, 0.5));
        let p = canvas.pixel(1, 1);
        assert!((p - Vec4::new(0.5, 0.0, 0.0, 0.5)).abs().max_element() < 1e-6);

        canvas.fill(&mask, Vec4::new(0.0, 0.0, 1.0, 0.5));
        let p = canvas.pixel(1, 1);
        assert!((p - Vec4::new(0.25, 0.0, 0.5, 0.75)).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_fill_with_skips_unpainted() {
        let mut canvas = Canvas::new(4, 4, 1.0);
        let mask = canvas.polygon_mask(&square(0.0, 0.0, 4.0));
        // Paint only the upper half of the scene
        canvas.fill_with(&mask, |p| (p.y > 2.0).then_some(Vec4::ONE));

        assert_eq!(canvas.pixel(0, 0).w, 1.0);
        assert_eq!(canvas.pixel(0, 3).w, 0.0);
    }

    #[test]
    fn test_stroke_mask_hairline() {
        let canvas = Canvas::new(20, 10, 1.0);
        let mask = canvas.stroke_mask(&[Vec2::new(2.0, 5.5), Vec2::new(18.0, 5.5)], 0.5, false);

        // Line at device y = 4.5: centred on row 4
        assert!((mask.get(10, 4) - 0.5).abs() < 1e-5);
        assert_eq!(mask.get(10, 7), 0.0);
    }

    #[test]
    fn test_disc_mask() {
        let canvas = Canvas::new(10, 10, 2.0);
        let mask = canvas.disc_mask(Vec2::new(2.5, 2.5), 1.0);
        // Device centre (5, 5), radius 2 px
        assert_eq!(mask.get(4, 4), 1.0);
        assert_eq!(mask.get(0, 0), 0.0);
    }

    #[test]
    fn test_blur_spreads_and_preserves_mass() {
        let canvas = Canvas::new(40, 40, 1.0);
        let mask = canvas.polygon_mask(&square(18.0, 18.0, 4.0));
        let blurred = mask.blurred(3.0);

        let total = |m: &Mask| m.coverage.iter().sum::<f32>();
        assert!((total(&mask) - total(&blurred)).abs() < 0.01);
        assert!(blurred.get(14, 20) > 0.0);
        assert!(blurred.get(20, 20) < 1.0);
    }

    #[test]
    fn test_image_export_unpremultiplies() {
        let mut canvas = Canvas::new(2, 2, 1.0);
        let mask = canvas.polygon_mask(&square(0.0, 0.0, 2.0));
        canvas.fill(&mask, Vec4::new(1.0, 0.5, 0.0, 0.5));

        let image = canvas.to_image();
        assert_eq!(image.get_pixel(0, 0).0, [255, 128, 0, 128]);
        assert_eq!(&canvas.premultiplied_rgba8()[..4], &[128, 64, 0, 128]);
    }
}
