//! Software raster target backed by an [`image::RgbaImage`].
//!
//! Draws anti-aliased circles and lines with source-over blending. Used for
//! headless snapshots and PNG export; the window uses the GPU target instead.

use std::path::Path;

use glam::{Vec2, Vec3};
use image::{ImageResult, Rgba, RgbaImage};

use crate::config::Viewport;
use crate::frame::RenderTarget;

/// A [`RenderTarget`] that paints into an in-memory RGBA image.
///
/// The image is resized to the frame's viewport (rounded up) on `begin`.
#[derive(Debug, Clone)]
pub struct RasterTarget {
    image: RgbaImage,
}

impl RasterTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Write the current image as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }

    /// Blend `color` at `opacity * coverage` onto pixel (x, y).
    fn blend(&mut self, x: u32, y: u32, color: Vec3, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0);
        let px = self.image.get_pixel_mut(x, y);
        for (channel, src) in px.0.iter_mut().take(3).zip(color.to_array()) {
            let dst = *channel as f32 / 255.0;
            let out = src.clamp(0.0, 1.0) * alpha + dst * (1.0 - alpha);
            *channel = (out * 255.0).round() as u8;
        }
        let dst_a = px.0[3] as f32 / 255.0;
        px.0[3] = ((alpha + dst_a * (1.0 - alpha)) * 255.0).round() as u8;
    }

    /// Pixel range covering `[lo, hi]` along an axis of length `len`.
    fn span(lo: f32, hi: f32, len: u32) -> Option<(u32, u32)> {
        if len == 0 || !lo.is_finite() || !hi.is_finite() || hi < 0.0 || lo >= len as f32 {
            return None;
        }
        let start = lo.floor().max(0.0) as u32;
        let end = (hi.ceil() as u32).min(len - 1);
        (start <= end).then_some((start, end))
    }
}

fn to_rgba(color: Vec3) -> Rgba<u8> {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    Rgba([c.x as u8, c.y as u8, c.z as u8, 255])
}

impl RenderTarget for RasterTarget {
    fn begin(&mut self, viewport: Viewport, background: Vec3) {
        let dim = |v: f32| if v.is_finite() && v > 0.0 { v.ceil() as u32 } else { 0 };
        let (w, h) = (dim(viewport.width), dim(viewport.height));
        if self.image.dimensions() != (w, h) {
            self.image = RgbaImage::new(w, h);
        }
        let bg = to_rgba(background);
        for px in self.image.pixels_mut() {
            *px = bg;
        }
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec3, opacity: f32) {
        let half = (width * 0.5).max(0.5);
        let (w, h) = self.image.dimensions();
        let Some((x0, x1)) = Self::span(from.x.min(to.x) - half - 1.0, from.x.max(to.x) + half + 1.0, w) else {
            return;
        };
        let Some((y0, y1)) = Self::span(from.y.min(to.y) - half - 1.0, from.y.max(to.y) + half + 1.0, h) else {
            return;
        };

        let seg = to - from;
        let len_sq = seg.length_squared();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    ((p - from).dot(seg) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = p.distance(from + seg * t);
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                self.blend(x, y, color, opacity * coverage);
            }
        }
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec3, opacity: f32) {
        let radius = radius.max(0.5);
        let (w, h) = self.image.dimensions();
        let Some((x0, x1)) = Self::span(center.x - radius - 1.0, center.x + radius + 1.0, w) else {
            return;
        };
        let Some((y0, y1)) = Self::span(center.y - radius - 1.0, center.y + radius + 1.0, h) else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (radius + 0.5 - p.distance(center)).clamp(0.0, 1.0);
                self.blend(x, y, color, opacity * coverage);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_resizes_and_clears() {
        let mut target = RasterTarget::new(1, 1);
        target.begin(Viewport::new(10.5, 4.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(target.image().dimensions(), (11, 4));
        assert!(target.image().pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_circle_paints_center_not_corner() {
        let mut target = RasterTarget::new(20, 20);
        target.begin(Viewport::new(20.0, 20.0), Vec3::ZERO);
        target.draw_circle(Vec2::new(10.0, 10.0), 3.0, Vec3::ONE, 1.0);
        assert_eq!(target.image().get_pixel(10, 10).0[0], 255);
        assert_eq!(target.image().get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_line_blends_with_opacity() {
        let mut target = RasterTarget::new(20, 20);
        target.begin(Viewport::new(20.0, 20.0), Vec3::ZERO);
        target.draw_line(Vec2::new(0.0, 10.5), Vec2::new(20.0, 10.5), 2.0, Vec3::ONE, 0.5);
        let mid = target.image().get_pixel(10, 10).0[0];
        assert!((126..=129).contains(&mid), "got {mid}");
        assert_eq!(target.image().get_pixel(10, 2).0[0], 0);
    }

    #[test]
    fn test_offscreen_shapes_are_ignored() {
        let mut target = RasterTarget::new(8, 8);
        target.begin(Viewport::new(8.0, 8.0), Vec3::ZERO);
        target.draw_circle(Vec2::new(-50.0, -50.0), 2.0, Vec3::ONE, 1.0);
        target.draw_line(Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0), 1.0, Vec3::ONE, 1.0);
        target.draw_circle(Vec2::NAN, 2.0, Vec3::ONE, 1.0);
        assert!(target.image().pixels().all(|p| p.0[0] == 0));
    }
}
