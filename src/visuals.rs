//! Color palettes and render styling.
//!
//! Particles take their color from a [`Palette`] by id, so a particle keeps
//! its color for its whole lifetime. Connection lines blend the colors of
//! their two endpoints.
//!
//! ```ignore
//! let style = RenderStyle::new(Palette::Constellation)
//!     .with_background(Vec3::new(0.02, 0.02, 0.05))
//!     .with_line_width(1.0);
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Pre-defined color palettes for the particle field.
///
/// Each palette is a short list of stops. Particle `id` picks a stop
/// round-robin, which reproduces the alternating dot colors of the
/// classic constellation background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Blue and purple glow (the default constellation look).
    #[default]
    Constellation,

    /// Cool blues and teals.
    Ocean,

    /// Vibrant cyberpunk colors (pink, cyan, purple).
    Neon,

    /// White through light blue to deep blue.
    Ice,

    /// Warm oranges and pinks.
    Sunset,

    /// Plain white.
    Mono,
}

impl Palette {
    /// Color stops for this palette.
    pub fn colors(&self) -> &'static [Vec3] {
        const CONSTELLATION: [Vec3; 2] = [
            Vec3::new(0.376, 0.647, 0.980), // Blue #60a5fa
            Vec3::new(0.659, 0.333, 0.969), // Purple #a855f7
        ];
        const OCEAN: [Vec3; 4] = [
            Vec3::new(0.0, 0.4, 0.6),
            Vec3::new(0.2, 0.6, 0.8),
            Vec3::new(0.6, 0.9, 1.0),
            Vec3::new(0.0, 0.2, 0.4),
        ];
        const NEON: [Vec3; 3] = [
            Vec3::new(1.0, 0.0, 0.5), // Pink
            Vec3::new(0.0, 1.0, 1.0), // Cyan
            Vec3::new(0.5, 0.0, 1.0), // Purple
        ];
        const ICE: [Vec3; 3] = [
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.8, 0.9, 1.0),
            Vec3::new(0.4, 0.7, 1.0),
        ];
        const SUNSET: [Vec3; 3] = [
            Vec3::new(1.0, 0.2, 0.4),
            Vec3::new(1.0, 0.5, 0.2),
            Vec3::new(1.0, 0.9, 0.4),
        ];
        const MONO: [Vec3; 1] = [Vec3::ONE];

        match self {
            Palette::Constellation => &CONSTELLATION,
            Palette::Ocean => &OCEAN,
            Palette::Neon => &NEON,
            Palette::Ice => &ICE,
            Palette::Sunset => &SUNSET,
            Palette::Mono => &MONO,
        }
    }

    /// Color assigned to the particle with this id.
    #[inline]
    pub fn color_for(&self, id: u32) -> Vec3 {
        let stops = self.colors();
        stops[id as usize % stops.len()]
    }

    /// Color of a connection line between two particles.
    ///
    /// Midpoint of the two endpoint colors, standing in for a gradient.
    pub fn line_color(&self, a: u32, b: u32) -> Vec3 {
        self.color_for(a).lerp(self.color_for(b), 0.5)
    }
}

/// Everything [`render`](crate::frame::render) needs besides the simulation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub palette: Palette,
    /// Clear color for the render target.
    pub background: Vec3,
    /// Connection line width in pixels.
    pub line_width: f32,
    /// Color of pointer links (lines from the cursor to nearby particles).
    pub pointer_color: Vec3,
}

impl RenderStyle {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            ..Default::default()
        }
    }

    pub fn with_background(mut self, background: Vec3) -> Self {
        self.background = background;
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width.max(0.0);
        self
    }

    pub fn with_pointer_color(mut self, color: Vec3) -> Self {
        self.pointer_color = color;
        self
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            palette: Palette::Constellation,
            background: Vec3::new(0.02, 0.02, 0.05),
            line_width: 1.0,
            pointer_color: Vec3::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_for_cycles_stops() {
        let p = Palette::Constellation;
        assert_eq!(p.color_for(0), p.colors()[0]);
        assert_eq!(p.color_for(1), p.colors()[1]);
        assert_eq!(p.color_for(2), p.colors()[0]);
    }

    #[test]
    fn test_line_color_is_symmetric() {
        let p = Palette::Neon;
        assert_eq!(p.line_color(1, 2), p.line_color(2, 1));
        assert_eq!(Palette::Mono.line_color(4, 9), Vec3::ONE);
    }

    #[test]
    fn test_palette_serde_names() {
        let json = serde_json::to_string(&Palette::Constellation).unwrap();
        assert_eq!(json, "\"constellation\"");
        let back: Palette = serde_json::from_str("\"ocean\"").unwrap();
        assert_eq!(back, Palette::Ocean);
    }

    #[test]
    fn test_line_width_never_negative() {
        let style = RenderStyle::default().with_line_width(-3.0);
        assert_eq!(style.line_width, 0.0);
    }
}
