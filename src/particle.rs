//! Particle and particle set types.

use glam::Vec2;

use crate::config::Viewport;

/// Time-driven opacity and scale oscillation.
///
/// Each cycle eases from `low` up to `high` and back over `period` seconds.
/// `phase` shifts the cycle so particles do not pulse in lockstep.
/// Purely cosmetic: it never feeds back into motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twinkle {
    pub low: f32,
    pub high: f32,
    /// Seconds per full cycle. Must be positive.
    pub period: f32,
    /// Offset into the cycle, in seconds.
    pub phase: f32,
    /// Radius multiplier at the brightest point of the cycle.
    pub scale_peak: f32,
}

impl Twinkle {
    /// Eased position in the cycle at time `t`, 0.0 at `low`, 1.0 at `high`.
    pub fn level(&self, t: f32) -> f32 {
        if !(self.period > 0.0) || !t.is_finite() {
            return 0.0;
        }
        let u = ((t + self.phase) / self.period).rem_euclid(1.0);
        let tri = if u < 0.5 { u * 2.0 } else { (1.0 - u) * 2.0 };
        // ease-in-out
        tri * tri * (3.0 - 2.0 * tri)
    }

    pub fn opacity(&self, t: f32) -> f32 {
        self.low + (self.high - self.low) * self.level(t)
    }

    pub fn scale(&self, t: f32) -> f32 {
        1.0 + (self.scale_peak - 1.0) * self.level(t)
    }
}

/// A single animated point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Unique within its set, stable for the particle's lifetime.
    pub id: u32,
    /// Position in viewport pixels.
    pub position: Vec2,
    /// Pixels per step at a step scale of 1.0.
    pub velocity: Vec2,
    /// Radius in pixels. Rendering only.
    pub size: f32,
    /// Base opacity in `[0, 1]`, used when there is no twinkle.
    pub opacity: f32,
    pub twinkle: Option<Twinkle>,
}

impl Particle {
    pub fn new(id: u32, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            position,
            velocity,
            size: 1.0,
            opacity: 1.0,
            twinkle: None,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_twinkle(mut self, twinkle: Twinkle) -> Self {
        self.twinkle = Some(twinkle);
        self
    }

    /// Velocity magnitude.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Opacity to draw with at time `t` seconds.
    pub fn opacity_at(&self, t: f32) -> f32 {
        match self.twinkle {
            Some(tw) => tw.opacity(t).clamp(0.0, 1.0),
            None => self.opacity,
        }
    }

    /// Radius to draw with at time `t` seconds.
    pub fn radius_at(&self, t: f32) -> f32 {
        match self.twinkle {
            Some(tw) => self.size * tw.scale(t),
            None => self.size,
        }
    }
}

/// All particles of one field, together with the bounds they live in.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSet {
    viewport: Viewport,
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new(viewport: Viewport, particles: Vec<Particle>) -> Self {
        Self {
            viewport,
            particles,
        }
    }

    pub fn empty(viewport: Viewport) -> Self {
        Self::new(viewport, Vec::new())
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Find a particle by id.
    pub fn get(&self, id: u32) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    /// Whether every particle lies inside the viewport.
    pub fn all_in_bounds(&self) -> bool {
        self.particles
            .iter()
            .all(|p| self.viewport.contains(p.position))
    }
}

impl<'a> IntoIterator for &'a ParticleSet {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}
