//! Particle initialization.
//!
//! Every random draw goes through a caller-supplied [`Rng`], so a seeded
//! generator gives exactly reproducible fields:
//!
//! ```ignore
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let set = initialize(Viewport::new(800.0, 600.0), 50, 0.5, SizeRange::new(1.0, 3.0), &mut rng);
//! ```
//!
//! The windowed viewer passes `rand::thread_rng()` instead.

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::config::{FieldConfig, OpacityMode, SizeRange, Viewport};
use crate::particle::{Particle, ParticleSet, Twinkle};

/// Context handed to spawn closures, with helpers for common draws.
pub struct SpawnContext<'a, R: Rng + ?Sized> {
    /// Index of the particle being spawned (0 to count-1). Becomes its id.
    pub index: u32,
    /// Total number of particles being spawned.
    pub count: u32,
    pub viewport: Viewport,
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> SpawnContext<'a, R> {
    /// Normalized progress through the spawn (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.index as f32 / self.count as f32
        }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max]`. The bounds may be given in either order.
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if lo == hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform point in `[0, width] x [0, height]`.
    pub fn random_in_viewport(&mut self) -> Vec2 {
        Vec2::new(
            self.random_range(0.0, self.viewport.width),
            self.random_range(0.0, self.viewport.height),
        )
    }

    /// Velocity with each component uniform in `[-span/2, span/2]`.
    pub fn random_velocity(&mut self, span: f32) -> Vec2 {
        let half = span * 0.5;
        Vec2::new(self.random_range(-half, half), self.random_range(-half, half))
    }

    pub fn random_size(&mut self, range: SizeRange) -> f32 {
        self.random_range(range.min, range.max)
    }
}

/// Spawn `count` particles with a custom closure.
///
/// Particles get ids `0..count` regardless of what the closure sets, so ids
/// are always unique within the set. An invalid viewport yields an empty set.
pub fn spawn_with<R, F>(viewport: Viewport, count: u32, rng: &mut R, mut spawner: F) -> ParticleSet
where
    R: Rng + ?Sized,
    F: FnMut(&mut SpawnContext<'_, R>) -> Particle,
{
    if !viewport.is_valid() {
        debug!(
            width = viewport.width,
            height = viewport.height,
            "invalid viewport, spawning nothing"
        );
        return ParticleSet::empty(viewport);
    }

    let particles = (0..count)
        .map(|index| {
            let mut ctx = SpawnContext {
                index,
                count,
                viewport,
                rng: &mut *rng,
            };
            let mut particle = spawner(&mut ctx);
            particle.id = index;
            particle
        })
        .collect();

    ParticleSet::new(viewport, particles)
}

/// Spawn `count` particles with uniform position, velocity and size.
///
/// Velocities are drawn per axis from `[-speed/2, speed/2]`. Opacity is 1.0;
/// use [`spawn_field`] for configured opacity. A size range that is not
/// finite and strictly positive yields an empty set, like an invalid viewport.
pub fn initialize<R: Rng + ?Sized>(
    viewport: Viewport,
    count: u32,
    speed: f32,
    size: SizeRange,
    rng: &mut R,
) -> ParticleSet {
    if !(size.min.is_finite() && size.max.is_finite() && size.min > 0.0 && size.max > 0.0) {
        debug!(min = size.min, max = size.max, "invalid size range, spawning nothing");
        return ParticleSet::empty(viewport);
    }
    let speed = if speed.is_finite() { speed.abs() } else { 0.0 };
    spawn_with(viewport, count, rng, |ctx| {
        let position = ctx.random_in_viewport();
        let velocity = ctx.random_velocity(speed);
        let size = ctx.random_size(size);
        Particle::new(ctx.index, position, velocity).with_size(size)
    })
}

/// Spawn the particle set described by `config`.
///
/// Assumes `config` has been validated.
pub fn spawn_field<R: Rng + ?Sized>(config: &FieldConfig, rng: &mut R) -> ParticleSet {
    let count = config.resolved_count();
    let opacity = config.opacity;
    let set = spawn_with(config.viewport, count, rng, |ctx| {
        let position = ctx.random_in_viewport();
        let velocity = ctx.random_velocity(config.speed);
        let size = ctx.random_size(config.size);
        let particle = Particle::new(ctx.index, position, velocity).with_size(size);
        match opacity {
            OpacityMode::Static { min, max } => particle.with_opacity(ctx.random_range(min, max)),
            OpacityMode::Twinkle {
                low,
                high,
                period,
                scale_peak,
            } => {
                let phase = ctx.random() * period;
                particle.with_opacity(high).with_twinkle(Twinkle {
                    low,
                    high,
                    period,
                    phase,
                    scale_peak,
                })
            }
        }
    });
    debug!(
        count = set.len(),
        width = config.viewport.width,
        height = config.viewport.height,
        "spawned particle field"
    );
    set
}
