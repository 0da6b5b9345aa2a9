//! Per-tick particle motion.
//!
//! A step moves every particle by `velocity * scale` and then applies the
//! edge rule. With [`EdgeMode::Bounce`], a particle that reaches or crosses an
//! edge is clamped onto it and its velocity component on that axis is
//! reflected to point back inside. Reflection flips sign only, so speed is
//! preserved. With [`EdgeMode::Wrap`] it re-enters from the opposite edge.
//! Either way no particle ever leaves `[0, width] x [0, height]`, not even
//! for a single frame.

use glam::Vec2;

use crate::config::EdgeMode;
use crate::particle::ParticleSet;

/// Advance `set` in place by one tick.
///
/// `scale` is the step multiplier from the [`Clock`](crate::time::Clock):
/// 1.0 for a plain per-frame increment. Non-finite or negative scales are
/// treated as zero.
pub fn step(set: &mut ParticleSet, scale: f32, edges: EdgeMode) {
    let scale = sanitize_scale(scale);
    let bounds = bounds_of(set);

    for p in set.particles_mut() {
        let (x, vx) = advance_axis(p.position.x, p.velocity.x, bounds.x, scale, edges);
        let (y, vy) = advance_axis(p.position.y, p.velocity.y, bounds.y, scale, edges);
        p.position = Vec2::new(x, y);
        p.velocity = Vec2::new(vx, vy);
    }
}

/// Functional form of [`step`]: returns the advanced set, leaving `set` untouched.
pub fn stepped(set: &ParticleSet, scale: f32, edges: EdgeMode) -> ParticleSet {
    let mut next = set.clone();
    step(&mut next, scale, edges);
    next
}

/// Push particles near `pointer` directly away from it.
///
/// Displacement falls off linearly from `strength * scale` at the pointer to
/// zero at `radius`. Only positions change, so velocities and speeds are
/// untouched. Results are clamped into the viewport. Particles exactly on
/// the pointer are left alone, since they have no direction to move in.
pub fn push_from_pointer(set: &mut ParticleSet, pointer: Vec2, radius: f32, strength: f32, scale: f32) {
    let scale = sanitize_scale(scale);
    if !(radius > 0.0) || !(strength > 0.0) || !pointer.is_finite() {
        return;
    }
    let bounds = bounds_of(set);

    for p in set.particles_mut() {
        let offset = p.position - pointer;
        let dist = offset.length();
        if dist >= radius || dist <= f32::EPSILON {
            continue;
        }
        let falloff = 1.0 - dist / radius;
        let moved = p.position + offset / dist * strength * falloff * scale;
        p.position = moved.clamp(Vec2::ZERO, bounds);
    }
}

fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        0.0
    }
}

/// Upper bounds of the set's viewport, with degenerate sizes collapsed to 0.
fn bounds_of(set: &ParticleSet) -> Vec2 {
    let size = set.viewport().size();
    let fix = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    Vec2::new(fix(size.x), fix(size.y))
}

fn advance_axis(pos: f32, vel: f32, bound: f32, scale: f32, edges: EdgeMode) -> (f32, f32) {
    let tentative = pos + vel * scale;
    match edges {
        EdgeMode::Bounce => {
            if tentative < 0.0 || (tentative == 0.0 && vel < 0.0) {
                (0.0, vel.abs())
            } else if tentative > bound || (tentative == bound && vel > 0.0) {
                (bound, -vel.abs())
            } else {
                (tentative, vel)
            }
        }
        EdgeMode::Wrap => {
            if bound <= 0.0 {
                (0.0, vel)
            } else if tentative < 0.0 || tentative > bound {
                (tentative.rem_euclid(bound).min(bound), vel)
            } else {
                (tentative, vel)
            }
        }
    }
}
