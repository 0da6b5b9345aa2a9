//! Integration tests for the particle field.
//!
//! Scenario tests use hand-placed particles; property tests run seeded
//! random fields for many ticks and check invariants after every step.

use constellation::config::{ConnectionConfig, ConnectionStrategy, EdgeMode, SizeRange, Viewport};
use constellation::connections::{compute_connections, connection_opacity, find_connections};
use constellation::frame::render;
use constellation::motion::step;
use constellation::spawn::initialize;
use constellation::{
    Clock, FieldConfig, Frame, FrameLoop, Particle, ParticleField, ParticleSet, RasterTarget,
    RecordingTarget, RenderStyle, SceneTarget, StepMode, TickOutcome, Vec2,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn pair(a: (Vec2, Vec2), b: (Vec2, Vec2)) -> ParticleSet {
    ParticleSet::new(
        Viewport::new(100.0, 100.0),
        vec![Particle::new(0, a.0, a.1), Particle::new(1, b.0, b.1)],
    )
}

fn random_set(seed: u64, count: u32, speed: f32) -> ParticleSet {
    let mut rng = StdRng::seed_from_u64(seed);
    initialize(
        Viewport::new(640.0, 480.0),
        count,
        speed,
        SizeRange::new(1.0, 3.0),
        &mut rng,
    )
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_opposite_edges_bounce() {
    let mut set = pair(
        (Vec2::new(0.0, 50.0), Vec2::new(-1.0, 0.0)),
        (Vec2::new(99.0, 50.0), Vec2::new(1.0, 0.0)),
    );
    step(&mut set, 1.0, EdgeMode::Bounce);

    let a = set.particles()[0];
    let b = set.particles()[1];
    assert_eq!(a.position.x, 0.0);
    assert_eq!(a.velocity.x, 1.0);
    assert_eq!(b.position.x, 100.0);
    assert_eq!(b.velocity.x, -1.0);
    assert_eq!(a.position.distance(b.position), 100.0);

    assert!(compute_connections(&set, 99.0, 1.0).is_empty());
}

#[test]
fn test_scenario_half_distance_half_opacity() {
    let set = pair(
        (Vec2::new(0.0, 0.0), Vec2::ZERO),
        (Vec2::new(10.0, 0.0), Vec2::ZERO),
    );
    let conns = compute_connections(&set, 20.0, 0.8);
    assert_eq!(conns.len(), 1);
    assert!((conns[0].distance - 10.0).abs() < 1e-6);
    assert!((conns[0].opacity - 0.4).abs() < 1e-6);
}

#[test]
fn test_coincident_particles_get_full_opacity() {
    let set = pair(
        (Vec2::new(30.0, 30.0), Vec2::ZERO),
        (Vec2::new(30.0, 30.0), Vec2::ZERO),
    );
    let conns = compute_connections(&set, 20.0, 0.6);
    assert_eq!(conns.len(), 1);
    assert_eq!(conns[0].distance, 0.0);
    assert_eq!(conns[0].opacity, 0.6);
    assert!(conns[0].opacity.is_finite());
}

#[test]
fn test_threshold_distance_is_not_connected() {
    let set = pair(
        (Vec2::new(0.0, 0.0), Vec2::ZERO),
        (Vec2::new(20.0, 0.0), Vec2::ZERO),
    );
    assert!(compute_connections(&set, 20.0, 1.0).is_empty());
    assert_eq!(connection_opacity(25.0, 20.0, 1.0), 0.0);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_positions_stay_in_bounds() {
    for seed in 0..8 {
        let mut set = random_set(seed, 60, 12.0);
        for edges in [EdgeMode::Bounce, EdgeMode::Wrap] {
            for _ in 0..300 {
                step(&mut set, 1.0, edges);
                assert!(set.all_in_bounds(), "seed {seed} left bounds with {edges:?}");
            }
        }
    }
}

#[test]
fn test_speed_is_invariant() {
    let mut set = random_set(42, 40, 6.0);
    let speeds: Vec<f32> = set.iter().map(Particle::speed).collect();
    for _ in 0..500 {
        step(&mut set, 1.0, EdgeMode::Bounce);
    }
    for (p, before) in set.iter().zip(speeds) {
        assert!((p.speed() - before).abs() < 1e-5, "particle {} changed speed", p.id);
    }
}

#[test]
fn test_connections_are_symmetric_without_self_pairs() {
    let set = random_set(9, 80, 1.0);
    let forward = compute_connections(&set, 90.0, 0.5);

    let reversed = ParticleSet::new(set.viewport(), set.iter().rev().copied().collect());
    let backward = compute_connections(&reversed, 90.0, 0.5);

    let key = |set: &ParticleSet, a: usize, b: usize| {
        let (ia, ib) = (set.particles()[a].id, set.particles()[b].id);
        (ia.min(ib), ia.max(ib))
    };
    let mut f: Vec<_> = forward.iter().map(|c| key(&set, c.a, c.b)).collect();
    let mut b: Vec<_> = backward.iter().map(|c| key(&reversed, c.a, c.b)).collect();
    f.sort_unstable();
    b.sort_unstable();

    assert!(!f.is_empty());
    assert_eq!(f, b);
    assert!(forward.iter().all(|c| c.a != c.b));
}

#[test]
fn test_grid_strategy_matches_all_pairs() {
    let set = random_set(21, 250, 1.0);
    let all_pairs = find_connections(&set, &ConnectionConfig::default());
    let grid = find_connections(
        &set,
        &ConnectionConfig {
            strategy: ConnectionStrategy::Grid,
            ..ConnectionConfig::default()
        },
    );
    assert_eq!(all_pairs, grid);
}

#[test]
fn test_render_is_idempotent() {
    let set = random_set(3, 50, 1.0);
    let conns = compute_connections(&set, 120.0, 0.5);
    let style = RenderStyle::default();
    let first: Frame = render(&set, &conns, &style, 0.75);
    let second = render(&set, &conns, &style, 0.75);
    assert_eq!(first, second);
    assert_eq!(first.line_count(), conns.len());
    assert_eq!(first.circle_count(), 50);
}

#[test]
fn test_seeded_initialize_is_reproducible() {
    assert_eq!(random_set(5, 30, 1.0), random_set(5, 30, 1.0));
    assert_ne!(random_set(5, 30, 1.0), random_set(6, 30, 1.0));
}

// ============================================================================
// Field lifecycle and tick loop
// ============================================================================

fn subscribed_loop(config: FieldConfig, seed: u64) -> (FrameLoop, constellation::Subscription) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut field = ParticleField::new();
    field.initialize(config.clone(), &mut rng).unwrap();
    let mut frames = FrameLoop::new(field, Clock::new(config.step));
    let subscription = frames.subscribe();
    (frames, subscription)
}

#[test]
fn test_frame_loop_draws_to_every_target_kind() {
    let config = FieldConfig::default().with_viewport(160.0, 120.0).with_count(12);
    let (mut frames, _subscription) = subscribed_loop(config, 1);

    let mut recording = RecordingTarget::default();
    let mut raster = RasterTarget::new(1, 1);
    let mut scene = SceneTarget::new();

    assert_eq!(frames.tick_with(1.0 / 60.0, &mut recording), TickOutcome::Rendered);
    assert_eq!(frames.tick_with(1.0 / 60.0, &mut raster), TickOutcome::Rendered);
    assert_eq!(frames.tick_with(1.0 / 60.0, &mut scene), TickOutcome::Rendered);

    assert_eq!(raster.image().dimensions(), (160, 120));
    let circles = recording
        .commands
        .iter()
        .filter(|c| matches!(c, constellation::DrawCommand::Circle { .. }))
        .count();
    assert_eq!(circles, 12);
    assert!(scene.scene().elements.len() >= 12);
}

#[test]
fn test_no_step_after_cancel() {
    let config = FieldConfig::default().with_viewport(160.0, 120.0).with_count(12);
    let (mut frames, subscription) = subscribed_loop(config, 2);
    let mut target = RecordingTarget::default();
    frames.tick_with(1.0 / 60.0, &mut target);

    drop(subscription);
    for _ in 0..3 {
        let outcome = frames.tick_with(1.0 / 60.0, &mut target);
        assert_ne!(outcome, TickOutcome::Rendered);
    }
    assert_eq!(target.begun, 1);
    assert!(frames.field().particles().is_none());
}

#[test]
fn test_delta_time_motion_is_frame_rate_independent() {
    let config = FieldConfig::default()
        .with_viewport(2_000.0, 2_000.0)
        .with_count(20)
        .with_speed(1.0)
        .with_step(StepMode::DeltaTime {
            reference_fps: 60.0,
            max_delta: 0.1,
        });

    let (mut at_30, _s30) = subscribed_loop(config.clone(), 4);
    let (mut at_60, _s60) = subscribed_loop(config, 4);
    let mut target = RecordingTarget::default();

    for _ in 0..30 {
        at_30.tick_with(1.0 / 30.0, &mut target);
    }
    for _ in 0..60 {
        at_60.tick_with(1.0 / 60.0, &mut target);
    }

    let a = at_30.field().particles().unwrap();
    let b = at_60.field().particles().unwrap();
    // a bounce clamps away a step-size dependent overshoot, so compare
    // only particles that stayed clear of the edges
    let interior = |p: Vec2| p.min_element() > 40.0 && p.max_element() < 1_960.0;
    let mut compared = 0;
    for (p, q) in a.iter().zip(b.iter()) {
        if interior(p.position) {
            assert!(p.position.distance(q.position) < 1e-2);
            compared += 1;
        }
    }
    assert!(compared > 0);
}

#[test]
fn test_invalid_config_degrades_to_blank_frames() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut field = ParticleField::new();
    assert!(field
        .initialize(FieldConfig::default().with_size(0.0, 2.0), &mut rng)
        .is_err());

    let mut frames = FrameLoop::new(field, Clock::default());
    let _subscription = frames.subscribe();
    let mut target = RecordingTarget::default();
    assert_eq!(frames.tick_with(1.0 / 60.0, &mut target), TickOutcome::Rendered);
    assert!(target.commands.is_empty());
}
