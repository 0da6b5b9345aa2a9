//! Proximity connections between particles.
//!
//! Two particles are connected when their distance is strictly below
//! `max_distance`. Line opacity fades linearly from `base_opacity` at
//! distance zero to nothing at the threshold.
//!
//! The all-pairs search is quadratic in particle count, which is fine for
//! the few dozen to few hundred particles a background field uses. For
//! denser fields use [`ConnectionStrategy::Grid`]: particles are bucketed
//! into cells of size `max_distance`, so only the 3x3 neighborhood of each
//! cell needs checking. Both strategies return the same connections in the
//! same order.

use glam::Vec2;

use crate::config::{ConnectionConfig, ConnectionStrategy};
use crate::particle::ParticleSet;

/// Largest grid dimension. Tiny thresholds on huge viewports get coarser cells
/// rather than millions of empty buckets.
const MAX_GRID_RESOLUTION: usize = 512;

/// An unordered pair of connected particles.
///
/// `a` and `b` index into [`ParticleSet::particles`], with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    pub opacity: f32,
}

/// A line from the pointer to a nearby particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerLink {
    /// Index into [`ParticleSet::particles`].
    pub index: usize,
    pub distance: f32,
    pub opacity: f32,
}

/// Opacity of a connection at `distance`.
///
/// `base_opacity` at distance zero, falling linearly to 0 at `max_distance`
/// and floored at 0 beyond it. A non-positive threshold yields 0.
#[inline]
pub fn connection_opacity(distance: f32, max_distance: f32, base_opacity: f32) -> f32 {
    if !(max_distance > 0.0) {
        return 0.0;
    }
    (base_opacity * (1.0 - distance / max_distance)).max(0.0)
}

/// All connections in `set`, by exhaustive pair comparison.
pub fn compute_connections(set: &ParticleSet, max_distance: f32, base_opacity: f32) -> Vec<Connection> {
    let mut out = Vec::new();
    all_pairs_into(set, max_distance, base_opacity, &mut out);
    out
}

/// All connections in `set` using the configured strategy, written into
/// `out` (cleared first) so callers can reuse the allocation across frames.
pub fn find_connections_into(set: &ParticleSet, config: &ConnectionConfig, out: &mut Vec<Connection>) {
    match config.strategy {
        ConnectionStrategy::AllPairs => {
            all_pairs_into(set, config.max_distance, config.base_opacity, out)
        }
        ConnectionStrategy::Grid => {
            grid_into(set, config.max_distance, config.base_opacity, out)
        }
    }
}

/// Convenience wrapper around [`find_connections_into`].
pub fn find_connections(set: &ParticleSet, config: &ConnectionConfig) -> Vec<Connection> {
    let mut out = Vec::new();
    find_connections_into(set, config, &mut out);
    out
}

fn all_pairs_into(set: &ParticleSet, max_distance: f32, base_opacity: f32, out: &mut Vec<Connection>) {
    out.clear();
    if !(max_distance > 0.0) {
        return;
    }
    let particles = set.particles();
    for (i, p) in particles.iter().enumerate() {
        for (j, q) in particles.iter().enumerate().skip(i + 1) {
            if let Some(c) = connect(i, j, p.position, q.position, max_distance, base_opacity) {
                out.push(c);
            }
        }
    }
}

fn grid_into(set: &ParticleSet, max_distance: f32, base_opacity: f32, out: &mut Vec<Connection>) {
    out.clear();
    if !(max_distance > 0.0) || set.len() < 2 {
        return;
    }
    let grid = SpatialGrid::build(set, max_distance);
    let particles = set.particles();

    for (i, p) in particles.iter().enumerate() {
        grid.for_each_neighbor(p.position, |j| {
            if j > i {
                if let Some(c) =
                    connect(i, j, p.position, particles[j].position, max_distance, base_opacity)
                {
                    out.push(c);
                }
            }
        });
    }
    // Neighbor cells are visited in grid order, not index order.
    out.sort_unstable_by_key(|c| (c.a, c.b));
}

#[inline]
fn connect(a: usize, b: usize, pa: Vec2, pb: Vec2, max_distance: f32, base_opacity: f32) -> Option<Connection> {
    let distance = pa.distance(pb);
    // NaN positions fail the comparison and are skipped.
    if distance < max_distance {
        Some(Connection {
            a,
            b,
            distance,
            opacity: connection_opacity(distance, max_distance, base_opacity),
        })
    } else {
        None
    }
}

/// Lines from `pointer` to every particle within `radius`.
pub fn pointer_links(set: &ParticleSet, pointer: Vec2, radius: f32, base_opacity: f32) -> Vec<PointerLink> {
    if !(radius > 0.0) || !pointer.is_finite() {
        return Vec::new();
    }
    set.iter()
        .enumerate()
        .filter_map(|(index, p)| {
            let distance = p.position.distance(pointer);
            (distance < radius).then(|| PointerLink {
                index,
                distance,
                opacity: connection_opacity(distance, radius, base_opacity),
            })
        })
        .collect()
}

/// Uniform bucket grid over the viewport.
///
/// Each cell holds the indices of the particles inside it. With a cell size
/// at least the query radius, every neighbor of a point lies in the 3x3
/// block of cells around it.
#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    /// Bucket all particles of `set` into cells of at least `cell_size`.
    pub fn build(set: &ParticleSet, cell_size: f32) -> Self {
        let viewport = set.viewport();
        let extent = viewport.width.max(viewport.height).max(0.0);
        let mut cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            extent.max(1.0)
        };
        if extent / cell_size > MAX_GRID_RESOLUTION as f32 {
            cell_size = extent / MAX_GRID_RESOLUTION as f32;
        }

        let dim = |len: f32| ((len.max(0.0) / cell_size).floor() as usize + 1).min(MAX_GRID_RESOLUTION + 1);
        let cols = dim(viewport.width);
        let rows = dim(viewport.height);

        let mut grid = Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        };
        for (i, p) in set.iter().enumerate() {
            let (cx, cy) = grid.cell_of(p.position);
            grid.cells[cy * cols + cx].push(i);
        }
        grid
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Grid dimensions as `(columns, rows)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Cell coordinates containing `pos`, clamped to the grid.
    pub fn cell_of(&self, pos: Vec2) -> (usize, usize) {
        let clamp = |v: f32, n: usize| {
            let c = (v / self.cell_size).floor();
            if c.is_nan() || c < 0.0 {
                0
            } else {
                (c as usize).min(n - 1)
            }
        };
        (clamp(pos.x, self.cols), clamp(pos.y, self.rows))
    }

    /// Call `f` with the index of every particle in the 3x3 cells around `pos`.
    pub fn for_each_neighbor(&self, pos: Vec2, mut f: impl FnMut(usize)) {
        let (cx, cy) = self.cell_of(pos);
        let x0 = cx.saturating_sub(1);
        let y0 = cy.saturating_sub(1);
        let x1 = (cx + 1).min(self.cols - 1);
        let y1 = (cy + 1).min(self.rows - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                for &i in &self.cells[y * self.cols + x] {
                    f(i);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Viewport;
    use crate::particle::Particle;
    use crate::spawn::initialize;
    use crate::config::SizeRange;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn set_of(points: &[(f32, f32)]) -> ParticleSet {
        let particles = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Particle::new(i as u32, Vec2::new(x, y), Vec2::ZERO))
            .collect();
        ParticleSet::new(Viewport::new(100.0, 100.0), particles)
    }

    #[test]
    fn test_half_distance_half_opacity() {
        let set = set_of(&[(0.0, 0.0), (10.0, 0.0)]);
        let conns = compute_connections(&set, 20.0, 0.8);
        assert_eq!(conns.len(), 1);
        assert_eq!((conns[0].a, conns[0].b), (0, 1));
        assert!((conns[0].opacity - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_coincident_particles_get_full_opacity() {
        let set = set_of(&[(5.0, 5.0), (5.0, 5.0)]);
        let conns = compute_connections(&set, 20.0, 0.6);
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].distance, 0.0);
        assert_eq!(conns[0].opacity, 0.6);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let set = set_of(&[(0.0, 0.0), (20.0, 0.0), (50.0, 50.0)]);
        assert!(compute_connections(&set, 20.0, 1.0).is_empty());
        assert!(compute_connections(&set, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_opacity_floor() {
        assert_eq!(connection_opacity(30.0, 20.0, 1.0), 0.0);
        assert_eq!(connection_opacity(0.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_grid_matches_all_pairs() {
        let mut rng = StdRng::seed_from_u64(11);
        let set = initialize(Viewport::new(800.0, 600.0), 300, 1.0, SizeRange::default(), &mut rng);
        for max in [15.0, 60.0, 250.0, 2000.0] {
            let brute = compute_connections(&set, max, 0.5);
            let config = ConnectionConfig {
                max_distance: max,
                base_opacity: 0.5,
                strategy: ConnectionStrategy::Grid,
                ..ConnectionConfig::default()
            };
            let grid = find_connections(&set, &config);
            assert_eq!(brute, grid, "mismatch at max_distance {max}");
        }
    }

    #[test]
    fn test_grid_caps_resolution() {
        let set = set_of(&[(1.0, 1.0)]);
        let grid = SpatialGrid::build(&set, 0.001);
        let (cols, rows) = grid.dimensions();
        assert!(cols <= MAX_GRID_RESOLUTION + 1 && rows <= MAX_GRID_RESOLUTION + 1);
        assert_eq!(grid.cell_of(Vec2::new(-5.0, f32::NAN)), (0, 0));
    }

    #[test]
    fn test_pointer_links() {
        let set = set_of(&[(10.0, 10.0), (40.0, 10.0), (90.0, 90.0)]);
        let links = pointer_links(&set, Vec2::new(10.0, 10.0), 50.0, 0.4);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].index, 0);
        assert!((links[0].opacity - 0.4).abs() < 1e-6);
        assert!((links[1].opacity - 0.4 * (1.0 - 30.0 / 50.0)).abs() < 1e-6);
        assert!(pointer_links(&set, Vec2::NAN, 50.0, 0.4).is_empty());
    }
}
