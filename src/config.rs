//! Field configuration.
//!
//! A [`FieldConfig`] is everything the embedding page supplies: viewport,
//! particle count or density, motion and size ranges, connection threshold,
//! palette, and the interaction/edge switches. Configs are plain data; they
//! can be built in code, loaded from JSON, or taken from a named preset.
//!
//! ```ignore
//! let config = FieldConfig::preset("constellation")?
//!     .with_viewport(1280.0, 720.0)
//!     .with_edges(EdgeMode::Wrap);
//! config.validate()?;
//! ```
//!
//! Every section carries `#[serde(default)]`, so a JSON file only needs the
//! options it changes:
//!
//! ```json
//! { "viewport": { "width": 800, "height": 600 }, "count": { "fixed": 40 } }
//! ```

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::visuals::{Palette, RenderStyle};

/// Upper bound on a configured particle count, fixed or density-capped.
pub const MAX_PARTICLES: u32 = 10_000;

/// Pixel dimensions of the area particles live in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Whether `p` lies in `[0, width] x [0, height]`.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Both dimensions positive and finite.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// How many particles to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleCount {
    /// Exactly this many.
    Fixed(u32),
    /// Scale with viewport area: `min(max, area / area_per_particle)`.
    Density { max: u32, area_per_particle: f32 },
}

impl ParticleCount {
    /// Resolve to a concrete count for `viewport`.
    ///
    /// Degenerate inputs resolve to zero rather than overflowing.
    pub fn resolve(&self, viewport: Viewport) -> u32 {
        match *self {
            ParticleCount::Fixed(n) => n,
            ParticleCount::Density {
                max,
                area_per_particle,
            } => {
                if !(area_per_particle > 0.0) || !viewport.is_valid() {
                    return 0;
                }
                let n = (viewport.area() / area_per_particle).floor();
                if n >= max as f32 {
                    max
                } else {
                    n as u32
                }
            }
        }
    }
}

impl Default for ParticleCount {
    fn default() -> Self {
        ParticleCount::Density {
            max: 80,
            area_per_particle: 15_000.0,
        }
    }
}

/// Inclusive range of particle radii in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl SizeRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

impl Default for SizeRange {
    fn default() -> Self {
        Self::new(1.0, 3.0)
    }
}

/// How particle opacity is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OpacityMode {
    /// Random opacity in `[min, max]`, fixed at creation.
    Static { min: f32, max: f32 },
    /// Ease-in-out oscillation between `low` and `high` every `period` seconds,
    /// with the rendered radius swelling to `scale_peak` at the brightest point.
    /// Each particle gets a random phase so the field shimmers unevenly.
    Twinkle {
        low: f32,
        high: f32,
        period: f32,
        scale_peak: f32,
    },
}

impl Default for OpacityMode {
    fn default() -> Self {
        OpacityMode::Twinkle {
            low: 0.3,
            high: 1.0,
            period: 2.5,
            scale_peak: 1.4,
        }
    }
}

/// Neighbor search used to build connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStrategy {
    /// Check every unordered pair. Quadratic; fine up to a few hundred particles.
    #[default]
    AllPairs,
    /// Bucket particles into a grid with cell size `max_distance` and only
    /// compare neighboring cells.
    Grid,
}

/// Connection line settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Pairs closer than this are connected. Zero disables connections.
    pub max_distance: f32,
    /// Opacity of a connection at distance zero.
    pub base_opacity: f32,
    /// Line width in pixels.
    pub line_width: f32,
    pub strategy: ConnectionStrategy,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_distance: 120.0,
            base_opacity: 0.5,
            line_width: 1.0,
            strategy: ConnectionStrategy::AllPairs,
        }
    }
}

/// What happens when a particle reaches the viewport edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Reflect the velocity component and clamp to the edge.
    #[default]
    Bounce,
    /// Re-enter from the opposite edge (toroidal topology).
    Wrap,
}

/// How far particles move per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StepMode {
    /// Constant per-tick increment: `position += velocity * increment`.
    /// Motion speed follows the host frame rate.
    Fixed { increment: f32 },
    /// Scale by elapsed time so motion matches `reference_fps` regardless of
    /// the actual frame rate. Deltas above `max_delta` seconds are clamped,
    /// so a stalled tab does not teleport particles.
    DeltaTime { reference_fps: f32, max_delta: f32 },
}

impl Default for StepMode {
    fn default() -> Self {
        StepMode::Fixed { increment: 1.0 }
    }
}

/// Cursor interaction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    pub enabled: bool,
    /// Particles within this many pixels of the cursor are affected.
    pub radius: f32,
    /// Maximum push-away distance per tick, in pixels.
    pub strength: f32,
    /// Spring stiffness used to smooth the cursor position.
    pub stiffness: f32,
    /// Spring damping used to smooth the cursor position.
    pub damping: f32,
    /// Opacity of cursor-to-particle links at distance zero. Zero disables them.
    pub link_opacity: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: 150.0,
            strength: 2.0,
            stiffness: 150.0,
            damping: 15.0,
            link_opacity: 0.4,
        }
    }
}

/// Complete configuration of a particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub viewport: Viewport,
    pub count: ParticleCount,
    /// Per-axis velocity span: components are drawn from `[-speed/2, speed/2]`.
    pub speed: f32,
    pub size: SizeRange,
    pub opacity: OpacityMode,
    pub connections: ConnectionConfig,
    pub edges: EdgeMode,
    pub step: StepMode,
    pub pointer: PointerConfig,
    pub palette: Palette,
    /// Clear color (linear RGB, 0.0-1.0).
    pub background: [f32; 3],
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            count: ParticleCount::default(),
            speed: 0.5,
            size: SizeRange::default(),
            opacity: OpacityMode::default(),
            connections: ConnectionConfig::default(),
            edges: EdgeMode::Bounce,
            step: StepMode::default(),
            pointer: PointerConfig::default(),
            palette: Palette::Constellation,
            background: [0.02, 0.02, 0.05],
        }
    }
}

/// Names accepted by [`FieldConfig::preset`].
pub const PRESETS: &[&str] = &["constellation", "starfield", "dense", "interactive"];

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a named preset.
    ///
    /// - `constellation` - blue/purple twinkling dots with connections
    /// - `starfield` - white dots drifting with wraparound, no connections
    /// - `dense` - many particles, grid-indexed connections
    /// - `interactive` - constellation plus cursor push and cursor links
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        let base = Self::default();
        let config = match name {
            "constellation" => base,
            "starfield" => Self {
                count: ParticleCount::Density {
                    max: 200,
                    area_per_particle: 5_000.0,
                },
                speed: 0.3,
                size: SizeRange::new(0.5, 1.5),
                opacity: OpacityMode::Static { min: 0.2, max: 0.9 },
                connections: ConnectionConfig {
                    max_distance: 0.0,
                    ..ConnectionConfig::default()
                },
                edges: EdgeMode::Wrap,
                palette: Palette::Mono,
                background: [0.0, 0.0, 0.0],
                ..base
            },
            "dense" => Self {
                count: ParticleCount::Density {
                    max: 600,
                    area_per_particle: 2_000.0,
                },
                connections: ConnectionConfig {
                    max_distance: 80.0,
                    base_opacity: 0.35,
                    strategy: ConnectionStrategy::Grid,
                    ..ConnectionConfig::default()
                },
                palette: Palette::Ocean,
                ..base
            },
            "interactive" => Self {
                pointer: PointerConfig {
                    enabled: true,
                    ..PointerConfig::default()
                },
                step: StepMode::DeltaTime {
                    reference_fps: 60.0,
                    max_delta: 0.1,
                },
                ..base
            },
            other => return Err(ConfigError::UnknownPreset(other.to_string())),
        };
        Ok(config)
    }

    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = ParticleCount::Fixed(count);
        self
    }

    pub fn with_density(mut self, max: u32, area_per_particle: f32) -> Self {
        self.count = ParticleCount::Density {
            max,
            area_per_particle,
        };
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_size(mut self, min: f32, max: f32) -> Self {
        self.size = SizeRange::new(min, max);
        self
    }

    pub fn with_opacity(mut self, opacity: OpacityMode) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_connections(mut self, max_distance: f32, base_opacity: f32) -> Self {
        self.connections.max_distance = max_distance;
        self.connections.base_opacity = base_opacity;
        self
    }

    pub fn with_strategy(mut self, strategy: ConnectionStrategy) -> Self {
        self.connections.strategy = strategy;
        self
    }

    pub fn with_edges(mut self, edges: EdgeMode) -> Self {
        self.edges = edges;
        self
    }

    pub fn with_step(mut self, step: StepMode) -> Self {
        self.step = step;
        self
    }

    pub fn with_pointer(mut self, enabled: bool) -> Self {
        self.pointer.enabled = enabled;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Particle count for the current viewport.
    pub fn resolved_count(&self) -> u32 {
        self.count.resolve(self.viewport)
    }

    /// Check every option, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.viewport.is_valid() {
            return Err(ConfigError::Viewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        let cap = match self.count {
            ParticleCount::Fixed(n) => n,
            ParticleCount::Density {
                max,
                area_per_particle,
            } => {
                if !(area_per_particle.is_finite() && area_per_particle > 0.0) {
                    return Err(ConfigError::Density(area_per_particle));
                }
                max
            }
        };
        if cap > MAX_PARTICLES {
            return Err(ConfigError::Count {
                count: cap,
                max: MAX_PARTICLES,
            });
        }

        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(ConfigError::Speed(self.speed));
        }

        let size = self.size;
        if !(size.min.is_finite() && size.max.is_finite() && size.min > 0.0 && size.min <= size.max)
        {
            return Err(ConfigError::Size {
                min: size.min,
                max: size.max,
            });
        }

        let (low, high) = match self.opacity {
            OpacityMode::Static { min, max } => (min, max),
            OpacityMode::Twinkle {
                low,
                high,
                period,
                scale_peak,
            } => {
                if !(period.is_finite() && period > 0.0) {
                    return Err(ConfigError::TwinklePeriod(period));
                }
                if !(scale_peak.is_finite() && scale_peak > 0.0) {
                    return Err(ConfigError::ScalePeak(scale_peak));
                }
                (low, high)
            }
        };
        check_unit_range(low, high)?;

        let conn = self.connections;
        if !(conn.max_distance.is_finite() && conn.max_distance >= 0.0) {
            return Err(ConfigError::ConnectionDistance(conn.max_distance));
        }
        check_unit_range(0.0, conn.base_opacity)?;

        match self.step {
            StepMode::Fixed { increment } => {
                if !(increment.is_finite() && increment >= 0.0) {
                    return Err(ConfigError::Step("increment must be non-negative"));
                }
            }
            StepMode::DeltaTime {
                reference_fps,
                max_delta,
            } => {
                if !(reference_fps.is_finite() && reference_fps > 0.0) {
                    return Err(ConfigError::Step("reference fps must be positive"));
                }
                if !(max_delta.is_finite() && max_delta > 0.0) {
                    return Err(ConfigError::Step("max delta must be positive"));
                }
            }
        }

        let pointer = self.pointer;
        let non_negative = |v: f32| v.is_finite() && v >= 0.0;
        if !non_negative(pointer.radius) {
            return Err(ConfigError::Pointer("radius must be non-negative"));
        }
        if !non_negative(pointer.strength) {
            return Err(ConfigError::Pointer("strength must be non-negative"));
        }
        if !non_negative(pointer.stiffness) || !non_negative(pointer.damping) {
            return Err(ConfigError::Pointer("spring constants must be non-negative"));
        }
        check_unit_range(0.0, pointer.link_opacity)?;

        Ok(())
    }

    /// Parse a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write this config to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Style handed to the renderer.
    pub fn render_style(&self) -> RenderStyle {
        RenderStyle::new(self.palette)
            .with_background(Vec3::from_array(self.background))
            .with_line_width(self.connections.line_width)
    }
}

fn check_unit_range(low: f32, high: f32) -> Result<(), ConfigError> {
    let in_unit = |v: f32| (0.0..=1.0).contains(&v);
    if in_unit(low) && in_unit(high) && low <= high {
        Ok(())
    } else {
        Err(ConfigError::Opacity { low, high })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FieldConfig::default().validate().is_ok());
        for name in PRESETS {
            let config = FieldConfig::preset(name).unwrap();
            assert!(config.validate().is_ok(), "preset {name} should validate");
        }
    }

    #[test]
    fn test_unknown_preset() {
        let err = FieldConfig::preset("nebula").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset(ref n) if n == "nebula"));
    }

    #[test]
    fn test_density_count_scales_and_caps() {
        let count = ParticleCount::Density {
            max: 80,
            area_per_particle: 15_000.0,
        };
        // 300x300 = 90_000 / 15_000 = 6
        assert_eq!(count.resolve(Viewport::new(300.0, 300.0)), 6);
        // 1920x1080 = 138 before the cap
        assert_eq!(count.resolve(Viewport::new(1920.0, 1080.0)), 80);
        assert_eq!(count.resolve(Viewport::new(0.0, 1080.0)), 0);
    }

    #[test]
    fn test_rejects_bad_viewport() {
        let config = FieldConfig::default().with_viewport(0.0, 100.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Viewport { .. })
        ));

        let config = FieldConfig::default().with_viewport(f32::NAN, 100.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_ranges() {
        let config = FieldConfig::default().with_size(3.0, 1.0);
        assert!(matches!(config.validate(), Err(ConfigError::Size { .. })));

        let config = FieldConfig::default().with_speed(-1.0);
        assert!(matches!(config.validate(), Err(ConfigError::Speed(_))));

        let config = FieldConfig::default().with_connections(-5.0, 0.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConnectionDistance(_))
        ));

        let config = FieldConfig::default().with_connections(100.0, 1.5);
        assert!(matches!(config.validate(), Err(ConfigError::Opacity { .. })));

        let config = FieldConfig::default().with_opacity(OpacityMode::Twinkle {
            low: 0.3,
            high: 1.0,
            period: 0.0,
            scale_peak: 1.0,
        });
        assert!(matches!(config.validate(), Err(ConfigError::TwinklePeriod(_))));

        let config = FieldConfig::default().with_opacity(OpacityMode::Twinkle {
            low: 0.3,
            high: 1.0,
            period: 3.0,
            scale_peak: f32::NAN,
        });
        assert!(matches!(config.validate(), Err(ConfigError::ScalePeak(p)) if p.is_nan()));
    }

    #[test]
    fn test_rejects_oversized_count() {
        let json = r#"{ "count": { "fixed": 4000000000 } }"#;
        let config = FieldConfig::from_json(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Count { count: 4_000_000_000, max: MAX_PARTICLES })
        ));

        let config = FieldConfig::default().with_density(MAX_PARTICLES + 1, 100.0);
        assert!(matches!(config.validate(), Err(ConfigError::Count { .. })));

        let config = FieldConfig::default().with_count(MAX_PARTICLES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "viewport": { "width": 800, "height": 600 },
            "count": { "fixed": 40 },
            "edges": "wrap",
            "step": { "mode": "delta_time", "reference_fps": 60, "max_delta": 0.1 }
        }"#;
        let config = FieldConfig::from_json(json).unwrap();
        assert_eq!(config.viewport, Viewport::new(800.0, 600.0));
        assert_eq!(config.resolved_count(), 40);
        assert_eq!(config.edges, EdgeMode::Wrap);
        assert_eq!(config.connections, ConnectionConfig::default());
        assert!(matches!(config.step, StepMode::DeltaTime { .. }));
    }

    #[test]
    fn test_partial_viewport_fills_missing_side() {
        let config = FieldConfig::from_json(r#"{ "viewport": { "width": 800 } }"#).unwrap();
        assert_eq!(config.viewport.width, 800.0);
        assert_eq!(config.viewport.height, Viewport::default().height);
    }

    #[test]
    fn test_negative_count_is_rejected_by_parser() {
        let json = r#"{ "count": { "fixed": -3 } }"#;
        assert!(matches!(
            FieldConfig::from_json(json),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip_preserves_preset() {
        let config = FieldConfig::preset("interactive").unwrap();
        let json = config.to_json().unwrap();
        assert_eq!(FieldConfig::from_json(&json).unwrap(), config);
    }
}
