//! # Constellation
//!
//! A bounded 2D particle field with proximity connections: the drifting,
//! twinkling dots-and-lines effect used as a page background.
//!
//! The simulator is plain CPU code with an injectable random source. Frames
//! are lists of draw commands that any [`RenderTarget`] can replay: a
//! software raster image, a declarative element list, or the wgpu window.
//!
//! ## Quick Start
//!
//! ```ignore
//! use constellation::prelude::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = FieldConfig::preset("constellation")?.with_viewport(800.0, 600.0);
//!     let mut field = ParticleField::new();
//!     field.initialize(config, &mut StdRng::seed_from_u64(7))?;
//!
//!     let mut frames = FrameLoop::new(field, Clock::default());
//!     let subscription = frames.subscribe();
//!     let mut target = RasterTarget::new(800, 600);
//!     for _ in 0..60 {
//!         frames.tick_with(1.0 / 60.0, &mut target);
//!     }
//!     drop(subscription);
//!     target.save_png("field.png").ok();
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! A [`Particle`] has an id, a position inside the viewport, a velocity,
//! a radius and an opacity. Opacity is either fixed or a [`Twinkle`]
//! oscillation. Particles are created together by [`spawn::initialize`]
//! and never individually destroyed; a resize regenerates the whole set.
//!
//! ### Motion
//!
//! [`motion::step`] moves every particle by `velocity * scale`. Particles
//! bounce off the viewport edges (or wrap around, see [`EdgeMode`]) and
//! never render outside it.
//!
//! ### Connections
//!
//! Two particles closer than `max_distance` are joined by a line whose
//! opacity fades linearly with distance. The default exhaustive pair check
//! is quadratic; [`ConnectionStrategy::Grid`] buckets particles for larger
//! fields and produces the same set.
//!
//! ### Frames
//!
//! [`frame::render`] emits all lines first, then all particles, so dots
//! always sit on top. Rendering never touches simulator state.
//!
//! ## Feature Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`FieldConfig`], presets, validation, JSON |
//! | [`field`] | [`ParticleField`], the simulator and its lifecycle |
//! | [`ticker`] | [`FrameLoop`] and its cancellable [`Subscription`] |
//! | [`raster`] | [`RasterTarget`] for PNG snapshots |
//! | [`scene`] | [`SceneTarget`] for percentage-positioned elements |
//! | [`viewer`] | Windowed viewer on winit and wgpu |

pub mod config;
pub mod connections;
pub mod error;
pub mod field;
pub mod frame;
pub mod gpu;
pub mod input;
pub mod motion;
pub mod particle;
pub mod raster;
pub mod scene;
pub mod spawn;
pub mod ticker;
pub mod time;
pub mod viewer;
pub mod visuals;

pub use config::{
    ConnectionConfig, ConnectionStrategy, EdgeMode, FieldConfig, OpacityMode, ParticleCount,
    PointerConfig, SizeRange, StepMode, Viewport, PRESETS,
};
pub use connections::{compute_connections, Connection, PointerLink, SpatialGrid};
pub use error::{ConfigError, GpuError, ViewerError};
pub use field::{FieldState, ParticleField};
pub use frame::{render, DrawCommand, Frame, RecordingTarget, RenderTarget};
pub use glam::{Vec2, Vec3};
pub use particle::{Particle, ParticleSet, Twinkle};
pub use raster::RasterTarget;
pub use scene::{Scene, SceneElement, SceneTarget};
pub use spawn::SpawnContext;
pub use ticker::{FrameLoop, Subscription, TickOutcome};
pub use time::{Clock, Tick};
pub use visuals::{Palette, RenderStyle};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use constellation::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{
        ConnectionStrategy, EdgeMode, FieldConfig, OpacityMode, StepMode, Viewport,
    };
    pub use crate::error::ConfigError;
    pub use crate::field::ParticleField;
    pub use crate::frame::{Frame, RenderTarget};
    pub use crate::raster::RasterTarget;
    pub use crate::scene::SceneTarget;
    pub use crate::ticker::{FrameLoop, Subscription, TickOutcome};
    pub use crate::time::Clock;
    pub use crate::visuals::{Palette, RenderStyle};
    pub use crate::{Vec2, Vec3};
}
