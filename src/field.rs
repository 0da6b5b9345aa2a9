//! The particle field simulator.
//!
//! [`ParticleField`] owns the particle set and everything derived from it
//! each frame. It is either [`FieldState::Uninitialized`] (only
//! [`ParticleField::initialize`] does anything) or [`FieldState::Running`].
//! Re-initializing replaces the set wholesale, which is how viewport resizes
//! are handled. [`ParticleField::teardown`] discards the set and returns to
//! uninitialized.
//!
//! ```ignore
//! let mut field = ParticleField::new();
//! field.initialize(FieldConfig::preset("constellation")?, &mut rand::thread_rng())?;
//!
//! // once per frame:
//! field.step(1.0);
//! field.compute_connections();
//! let frame = field.render(elapsed);
//! frame.replay(&mut target);
//! ```

use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::config::{FieldConfig, Viewport};
use crate::connections::{find_connections_into, pointer_links, Connection, PointerLink};
use crate::error::ConfigError;
use crate::frame::{render_into, Frame, PointerOverlay};
use crate::input::{SmoothedPointer, Spring};
use crate::motion;
use crate::particle::ParticleSet;
use crate::spawn::spawn_field;
use crate::visuals::RenderStyle;

/// Lifecycle of a [`ParticleField`].
#[derive(Debug, Clone, Default)]
pub enum FieldState {
    #[default]
    Uninitialized,
    Running(ParticleSet),
}

/// Particle simulator with an explicit lifecycle.
#[derive(Debug)]
pub struct ParticleField {
    config: FieldConfig,
    style: RenderStyle,
    state: FieldState,
    connections: Vec<Connection>,
    pointer: SmoothedPointer,
    pointer_enabled: bool,
    pointer_links: Vec<PointerLink>,
    /// Reused across frames.
    frame: Frame,
}

impl ParticleField {
    pub fn new() -> Self {
        let config = FieldConfig::default();
        Self {
            style: config.render_style(),
            pointer: pointer_for(&config),
            pointer_enabled: config.pointer.enabled,
            frame: Frame::blank(config.viewport, Vec3::from_array(config.background)),
            config,
            state: FieldState::Uninitialized,
            connections: Vec::new(),
            pointer_links: Vec::new(),
        }
    }

    /// Create the particle set described by `config`.
    ///
    /// Valid from either state; a running field is replaced wholesale. An
    /// invalid config is reported, and the field still enters the running
    /// state with no particles so it renders blank frames instead of stale
    /// ones.
    pub fn initialize<R: Rng + ?Sized>(&mut self, config: FieldConfig, rng: &mut R) -> Result<(), ConfigError> {
        let result = config.validate();
        self.style = config.render_style();
        self.pointer = pointer_for(&config);
        self.pointer_enabled = config.pointer.enabled;
        self.connections.clear();
        self.pointer_links.clear();

        let set = match &result {
            Ok(()) => spawn_field(&config, rng),
            Err(err) => {
                warn!(error = %err, "rejected field config; rendering blank");
                ParticleSet::empty(config.viewport)
            }
        };
        debug!(
            particles = set.len(),
            width = config.viewport.width,
            height = config.viewport.height,
            "field initialized"
        );
        self.config = config;
        self.state = FieldState::Running(set);
        result
    }

    /// Re-initialize with the current config and fresh randomness.
    pub fn reseed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), ConfigError> {
        self.initialize(self.config.clone(), rng)
    }

    /// Regenerate the particle set for a new viewport size.
    pub fn resize<R: Rng + ?Sized>(&mut self, width: f32, height: f32, rng: &mut R) -> Result<(), ConfigError> {
        let config = self.config.clone().with_viewport(width, height);
        self.initialize(config, rng)
    }

    /// Discard the particle set.
    pub fn teardown(&mut self) {
        if self.is_running() {
            debug!("field torn down");
        }
        self.state = FieldState::Uninitialized;
        self.connections.clear();
        self.pointer_links.clear();
        self.pointer.clear();
    }

    /// Advance every particle by one tick. Does nothing while uninitialized.
    ///
    /// When cursor interaction is on and the cursor is inside the viewport,
    /// nearby particles are pushed away from the smoothed cursor position.
    pub fn step(&mut self, scale: f32) {
        let FieldState::Running(set) = &mut self.state else {
            return;
        };
        motion::step(set, scale, self.config.edges);

        if self.pointer_enabled {
            if let Some(pos) = self.pointer.position() {
                let p = self.config.pointer;
                motion::push_from_pointer(set, pos, p.radius, p.strength, scale);
            }
        }
    }

    /// Rebuild connections (and cursor links) from current positions.
    pub fn compute_connections(&mut self) -> &[Connection] {
        self.pointer_links.clear();
        let FieldState::Running(set) = &self.state else {
            self.connections.clear();
            return &self.connections;
        };
        find_connections_into(set, &self.config.connections, &mut self.connections);

        let p = self.config.pointer;
        if self.pointer_enabled && p.link_opacity > 0.0 {
            if let Some(pos) = self.pointer.position() {
                self.pointer_links = pointer_links(set, pos, p.radius, p.link_opacity);
            }
        }
        trace!(
            particles = set.len(),
            connections = self.connections.len(),
            pointer_links = self.pointer_links.len(),
            "connections computed"
        );
        &self.connections
    }

    /// Draw the current state into the reused frame buffer.
    ///
    /// Uses connections from the last [`ParticleField::compute_connections`].
    /// An uninitialized field renders a blank frame.
    pub fn render(&mut self, time: f32) -> &Frame {
        match &self.state {
            FieldState::Running(set) => {
                let overlay = match self.pointer.position() {
                    Some(position) if !self.pointer_links.is_empty() => Some(PointerOverlay {
                        position,
                        links: &self.pointer_links,
                    }),
                    _ => None,
                };
                render_into(&mut self.frame, set, &self.connections, overlay, &self.style, time);
            }
            FieldState::Uninitialized => {
                self.frame = Frame::blank(self.config.viewport, self.style.background);
            }
        }
        &self.frame
    }

    /// Feed a raw cursor position, or `None` when it leaves the viewport.
    pub fn set_pointer(&mut self, position: Option<Vec2>) {
        match position {
            Some(pos) => self.pointer.set_target(pos),
            None => self.pointer.clear(),
        }
    }

    /// Integrate cursor smoothing by `dt` seconds.
    pub fn advance_pointer(&mut self, dt: f32) {
        self.pointer.advance(dt);
    }

    /// Smoothed cursor position.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer.position()
    }

    pub fn pointer_enabled(&self) -> bool {
        self.pointer_enabled
    }

    pub fn set_pointer_enabled(&mut self, enabled: bool) {
        self.pointer_enabled = enabled;
        if !enabled {
            self.pointer_links.clear();
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, FieldState::Running(_))
    }

    #[inline]
    pub fn state(&self) -> &FieldState {
        &self.state
    }

    /// The particle set, if running.
    pub fn particles(&self) -> Option<&ParticleSet> {
        match &self.state {
            FieldState::Running(set) => Some(set),
            FieldState::Uninitialized => None,
        }
    }

    /// Connections from the last [`ParticleField::compute_connections`].
    #[inline]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    #[inline]
    pub fn pointer_links(&self) -> &[PointerLink] {
        &self.pointer_links
    }

    #[inline]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    #[inline]
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: RenderStyle) {
        self.style = style;
    }
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new()
    }
}

fn pointer_for(config: &FieldConfig) -> SmoothedPointer {
    SmoothedPointer::new(Spring::new(config.pointer.stiffness, config.pointer.damping))
}
