//! Pointer input and smoothing.
//!
//! Cursor events arrive whenever the windowing system delivers them, not in
//! step with frames. [`Input`] records the latest raw cursor position and the
//! few keys the viewer reacts to; [`SmoothedPointer`] chases that position
//! with a damped spring so particles respond to a gliding cursor instead of
//! a jittery one.
//!
//! ```ignore
//! let mut pointer = SmoothedPointer::new(Spring::new(150.0, 15.0));
//! pointer.set_target(Vec2::new(320.0, 240.0));
//! pointer.advance(1.0 / 60.0);
//! if let Some(pos) = pointer.position() { /* ... */ }
//! ```

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Largest integration substep, in seconds. Keeps stiff springs stable when
/// a frame takes long.
const MAX_SUBSTEP: f32 = 1.0 / 240.0;

/// Damped spring constants (unit mass).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub stiffness: f32,
    pub damping: f32,
}

impl Spring {
    pub fn new(stiffness: f32, damping: f32) -> Self {
        Self {
            stiffness: stiffness.max(0.0),
            damping: damping.max(0.0),
        }
    }
}

impl Default for Spring {
    fn default() -> Self {
        Self::new(150.0, 15.0)
    }
}

/// Cursor position smoothed by a spring.
///
/// `None` while the cursor is outside the window.
#[derive(Debug, Clone)]
pub struct SmoothedPointer {
    spring: Spring,
    target: Option<Vec2>,
    position: Vec2,
    velocity: Vec2,
}

impl SmoothedPointer {
    pub fn new(spring: Spring) -> Self {
        Self {
            spring,
            target: None,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
        }
    }

    /// Point the spring at `target`. The first target after the cursor
    /// enters is adopted immediately instead of sweeping in from elsewhere.
    pub fn set_target(&mut self, target: Vec2) {
        if !target.is_finite() {
            return;
        }
        if self.target.is_none() {
            self.position = target;
            self.velocity = Vec2::ZERO;
        }
        self.target = Some(target);
    }

    /// Cursor left; the pointer stops influencing the field.
    pub fn clear(&mut self) {
        self.target = None;
        self.velocity = Vec2::ZERO;
    }

    /// Integrate the spring forward by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        let Some(target) = self.target else {
            return;
        };
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let steps = (dt / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let h = dt / steps as f32;
        for _ in 0..steps {
            let accel = (target - self.position) * self.spring.stiffness
                - self.velocity * self.spring.damping;
            // semi-implicit Euler
            self.velocity += accel * h;
            self.position += self.velocity * h;
        }
    }

    /// Smoothed position, if the cursor is inside the window.
    pub fn position(&self) -> Option<Vec2> {
        self.target.map(|_| self.position)
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }
}

impl Default for SmoothedPointer {
    fn default() -> Self {
        Self::new(Spring::default())
    }
}

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Pause / resume.
    Space,
    /// Re-seed the field.
    R,
    /// Toggle cursor interaction.
    P,
    Escape,
}

impl KeyCode {
    fn from_winit(key: WinitKeyCode) -> Option<Self> {
        match key {
            WinitKeyCode::Space => Some(KeyCode::Space),
            WinitKeyCode::KeyR => Some(KeyCode::R),
            WinitKeyCode::KeyP => Some(KeyCode::P),
            WinitKeyCode::Escape => Some(KeyCode::Escape),
            _ => None,
        }
    }
}

/// Raw input state gathered from window events.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    cursor: Option<Vec2>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` went down since the last [`Input::begin_frame`].
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Latest cursor position in window pixels, `None` if outside.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(key) = KeyCode::from_winit(code) else {
                    return;
                };
                match event.state {
                    ElementState::Pressed => {
                        // no key repeat
                        if self.keys_held.insert(key) {
                            self.keys_pressed.insert(key);
                        }
                    }
                    ElementState::Released => {
                        self.keys_held.remove(&key);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_target_snaps() {
        let mut pointer = SmoothedPointer::default();
        assert_eq!(pointer.position(), None);
        pointer.set_target(Vec2::new(100.0, 50.0));
        assert_eq!(pointer.position(), Some(Vec2::new(100.0, 50.0)));
    }

    #[test]
    fn test_spring_converges_on_target() {
        let mut pointer = SmoothedPointer::default();
        pointer.set_target(Vec2::ZERO);
        pointer.set_target(Vec2::new(300.0, 0.0));

        pointer.advance(1.0 / 60.0);
        let early = pointer.position().unwrap().x;
        assert!(early > 0.0 && early < 300.0);

        for _ in 0..180 {
            pointer.advance(1.0 / 60.0);
        }
        let settled = pointer.position().unwrap();
        assert!((settled.x - 300.0).abs() < 0.5, "settled at {settled:?}");
    }

    #[test]
    fn test_large_dt_stays_stable() {
        let mut pointer = SmoothedPointer::default();
        pointer.set_target(Vec2::ZERO);
        pointer.set_target(Vec2::new(50.0, 50.0));
        pointer.advance(2.0);
        let pos = pointer.position().unwrap();
        assert!(pos.is_finite());
        assert!((pos - Vec2::new(50.0, 50.0)).length() < 1.0);
    }

    #[test]
    fn test_clear_hides_pointer() {
        let mut pointer = SmoothedPointer::default();
        pointer.set_target(Vec2::ONE);
        pointer.clear();
        assert_eq!(pointer.position(), None);
        pointer.advance(0.1);
        assert_eq!(pointer.position(), None);
    }

    #[test]
    fn test_key_pressed_clears_each_frame() {
        let mut input = Input::new();
        input.keys_held.insert(KeyCode::Space);
        input.keys_pressed.insert(KeyCode::Space);
        assert!(input.key_pressed(KeyCode::Space));
        input.begin_frame();
        assert!(!input.key_pressed(KeyCode::Space));
    }
}
