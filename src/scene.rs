//! Declarative scene target.
//!
//! Instead of painting pixels, [`SceneTarget`] turns a frame into a list of
//! styled elements positioned by percentage of the viewport, the way a DOM
//! overlay would place absolutely positioned dots and rotated bars. The
//! scene serializes to JSON for a host page to diff against its previous
//! element list.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::Viewport;
use crate::frame::RenderTarget;

/// One positioned element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneElement {
    /// A round dot centered at (`left`%, `top`%).
    Dot {
        left: f32,
        top: f32,
        /// Diameter in pixels.
        size: f32,
        color: String,
        opacity: f32,
    },
    /// A bar starting at (`left`%, `top`%), rotated `angle` degrees clockwise
    /// about its left-center origin.
    Line {
        left: f32,
        top: f32,
        /// Length in pixels.
        length: f32,
        angle: f32,
        thickness: f32,
        color: String,
        opacity: f32,
    },
}

/// A whole frame as elements, in paint order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub elements: Vec<SceneElement>,
}

/// [`RenderTarget`] that records a [`Scene`].
#[derive(Debug, Default)]
pub struct SceneTarget {
    scene: Scene,
}

impl SceneTarget {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn into_scene(self) -> Scene {
        self.scene
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.scene)
    }

    fn percent(&self, p: Vec2) -> (f32, f32) {
        let pct = |v: f32, len: f32| if len > 0.0 { v / len * 100.0 } else { 0.0 };
        (pct(p.x, self.scene.width), pct(p.y, self.scene.height))
    }
}

/// `#rrggbb` for a linear 0.0-1.0 color.
pub fn hex_color(color: Vec3) -> String {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    format!("#{:02x}{:02x}{:02x}", c.x as u8, c.y as u8, c.z as u8)
}

impl RenderTarget for SceneTarget {
    fn begin(&mut self, viewport: Viewport, background: Vec3) {
        self.scene.width = viewport.width;
        self.scene.height = viewport.height;
        self.scene.background = hex_color(background);
        self.scene.elements.clear();
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec3, opacity: f32) {
        let (left, top) = self.percent(from);
        let delta = to - from;
        self.scene.elements.push(SceneElement::Line {
            left,
            top,
            length: delta.length(),
            angle: delta.y.atan2(delta.x).to_degrees(),
            thickness: width,
            color: hex_color(color),
            opacity,
        });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec3, opacity: f32) {
        let (left, top) = self.percent(center);
        self.scene.elements.push(SceneElement::Dot {
            left,
            top,
            size: radius * 2.0,
            color: hex_color(color),
            opacity,
        });
    }
}
