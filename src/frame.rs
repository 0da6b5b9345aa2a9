//! Render frames and the render-target seam.
//!
//! [`render`] turns a particle snapshot into an ordered list of
//! [`DrawCommand`]s: every line first, then every particle, so dots always
//! sit on top of the lines that join them. A [`Frame`] knows nothing about
//! where it ends up; [`Frame::replay`] feeds it to any [`RenderTarget`]
//! (a raster image, a declarative scene, or the GPU window).

use glam::{Vec2, Vec3};

use crate::config::Viewport;
use crate::connections::{Connection, PointerLink};
use crate::particle::ParticleSet;
use crate::visuals::RenderStyle;

/// One drawing instruction, in viewport pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Vec3,
        opacity: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Vec3,
        opacity: f32,
    },
}

/// A surface that can draw a [`Frame`].
///
/// Targets own their draw state; a frame is replayed from scratch each tick,
/// so `begin` must clear whatever the previous frame left behind.
pub trait RenderTarget {
    /// Whether the target can accept a frame right now. A target that is not
    /// ready (a surface still being configured, say) is skipped for this tick
    /// and asked again on the next.
    fn is_ready(&self) -> bool {
        true
    }

    /// Start a frame: clear to `background` and adopt `viewport` as the
    /// coordinate space.
    fn begin(&mut self, viewport: Viewport, background: Vec3);

    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec3, opacity: f32);

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec3, opacity: f32);

    /// Finish the frame (present, flush, ...).
    fn finish(&mut self) {}
}

/// One rendered snapshot of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub viewport: Viewport,
    pub background: Vec3,
    commands: Vec<DrawCommand>,
}

impl Frame {
    /// An empty frame: just the background.
    pub fn blank(viewport: Viewport, background: Vec3) -> Self {
        Self {
            viewport,
            background,
            commands: Vec::new(),
        }
    }

    #[inline]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    /// Draw this frame on `target`.
    pub fn replay<T: RenderTarget + ?Sized>(&self, target: &mut T) {
        target.begin(self.viewport, self.background);
        for cmd in &self.commands {
            match *cmd {
                DrawCommand::Line {
                    from,
                    to,
                    width,
                    color,
                    opacity,
                } => target.draw_line(from, to, width, color, opacity),
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                    opacity,
                } => target.draw_circle(center, radius, color, opacity),
            }
        }
        target.finish();
    }

    fn reset(&mut self, viewport: Viewport, background: Vec3) {
        self.viewport = viewport;
        self.background = background;
        self.commands.clear();
    }
}

/// Render particles and their connections into a new frame.
///
/// `time` drives twinkle only; for the same inputs the output is identical.
pub fn render(set: &ParticleSet, connections: &[Connection], style: &RenderStyle, time: f32) -> Frame {
    let mut frame = Frame::blank(set.viewport(), style.background);
    render_into(&mut frame, set, connections, None, style, time);
    frame
}

/// Pointer position plus the links to draw from it.
#[derive(Debug, Clone, Copy)]
pub struct PointerOverlay<'a> {
    pub position: Vec2,
    pub links: &'a [PointerLink],
}

/// Render into an existing frame, reusing its command buffer.
pub fn render_into(
    frame: &mut Frame,
    set: &ParticleSet,
    connections: &[Connection],
    pointer: Option<PointerOverlay<'_>>,
    style: &RenderStyle,
    time: f32,
) {
    frame.reset(set.viewport(), style.background);
    let particles = set.particles();
    let palette = style.palette;

    for c in connections {
        let (Some(pa), Some(pb)) = (particles.get(c.a), particles.get(c.b)) else {
            continue;
        };
        frame.commands.push(DrawCommand::Line {
            from: pa.position,
            to: pb.position,
            width: style.line_width,
            color: palette.line_color(pa.id, pb.id),
            opacity: c.opacity,
        });
    }

    if let Some(overlay) = pointer {
        for link in overlay.links {
            let Some(p) = particles.get(link.index) else {
                continue;
            };
            frame.commands.push(DrawCommand::Line {
                from: overlay.position,
                to: p.position,
                width: style.line_width,
                color: style.pointer_color,
                opacity: link.opacity,
            });
        }
    }

    for p in particles {
        frame.commands.push(DrawCommand::Circle {
            center: p.position,
            radius: p.radius_at(time),
            color: palette.color_for(p.id),
            opacity: p.opacity_at(time),
        });
    }
}

/// Target that records calls; handy for tests and for diffing frames.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingTarget {
    pub begun: usize,
    pub finished: usize,
    pub commands: Vec<DrawCommand>,
}

impl RenderTarget for RecordingTarget {
    fn begin(&mut self, _viewport: Viewport, _background: Vec3) {
        self.begun += 1;
        self.commands.clear();
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec3, opacity: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
            opacity,
        });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec3, opacity: f32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            opacity,
        });
    }

    fn finish(&mut self) {
        self.finished += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::compute_connections;
    use crate::particle::Particle;

    fn pair() -> ParticleSet {
        ParticleSet::new(
            Viewport::new(100.0, 100.0),
            vec![
                Particle::new(0, Vec2::new(10.0, 10.0), Vec2::ZERO).with_size(2.0),
                Particle::new(1, Vec2::new(20.0, 10.0), Vec2::ZERO).with_size(3.0),
            ],
        )
    }

    #[test]
    fn test_lines_before_circles() {
        let set = pair();
        let conns = compute_connections(&set, 50.0, 1.0);
        let frame = render(&set, &conns, &RenderStyle::default(), 0.0);

        assert_eq!(frame.line_count(), 1);
        assert_eq!(frame.circle_count(), 2);
        assert!(matches!(frame.commands()[0], DrawCommand::Line { .. }));
        assert!(frame.commands()[1..]
            .iter()
            .all(|c| matches!(c, DrawCommand::Circle { .. })));
    }

    #[test]
    fn test_render_is_idempotent() {
        let set = pair();
        let conns = compute_connections(&set, 50.0, 1.0);
        let style = RenderStyle::default();
        assert_eq!(render(&set, &conns, &style, 1.25), render(&set, &conns, &style, 1.25));
    }

    #[test]
    fn test_replay_clears_then_draws_in_order() {
        let set = pair();
        let conns = compute_connections(&set, 50.0, 1.0);
        let frame = render(&set, &conns, &RenderStyle::default(), 0.0);

        let mut target = RecordingTarget::default();
        frame.replay(&mut target);
        frame.replay(&mut target);
        assert_eq!(target.begun, 2);
        assert_eq!(target.finished, 2);
        assert_eq!(target.commands, frame.commands());
    }

    #[test]
    fn test_pointer_links_drawn_under_particles() {
        let set = pair();
        let links = [PointerLink {
            index: 1,
            distance: 5.0,
            opacity: 0.3,
        }];
        let mut frame = Frame::blank(set.viewport(), Vec3::ZERO);
        let overlay = PointerOverlay {
            position: Vec2::new(25.0, 10.0),
            links: &links,
        };
        render_into(&mut frame, &set, &[], Some(overlay), &RenderStyle::default(), 0.0);

        match frame.commands()[0] {
            DrawCommand::Line { from, to, opacity, .. } => {
                assert_eq!(from, Vec2::new(25.0, 10.0));
                assert_eq!(to, Vec2::new(20.0, 10.0));
                assert_eq!(opacity, 0.3);
            }
            other => panic!("expected pointer link first, got {other:?}"),
        }
        assert_eq!(frame.circle_count(), 2);
    }

    #[test]
    fn test_stale_connection_indices_are_skipped() {
        let set = pair();
        let bogus = [Connection {
            a: 0,
            b: 9,
            distance: 1.0,
            opacity: 1.0,
        }];
        let frame = render(&set, &bogus, &RenderStyle::default(), 0.0);
        assert_eq!(frame.line_count(), 0);
    }
}
