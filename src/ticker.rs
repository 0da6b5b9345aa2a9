//! Frame-tick driver with a cancellable subscription.
//!
//! A [`FrameLoop`] pairs a [`ParticleField`] with a [`Clock`]. The host calls
//! [`FrameLoop::tick`] from its refresh callback; work only happens while a
//! [`Subscription`] from [`FrameLoop::subscribe`] is alive. Dropping the
//! subscription (or calling [`Subscription::cancel`]) ends the loop: the next
//! tick tears the field down and no step or render runs after that.
//!
//! ```ignore
//! let mut frames = FrameLoop::new(field, Clock::default());
//! let subscription = frames.subscribe();
//!
//! // refresh callback
//! match frames.tick(&mut target) {
//!     TickOutcome::Rendered | TickOutcome::NotReady => {}
//!     TickOutcome::Idle | TickOutcome::Cancelled => { /* stop requesting frames */ }
//! }
//!
//! // unmount
//! drop(subscription);
//! ```

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::field::ParticleField;
use crate::frame::RenderTarget;
use crate::time::{Clock, Tick};

/// Result of one [`FrameLoop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stepped, rendered and replayed on the target.
    Rendered,
    /// The target could not draw; nothing moved. Try again next tick.
    NotReady,
    /// No live subscription, or the field is not running.
    Idle,
    /// The subscription was cancelled since the last tick; the field has
    /// been torn down. Reported once, then ticks are `Idle`.
    Cancelled,
}

/// Handle that keeps a [`FrameLoop`] ticking. Cancels on drop.
#[derive(Debug)]
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    active: Rc<Cell<bool>>,
}

impl Subscription {
    /// End the subscription now.
    pub fn cancel(self) {}

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.set(false);
    }
}

/// Per-frame driver: step, connect, render, replay.
#[derive(Debug)]
pub struct FrameLoop {
    field: ParticleField,
    clock: Clock,
    subscription: Option<Rc<Cell<bool>>>,
}

impl FrameLoop {
    pub fn new(field: ParticleField, clock: Clock) -> Self {
        Self {
            field,
            clock,
            subscription: None,
        }
    }

    /// Start ticking. Any earlier subscription is cancelled and replaced.
    ///
    /// If the earlier subscription was already cancelled but no tick has
    /// observed it yet, the field is torn down here; the caller must
    /// initialize it again before the new subscription renders anything.
    pub fn subscribe(&mut self) -> Subscription {
        if let Some(previous) = self.subscription.take() {
            if !previous.get() {
                self.field.teardown();
                debug!("frame loop cancelled before resubscribe");
            }
            previous.set(false);
        }
        let active = Rc::new(Cell::new(true));
        self.subscription = Some(Rc::clone(&active));
        debug!("frame loop subscribed");
        Subscription { active }
    }

    /// Whether a live subscription exists.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(|a| a.get())
    }

    /// Run one frame timed by the wall clock.
    pub fn tick(&mut self, target: &mut dyn RenderTarget) -> TickOutcome {
        if let Some(outcome) = self.gate(target) {
            return outcome;
        }
        let tick = self.clock.tick();
        self.run(tick, target)
    }

    /// Run one frame with an explicit delta in seconds.
    pub fn tick_with(&mut self, delta: f32, target: &mut dyn RenderTarget) -> TickOutcome {
        if let Some(outcome) = self.gate(target) {
            return outcome;
        }
        let tick = self.clock.advance(delta);
        self.run(tick, target)
    }

    /// Early outcome when this tick must not step or render.
    fn gate(&mut self, target: &dyn RenderTarget) -> Option<TickOutcome> {
        match self.subscription.as_ref().map(|active| active.get()) {
            None => return Some(TickOutcome::Idle),
            Some(false) => {
                self.subscription = None;
                self.field.teardown();
                debug!("frame loop cancelled");
                return Some(TickOutcome::Cancelled);
            }
            Some(true) => {}
        }
        if !self.field.is_running() {
            return Some(TickOutcome::Idle);
        }
        if !target.is_ready() {
            trace!("render target not ready; skipping tick");
            return Some(TickOutcome::NotReady);
        }
        None
    }

    fn run(&mut self, tick: Tick, target: &mut dyn RenderTarget) -> TickOutcome {
        self.field.advance_pointer(tick.delta);
        self.field.step(tick.scale);
        self.field.compute_connections();
        let frame = self.field.render(tick.elapsed);
        frame.replay(target);
        trace!(frame = tick.frame, commands = frame.len(), "tick rendered");
        TickOutcome::Rendered
    }

    #[inline]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    #[inline]
    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    #[inline]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[inline]
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldConfig, StepMode};
    use crate::frame::RecordingTarget;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn running_loop() -> FrameLoop {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::new();
        field
            .initialize(
                FieldConfig::default().with_viewport(200.0, 200.0).with_count(10),
                &mut rng,
            )
            .unwrap();
        FrameLoop::new(field, Clock::new(StepMode::default()))
    }

    struct Unready;

    impl RenderTarget for Unready {
        fn is_ready(&self) -> bool {
            false
        }
        fn begin(&mut self, _: crate::config::Viewport, _: Vec3) {
            panic!("not ready");
        }
        fn draw_line(&mut self, _: glam::Vec2, _: glam::Vec2, _: f32, _: Vec3, _: f32) {}
        fn draw_circle(&mut self, _: glam::Vec2, _: f32, _: Vec3, _: f32) {}
    }

    #[test]
    fn test_idle_without_subscription() {
        let mut frames = running_loop();
        let mut target = RecordingTarget::default();
        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Idle);
        assert_eq!(target.begun, 0);
    }

    #[test]
    fn test_renders_while_subscribed() {
        let mut frames = running_loop();
        let _sub = frames.subscribe();
        let mut target = RecordingTarget::default();
        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Rendered);
        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Rendered);
        assert_eq!(target.begun, 2);
        assert_eq!(frames.clock().frame(), 2);
    }

    #[test]
    fn test_cancel_stops_ticks_and_tears_down() {
        let mut frames = running_loop();
        let sub = frames.subscribe();
        let mut target = RecordingTarget::default();
        frames.tick_with(0.016, &mut target);
        let before = frames.field().particles().unwrap().clone();

        sub.cancel();
        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Cancelled);
        assert_eq!(target.begun, 1);
        assert!(!frames.field().is_running());
        assert!(!before.is_empty());

        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Idle);
        assert_eq!(target.begun, 1);
    }

    #[test]
    fn test_drop_cancels() {
        let mut frames = running_loop();
        {
            let _sub = frames.subscribe();
            assert!(frames.is_subscribed());
        }
        assert!(!frames.is_subscribed());
        let mut target = RecordingTarget::default();
        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Cancelled);
    }

    #[test]
    fn test_resubscribe_replaces_old_handle() {
        let mut frames = running_loop();
        let first = frames.subscribe();
        let second = frames.subscribe();
        assert!(!first.is_active());
        assert!(second.is_active());
        // dropping the stale handle does not cancel the new one
        drop(first);
        assert!(frames.is_subscribed());
    }

    #[test]
    fn test_resubscribe_after_cancel_tears_down() {
        let mut frames = running_loop();
        let sub = frames.subscribe();
        let mut target = RecordingTarget::default();
        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Rendered);

        sub.cancel();
        let _sub = frames.subscribe();
        assert!(!frames.field().is_running());
        assert!(frames.field().particles().is_none());
        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Idle);
        assert_eq!(target.begun, 1);

        let mut rng = StdRng::seed_from_u64(2);
        frames
            .field_mut()
            .initialize(
                FieldConfig::default().with_viewport(200.0, 200.0).with_count(4),
                &mut rng,
            )
            .unwrap();
        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Rendered);
        assert_eq!(frames.field().particles().map(|p| p.len()), Some(4));
    }

    #[test]
    fn test_not_ready_skips_without_moving() {
        let mut frames = running_loop();
        let _sub = frames.subscribe();
        let before = frames.field().particles().unwrap().clone();
        assert_eq!(frames.tick_with(0.016, &mut Unready), TickOutcome::NotReady);
        assert_eq!(frames.field().particles().unwrap(), &before);

        let mut target = RecordingTarget::default();
        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Rendered);
    }

    #[test]
    fn test_idle_when_field_uninitialized() {
        let mut frames = FrameLoop::new(ParticleField::new(), Clock::default());
        let _sub = frames.subscribe();
        let mut target = RecordingTarget::default();
        assert_eq!(frames.tick_with(0.016, &mut target), TickOutcome::Idle);
    }
}
