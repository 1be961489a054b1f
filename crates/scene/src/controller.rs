//! Interactive globe orientation controller.
//!
//! Drives the globe's yaw and pitch from three writers that never overlap:
//! - direct pointer drags, applied immediately;
//! - inertial decay after a fast release, damped once per frame;
//! - programmatic rotations toward a selected marker, eased over a fixed
//!   duration.
//!
//! Idle auto-rotation is a separate value that interactions pause, and that
//! a selection holds off until it is released.

use foundation::math::{Vec2, Vec3};
use foundation::time::Time;
use runtime::tween::{Tween, TweenSlot, TweenStatus};

use crate::config::{AutoRotateConfig, DragConfig, RotationConfig};
use crate::orientation::{OrientationState, rotate_toward};

/// Which writer currently owns the orientation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Idle,
    UserDragging,
    Decaying,
    ProgrammaticRotation,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AutoRotate {
    Running,
    /// Paused until the given session time.
    PausedUntil(Time),
    /// Paused until explicitly released.
    Held,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    RotationCompleted,
    DecayFinished,
    AutoRotateResumed,
}

#[derive(Debug, Clone)]
pub struct GlobeController {
    drag: DragConfig,
    rotation: RotationConfig,
    auto: AutoRotateConfig,

    orientation: OrientationState,
    state: ControlState,

    /// Per-frame (yaw, pitch) velocity from the last drag move.
    velocity: Vec2,
    last_pointer: Option<Vec2>,

    yaw_tween: TweenSlot<f64>,
    pitch_tween: TweenSlot<f64>,

    auto_rotate: AutoRotate,
}

impl GlobeController {
    pub fn new(drag: DragConfig, rotation: RotationConfig, auto: AutoRotateConfig) -> Self {
        Self {
            drag,
            rotation,
            auto,
            orientation: OrientationState::default(),
            state: ControlState::Idle,
            velocity: Vec2::new(0.0, 0.0),
            last_pointer: None,
            yaw_tween: TweenSlot::new(),
            pitch_tween: TweenSlot::new(),
            auto_rotate: AutoRotate::Running,
        }
    }

    pub fn orientation(&self) -> OrientationState {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: OrientationState) {
        self.orientation = orientation;
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn auto_rotate(&self) -> AutoRotate {
        self.auto_rotate
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_rotating(&self) -> bool {
        self.state == ControlState::ProgrammaticRotation
    }

    /// Start a drag. Cancels any rotation animation or decay in flight.
    pub fn pointer_down(&mut self, pos_px: Vec2, now: Time) {
        self.yaw_tween.cancel();
        self.pitch_tween.cancel();
        self.velocity = Vec2::new(0.0, 0.0);
        self.last_pointer = Some(pos_px);
        self.state = ControlState::UserDragging;
        self.pause_auto_rotate(now);
    }

    /// Apply a drag move immediately. Ignored unless dragging.
    pub fn pointer_move(&mut self, pos_px: Vec2, now: Time) {
        if self.state != ControlState::UserDragging {
            return;
        }
        let Some(last) = self.last_pointer.replace(pos_px) else {
            return;
        };
        let delta = pos_px - last;
        let k = self.drag.radians_per_px();
        self.velocity = Vec2::new(delta.x * k, delta.y * k);
        self.orientation.rotate_by(self.velocity.x, self.velocity.y);
        self.pause_auto_rotate(now);
    }

    /// End a drag, entering decay when the release is fast enough.
    pub fn pointer_up(&mut self, now: Time) {
        if self.state != ControlState::UserDragging {
            return;
        }
        self.last_pointer = None;
        let threshold = self.drag.inertia_threshold;
        if self.velocity.x.abs() > threshold || self.velocity.y.abs() > threshold {
            self.state = ControlState::Decaying;
        } else {
            self.velocity = Vec2::new(0.0, 0.0);
            self.state = ControlState::Idle;
            self.pause_auto_rotate(now);
        }
    }

    /// Animate toward the orientation that faces `marker_local` to the camera.
    /// Replaces any running rotation and stops drag or decay.
    pub fn rotate_to_marker(&mut self, marker_local: Vec3, now: Time) -> OrientationState {
        let target = rotate_toward(self.orientation, marker_local);
        let duration = self.rotation.duration_s;
        let ease = self.rotation.ease;
        self.yaw_tween
            .start(Tween::new(self.orientation.yaw(), target.yaw(), duration, ease));
        self.pitch_tween
            .start(Tween::new(self.orientation.pitch(), target.pitch(), duration, ease));
        self.velocity = Vec2::new(0.0, 0.0);
        self.last_pointer = None;
        self.state = ControlState::ProgrammaticRotation;
        self.pause_auto_rotate(now);
        target
    }

    /// Keep auto-rotate off until [`release_hold`](Self::release_hold).
    pub fn hold_auto_rotate(&mut self) {
        self.auto_rotate = AutoRotate::Held;
    }

    pub fn release_hold(&mut self, now: Time) {
        if self.auto_rotate == AutoRotate::Held {
            self.auto_rotate = AutoRotate::PausedUntil(now.after(self.auto.pause_s));
        }
    }

    /// Advance one frame ending at `now`.
    pub fn tick(&mut self, dt_s: f64, now: Time) -> Vec<ControllerEvent> {
        let mut events = Vec::new();
        match self.state {
            ControlState::UserDragging => {}
            ControlState::Decaying => self.step_decay(&mut events),
            ControlState::ProgrammaticRotation => self.step_rotation(dt_s, now, &mut events),
            ControlState::Idle => {}
        }

        if let AutoRotate::PausedUntil(deadline) = self.auto_rotate {
            if deadline.is_reached(now) && self.state == ControlState::Idle {
                self.auto_rotate = AutoRotate::Running;
                events.push(ControllerEvent::AutoRotateResumed);
            }
        }

        if self.state == ControlState::Idle && self.auto_rotate == AutoRotate::Running {
            let dt = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
            self.orientation.rotate_by(self.auto.speed * dt, 0.0);
        }
        events
    }

    fn step_decay(&mut self, events: &mut Vec<ControllerEvent>) {
        let damping = self.drag.damping;
        self.velocity = Vec2::new(self.velocity.x * damping, self.velocity.y * damping);

        let stop = self.drag.stop_threshold;
        if self.velocity.x.abs() < stop && self.velocity.y.abs() < stop {
            self.velocity = Vec2::new(0.0, 0.0);
            self.state = ControlState::Idle;
            events.push(ControllerEvent::DecayFinished);
            if self.auto_rotate != AutoRotate::Held {
                self.auto_rotate = AutoRotate::Running;
                events.push(ControllerEvent::AutoRotateResumed);
            }
            return;
        }
        self.orientation.rotate_by(self.velocity.x, self.velocity.y);
    }

    fn step_rotation(&mut self, dt_s: f64, now: Time, events: &mut Vec<ControllerEvent>) {
        let yaw = self.yaw_tween.advance(dt_s);
        let pitch = self.pitch_tween.advance(dt_s);
        if let Some((value, _)) = yaw {
            self.orientation.set_yaw(value);
        }
        if let Some((value, _)) = pitch {
            self.orientation.set_pitch(value);
        }
        let done = |s: Option<(f64, TweenStatus)>| !matches!(s, Some((_, TweenStatus::Running)));
        if done(yaw) && done(pitch) {
            self.state = ControlState::Idle;
            events.push(ControllerEvent::RotationCompleted);
            self.pause_auto_rotate(now);
        }
    }

    fn pause_auto_rotate(&mut self, now: Time) {
        if self.auto_rotate != AutoRotate::Held {
            self.auto_rotate = AutoRotate::PausedUntil(now.after(self.auto.pause_s));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AutoRotate, ControlState, ControllerEvent, GlobeController};
    use crate::config::{AutoRotateConfig, DragConfig, RotationConfig};
    use foundation::math::{GeoPoint, Vec2, marker_anchor};
    use foundation::time::Time;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} vs {b}");
    }

    fn controller() -> GlobeController {
        GlobeController::new(
            DragConfig::default(),
            RotationConfig::default(),
            AutoRotateConfig {
                speed: 0.1,
                pause_s: 2.0,
            },
        )
    }

    #[test]
    fn drag_applies_immediately_and_clamps_pitch() {
        let mut c = controller();
        c.pointer_down(Vec2::new(100.0, 100.0), Time(0.0));
        c.pointer_move(Vec2::new(110.0, 100.0), Time(0.01));
        assert_close(c.orientation().yaw(), 10.0 * 0.006, 1e-12);
        c.pointer_move(Vec2::new(110.0, 10_000.0), Time(0.02));
        assert_close(c.orientation().pitch(), std::f64::consts::FRAC_PI_2, 1e-12);
    }

    #[test]
    fn slow_release_goes_idle_and_pauses_auto_rotate() {
        let mut c = controller();
        c.pointer_down(Vec2::new(0.0, 0.0), Time(1.0));
        c.pointer_up(Time(1.0));
        assert_eq!(c.state(), ControlState::Idle);
        assert_eq!(c.auto_rotate(), AutoRotate::PausedUntil(Time(3.0)));
        assert!(c.tick(0.5, Time(1.5)).is_empty());
        assert_eq!(c.tick(1.6, Time(3.1)), vec![ControllerEvent::AutoRotateResumed]);
    }

    #[test]
    fn tiny_drag_release_leaves_orientation_where_the_drag_put_it() {
        let mut c = GlobeController::new(
            DragConfig::default(),
            RotationConfig::default(),
            AutoRotateConfig::default(),
        );
        c.pointer_down(Vec2::new(100.0, 100.0), Time(0.0));
        c.pointer_move(Vec2::new(100.1, 100.1), Time(0.01));
        let dragged = c.orientation();
        assert_close(dragged.yaw(), 0.0006, 1e-9);
        c.pointer_up(Time(0.02));
        assert_eq!(c.state(), ControlState::Idle);

        for i in 1..=200 {
            c.tick(1.0 / 60.0, Time(0.02 + i as f64 / 60.0));
        }
        assert_eq!(c.state(), ControlState::Idle);
        assert_eq!(c.orientation(), dragged);
    }

    #[test]
    fn decay_damps_and_then_resumes_auto_rotate() {
        let mut c = controller();
        c.pointer_down(Vec2::new(0.0, 0.0), Time(0.0));
        c.pointer_move(Vec2::new(20.0, 0.0), Time(0.01));
        c.pointer_up(Time(0.02));
        assert_eq!(c.state(), ControlState::Decaying);

        let yaw0 = c.orientation().yaw();
        c.tick(1.0 / 60.0, Time(0.04));
        assert_close(c.orientation().yaw() - yaw0, 0.12 * 0.92, 1e-12);

        let mut finished = false;
        for i in 0..500 {
            let events = c.tick(1.0 / 60.0, Time(0.05 + i as f64 / 60.0));
            if events.contains(&ControllerEvent::DecayFinished) {
                assert!(events.contains(&ControllerEvent::AutoRotateResumed));
                finished = true;
                break;
            }
        }
        assert!(finished);
        assert_eq!(c.state(), ControlState::Idle);
        assert_eq!(c.auto_rotate(), AutoRotate::Running);
    }

    #[test]
    fn pointer_down_cancels_decay() {
        let mut c = controller();
        c.pointer_down(Vec2::new(0.0, 0.0), Time(0.0));
        c.pointer_move(Vec2::new(50.0, 0.0), Time(0.01));
        c.pointer_up(Time(0.02));
        c.tick(1.0 / 60.0, Time(0.03));
        c.pointer_down(Vec2::new(5.0, 5.0), Time(0.04));
        assert_eq!(c.state(), ControlState::UserDragging);
        assert_eq!(c.velocity(), Vec2::new(0.0, 0.0));
        let yaw = c.orientation().yaw();
        c.tick(1.0 / 60.0, Time(0.05));
        assert_eq!(c.orientation().yaw(), yaw);
    }

    #[test]
    fn rotation_completes_on_target_and_reports_once() {
        let mut c = controller();
        let local = marker_anchor(GeoPoint::new(41.9, 12.5).unwrap(), 5.0, 0.072);
        let target = c.rotate_to_marker(local, Time(0.0));
        assert!(c.is_rotating());

        let mut completions = 0;
        for i in 1..=120 {
            let events = c.tick(1.0 / 60.0, Time(i as f64 / 60.0));
            completions += events
                .iter()
                .filter(|e| **e == ControllerEvent::RotationCompleted)
                .count();
        }
        assert_eq!(completions, 1);
        assert_eq!(c.state(), ControlState::Idle);
        assert_close(c.orientation().yaw(), target.yaw(), 1e-12);
        assert_close(c.orientation().pitch(), target.pitch(), 1e-12);
    }

    #[test]
    fn pointer_down_cancels_rotation() {
        let mut c = controller();
        let local = marker_anchor(GeoPoint::new(-30.0, 100.0).unwrap(), 5.0, 0.072);
        c.rotate_to_marker(local, Time(0.0));
        c.tick(0.1, Time(0.1));
        c.pointer_down(Vec2::new(0.0, 0.0), Time(0.1));
        let yaw = c.orientation().yaw();
        c.pointer_up(Time(0.1));
        let events = c.tick(0.1, Time(0.2));
        assert!(!events.contains(&ControllerEvent::RotationCompleted));
        assert_eq!(c.orientation().yaw(), yaw);
    }

    #[test]
    fn held_auto_rotate_survives_interaction_until_released() {
        let mut c = controller();
        c.hold_auto_rotate();
        c.pointer_down(Vec2::new(0.0, 0.0), Time(0.0));
        c.pointer_up(Time(0.0));
        c.tick(5.0, Time(5.0));
        assert_eq!(c.auto_rotate(), AutoRotate::Held);
        c.release_hold(Time(5.0));
        assert_eq!(c.auto_rotate(), AutoRotate::PausedUntil(Time(7.0)));
    }

    #[test]
    fn idle_auto_rotate_spins_yaw() {
        let mut c = controller();
        c.tick(1.0, Time(1.0));
        assert_close(c.orientation().yaw(), 0.1, 1e-12);
    }
}
