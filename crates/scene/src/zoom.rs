use runtime::tween::{Tween, TweenSlot, TweenStatus};

use crate::config::ZoomConfig;

/// Camera distance with eased, clamped zoom animations.
///
/// Only one zoom tween runs at a time; a new request replaces it, starting
/// from the distance reached so far.
#[derive(Debug, Clone)]
pub struct ZoomController {
    cfg: ZoomConfig,
    distance: f64,
    tween: TweenSlot<f64>,
    remembered: Option<f64>,
}

impl ZoomController {
    pub fn new(cfg: ZoomConfig) -> Self {
        let distance = cfg.initial_distance.clamp(cfg.min_distance, cfg.max_distance);
        Self {
            cfg,
            distance,
            tween: TweenSlot::new(),
            remembered: None,
        }
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Where the running animation ends, or the current distance when idle.
    pub fn target(&self) -> f64 {
        self.tween.target().unwrap_or(self.distance)
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_active()
    }

    pub fn remembered(&self) -> Option<f64> {
        self.remembered
    }

    pub fn clamp(&self, distance: f64) -> f64 {
        if !distance.is_finite() {
            return self.distance;
        }
        distance.clamp(self.cfg.min_distance, self.cfg.max_distance)
    }

    /// Wheel delta in pixels; positive zooms out.
    pub fn wheel(&mut self, delta_y: f64) {
        let target = self.clamp(self.distance + delta_y * self.cfg.wheel_speed * self.cfg.wheel_scale);
        self.animate_to(target, self.cfg.duration_s, self.cfg.ease);
    }

    /// One button step closer, measured from the distance shown right now.
    pub fn zoom_in(&mut self) {
        let target = self.clamp(self.distance - self.cfg.button_step);
        self.animate_to(target, self.cfg.duration_s, self.cfg.ease);
    }

    pub fn zoom_out(&mut self) {
        let target = self.clamp(self.distance + self.cfg.button_step);
        self.animate_to(target, self.cfg.duration_s, self.cfg.ease);
    }

    /// Two-finger pinch; `scale > 1` means the fingers moved apart.
    pub fn pinch(&mut self, scale: f64) {
        if !(scale.is_finite() && scale > 0.0) {
            return;
        }
        let target = self.clamp(self.distance / scale);
        self.animate_to(target, self.cfg.duration_s, self.cfg.ease);
    }

    /// Move in on a selection, remembering the distance to come back to.
    /// A second focus keeps the first remembered distance.
    pub fn focus(&mut self) {
        if self.remembered.is_none() {
            self.remembered = Some(self.distance);
        }
        let target = self.clamp(self.cfg.focus_distance);
        self.animate_to(target, self.cfg.focus_duration_s, self.cfg.focus_ease);
    }

    /// Return to the remembered distance. Returns false when nothing was
    /// remembered.
    pub fn restore(&mut self) -> bool {
        let Some(back) = self.remembered.take() else {
            return false;
        };
        let target = self.clamp(back);
        self.animate_to(target, self.cfg.restore_duration_s, self.cfg.focus_ease);
        true
    }

    /// Jump to `distance` (clamped) without animating.
    pub fn set_distance(&mut self, distance: f64) {
        self.tween.cancel();
        self.distance = self.clamp(distance);
    }

    pub fn cancel(&mut self) {
        self.tween.cancel();
    }

    /// Advance the running animation. Returns true on the frame it completes.
    pub fn advance(&mut self, dt_s: f64) -> bool {
        match self.tween.advance(dt_s) {
            Some((value, status)) => {
                self.distance = value;
                status == TweenStatus::Completed
            }
            None => false,
        }
    }

    fn animate_to(&mut self, target: f64, duration_s: f64, ease: foundation::ease::Ease) {
        self.tween
            .start(Tween::new(self.distance, target, duration_s, ease));
    }
}
