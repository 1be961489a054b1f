use foundation::ease::Ease;

/// Values a [`Tween`] can interpolate.
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TweenStatus {
    Running,
    Completed,
}

/// Fixed-duration eased animation from `from` to `to`.
///
/// A tween is a plain value advanced by the frame loop; completion is the
/// `Completed` status returned by the advancing call, never a callback.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tween<T: Lerp> {
    from: T,
    to: T,
    duration_s: f64,
    elapsed_s: f64,
    ease: Ease,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration_s: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration_s: duration_s.max(0.0),
            elapsed_s: 0.0,
            ease,
        }
    }

    pub fn from_value(&self) -> T {
        self.from
    }

    pub fn target(&self) -> T {
        self.to
    }

    pub fn progress(&self) -> f64 {
        if self.duration_s <= 0.0 {
            return 1.0;
        }
        (self.elapsed_s / self.duration_s).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Current interpolated value. Exactly `to` once finished.
    pub fn value(&self) -> T {
        if self.is_finished() {
            return self.to;
        }
        self.from.lerp(self.to, self.ease.apply(self.progress()))
    }

    /// Advance by `dt_s` seconds and return the new value and status.
    pub fn advance(&mut self, dt_s: f64) -> (T, TweenStatus) {
        if dt_s.is_finite() && dt_s > 0.0 {
            self.elapsed_s = (self.elapsed_s + dt_s).min(self.duration_s);
        }
        let status = if self.is_finished() {
            TweenStatus::Completed
        } else {
            TweenStatus::Running
        };
        (self.value(), status)
    }
}

/// Holds at most one tween per animated property.
///
/// Starting a new tween replaces the running one, so two animations can never
/// write the same property in the same frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSlot<T: Lerp> {
    active: Option<Tween<T>>,
}

impl<T: Lerp> Default for TweenSlot<T> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<T: Lerp> TweenSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `tween`, returning the one it replaced (if any).
    pub fn start(&mut self, tween: Tween<T>) -> Option<Tween<T>> {
        self.active.replace(tween)
    }

    pub fn cancel(&mut self) -> Option<Tween<T>> {
        self.active.take()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn target(&self) -> Option<T> {
        self.active.as_ref().map(Tween::target)
    }

    /// Advance the running tween. Returns `None` when idle; the slot empties
    /// itself on the frame the tween completes.
    pub fn advance(&mut self, dt_s: f64) -> Option<(T, TweenStatus)> {
        let tween = self.active.as_mut()?;
        let (value, status) = tween.advance(dt_s);
        if status == TweenStatus::Completed {
            self.active = None;
        }
        Some((value, status))
    }
}

#[cfg(test)]
mod tests {
    use super::{Tween, TweenSlot, TweenStatus};
    use foundation::ease::Ease;

    #[test]
    fn tween_reaches_target_exactly() {
        let mut t = Tween::new(0.0, 10.0, 1.0, Ease::Power2Out);
        let (v, s) = t.advance(0.5);
        assert_eq!(s, TweenStatus::Running);
        assert!(v > 5.0 && v < 10.0);
        let (v, s) = t.advance(0.6);
        assert_eq!(s, TweenStatus::Completed);
        assert_eq!(v, 10.0);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut t = Tween::new(1.0, 2.0, 0.0, Ease::Linear);
        assert_eq!(t.advance(0.0), (2.0, TweenStatus::Completed));
    }

    #[test]
    fn starting_a_tween_replaces_the_previous_one() {
        let mut slot = TweenSlot::new();
        assert!(slot.start(Tween::new(0.0, 1.0, 1.0, Ease::Linear)).is_none());
        let replaced = slot.start(Tween::new(0.0, -1.0, 1.0, Ease::Linear));
        assert_eq!(replaced.map(|t| t.target()), Some(1.0));
        assert_eq!(slot.target(), Some(-1.0));
    }

    #[test]
    fn slot_empties_on_completion() {
        let mut slot = TweenSlot::new();
        slot.start(Tween::new(0.0, 4.0, 0.5, Ease::Linear));
        assert_eq!(slot.advance(0.25), Some((2.0, TweenStatus::Running)));
        assert_eq!(slot.advance(0.25), Some((4.0, TweenStatus::Completed)));
        assert!(!slot.is_active());
        assert_eq!(slot.advance(0.25), None);
    }
}
