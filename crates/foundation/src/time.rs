/// Session time in seconds since the session started.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Self = Time(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// The instant `secs` after `self`.
    pub fn after(self, secs: f64) -> Self {
        Time(self.0 + secs)
    }

    /// True once `now` is at or past `self`.
    pub fn is_reached(self, now: Time) -> bool {
        now.0 >= self.0
    }
}
