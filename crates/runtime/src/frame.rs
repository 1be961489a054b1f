use foundation::time::Time;

/// Per-frame timing handed to every frame callback.
///
/// The display refresh loop drives frames with a variable `dt_s`; `time` is
/// the accumulated session time at the start of the frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time of this frame (seconds).
    pub dt_s: f64,
    /// Session time at the start of the frame.
    pub time: Time,
}

impl Frame {
    pub fn first() -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time: Time::ZERO,
        }
    }

    /// The frame following `self`, which lasted `dt_s` seconds.
    ///
    /// Negative or non-finite deltas are treated as zero so time never runs
    /// backwards.
    pub fn advance(self, dt_s: f64) -> Self {
        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        Self {
            index: self.index + 1,
            dt_s,
            time: self.time.after(self.dt_s),
        }
    }

    /// Session time at the end of this frame.
    pub fn end_time(&self) -> Time {
        self.time.after(self.dt_s)
    }
}
