use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Wrap an angle into `(-π, π]`.
pub fn wrap_pi(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Clamp a pitch angle to `[-π/2, π/2]`.
pub fn clamp_pitch(pitch: f64) -> f64 {
    pitch.clamp(-FRAC_PI_2, FRAC_PI_2)
}

/// Yaw to animate toward so the rotation takes the short way around.
///
/// `current` may carry any number of accumulated full turns; the result is
/// always within π of it.
pub fn shortest_yaw_target(current: f64, raw_target: f64) -> f64 {
    let mut diff = wrap_pi(raw_target) - wrap_pi(current);
    if diff > PI {
        diff -= TAU;
    } else if diff < -PI {
        diff += TAU;
    }
    current + diff
}
