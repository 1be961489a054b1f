use foundation::math::{Vec3, clamp_pitch, shortest_yaw_target};

/// Rotation of the globe group: yaw about +Y, then pitch about +X.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct OrientationState {
    yaw: f64,
    pitch: f64,
}

impl OrientationState {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self {
            yaw,
            pitch: clamp_pitch(pitch),
        }
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Always within `[-π/2, π/2]`.
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn set_yaw(&mut self, yaw: f64) {
        self.yaw = yaw;
    }

    pub fn set_pitch(&mut self, pitch: f64) {
        self.pitch = clamp_pitch(pitch);
    }

    pub fn rotate_by(&mut self, d_yaw: f64, d_pitch: f64) {
        self.yaw += d_yaw;
        self.set_pitch(self.pitch + d_pitch);
    }

    /// Globe-local position to world space: `Rx(pitch) · Ry(yaw) · local`.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let x = local.x * cy + local.z * sy;
        let z = -local.x * sy + local.z * cy;
        let y = local.y;
        Vec3::new(x, y * cp - z * sp, y * sp + z * cp)
    }

    /// World position back to globe-local space.
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let y = world.y * cp + world.z * sp;
        let z = -world.y * sp + world.z * cp;
        Vec3::new(world.x * cy - z * sy, y, world.x * sy + z * cy)
    }
}

/// Orientation that brings `marker_local` onto the +Z axis, facing a camera
/// that looks down -Z.
///
/// The yaw takes the short way around from `current`; pitch is taken as is.
pub fn rotate_toward(current: OrientationState, marker_local: Vec3) -> OrientationState {
    let pitch = marker_local.y.atan2(marker_local.x.hypot(marker_local.z));
    let raw_yaw = -marker_local.x.atan2(marker_local.z);
    OrientationState::new(shortest_yaw_target(current.yaw, raw_yaw), pitch)
}
