use foundation::math::Vec3;

use crate::picking::{Ray, Sphere, ray_sphere_hit};

/// Relative slack between the globe hit and the marker distance.
const OCCLUSION_EPS: f64 = 1e-9;

/// Whether a marker at `marker_world` can be seen from the camera.
///
/// Two stages, both strict:
/// 1. the marker must lie in front of the camera (positive dot between the
///    unit camera->marker vector and `camera_forward`);
/// 2. the globe must not occlude it: a ray from the camera toward the marker
///    that hits `globe` closer than the marker means the marker is hidden.
///
/// Only the globe sphere takes part in the occlusion test. `None` stands for
/// a globe that is not built yet and never occludes.
///
/// Evaluated fresh on every call; nothing is cached between pointer events.
pub fn is_visible(
    marker_world: Vec3,
    camera_pos: Vec3,
    camera_forward: Vec3,
    globe: Option<&Sphere>,
) -> bool {
    let to_marker = marker_world - camera_pos;
    let marker_distance = to_marker.length();
    let Some(dir) = to_marker.normalize() else {
        return false;
    };
    let Some(forward) = camera_forward.normalize() else {
        return false;
    };
    if dir.dot(forward) <= 0.0 {
        return false;
    }

    let Some(globe) = globe else {
        return true;
    };
    // A marker on the surface must not be hidden by its own hit point.
    let tolerance = OCCLUSION_EPS * marker_distance.max(1.0);
    match ray_sphere_hit(Ray::new(camera_pos, dir), *globe) {
        Some(hit) => hit >= marker_distance - tolerance,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::is_visible;
    use crate::picking::Sphere;
    use foundation::math::{GeoPoint, Vec3, marker_anchor};

    const CAMERA: Vec3 = Vec3::new(0.0, 0.0, 12.0);
    const FORWARD: Vec3 = Vec3::new(0.0, 0.0, -1.0);

    fn globe() -> Sphere {
        Sphere::new(Vec3::ZERO, 5.0)
    }

    #[test]
    fn marker_facing_camera_is_visible() {
        let marker = Vec3::new(0.0, 0.0, 5.072);
        assert!(is_visible(marker, CAMERA, FORWARD, Some(&globe())));
    }

    #[test]
    fn marker_on_far_side_is_occluded() {
        let marker = Vec3::new(0.0, 0.0, -5.072);
        assert!(!is_visible(marker, CAMERA, FORWARD, Some(&globe())));
    }

    #[test]
    fn marker_behind_camera_is_never_visible() {
        let marker = Vec3::new(0.0, 0.0, 13.0);
        assert!(!is_visible(marker, CAMERA, FORWARD, Some(&globe())));
        assert!(!is_visible(marker, CAMERA, FORWARD, None));
    }

    #[test]
    fn perpendicular_marker_fails_the_strict_test() {
        let marker = Vec3::new(4.0, 0.0, 12.0);
        assert!(!is_visible(marker, CAMERA, FORWARD, None));
    }

    #[test]
    fn missing_globe_means_no_occlusion() {
        let marker = Vec3::new(0.0, 0.0, -5.072);
        assert!(is_visible(marker, CAMERA, FORWARD, None));
    }

    #[test]
    fn floating_marker_near_the_limb_stays_visible() {
        // Lat 0, lng -90 projects onto +Z; tilt it toward the limb.
        let geo = GeoPoint::new(60.0, -90.0).unwrap();
        let marker = marker_anchor(geo, 5.0, 0.072);
        assert!(marker.z > 0.0);
        assert!(is_visible(marker, CAMERA, FORWARD, Some(&globe())));
    }

    #[test]
    fn nearest_surface_point_is_visible_from_any_camera() {
        let cameras = [
            Vec3::new(1.0, -3.0, 7.5),
            Vec3::new(6.3, 2.2, -4.1),
            Vec3::new(-9.0, 7.7, 0.3),
            Vec3::new(0.1, 0.2, 29.9),
            Vec3::new(-3.3, -11.0, -5.5),
        ];
        for cam in cameras {
            let forward = -cam;
            let nearest = cam.normalize().unwrap() * 5.0;
            assert!(is_visible(nearest, cam, forward, Some(&globe())), "{cam:?}");
            let antipode = -nearest;
            assert!(!is_visible(antipode, cam, forward, Some(&globe())), "{cam:?}");
        }
    }

    #[test]
    fn camera_at_marker_is_not_visible() {
        assert!(!is_visible(CAMERA, CAMERA, FORWARD, Some(&globe())));
    }
}
