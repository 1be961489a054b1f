use foundation::math::{Vec2, Vec3};

use crate::picking::Ray;

/// Pixel rectangle of the canvas the globe is drawn into.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    pub fn contains(&self, pos_px: Vec2) -> bool {
        pos_px.x >= self.left
            && pos_px.x <= self.left + self.width
            && pos_px.y >= self.top
            && pos_px.y <= self.top + self.height
    }

    /// Pixel position to normalized device coordinates in `[-1, 1]`, +Y up.
    /// `None` outside the rectangle.
    pub fn to_ndc(&self, pos_px: Vec2) -> Option<Vec2> {
        if !self.contains(pos_px) {
            return None;
        }
        Some(Vec2::new(
            (pos_px.x - self.left) / self.width * 2.0 - 1.0,
            -((pos_px.y - self.top) / self.height) * 2.0 + 1.0,
        ))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1280.0, 720.0)
    }
}

/// Perspective camera on the +Z axis looking at the globe center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub distance: f64,
    pub fov_y_deg: f64,
    pub viewport: Viewport,
}

impl Camera {
    pub fn new(distance: f64, fov_y_deg: f64, viewport: Viewport) -> Self {
        Self {
            distance,
            fov_y_deg,
            viewport,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, -1.0)
    }

    /// World-space ray through a pointer position, or `None` when the pointer
    /// is outside the viewport.
    pub fn screen_ray(&self, pos_px: Vec2) -> Option<Ray> {
        let ndc = self.viewport.to_ndc(pos_px)?;
        let half = (self.fov_y_deg.to_radians() * 0.5).tan();
        let dir = Vec3::new(ndc.x * half * self.viewport.aspect(), ndc.y * half, -1.0);
        Some(Ray::new(self.position(), dir.normalize()?))
    }

    /// Pixel position of a world point, or `None` when it is behind the
    /// camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let rel = world - self.position();
        if rel.z >= 0.0 {
            return None;
        }
        let half = (self.fov_y_deg.to_radians() * 0.5).tan();
        let ndc_x = rel.x / -rel.z / (half * self.viewport.aspect());
        let ndc_y = rel.y / -rel.z / half;
        Some(Vec2::new(
            self.viewport.left + (ndc_x + 1.0) * 0.5 * self.viewport.width,
            self.viewport.top + (1.0 - ndc_y) * 0.5 * self.viewport.height,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, Viewport};
    use foundation::math::{Vec2, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} vs {b}");
    }

    #[test]
    fn center_pixel_looks_straight_ahead() {
        let cam = Camera::new(12.0, 75.0, Viewport::new(0.0, 0.0, 800.0, 600.0));
        let ray = cam.screen_ray(Vec2::new(400.0, 300.0)).expect("ray");
        assert_close(ray.origin.z, 12.0, 1e-12);
        assert_close(ray.dir.x, 0.0, 1e-12);
        assert_close(ray.dir.y, 0.0, 1e-12);
        assert_close(ray.dir.z, -1.0, 1e-12);
    }

    #[test]
    fn top_edge_matches_half_fov() {
        let cam = Camera::new(12.0, 90.0, Viewport::new(10.0, 20.0, 100.0, 100.0));
        let ray = cam.screen_ray(Vec2::new(60.0, 20.0)).expect("ray");
        // 45° up from the view axis.
        assert_close(ray.dir.y, -ray.dir.z, 1e-12);
        assert!(ray.dir.y > 0.0);
    }

    #[test]
    fn project_inverts_screen_ray() {
        let cam = Camera::new(12.0, 75.0, Viewport::new(0.0, 0.0, 800.0, 600.0));
        let px = Vec2::new(610.0, 120.0);
        let ray = cam.screen_ray(px).expect("ray");
        let back = cam.project(ray.at(7.0)).expect("in front");
        assert_close(back.x, px.x, 1e-9);
        assert_close(back.y, px.y, 1e-9);
        assert!(cam.project(Vec3::new(0.0, 0.0, 13.0)).is_none());
    }

    #[test]
    fn pointer_outside_viewport_yields_no_ray() {
        let cam = Camera::new(12.0, 75.0, Viewport::new(100.0, 100.0, 200.0, 200.0));
        assert!(cam.screen_ray(Vec2::new(50.0, 150.0)).is_none());
        assert!(cam.screen_ray(Vec2::new(150.0, 301.0)).is_none());
        assert!(cam.screen_ray(Vec2::new(150.0, 150.0)).is_some());
    }
}
