//! Geographic coordinates placed on a fixed-radius globe.
//!
//! The globe uses a Y-up frame. Longitude is offset by 180° so that the
//! texture seam of the equirectangular map image lines up with the mesh seam.

use super::Vec3;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeoError {
    NotFinite,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::NotFinite => write!(f, "coordinate is not a finite number"),
            GeoError::LatitudeOutOfRange(v) => write!(f, "latitude {v} outside [-90, 90]"),
            GeoError::LongitudeOutOfRange(v) => write!(f, "longitude {v} outside [-180, 180]"),
        }
    }
}

impl std::error::Error for GeoError {}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Skip range checks. Projection of out-of-range input is well defined
    /// (it never panics) but has no geographic meaning.
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Cartesian position on (or above) the globe surface.
pub type SpherePoint = Vec3;

/// Project a geographic point onto a sphere of `radius`.
///
/// `phi` is the polar angle from +Y, `theta` the azimuth with the 180° seam
/// offset applied.
pub fn project(geo: GeoPoint, radius: f64) -> SpherePoint {
    let phi = (90.0 - geo.latitude).to_radians();
    let theta = (geo.longitude + 180.0).to_radians();

    let x = -(radius * phi.sin() * theta.cos());
    let z = radius * phi.sin() * theta.sin();
    let y = radius * phi.cos();

    Vec3::new(x, y, z)
}

/// Push `point` outward along its own normal by `offset`.
///
/// The sphere centre is returned unchanged since it has no normal.
pub fn float_above(point: SpherePoint, offset: f64) -> SpherePoint {
    match point.normalize() {
        Some(normal) => point + normal * offset,
        None => point,
    }
}

/// Projection followed by the surface offset used for marker anchors.
pub fn marker_anchor(geo: GeoPoint, radius: f64, offset: f64) -> SpherePoint {
    float_above(project(geo, radius), offset)
}
