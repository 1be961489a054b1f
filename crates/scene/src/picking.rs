use foundation::math::Vec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    /// Ray from `from` through `to`. `None` when the two points coincide.
    pub fn between(from: Vec3, to: Vec3) -> Option<Self> {
        let dir = (to - from).normalize()?;
        Some(Self::new(from, dir))
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    /// Index of the hit candidate.
    pub index: usize,
    pub distance: f64,
    pub point: Vec3,
}

/// Distance along the (normalized) ray to the nearest non-negative
/// intersection with `sphere`.
///
/// A ray starting inside the sphere reports its exit point.
pub fn ray_sphere_hit(ray: Ray, sphere: Sphere) -> Option<f64> {
    let dir = ray.dir.normalize()?;
    let oc = ray.origin - sphere.center;
    let b = oc.dot(dir);
    let c = oc.dot(oc) - sphere.radius * sphere.radius;
    let disc = b * b - c;
    if disc < 0.0 || !disc.is_finite() {
        return None;
    }
    let root = disc.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + root;
    (far >= 0.0).then_some(far)
}

/// Deterministic marker picking.
///
/// Ordering contract:
/// - the closest hit along the ray wins;
/// - if several candidates are hit at the same distance, the lower index wins.
pub fn pick_markers<I>(ray: Ray, candidates: I) -> Option<PickHit>
where
    I: IntoIterator<Item = (usize, Sphere)>,
{
    let dir = ray.dir.normalize()?;
    let ray = Ray::new(ray.origin, dir);

    let mut best: Option<(f64, usize)> = None;
    for (index, sphere) in candidates {
        let Some(t) = ray_sphere_hit(ray, sphere) else {
            continue;
        };
        best = match best {
            None => Some((t, index)),
            Some((bt, bi)) => {
                let ord = t.total_cmp(&bt).then_with(|| index.cmp(&bi));
                if ord.is_lt() { Some((t, index)) } else { Some((bt, bi)) }
            }
        };
    }

    let (t, index) = best?;
    Some(PickHit {
        index,
        distance: t,
        point: ray.at(t),
    })
}
