use crate::{Ray, Vec3};

/// Extent given to a box created from a single point, so that point-like
/// boxes never have zero volume.
pub const POINT_PADDING: f32 = 1e-4;

/// Axis-Aligned Bounding Box for the bounding volume hierarchy.
///
/// A box starts out empty and only ever grows, either by inserting points or
/// by merging with another box. When not empty, `min <= max` holds on every
/// axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    empty: bool,
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// A box that contains nothing and is never hit.
    pub const EMPTY: Aabb = Aabb {
        empty: true,
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    /// Create an AABB from two corner points (in any order).
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            empty: false,
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a padded box around a single point.
    pub fn from_point(point: Vec3) -> Self {
        Self {
            empty: false,
            min: point,
            max: point + Vec3::splat(POINT_PADDING),
        }
    }

    /// Create the smallest box containing all of `points`.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.add_point(p);
        }
        aabb
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        match (a.empty, b.empty) {
            (true, _) => *b,
            (_, true) => *a,
            _ => Self {
                empty: false,
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            },
        }
    }

    /// Grow the box to include `point`.
    ///
    /// The first point inserted into an empty box yields a padded box of
    /// `POINT_PADDING` per axis.
    pub fn add_point(&mut self, point: Vec3) {
        if self.empty {
            *self = Self::from_point(point);
        } else {
            self.min = self.min.min(point);
            self.max = self.max.max(point);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns true if `point` lies inside the box (inclusive).
    pub fn contains(&self, point: Vec3) -> bool {
        !self.empty && point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Slab test parameter interval `(tmin, tmax)` for a ray.
    ///
    /// `tmin` starts at 0 and `tmax` at infinity; each axis narrows the
    /// interval using the ray's cached reciprocal direction. The ray hits the
    /// box iff the returned interval is non-empty.
    ///
    /// A ray parallel to an axis whose origin lies exactly on one of that
    /// axis' faces yields `0 * inf = NaN`; such an axis places no limit.
    pub fn slab_interval(&self, ray: &Ray) -> (f32, f32) {
        let origin = ray.origin();
        let inv = ray.inv_direction();

        let mut tmin = 0.0_f32;
        let mut tmax = f32::INFINITY;

        for axis in 0..3 {
            let t1 = (self.min[axis] - origin[axis]) * inv[axis];
            let t2 = (self.max[axis] - origin[axis]) * inv[axis];
            if t1.is_nan() || t2.is_nan() {
                continue;
            }

            tmin = tmin.max(t1.min(t2));
            tmax = tmax.min(t1.max(t2));
        }

        (tmin, tmax)
    }

    /// Test if a ray intersects this AABB in front of its origin.
    ///
    /// Uses the slab method. An empty box is never hit.
    pub fn hit(&self, ray: &Ray) -> bool {
        if self.empty {
            return false;
        }
        let (tmin, tmax) = self.slab_interval(ray);
        tmin < tmax
    }

    /// Translate (move) the AABB by an offset vector.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        if self.empty {
            return *self;
        }
        Self {
            empty: false,
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_new_orders_corners() {
        let aabb = Aabb::new(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min(), Vec3::ZERO);
        assert_eq!(aabb.max(), Vec3::splat(10.0));
        assert!(!aabb.is_empty());
    }

    #[test]
    fn test_add_point_to_empty_pads() {
        let mut aabb = Aabb::EMPTY;
        aabb.add_point(Vec3::new(1.0, 2.0, 3.0));

        assert!(!aabb.is_empty());
        assert_eq!(aabb.min(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.max(), Vec3::new(1.0, 2.0, 3.0) + Vec3::splat(POINT_PADDING));
    }

    #[test]
    fn test_add_point_grows_monotonically() {
        let mut aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        aabb.add_point(Vec3::new(0.5, 0.5, 0.5));
        assert_eq!(aabb.min(), Vec3::ZERO);
        assert_eq!(aabb.max(), Vec3::ONE);

        aabb.add_point(Vec3::new(-1.0, 2.0, 0.5));
        assert_eq!(aabb.min(), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(aabb.max(), Vec3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::new(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::new(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.min(), Vec3::ZERO);
        assert_eq!(surrounding.max(), Vec3::splat(10.0));
    }

    #[test]
    fn test_surrounding_with_empty() {
        let box1 = Aabb::new(Vec3::ONE, Vec3::splat(2.0));

        assert_eq!(Aabb::surrounding(&box1, &Aabb::EMPTY), box1);
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &box1), box1);
        assert!(Aabb::surrounding(&Aabb::EMPTY, &Aabb::EMPTY).is_empty());
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&ray));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray));

        // Ray starting inside
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.3, -0.2, 0.9));
        assert!(aabb.hit(&ray));
    }

    #[test]
    fn test_empty_never_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(!Aabb::EMPTY.hit(&ray));
        assert!(!Aabb::default().hit(&ray));
    }

    #[test]
    fn test_hit_matches_slab_interval() {
        let aabb = Aabb::new(Vec3::new(2.0, -1.0, -1.0), Vec3::new(4.0, 1.0, 1.0));
        let directions = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.4, -0.2),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.3, 0.1, 0.05),
        ];

        for d in directions {
            let ray = Ray::new(Vec3::ZERO, d);
            let (tmin, tmax) = aabb.slab_interval(&ray);
            assert_eq!(aabb.hit(&ray), tmin < tmax, "direction {d:?}");
        }
    }

    #[test]
    fn test_parallel_ray_on_face_plane() {
        let aabb = Aabb::new(Vec3::new(0.0, -2.0, -3.0), Vec3::new(4.0, 0.0, 1.0));
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, -1.0).normalize());

        let (tmin, tmax) = aabb.slab_interval(&ray);
        assert!(tmin.is_finite() && tmax.is_finite());
        assert!(aabb.hit(&ray));

        // Same on the max face
        let ray = Ray::new(Vec3::new(4.0, 1.0, 0.0), Vec3::new(0.0, -1.0, -1.0).normalize());
        assert!(aabb.hit(&ray));

        // Parallel and outside the slab still misses
        let ray = Ray::new(Vec3::new(4.5, 1.0, 0.0), Vec3::new(0.0, -1.0, -1.0).normalize());
        assert!(!aabb.hit(&ray));
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn test_aabb_translate() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        let translated = aabb.translate(Vec3::new(5.0, 0.0, 0.0));

        assert_eq!(translated.min(), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(translated.max(), Vec3::new(6.0, 1.0, 1.0));
        assert!(Aabb::EMPTY.translate(Vec3::ONE).is_empty());
    }

    #[test]
    fn test_contains() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(aabb.contains(Vec3::splat(0.5)));
        assert!(aabb.contains(Vec3::ONE));
        assert!(!aabb.contains(Vec3::new(1.5, 0.5, 0.5)));
        assert!(!Aabb::EMPTY.contains(Vec3::ZERO));
    }
}
