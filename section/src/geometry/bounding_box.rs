use crate::{geometry::Ray, Pos};

/// Axis aligned bounding box. A freshly created box is empty (min is +inf and
/// max is -inf) until a point is added to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Pos,
    pub max: Pos,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Pos::repeat(f64::INFINITY),
            max: Pos::repeat(f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Pos>) -> Self {
        let mut bounds = Self::empty();
        points.into_iter().for_each(|x| bounds.expand_point(*x));
        bounds
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn center(&self) -> Pos {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Pos {
        if self.is_empty() {
            return Pos::zeros();
        }

        self.max - self.min
    }

    /// Length of the longest side.
    pub fn max_dimension(&self) -> f64 {
        self.size().max()
    }

    pub fn expand_point(&mut self, point: Pos) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Slab test. Returns the distance along the ray to the first point inside
    /// the box (zero when the origin is already inside).
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        if self.is_empty() {
            return None;
        }

        let (mut near, mut far) = (0_f64, f64::INFINITY);
        for axis in 0..3 {
            let inv = 1.0 / ray.direction[axis];
            let t0 = (self.min[axis] - ray.origin[axis]) * inv;
            let t1 = (self.max[axis] - ray.origin[axis]) * inv;
            let (t0, t1) = if inv < 0.0 { (t1, t0) } else { (t0, t1) };

            // NaN shows up when the ray is parallel to a slab and starts on
            // its boundary; max/min skip over it.
            near = near.max(t0);
            far = far.min(t1);
            if near > far {
                return None;
            }
        }

        Some(near)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box() {
        let bounds = BoundingBox::empty();
        assert!(bounds.is_empty());
        assert_eq!(bounds.size(), Pos::zeros());
        assert_eq!(bounds.max_dimension(), 0.0);
        assert!(BoundingBox::from_points(std::iter::empty()).is_empty());
    }

    #[test]
    fn single_point_is_not_empty() {
        let bounds = BoundingBox::from_points(&[Pos::new(1.0, 2.0, 3.0)]);
        assert!(!bounds.is_empty());
        assert_eq!(bounds.center(), Pos::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.size(), Pos::zeros());
    }

    #[test]
    fn center_and_size() {
        let bounds = BoundingBox::from_points(&[
            Pos::new(-1.0, 0.0, 2.0),
            Pos::new(3.0, 4.0, -2.0),
            Pos::new(0.0, 1.0, 0.0),
        ]);

        assert_eq!(bounds.min, Pos::new(-1.0, 0.0, -2.0));
        assert_eq!(bounds.max, Pos::new(3.0, 4.0, 2.0));
        assert_eq!(bounds.center(), Pos::new(1.0, 2.0, 0.0));
        assert_eq!(bounds.size(), Pos::new(4.0, 4.0, 4.0));
        assert_eq!(bounds.max_dimension(), 4.0);
    }

    #[test]
    fn union_with_empty() {
        let a = BoundingBox::from_points(&[Pos::zeros(), Pos::repeat(1.0)]);
        assert_eq!(a.union(&BoundingBox::empty()), a);
        assert_eq!(BoundingBox::empty().union(&a), a);
    }

    #[test]
    fn ray_slab() {
        let bounds = BoundingBox::from_points(&[Pos::repeat(-1.0), Pos::repeat(1.0)]);

        let hit = Ray::new(Pos::new(0.0, 0.0, 5.0), -Pos::z());
        assert_eq!(bounds.intersect_ray(&hit), Some(4.0));

        let inside = Ray::new(Pos::zeros(), Pos::x());
        assert_eq!(bounds.intersect_ray(&inside), Some(0.0));

        let miss = Ray::new(Pos::new(3.0, 0.0, 5.0), -Pos::z());
        assert_eq!(bounds.intersect_ray(&miss), None);

        let behind = Ray::new(Pos::new(0.0, 0.0, 5.0), Pos::z());
        assert_eq!(bounds.intersect_ray(&behind), None);
    }
}
