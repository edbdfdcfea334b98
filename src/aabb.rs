use cgmath::prelude::*;
use cgmath::{BaseFloat, Point3, Vector3};

/// Axis-aligned bounding box arithmetic (component C1).
///
/// Matches the GPU-visible layout used by `SubBvhNode`/`TopBvhNode`: an
/// empty box is represented by the `(+inf, -inf)` sentinel rather than an
/// `Option`, so `fit`/`union` can be applied blindly during a fold without
/// a branch for "nothing accumulated yet" — the sentinel is union's
/// identity element.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb<S: BaseFloat = f32> {
    pub min: Point3<S>,
    pub max: Point3<S>,
}

/// The crate builds over `f32` coordinates, matching the wire/GPU layout.
pub type Aabb32 = Aabb<f32>;

/// One of the three coordinate axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl<S: BaseFloat> Aabb<S> {
    /// The empty box: the identity element of `union`.
    #[inline]
    pub fn empty() -> Self {
        Aabb {
            min: Point3::new(S::infinity(), S::infinity(), S::infinity()),
            max: Point3::new(-S::infinity(), -S::infinity(), -S::infinity()),
        }
    }

    #[inline]
    pub fn new(min: Point3<S>, max: Point3<S>) -> Self {
        Aabb { min, max }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow to enclose the given point. No-op-preserving on an already-empty box.
    #[inline]
    pub fn fit_point(&self, p: Point3<S>) -> Self {
        Aabb {
            min: Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    /// Union of two boxes.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Aabb {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Intersection of two boxes; empty if they are disjoint on any axis.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Self {
        Aabb {
            min: Point3::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: Point3::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        }
    }

    /// Whether the two boxes share any point on every axis.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains(&self, p: Point3<S>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Whether `self` fully covers `other`.
    #[inline]
    pub fn contains_box(&self, other: &Self) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    #[inline]
    pub fn diagonal(&self) -> Vector3<S> {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Point3<S> {
        let two = S::one() + S::one();
        self.min + self.diagonal() / two
    }

    #[inline]
    pub fn surface_area(&self) -> S {
        let d = self.diagonal();
        if self.is_empty() {
            return S::zero();
        }
        let two = S::one() + S::one();
        two * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Index of the longest axis.
    ///
    /// NOTE: the original source (and the teacher's `Bounds3::maximum_extent`)
    /// both contain the same bug here — comparing `d.z > d.z` instead of
    /// `d.y > d.z` in the fallback branch, which always evaluates to
    /// `false`. This is the corrected version; see DESIGN.md.
    #[inline]
    pub fn maximum_extent(&self) -> Axis {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            Axis::X
        } else if d.y > d.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> S {
        match axis {
            Axis::X => self.min.x,
            Axis::Y => self.min.y,
            Axis::Z => self.min.z,
        }
    }

    #[inline]
    pub fn axis_min(&self, axis: Axis) -> S {
        match axis {
            Axis::X => self.min.x,
            Axis::Y => self.min.y,
            Axis::Z => self.min.z,
        }
    }

    #[inline]
    pub fn axis_max(&self, axis: Axis) -> S {
        match axis {
            Axis::X => self.max.x,
            Axis::Y => self.max.y,
            Axis::Z => self.max.z,
        }
    }

    #[inline]
    pub fn with_axis_max(&self, axis: Axis, value: S) -> Self {
        let mut b = *self;
        match axis {
            Axis::X => b.max.x = value,
            Axis::Y => b.max.y = value,
            Axis::Z => b.max.z = value,
        }
        b
    }

    #[inline]
    pub fn with_axis_min(&self, axis: Axis, value: S) -> Self {
        let mut b = *self;
        match axis {
            Axis::X => b.min.x = value,
            Axis::Y => b.min.y = value,
            Axis::Z => b.min.z = value,
        }
        b
    }

    /// The 8 corners of the box, in the order used by the top-level
    /// builder's transformed-AABB calculation.
    pub fn corners(&self) -> [Point3<S>; 8] {
        [
            Point3::new(self.max.x, self.max.y, self.max.z),
            Point3::new(self.max.x, self.max.y, self.min.z),
            Point3::new(self.max.x, self.min.y, self.max.z),
            Point3::new(self.max.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.max.z),
            Point3::new(self.min.x, self.max.y, self.min.z),
            Point3::new(self.min.x, self.max.y, self.max.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_union_identity() {
        let empty = Aabb32::empty();
        let b = Aabb32::new(Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0));
        assert_eq!(empty.union(&b), b);
    }

    #[test]
    fn surface_area_of_unit_cube() {
        let b = Aabb32::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(b.surface_area(), 6.0);
    }

    #[test]
    fn degenerate_box_has_zero_area() {
        let b = Aabb32::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        assert_eq!(b.surface_area(), 0.0);
    }

    #[test]
    fn intersects_is_false_for_disjoint_boxes() {
        let a = Aabb32::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb32::new(Point3::new(2.0, 2.0, 2.0), Point3::new(3.0, 3.0, 3.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn maximum_extent_picks_longest_axis() {
        let b = Aabb32::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 5.0, 2.0));
        assert_eq!(b.maximum_extent(), Axis::Y);
    }

    #[test]
    fn contains_is_inclusive_at_boundary() {
        let b = Aabb32::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(b.contains(Point3::new(1.0, 1.0, 1.0)));
        assert!(b.contains(Point3::new(0.0, 0.0, 0.0)));
    }
}
