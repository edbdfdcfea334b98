//! Triangle-AABB polygon clipping (component C2): Sutherland-Hodgman
//! against the box's 6 axis-aligned half-spaces, returning the tight AABB
//! of the clipped convex polygon.
//!
//! Grounded on `original_source/src/bvh/bvh_spatial_split.cpp`'s
//! `clipTriangleBounds` (the "HIGH_QUALITY_CLIPS" variant it keeps active;
//! the commented-out alternate segment clipper in the same file is not
//! reproduced — see DESIGN.md).

use cgmath::{Point3, Vector3};
use smallvec::SmallVec;

use crate::aabb::{Aabb32, Axis};

/// Starts at 3 vertices; each of the 6 clip planes can add at most one, so
/// 11 is the hard upper bound (spec.md 4.1).
type Polygon = SmallVec<[Point3<f32>; 11]>;

/// Clip a triangle's convex hull against `clip_box` and return the tight
/// AABB of what remains, or `None` if the triangle doesn't intersect the
/// box (including "clips to nothing" numerical edge cases, which the
/// caller treats as `ClipperFailure`: the primitive is simply absent from
/// that bin).
pub fn clip_triangle_to_aabb(
    v0: Point3<f32>,
    v1: Point3<f32>,
    v2: Point3<f32>,
    clip_box: &Aabb32,
) -> Option<Aabb32> {
    let mut polygon: Polygon = SmallVec::new();
    polygon.push(v0);
    polygon.push(v1);
    polygon.push(v2);

    for axis in Axis::ALL {
        polygon = clip_against_plane(&polygon, axis, clip_box.axis_min(axis), true);
        if polygon.len() < 3 {
            return None;
        }
        polygon = clip_against_plane(&polygon, axis, clip_box.axis_max(axis), false);
        if polygon.len() < 3 {
            return None;
        }
    }

    let mut bounds = Aabb32::empty();
    for p in &polygon {
        bounds = bounds.fit_point(*p);
    }
    if bounds.is_empty() {
        None
    } else {
        Some(bounds)
    }
}

/// One Sutherland-Hodgman pass against a single half-space
/// `coord(axis) >= plane_pos` (when `is_min_plane`) or `coord(axis) <=
/// plane_pos` (otherwise).
fn clip_against_plane(polygon: &Polygon, axis: Axis, plane_pos: f32, is_min_plane: bool) -> Polygon {
    let mut out = Polygon::new();
    if polygon.is_empty() {
        return out;
    }

    let inside = |p: &Point3<f32>| -> bool {
        let c = axis_component(*p, axis);
        if is_min_plane {
            c >= plane_pos
        } else {
            c <= plane_pos
        }
    };

    let n = polygon.len();
    for i in 0..n {
        let curr = polygon[i];
        let prev = polygon[(i + n - 1) % n];
        let curr_in = inside(&curr);
        let prev_in = inside(&prev);

        if curr_in != prev_in {
            out.push(plane_intersection(prev, curr, axis, plane_pos));
        }
        if curr_in {
            out.push(curr);
        }
    }
    out
}

/// Intersection of edge `prev -> curr` with the plane `coord(axis) ==
/// plane_pos`, snapped exactly onto the plane to avoid drift producing a
/// vertex just outside the clip bounds (spec.md 4.1's numerical-drift
/// note). Returns `prev` unchanged if the edge is parallel to the plane
/// (shouldn't be called in that case, since `curr_in != prev_in` implies a
/// crossing, but division by ~0 is guarded regardless).
fn plane_intersection(prev: Point3<f32>, curr: Point3<f32>, axis: Axis, plane_pos: f32) -> Point3<f32> {
    let edge: Vector3<f32> = curr - prev;
    let denom = axis_component_v(edge, axis);
    if denom == 0.0 {
        return prev;
    }
    let t = (plane_pos - axis_component(prev, axis)) / denom;
    let t = t.clamp(0.0, 1.0);
    let mut p = prev + edge * t;
    set_axis_component(&mut p, axis, plane_pos);
    p
}

#[inline]
fn axis_component(p: Point3<f32>, axis: Axis) -> f32 {
    match axis {
        Axis::X => p.x,
        Axis::Y => p.y,
        Axis::Z => p.z,
    }
}

#[inline]
fn axis_component_v(v: Vector3<f32>, axis: Axis) -> f32 {
    match axis {
        Axis::X => v.x,
        Axis::Y => v.y,
        Axis::Z => v.z,
    }
}

#[inline]
fn set_axis_component(p: &mut Point3<f32>, axis: Axis, value: f32) {
    match axis {
        Axis::X => p.x = value,
        Axis::Y => p.y = value,
        Axis::Z => p.z = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_fully_inside_box_is_unchanged() {
        let v0 = Point3::new(0.2, 0.2, 0.0);
        let v1 = Point3::new(0.8, 0.2, 0.0);
        let v2 = Point3::new(0.5, 0.8, 0.0);
        let clip = Aabb32::new(Point3::new(0.0, 0.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let bounds = clip_triangle_to_aabb(v0, v1, v2, &clip).unwrap();
        assert_eq!(bounds.min, Point3::new(0.2, 0.2, 0.0));
        assert_eq!(bounds.max, Point3::new(0.8, 0.8, 0.0));
    }

    #[test]
    fn triangle_straddling_plane_is_clipped_tight() {
        // Triangle spans x in [-1, 1]; clip to x in [0, 2].
        let v0 = Point3::new(-1.0, 0.0, 0.0);
        let v1 = Point3::new(1.0, 0.0, 0.0);
        let v2 = Point3::new(0.0, 1.0, 0.0);
        let clip = Aabb32::new(Point3::new(0.0, -1.0, -1.0), Point3::new(2.0, 2.0, 1.0));
        let bounds = clip_triangle_to_aabb(v0, v1, v2, &clip).unwrap();
        assert!(bounds.min.x >= 0.0 - 1e-6);
        assert!(bounds.max.x <= 1.0 + 1e-6);
        assert!((bounds.min.x - 0.0).abs() < 1e-5);
    }

    #[test]
    fn triangle_outside_box_clips_to_none() {
        let v0 = Point3::new(10.0, 10.0, 10.0);
        let v1 = Point3::new(11.0, 10.0, 10.0);
        let v2 = Point3::new(10.0, 11.0, 10.0);
        let clip = Aabb32::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(clip_triangle_to_aabb(v0, v1, v2, &clip).is_none());
    }

    #[test]
    fn triangle_parallel_to_clip_plane_contributes_no_vertex() {
        // Triangle lies flat in the z=0 plane; clip box spans z in [-1, 1].
        // Clipping against the z planes shouldn't introduce new vertices.
        let v0 = Point3::new(0.0, 0.0, 0.0);
        let v1 = Point3::new(1.0, 0.0, 0.0);
        let v2 = Point3::new(0.0, 1.0, 0.0);
        let clip = Aabb32::new(Point3::new(-5.0, -5.0, -1.0), Point3::new(5.0, 5.0, 1.0));
        let bounds = clip_triangle_to_aabb(v0, v1, v2, &clip).unwrap();
        assert_eq!(bounds.min.z, 0.0);
        assert_eq!(bounds.max.z, 0.0);
    }

    #[test]
    fn clipped_vertices_never_fall_outside_clip_bounds() {
        let v0 = Point3::new(-2.0, -2.0, -2.0);
        let v1 = Point3::new(3.0, -1.0, 0.5);
        let v2 = Point3::new(-1.0, 4.0, 1.0);
        let clip = Aabb32::new(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5));
        if let Some(bounds) = clip_triangle_to_aabb(v0, v1, v2, &clip) {
            assert!(clip.contains_box(&bounds) || {
                // Allow a hair of floating point slack, never gross overshoot.
                let eps = 1e-4;
                bounds.min.x >= clip.min.x - eps
                    && bounds.min.y >= clip.min.y - eps
                    && bounds.min.z >= clip.min.z - eps
                    && bounds.max.x <= clip.max.x + eps
                    && bounds.max.y <= clip.max.y + eps
                    && bounds.max.z <= clip.max.z + eps
            });
        }
    }
}
