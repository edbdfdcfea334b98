//! Primitive set (component C3): decouples sorting/partitioning during a
//! build from the underlying vertex/triangle buffers. A `PrimitiveRef`
//! names a triangle by its original index and carries its own bounds,
//! which the spatial-split builder may tighten below the triangle's full
//! AABB (and duplicate across two references) — the object-split builder
//! never does either.

use crate::aabb::Aabb32;
use crate::geometry::{Triangle, Vertex};

/// `(globalIndex, bounds)`: names an original triangle and the AABB the
/// builder should treat it as having, which may be a clipped sub-box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PrimitiveRef {
    pub global_index: u32,
    pub bounds: Aabb32,
}

impl PrimitiveRef {
    #[inline]
    pub fn centroid(&self) -> cgmath::Point3<f32> {
        self.bounds.center()
    }
}

/// Build the initial, unclipped primitive set: one reference per input
/// triangle, each with its full (unclipped) AABB.
pub fn generate_primitives(vertices: &[Vertex], triangles: &[Triangle]) -> Vec<PrimitiveRef> {
    triangles
        .iter()
        .enumerate()
        .map(|(i, tri)| PrimitiveRef {
            global_index: i as u32,
            bounds: tri.bounds(vertices),
        })
        .collect()
}

/// The union of every primitive's bounds, or empty if `primitives` is empty.
pub fn bounds_of(primitives: &[PrimitiveRef]) -> Aabb32 {
    primitives.iter().fold(Aabb32::empty(), |b, p| b.union(&p.bounds))
}

/// The union of every primitive's centroid, used to pick the widest
/// centroid-spread axis in the "fast" builder variant.
pub fn centroid_bounds_of(primitives: &[PrimitiveRef]) -> Aabb32 {
    primitives
        .iter()
        .fold(Aabb32::empty(), |b, p| b.fit_point(p.centroid()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vertex::Vertex;

    fn v(p: [f32; 3]) -> Vertex {
        Vertex::new(p, [0.0, 1.0, 0.0], [0.0, 0.0])
    }

    #[test]
    fn generates_one_ref_per_triangle() {
        let vertices = vec![v([0.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), v([0.0, 1.0, 0.0])];
        let triangles = vec![Triangle::new([0, 1, 2], 0)];
        let prims = generate_primitives(&vertices, &triangles);
        assert_eq!(prims.len(), 1);
        assert_eq!(prims[0].global_index, 0);
    }
}
