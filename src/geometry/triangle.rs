use bytemuck::{Pod, Zeroable};

use super::vertex::Vertex;
use crate::aabb::Aabb32;
use crate::error::{BvhError, Result};

/// A single triangle: three indices into a shared vertex buffer plus a
/// material index the builder never inspects.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub material_index: u32,
}

impl Triangle {
    pub fn new(indices: [u32; 3], material_index: u32) -> Self {
        Triangle { indices, material_index }
    }

    /// The triangle's three vertex positions, looked up in `vertices`.
    ///
    /// # Panics
    /// Panics if any index is out of range. Callers that haven't already
    /// validated the triangle buffer (see [`validate_triangles`]) should
    /// not call this directly.
    #[inline]
    pub fn positions(&self, vertices: &[Vertex]) -> [cgmath::Point3<f32>; 3] {
        [
            vertices[self.indices[0] as usize].position3(),
            vertices[self.indices[1] as usize].position3(),
            vertices[self.indices[2] as usize].position3(),
        ]
    }

    /// The triangle's tight AABB.
    pub fn bounds(&self, vertices: &[Vertex]) -> Aabb32 {
        let [p0, p1, p2] = self.positions(vertices);
        Aabb32::empty().fit_point(p0).fit_point(p1).fit_point(p2)
    }
}

/// Validates that every triangle's indices fall within `vertices`, and that
/// there's at least one triangle. This is the only condition the builder
/// core treats as a hard failure (spec: `MalformedInput`); everything else
/// degrades to a leaf.
pub fn validate_triangles(vertices: &[Vertex], triangles: &[Triangle]) -> Result<()> {
    if triangles.is_empty() {
        return Err(BvhError::MalformedInput("no triangles supplied".into()));
    }
    for (i, tri) in triangles.iter().enumerate() {
        for &idx in &tri.indices {
            if idx as usize >= vertices.len() {
                return Err(BvhError::MalformedInput(format!(
                    "triangle {} references vertex {} but only {} vertices were supplied",
                    i,
                    idx,
                    vertices.len()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(p: [f32; 3]) -> Vertex {
        Vertex::new(p, [0.0, 1.0, 0.0], [0.0, 0.0])
    }

    #[test]
    fn bounds_of_a_single_triangle() {
        let vertices = vec![v([0.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), v([0.0, 1.0, 0.0])];
        let tri = Triangle::new([0, 1, 2], 0);
        let b = tri.bounds(&vertices);
        assert_eq!(b.min, cgmath::Point3::new(0.0, 0.0, 0.0));
        assert_eq!(b.max, cgmath::Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn rejects_empty_triangle_list() {
        let vertices = vec![v([0.0, 0.0, 0.0])];
        assert!(validate_triangles(&vertices, &[]).is_err());
    }

    #[test]
    fn rejects_out_of_range_index() {
        let vertices = vec![v([0.0, 0.0, 0.0]), v([1.0, 0.0, 0.0])];
        let triangles = vec![Triangle::new([0, 1, 5], 0)];
        assert!(validate_triangles(&vertices, &triangles).is_err());
    }
}
