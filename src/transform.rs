//! Affine transforms for scene instances (used by the top-level builder,
//! component C10, to place each sub-BVH's local-space AABB into world
//! space and to store each `TopBvhNode` leaf's inverse transform).
//!
//! Adapted from the teacher's `space/transform.rs::Transform3`, dropping
//! the ray/normal transform methods (no ray traversal in this crate) and
//! the `Trans`/`cgmath::Transform` trait machinery they existed to serve.

use cgmath::prelude::*;
use cgmath::{BaseFloat, Deg, Matrix4, Point3, Vector3};

/// A matrix/inverse pair, so the inverse doesn't need to be recomputed
/// every time a node stores it.
#[derive(Debug, Clone, Copy)]
pub struct Transform3<N: BaseFloat> {
    m: Matrix4<N>,
    minv: Matrix4<N>,
}

impl<N: BaseFloat> Transform3<N> {
    pub fn new(m: Matrix4<N>, minv: Matrix4<N>) -> Self {
        Transform3 { m, minv }
    }

    /// Computes the inverse internally; panics if the matrix is singular
    /// (a degenerate instance transform is a scene-authoring error, not a
    /// build-time condition this crate recovers from).
    pub fn from_matrix(m: Matrix4<N>) -> Self {
        let minv = m.invert().expect("instance transform must be invertible");
        Transform3 { m, minv }
    }

    pub fn identity() -> Self {
        let m = Matrix4::identity();
        Transform3 { m, minv: m }
    }

    pub fn translate(delta: Vector3<N>) -> Self {
        Transform3 {
            m: Matrix4::from_translation(delta),
            minv: Matrix4::from_translation(-delta),
        }
    }

    pub fn scale(x: N, y: N, z: N) -> Self {
        let one = N::one();
        Transform3 {
            m: Matrix4::from_nonuniform_scale(x, y, z),
            minv: Matrix4::from_nonuniform_scale(one / x, one / y, one / z),
        }
    }

    pub fn rotate_x(theta: Deg<N>) -> Self {
        let m = Matrix4::from_angle_x(theta);
        Transform3 { m, minv: m.transpose() }
    }

    pub fn rotate_y(theta: Deg<N>) -> Self {
        let m = Matrix4::from_angle_y(theta);
        Transform3 { m, minv: m.transpose() }
    }

    pub fn rotate_z(theta: Deg<N>) -> Self {
        let m = Matrix4::from_angle_z(theta);
        Transform3 { m, minv: m.transpose() }
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix4<N> {
        &self.m
    }

    #[inline]
    pub fn inverse_matrix(&self) -> &Matrix4<N> {
        &self.minv
    }

    pub fn inverse(&self) -> Self {
        Transform3 { m: self.minv, minv: self.m }
    }

    #[inline]
    pub fn transform_point(&self, point: Point3<N>) -> Point3<N> {
        self.m.transform_point(point)
    }

    #[inline]
    pub fn transform_vector(&self, vec: Vector3<N>) -> Vector3<N> {
        self.m.transform_vector(vec)
    }

    /// Compose so that `self.concat(&other)` transforms a point by
    /// applying `other` first, then `self` — i.e. `other` is nested
    /// inside `self` (a child's local transform composed under its
    /// parent's).
    pub fn concat(&self, other: &Self) -> Self {
        Transform3 {
            m: self.m * other.m,
            minv: other.minv * self.minv,
        }
    }
}

impl Transform3<f32> {
    /// Column-major 4x4, the layout `TopBvhNode::inv_transform` stores.
    pub fn inverse_matrix_columns(&self) -> [[f32; 4]; 4] {
        let m = self.minv;
        [
            [m.x.x, m.x.y, m.x.z, m.x.w],
            [m.y.x, m.y.y, m.y.z, m.y.w],
            [m.z.x, m.z.y, m.z.z, m.z.w],
            [m.w.x, m.w.y, m.w.z, m.w.w],
        ]
    }
}

impl<N: BaseFloat> Default for Transform3<N> {
    fn default() -> Self {
        Self::identity()
    }
}
