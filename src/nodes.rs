//! GPU-visible BVH node layouts (spec.md 6.2).
//!
//! Grounded on `original_source/src/bvh/bvh_nodes.h`'s `SubBVHNode`/
//! `TopBVHNode`, translated field-for-field from the C `union` (leaf vs.
//! interior reuse the same slot) into a single `u32` whose meaning is
//! disambiguated by a sibling field, which is what `#[repr(C)]` +
//! `bytemuck` can actually express.

use bytemuck::{Pod, Zeroable};

use crate::aabb::Aabb32;

/// A node in a sub-BVH (single mesh's object/spatial-split hierarchy).
///
/// 48 bytes, matching the original's `AABB (24) + u32 + u32 + u32[2]`
/// layout so a `Vec<SubBvhNode>` can be written to the cache file or an
/// OpenCL buffer without repacking.
///
/// `index_union` is the first child's index for an interior node, or the
/// first triangle's index for a leaf; `triangle_count == 0` means interior.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable, Default)]
pub struct SubBvhNode {
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub index_union: u32,
    pub triangle_count: u32,
    pub _padding: [u32; 2],
}

impl SubBvhNode {
    #[inline]
    pub fn empty() -> Self {
        SubBvhNode {
            bounds_min: [0.0; 3],
            bounds_max: [0.0; 3],
            index_union: 0,
            triangle_count: 0,
            _padding: [0; 2],
        }
    }

    #[inline]
    pub fn bounds(&self) -> Aabb32 {
        Aabb32::new(self.bounds_min.into(), self.bounds_max.into())
    }

    #[inline]
    pub fn set_bounds(&mut self, bounds: Aabb32) {
        self.bounds_min = bounds.min.into();
        self.bounds_max = bounds.max.into();
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.triangle_count > 0
    }

    #[inline]
    pub fn make_leaf(&mut self, first_triangle_index: u32, triangle_count: u32) {
        self.index_union = first_triangle_index;
        self.triangle_count = triangle_count;
    }

    #[inline]
    pub fn make_interior(&mut self, left_child_index: u32) {
        self.index_union = left_child_index;
        self.triangle_count = 0;
    }

    #[inline]
    pub fn left_child_index(&self) -> u32 {
        debug_assert!(!self.is_leaf());
        self.index_union
    }

    #[inline]
    pub fn first_triangle_index(&self) -> u32 {
        debug_assert!(self.is_leaf());
        self.index_union
    }
}

/// A node in the top-level (instance) hierarchy.
///
/// Interior nodes store both children's indices directly rather than the
/// original's `leftChildIndex`/`rightChildIndex` union with `subBvhNode`,
/// since a single `u32` can't hold two indices; `is_leaf` disambiguates.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable, Default)]
pub struct TopBvhNode {
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub inv_transform: [[f32; 4]; 4],
    pub left_child_index: u32,
    pub right_child_index: u32,
    pub sub_bvh_index: u32,
    pub is_leaf: u32,
}

impl TopBvhNode {
    #[inline]
    pub fn bounds(&self) -> Aabb32 {
        Aabb32::new(self.bounds_min.into(), self.bounds_max.into())
    }

    #[inline]
    pub fn set_bounds(&mut self, bounds: Aabb32) {
        self.bounds_min = bounds.min.into();
        self.bounds_max = bounds.max.into();
    }

    pub fn leaf(bounds: Aabb32, inv_transform: [[f32; 4]; 4], sub_bvh_index: u32) -> Self {
        let mut n = TopBvhNode {
            bounds_min: [0.0; 3],
            bounds_max: [0.0; 3],
            inv_transform,
            left_child_index: 0,
            right_child_index: 0,
            sub_bvh_index,
            is_leaf: 1,
        };
        n.set_bounds(bounds);
        n
    }

    pub fn interior(bounds: Aabb32, left_child_index: u32, right_child_index: u32) -> Self {
        let mut n = TopBvhNode {
            bounds_min: [0.0; 3],
            bounds_max: [0.0; 3],
            inv_transform: IDENTITY_4X4,
            left_child_index,
            right_child_index,
            sub_bvh_index: 0,
            is_leaf: 0,
        };
        n.set_bounds(bounds);
        n
    }
}

const IDENTITY_4X4: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];
