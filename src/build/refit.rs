//! BVH refit (component C9): recompute bounds bottom-up after vertex
//! positions move, without touching topology or primitive ranges.
//!
//! Grounded directly on `original_source/src/bvh/refit_bvh.cpp`'s
//! `recurse`. `triangles` here is the already-reordered buffer the
//! builder produced (indexed directly by `first_triangle_index`), not
//! the caller's original triangle array.

use crate::aabb::Aabb32;
use crate::geometry::{Triangle, Vertex};
use crate::nodes::SubBvhNode;

/// Recompute every node's bounds under `root_index`, given that
/// `vertices` may have moved but `nodes`/`triangles`' topology (child
/// indices, leaf ranges) is exactly as the builder left it.
pub fn refit(nodes: &mut [SubBvhNode], root_index: u32, vertices: &[Vertex], triangles: &[Triangle]) -> Aabb32 {
    recurse(nodes, root_index, vertices, triangles)
}

fn recurse(nodes: &mut [SubBvhNode], node_index: u32, vertices: &[Vertex], triangles: &[Triangle]) -> Aabb32 {
    let node = nodes[node_index as usize];
    let bounds = if node.is_leaf() {
        let first = node.first_triangle_index();
        let mut b = Aabb32::empty();
        for i in first..first + node.triangle_count {
            b = b.union(&triangles[i as usize].bounds(vertices));
        }
        b
    } else {
        let left = node.left_child_index();
        let left_bounds = recurse(nodes, left, vertices, triangles);
        let right_bounds = recurse(nodes, left + 1, vertices, triangles);
        left_bounds.union(&right_bounds)
    };

    nodes[node_index as usize].set_bounds(bounds);
    bounds
}
