//! Object-split binned-SAH builder (component C6).
//!
//! Grounded on `original_source/src/bvh/bvh_build.cpp`'s `buildBVH`: an
//! explicit `std::stack` of `(nodeID, primitives)` rather than recursion,
//! so a pathological input can't blow the call stack before the depth
//! cap kicks in. Primitives are partitioned in place
//! (`performObjectSplitInPlace`) since an object split never duplicates a
//! primitive — unlike the spatial-split builder in `sbvh.rs`, this one
//! never needs to grow the primitive set.

use std::ops::Range;

use log::{debug, warn};

use crate::aabb::Axis;
use crate::arena::NodeArena;
use crate::binning::object::{find_object_split_binned, perform_object_split_in_place};
use crate::config::BuildConfig;
use crate::error::Result;
use crate::geometry::{validate_triangles, Triangle, Vertex};
use crate::nodes::SubBvhNode;
use crate::primitive::{bounds_of, centroid_bounds_of, generate_primitives};

use super::SubBvhBuildOutput;

/// Build a sub-BVH over `triangles` using the binned object-split SAH.
///
/// `fast`, when true, restricts every node's split scan to its bounds'
/// single widest axis (the original's `buildBinnedFastBVH`) instead of
/// scanning all three — a quality/build-time tradeoff, not a different
/// algorithm.
pub fn build(vertices: &[Vertex], triangles: &[Triangle], config: &BuildConfig, fast: bool) -> Result<SubBvhBuildOutput> {
    validate_triangles(vertices, triangles)?;

    let mut primitives = generate_primitives(vertices, triangles);
    let max_depth = config.max_depth(primitives.len());

    let mut arena: NodeArena<SubBvhNode> = NodeArena::with_capacity(primitives.len().max(1) * 2);
    let root = arena.allocate_pair();
    arena.get_mut(root).set_bounds(bounds_of(&primitives));

    let mut stack: Vec<(u32, Range<usize>, u32)> = vec![(root, 0..primitives.len(), 0)];

    while let Some((node_index, range, depth)) = stack.pop() {
        let node_bounds = arena.get(node_index).bounds();
        let slice = &mut primitives[range.clone()];

        let over_cap = slice.len() > config.max_prims_per_leaf;
        let split = if depth < max_depth && (slice.len() >= config.min_leaf_primitives || over_cap) {
            let axes: &[Axis] = if fast { &[centroid_bounds_of(slice).maximum_extent()] } else { &Axis::ALL };
            find_object_split_binned(&node_bounds, slice, axes, config.n_obj_bins, over_cap)
        } else {
            None
        };

        if split.is_none() && over_cap {
            warn!(
                "binned-sah: node {} holds {} primitives, over max_prims_per_leaf={} but no split was found",
                node_index,
                slice.len(),
                config.max_prims_per_leaf
            );
        }

        match split {
            Some(split) => {
                let mid = perform_object_split_in_place(slice, &split) + range.start;
                if mid == range.start || mid == range.end {
                    // Every primitive's centroid fell on the same side of
                    // the chosen plane despite the SAH scan finding one
                    // (coincident centroids closer together than the bin
                    // granularity). Degrade to a leaf rather than loop.
                    make_leaf(&mut arena, node_index, &range);
                    continue;
                }

                let left_index = arena.allocate_pair();
                let right_index = left_index + 1;
                arena.get_mut(left_index).set_bounds(split.left_bounds);
                arena.get_mut(right_index).set_bounds(split.right_bounds);
                arena.get_mut(node_index).make_interior(left_index);

                stack.push((left_index, range.start..mid, depth + 1));
                stack.push((right_index, mid..range.end, depth + 1));
            }
            None => make_leaf(&mut arena, node_index, &range),
        }
    }

    let primitive_order = primitives.iter().map(|p| p.global_index).collect();
    debug!(
        "binned-sah build: {} triangles -> {} nodes (fast={})",
        triangles.len(),
        arena.len(),
        fast
    );

    Ok(SubBvhBuildOutput { nodes: arena.into_vec(), primitive_order })
}

fn make_leaf(arena: &mut NodeArena<SubBvhNode>, node_index: u32, range: &Range<usize>) {
    arena.get_mut(node_index).make_leaf(range.start as u32, (range.end - range.start) as u32);
}
