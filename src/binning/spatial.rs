//! Binned spatial-split scan (component C7).
//!
//! Grounded on `original_source/src/bvh/bvh_spatial_split.cpp`:
//! `SpatialBin` tracks `enter`/`exit` counts separately (a primitive
//! spanning several bins increments `enter` only in its leftmost bin and
//! `exit` only in its rightmost, so summing doesn't double-count it), and
//! each covered bin's bounds come from re-clipping the triangle to that
//! bin's slab rather than just splitting the primitive's existing AABB.

use crate::aabb::{Aabb32, Axis};
use crate::clip::clip_triangle_to_aabb;
use crate::geometry::{Triangle, Vertex};
use crate::primitive::PrimitiveRef;

#[derive(Debug, Clone, Copy)]
struct SpatialBin {
    enter: usize,
    exit: usize,
    bounds: Aabb32,
    left_plane: f32,
    right_plane: f32,
}

impl SpatialBin {
    fn empty(left_plane: f32, right_plane: f32) -> Self {
        SpatialBin { enter: 0, exit: 0, bounds: Aabb32::empty(), left_plane, right_plane }
    }

    fn merge(&self, other: &Self) -> Self {
        SpatialBin {
            enter: self.enter + other.enter,
            exit: self.exit + other.exit,
            bounds: self.bounds.union(&other.bounds),
            left_plane: self.left_plane.min(other.left_plane),
            right_plane: self.right_plane.max(other.right_plane),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpatialSplit {
    pub axis: Axis,
    pub position: f32,
    pub left_count: usize,
    pub right_count: usize,
    pub left_bounds: Aabb32,
    pub right_bounds: Aabb32,
    pub sah: f32,
}

/// Scan `n_bins` spatial bins per axis and return the lowest-SAH split
/// that also beats `current_node_sah` (the cost of not splitting at all),
/// or `None`. Requires at least 4 primitives, matching the original's
/// "leaf nodes should have at least 3 primitives" guard (the 4th is the
/// one under consideration for subdivision).
pub fn find_spatial_split_binned(
    node_bounds: &Aabb32,
    primitives: &[PrimitiveRef],
    vertices: &[Vertex],
    triangles: &[Triangle],
    axes_to_consider: &[Axis],
    n_bins: usize,
) -> Option<SpatialSplit> {
    if primitives.len() < 4 {
        return None;
    }

    let current_node_sah = node_bounds.surface_area() * primitives.len() as f32;
    let mut best: Option<SpatialSplit> = None;

    for &axis in axes_to_consider {
        let extent = node_bounds.axis_max(axis) - node_bounds.axis_min(axis);
        if extent <= f32::MIN_POSITIVE {
            continue;
        }

        let bins = bin_primitives(node_bounds, axis, primitives, vertices, triangles, n_bins);

        // Inclusive prefix sums from the left and from the right, so
        // `summed[i]` covers bins `0..=i` and `inv_summed[i]` covers bins
        // `(n_bins - 1 - i)..n_bins`.
        let mut summed = vec![bins[0]; n_bins];
        for i in 1..n_bins {
            summed[i] = summed[i - 1].merge(&bins[i]);
        }

        let mut inv_summed = vec![bins[n_bins - 1]; n_bins];
        for i in 1..n_bins {
            inv_summed[i] = inv_summed[i - 1].merge(&bins[n_bins - 1 - i]);
        }

        for split_position in 1..n_bins {
            let left = summed[split_position - 1];
            let right = inv_summed[n_bins - split_position - 1];

            let enter_count = left.enter;
            let exit_count = right.exit;
            if enter_count == 0 || exit_count == 0 {
                continue;
            }

            let sah = enter_count as f32 * left.bounds.surface_area() + exit_count as f32 * right.bounds.surface_area();
            let better = best.map(|b| sah < b.sah).unwrap_or(true);
            if better && sah < current_node_sah {
                best = Some(SpatialSplit {
                    axis,
                    position: left.right_plane,
                    left_count: enter_count,
                    right_count: exit_count,
                    left_bounds: left.bounds,
                    right_bounds: right.bounds,
                    sah,
                });
            }
        }
    }

    best
}

fn bin_primitives(
    node_bounds: &Aabb32,
    axis: Axis,
    primitives: &[PrimitiveRef],
    vertices: &[Vertex],
    triangles: &[Triangle],
    n_bins: usize,
) -> Vec<SpatialBin> {
    let min = node_bounds.axis_min(axis);
    let max = node_bounds.axis_max(axis);
    let extent = max - min;
    let k1 = n_bins as f32 / extent;
    let k1_inv = extent / n_bins as f32;

    let mut bins: Vec<SpatialBin> = (0..n_bins)
        .map(|i| {
            let left = if i == 0 { min } else { min + i as f32 * k1_inv };
            let right = if i == n_bins - 1 { max } else { min + (i + 1) as f32 * k1_inv };
            SpatialBin::empty(left, right)
        })
        .collect();

    for p in primitives {
        let p_min = p.bounds.axis_min(axis);
        let p_max = p.bounds.axis_max(axis);

        let x_min = k1 * (p_min - min);
        let x_max = k1 * (p_max - min);
        let mut left_bin = (x_min as isize).clamp(0, n_bins as isize - 1) as usize;
        let mut right_bin = (x_max as isize).clamp(0, n_bins as isize - 1) as usize;

        while left_bin > 0 && p_min <= bins[left_bin].left_plane {
            left_bin -= 1;
        }
        while left_bin != n_bins - 1 && p_min > bins[left_bin].right_plane {
            left_bin += 1;
        }
        while right_bin > 0 && p_max < bins[right_bin].left_plane {
            right_bin -= 1;
        }
        while right_bin != n_bins - 1 && p_max >= bins[right_bin].right_plane {
            right_bin += 1;
        }
        if left_bin > right_bin {
            right_bin = left_bin;
        }

        let [v0, v1, v2] = triangles[p.global_index as usize].positions(vertices);

        let mut actual_left: Option<usize> = None;
        let mut actual_right: Option<usize> = None;

        for bin_id in left_bin..=right_bin {
            let mut bin_box = p.bounds;
            bin_box = bin_box.with_axis_min(axis, bins[bin_id].left_plane);
            bin_box = bin_box.with_axis_max(axis, bins[bin_id].right_plane);

            if let Some(clipped) = clip_triangle_to_aabb(v0, v1, v2, &bin_box) {
                actual_left = Some(actual_left.map_or(bin_id, |l| l.min(bin_id)));
                actual_right = Some(actual_right.map_or(bin_id, |r| r.max(bin_id)));
                bins[bin_id].bounds = bins[bin_id].bounds.union(&clipped);
            }
        }

        if let (Some(l), Some(r)) = (actual_left, actual_right) {
            bins[l].enter += 1;
            bins[r].exit += 1;
        }
    }

    bins
}
