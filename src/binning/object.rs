//! Binned object-split (SAH) scan (component C5).
//!
//! Grounded on `original_source/src/bvh/bvh_object_split.cpp`:
//! `ObjectBin` stores its own `leftPlane`/`rightPlane` rather than
//! recomputing them from the bin index, so a primitive whose centroid
//! drifts to the wrong side of a recomputed boundary (float rounding) is
//! still reclassified against the bin it was actually binned into.

use crate::aabb::{Aabb32, Axis};
use crate::primitive::PrimitiveRef;

#[derive(Debug, Clone, Copy)]
struct ObjectBin {
    count: usize,
    bounds: Aabb32,
    left_plane: f32,
    right_plane: f32,
}

impl ObjectBin {
    fn empty(left_plane: f32, right_plane: f32) -> Self {
        ObjectBin { count: 0, bounds: Aabb32::empty(), left_plane, right_plane }
    }

    fn merge(&self, other: &Self) -> Self {
        ObjectBin {
            count: self.count + other.count,
            bounds: self.bounds.union(&other.bounds),
            left_plane: self.left_plane.min(other.left_plane),
            right_plane: self.right_plane.max(other.right_plane),
        }
    }
}

/// The best object split found, if any axis produced one.
#[derive(Debug, Clone, Copy)]
pub struct ObjectSplit {
    pub axis: Axis,
    pub position: f32,
    pub left_bounds: Aabb32,
    pub right_bounds: Aabb32,
    pub sah: f32,
}

/// Scan `n_bins` object bins per axis in `axes_to_consider` and return the
/// split with lowest partial SAH cost (`count * surface_area` summed over
/// both sides), or `None` if no axis has a nonzero extent, every split
/// puts every primitive on one side, or the best candidate doesn't beat
/// the node's own leaf cost (`primCount * surface_area(node_bounds)`,
/// spec.md 4.3's termination condition (c)) — unless `force` is set, in
/// which case the leaf-cost gate is skipped (used when a node exceeds
/// `max_prims_per_leaf` and must split regardless of SAH).
pub fn find_object_split_binned(
    node_bounds: &Aabb32,
    primitives: &[PrimitiveRef],
    axes_to_consider: &[Axis],
    n_bins: usize,
    force: bool,
) -> Option<ObjectSplit> {
    let current_node_sah = primitives.len() as f32 * node_bounds.surface_area();
    let mut best: Option<ObjectSplit> = None;

    for &axis in axes_to_consider {
        let extent = node_bounds.axis_max(axis) - node_bounds.axis_min(axis);
        if extent <= f32::MIN_POSITIVE {
            continue;
        }

        let bins = bin_primitives(node_bounds, axis, primitives, n_bins);

        let mut summed = vec![ObjectBin::empty(0.0, 0.0); n_bins];
        let mut running = bins[0];
        summed[0] = running;
        for i in 1..n_bins {
            running = running.merge(&bins[i]);
            summed[i] = running;
        }

        let mut inv_summed = vec![ObjectBin::empty(0.0, 0.0); n_bins];
        let mut running = bins[n_bins - 1];
        inv_summed[0] = running;
        for i in 1..n_bins {
            running = running.merge(&bins[n_bins - 1 - i]);
            inv_summed[i] = running;
        }

        for split_position in 1..n_bins {
            let left = summed[split_position - 1];
            let right = inv_summed[n_bins - split_position - 1];

            if left.count == 0 || right.count == 0 {
                continue;
            }

            let partial_sah =
                left.count as f32 * left.bounds.surface_area() + right.count as f32 * right.bounds.surface_area();

            if best.is_none() || partial_sah < best.unwrap().sah {
                best = Some(ObjectSplit {
                    axis,
                    position: left.right_plane,
                    left_bounds: left.bounds,
                    right_bounds: right.bounds,
                    sah: partial_sah,
                });
            }
        }
    }

    best.filter(|b| force || b.sah < current_node_sah)
}

fn bin_primitives(node_bounds: &Aabb32, axis: Axis, primitives: &[PrimitiveRef], n_bins: usize) -> Vec<ObjectBin> {
    let min = node_bounds.axis_min(axis);
    let max = node_bounds.axis_max(axis);
    let extent = max - min;
    let k1 = n_bins as f32 / extent;
    let k1_inv = extent / n_bins as f32;

    let mut bins: Vec<ObjectBin> = (0..n_bins)
        .map(|i| {
            let left = if i == 0 { min } else { min + i as f32 * k1_inv };
            let right = if i == n_bins - 1 { max } else { min + (i + 1) as f32 * k1_inv };
            ObjectBin::empty(left, right)
        })
        .collect();

    for p in primitives {
        let centroid = p.bounds.center();
        let centroid = match axis {
            Axis::X => centroid.x,
            Axis::Y => centroid.y,
            Axis::Z => centroid.z,
        };
        let x = k1 * (centroid - min);
        let mut bin_id = (x as isize).clamp(0, n_bins as isize - 1) as usize;

        while bin_id > 0 && centroid < bins[bin_id].left_plane {
            bin_id -= 1;
        }
        while bin_id != n_bins - 1 && centroid >= bins[bin_id].right_plane {
            bin_id += 1;
        }

        bins[bin_id].count += 1;
        bins[bin_id].bounds = bins[bin_id].bounds.union(&p.bounds);
    }

    bins
}

/// Partition `primitives` in place so that every primitive whose centroid
/// lies left of `split.position` on `split.axis` comes first, and return
/// the number of primitives sent left. Uses `partition::partition` for a
/// single in-place swap pass rather than allocating two new `Vec`s.
pub fn perform_object_split_in_place(primitives: &mut [PrimitiveRef], split: &ObjectSplit) -> usize {
    let (left, _right) = partition::partition(primitives, |p| {
        let c = p.bounds.center();
        let v = match split.axis {
            Axis::X => c.x,
            Axis::Y => c.y,
            Axis::Z => c.z,
        };
        v < split.position
    });
    left.len()
}
