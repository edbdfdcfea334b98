//! BVH construction subsystem for an OpenCL-accelerated path tracer.
//!
//! This crate owns geometry in, hierarchy out: binned-SAH object-split
//! and spatial-split (SBVH) sub-BVH builders, a two-level top/sub
//! assembler for instanced scenes, refit, and the GPU-consumable node
//! layouts the renderer's OpenCL kernels traverse. It does not trace
//! rays, shade, or render — that's the concern of whatever consumes the
//! node buffers this crate produces.

pub mod aabb;
pub mod arena;
pub mod binning;
pub mod build;
pub mod cache;
pub mod clip;
pub mod config;
pub mod error;
pub mod geometry;
pub mod nodes;
pub mod primitive;
pub mod scene;
pub mod transform;
pub mod validate;

pub use crate::aabb::{Aabb, Aabb32, Axis};
pub use crate::cache::{read as read_cache, write as write_cache, CachedBvh};
pub use crate::config::BuildConfig;
pub use crate::error::{BvhError, Result};
pub use crate::geometry::{validate_triangles, Triangle, Vertex};
pub use crate::nodes::{SubBvhNode, TopBvhNode};
pub use crate::primitive::{generate_primitives, PrimitiveRef};
pub use crate::scene::{MeshInstance, SceneNode};
pub use crate::transform::Transform3;
pub use crate::validate::{validate, ValidationFailure};

/// What a sub-BVH builder hands back: the flattened node array, the root's
/// index into it, and the triangle buffer reordered to match each leaf's
/// contiguous `first_triangle_index .. +triangle_count` window.
///
/// A spatial-split build's `triangles` can be longer than the input
/// triangle count, since a straddling triangle is referenced from both
/// children; the duplicate carries the same material index and geometry
/// as the original.
#[derive(Debug, Clone)]
pub struct BvhBuildOutput {
    pub root_index: u32,
    pub nodes: Vec<SubBvhNode>,
    pub triangles: Vec<Triangle>,
}

/// What `build_top_bvh` hands back: the root's index into `nodes` (per
/// [`build::top::build`], the root is always the last-allocated node).
#[derive(Debug, Clone)]
pub struct TopBvhBuildOutput {
    pub root_index: u32,
    pub nodes: Vec<TopBvhNode>,
}

fn into_bvh_build_output(output: build::SubBvhBuildOutput, triangles: &[Triangle]) -> BvhBuildOutput {
    let reordered = output.primitive_order.iter().map(|&i| triangles[i as usize]).collect();
    BvhBuildOutput { root_index: 0, nodes: output.nodes, triangles: reordered }
}

/// Build a sub-BVH over `triangles` with the binned object-split SAH
/// builder, scanning all three axes at every node (spec.md 4.3.1).
pub fn build_binned_bvh(vertices: &[Vertex], triangles: &[Triangle], config: &BuildConfig) -> Result<BvhBuildOutput> {
    let output = build::binned::build(vertices, triangles, config, false)?;
    Ok(into_bvh_build_output(output, triangles))
}

/// Build a sub-BVH over `triangles` with the binned object-split SAH
/// builder, restricting each node's axis scan to its bounds' single widest
/// axis instead of scanning all three (spec.md 4.3.1).
pub fn build_binned_fast_bvh(
    vertices: &[Vertex],
    triangles: &[Triangle],
    config: &BuildConfig,
) -> Result<BvhBuildOutput> {
    let output = build::binned::build(vertices, triangles, config, true)?;
    Ok(into_bvh_build_output(output, triangles))
}

/// Build a sub-BVH over `triangles` with the spatial-split (SBVH)
/// builder, duplicating references for triangles that straddle a split
/// plane when doing so beats object-splitting or unsplitting.
pub fn build_spatial_split_bvh(
    vertices: &[Vertex],
    triangles: &[Triangle],
    config: &BuildConfig,
) -> Result<BvhBuildOutput> {
    let output = build::sbvh::build(vertices, triangles, config)?;
    Ok(into_bvh_build_output(output, triangles))
}

/// Recompute every node's bounds in place from the current vertex
/// positions, without touching topology. Returns the root's new bounds.
pub fn refit_bvh(nodes: &mut [SubBvhNode], root_index: u32, vertices: &[Vertex], triangles: &[Triangle]) -> Aabb32 {
    build::refit::refit(nodes, root_index, vertices, triangles)
}

/// Assemble a two-level top-BVH over every mesh instance reachable from
/// `root`, clustering instances by proximity (Walter et al. 2008). Each
/// instance's `sub_bvh_root_index` is assumed already offset past the
/// nodes of any earlier mesh it shares a buffer with, so there's no
/// separate offset table to thread through here.
pub fn build_top_bvh(root: &SceneNode) -> Result<TopBvhBuildOutput> {
    let (root_index, nodes) = build::top::build(root);
    Ok(TopBvhBuildOutput { root_index, nodes })
}
