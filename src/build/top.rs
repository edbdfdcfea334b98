//! Top-level (instance) BVH builder (component C10).
//!
//! Grounded on `original_source/src/bvh/top_bvh_build.cpp`'s
//! `buildTopBVH`: a scene-graph walk collects one leaf per mesh instance
//! (transforming its sub-BVH root bounds through the accumulated scene
//! transform via 8 explicit corners), then Walter et al. 2008's fast
//! agglomerative clustering repeatedly merges the current mutual-nearest
//! pair until one root remains.

use std::cmp::Ordering;

use crate::aabb::Aabb32;
use crate::nodes::TopBvhNode;
use crate::scene::SceneNode;
use crate::transform::Transform3;

/// Build a top-level BVH over every mesh instance reachable from `root`.
/// Returns the root node's index into the returned node array (the root
/// always ends up last, per the original) plus the array itself.
///
/// Returns `(0, vec![])` for a scene with no mesh instances at all.
pub fn build(root: &SceneNode) -> (u32, Vec<TopBvhNode>) {
    let mut nodes: Vec<TopBvhNode> = Vec::new();
    let mut list: Vec<u32> = Vec::new();

    let mut stack: Vec<(&SceneNode, Transform3<f32>)> = vec![(root, Transform3::identity())];
    while let Some((scene_node, base_transform)) = stack.pop() {
        let transform = base_transform.concat(&scene_node.transform);
        for child in &scene_node.children {
            stack.push((child, transform));
        }

        if let Some(mesh) = &scene_node.mesh {
            let bounds = calc_transformed_aabb(&mesh.local_bounds, &transform);
            let node_id = nodes.len() as u32;
            nodes.push(TopBvhNode::leaf(bounds, transform.inverse_matrix_columns(), mesh.sub_bvh_root_index));
            list.push(node_id);
        }
    }

    if list.is_empty() {
        return (0, nodes);
    }
    if list.len() == 1 {
        return (list[0], nodes);
    }

    let mut node_a = *list.last().unwrap();
    let mut node_b = find_best_match(&nodes, &list, node_a);
    while list.len() > 1 {
        let node_c = find_best_match(&nodes, &list, node_b);
        if node_a == node_c {
            list.retain(|&x| x != node_a && x != node_b);

            let merged = merge_nodes(node_a, nodes[node_a as usize], node_b, nodes[node_b as usize]);
            let new_id = nodes.len() as u32;
            nodes.push(merged);
            node_a = new_id;

            list.push(node_a);
            node_b = find_best_match(&nodes, &list, node_a);
        } else {
            node_a = node_b;
            node_b = node_c;
        }
    }

    let root_index = nodes.len() as u32 - 1;
    (root_index, nodes)
}

/// The instance among `indices` (excluding `this_id` unless it's the
/// only option) whose merged bounds with `this_id`'s node has lowest
/// surface area.
fn find_best_match(nodes: &[TopBvhNode], indices: &[u32], this_id: u32) -> u32 {
    *indices
        .iter()
        .min_by(|&&a, &&b| {
            if a == this_id {
                return Ordering::Greater;
            }
            if b == this_id {
                return Ordering::Less;
            }
            let sa_a = combined_surface_area(&nodes[this_id as usize], &nodes[a as usize]);
            let sa_b = combined_surface_area(&nodes[this_id as usize], &nodes[b as usize]);
            sa_a.partial_cmp(&sa_b).unwrap_or(Ordering::Equal)
        })
        .copied()
        .unwrap()
}

fn combined_surface_area(a: &TopBvhNode, b: &TopBvhNode) -> f32 {
    a.bounds().union(&b.bounds()).surface_area()
}

fn merge_nodes(a_id: u32, a: TopBvhNode, b_id: u32, b: TopBvhNode) -> TopBvhNode {
    TopBvhNode::interior(a.bounds().union(&b.bounds()), a_id, b_id)
}

fn calc_transformed_aabb(bounds: &Aabb32, transform: &Transform3<f32>) -> Aabb32 {
    bounds
        .corners()
        .iter()
        .fold(Aabb32::empty(), |acc, &corner| acc.fit_point(transform.transform_point(corner)))
}
