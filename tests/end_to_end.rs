//! End-to-end scenarios (spec.md 8): concrete builds checked against
//! their expected shape, plus the universal invariants re-checked across
//! randomized inputs where the concrete scenarios don't already cover
//! them.

use cgmath::{Point3, Vector3};
use rand::Rng;

use tracer_bvh::{
    build_binned_bvh, build_spatial_split_bvh, build_top_bvh, refit_bvh, validate, BuildConfig, MeshInstance,
    SceneNode, Transform3, Triangle, Vertex,
};

fn v(p: [f32; 3]) -> Vertex {
    Vertex::new(p, [0.0, 1.0, 0.0], [0.0, 0.0])
}

/// S1: a single triangle builds a single leaf with exact bounds.
#[test]
fn s1_single_triangle_is_one_leaf_with_exact_bounds() {
    let vertices = vec![v([0.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), v([0.0, 1.0, 0.0])];
    let triangles = vec![Triangle::new([0, 1, 2], 0)];
    let config = BuildConfig::default();

    let output = build_binned_bvh(&vertices, &triangles, &config).unwrap();
    // index 1 is the root's discarded sibling slot (the arena only ever
    // allocates in pairs, even for the root).
    assert_eq!(output.nodes.len(), 2);
    let root = output.nodes[0];
    assert!(root.is_leaf());
    assert_eq!(root.triangle_count, 1);
    assert_eq!(root.bounds().min, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(root.bounds().max, Point3::new(1.0, 1.0, 0.0));
}

/// S2: two widely separated axis-aligned triangles split into one
/// interior node whose bounds enclose both leaves, along axis 0.
#[test]
fn s2_two_separated_triangles_split_on_x() {
    let vertices = vec![
        v([0.0, 0.0, 0.0]),
        v([1.0, 0.0, 0.0]),
        v([0.0, 1.0, 0.0]),
        v([10.0, 0.0, 0.0]),
        v([11.0, 0.0, 0.0]),
        v([10.0, 1.0, 0.0]),
    ];
    let triangles = vec![Triangle::new([0, 1, 2], 0), Triangle::new([3, 4, 5], 0)];
    let mut config = BuildConfig::default();
    config.min_leaf_primitives = 0;

    let output = build_binned_bvh(&vertices, &triangles, &config).unwrap();
    // +1 for the root's discarded sibling slot at index 1.
    assert_eq!(output.nodes.len(), 4);
    let root = output.nodes[0];
    assert!(!root.is_leaf());

    let left = output.nodes[root.left_child_index() as usize];
    let right = output.nodes[root.left_child_index() as usize + 1];
    assert!(left.is_leaf() && right.is_leaf());
    assert!(root.bounds().contains_box(&left.bounds()));
    assert!(root.bounds().contains_box(&right.bounds()));
}

/// S3: 1000 random triangles in the unit cube builds without exceeding
/// the configured depth cap, and passes every structural check.
#[test]
fn s3_thousand_random_triangles_respects_depth_cap() {
    let mut rng = rand::thread_rng();
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    for _ in 0..1000 {
        let base = vertices.len() as u32;
        for _ in 0..3 {
            let p = [rng.gen_range(0.0, 1.0), rng.gen_range(0.0, 1.0), rng.gen_range(0.0, 1.0)];
            vertices.push(v(p));
        }
        triangles.push(Triangle::new([base, base + 1, base + 2], 0));
    }
    let config = BuildConfig::default();

    let output = build_binned_bvh(&vertices, &triangles, &config).unwrap();

    let failures = validate(&output.nodes, output.root_index, &vertices, &output.triangles);
    assert!(failures.is_empty(), "unexpected validation failures: {:?}", failures);

    let depth = node_depth(&output.nodes, output.root_index);
    assert!(depth <= config.max_depth(1000), "depth {} exceeded cap", depth);
}

fn node_depth(nodes: &[tracer_bvh::SubBvhNode], index: u32) -> u32 {
    let node = nodes[index as usize];
    if node.is_leaf() {
        0
    } else {
        let left = node.left_child_index();
        1 + node_depth(nodes, left).max(node_depth(nodes, left + 1))
    }
}

/// S4: a long thin triangle spanning a cluster of 99 small triangles
/// forces the SBVH to duplicate its reference rather than degrade the
/// cluster's split quality.
#[test]
fn s4_long_triangle_against_small_cluster_duplicates_a_reference() {
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();

    for i in 0..99 {
        let x = i as f32 * 0.01;
        let base = vertices.len() as u32;
        vertices.push(v([x, 0.0, 0.0]));
        vertices.push(v([x + 0.005, 0.0, 0.0]));
        vertices.push(v([x, 0.005, 0.0]));
        triangles.push(Triangle::new([base, base + 1, base + 2], 0));
    }

    let base = vertices.len() as u32;
    vertices.push(v([-5.0, 2.0, 0.0]));
    vertices.push(v([5.0, 2.0, 0.0]));
    vertices.push(v([0.0, 2.1, 0.0]));
    triangles.push(Triangle::new([base, base + 1, base + 2], 0));

    let config = BuildConfig::default();
    let output = build_spatial_split_bvh(&vertices, &triangles, &config).unwrap();

    assert!(
        output.triangles.len() > triangles.len(),
        "expected at least one duplicated reference, got {} references for {} triangles",
        output.triangles.len(),
        triangles.len()
    );

    let long_triangle = triangles[triangles.len() - 1];
    let references = output.triangles.iter().filter(|&&t| t == long_triangle).count();
    assert!(references >= 1);
}

/// S5: two meshes placed at four instances cluster into a correctly
/// shaped top-BVH whose every bounds contains its descendants'.
#[test]
fn s5_two_meshes_four_instances_build_a_consistent_top_bvh() {
    let sub_bounds = tracer_bvh::Aabb32::new(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5));

    let mut scene_root = SceneNode::group(Transform3::identity());
    for (x, sub_index) in [(0.0, 0u32), (2.0, 0), (50.0, 1), (52.0, 1)] {
        scene_root.add_child(SceneNode::leaf(
            Transform3::translate(Vector3::new(x, 0.0, 0.0)),
            MeshInstance { sub_bvh_root_index: sub_index, local_bounds: sub_bounds },
        ));
    }

    let top = build_top_bvh(&scene_root).unwrap();
    assert_eq!(top.nodes.len(), 7); // 4 leaves + 3 merges
    let root = top.nodes[top.root_index as usize];
    for n in &top.nodes {
        assert!(root.bounds().contains_box(&n.bounds()));
    }
}

/// S6: refitting after moving vertices (no topology change) matches a
/// fresh build's bounds exactly.
#[test]
fn s6_refit_after_moving_vertices_matches_a_fresh_build() {
    let mut vertices: Vec<Vertex> = (0..30)
        .map(|i| {
            let x = i as f32;
            v([x, (x * 0.37).sin(), (x * 0.71).cos()])
        })
        .collect();
    let triangles: Vec<Triangle> = (0..10).map(|i| Triangle::new([i * 3, i * 3 + 1, i * 3 + 2], 0)).collect();
    let config = BuildConfig::default();

    let mut output = build_binned_bvh(&vertices, &triangles, &config).unwrap();

    for vertex in &mut vertices {
        vertex.position[0] += 3.0;
        vertex.position[1] -= 1.5;
    }

    refit_bvh(&mut output.nodes, output.root_index, &vertices, &output.triangles);

    let fresh = build_binned_bvh(&vertices, &triangles, &config).unwrap();
    let mut fresh_nodes = fresh.nodes;
    refit_bvh(&mut fresh_nodes, fresh.root_index, &vertices, &fresh.triangles);

    assert_eq!(output.nodes[0].bounds(), fresh_nodes[0].bounds());
}

/// Invariant 8 (top-BVH transform): a single instance under an identity
/// transform reproduces the sub-BVH root's bounds exactly.
#[test]
fn invariant_single_instance_identity_transform_preserves_bounds() {
    let sub_bounds = tracer_bvh::Aabb32::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(4.0, 5.0, 6.0));
    let mut scene_root = SceneNode::group(Transform3::identity());
    scene_root.add_child(SceneNode::leaf(
        Transform3::identity(),
        MeshInstance { sub_bvh_root_index: 0, local_bounds: sub_bounds },
    ));

    let top = build_top_bvh(&scene_root).unwrap();
    assert_eq!(top.nodes[top.root_index as usize].bounds(), sub_bounds);
}

/// Invariant 4 (sibling pairing): every interior node's right child is
/// exactly its left child's index + 1, and strictly greater than its own.
#[test]
fn invariant_sibling_pairing_holds_across_a_random_build() {
    let mut rng = rand::thread_rng();
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    for _ in 0..200 {
        let base = vertices.len() as u32;
        for _ in 0..3 {
            let p = [rng.gen_range(-10.0, 10.0), rng.gen_range(-10.0, 10.0), rng.gen_range(-10.0, 10.0)];
            vertices.push(v(p));
        }
        triangles.push(Triangle::new([base, base + 1, base + 2], 0));
    }
    let config = BuildConfig::default();
    let output = build_binned_bvh(&vertices, &triangles, &config).unwrap();

    for (i, node) in output.nodes.iter().enumerate() {
        if !node.is_leaf() {
            let left = node.left_child_index() as usize;
            assert!(left > i);
            assert!(left + 1 < output.nodes.len());
        }
    }
}
