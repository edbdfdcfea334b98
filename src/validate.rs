//! BVH validator (component C11): structural and containment checks over
//! an already-built sub-BVH. Grounded on `original_source/src/bvh/
//! bvh_test.h`'s `BvhTester` (`countNodes`/`countDepth`/`countLeafs`),
//! generalized here into a set of independent checks that each return a
//! [`ValidationFailure`] instead of asserting, so a caller can log every
//! problem rather than stopping at the first one.

use std::collections::HashSet;

use crate::geometry::{Triangle, Vertex};
use crate::nodes::SubBvhNode;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    /// An interior node's bounds don't contain one of its children's.
    BoundsDoNotContainChild { node: u32, child: u32 },
    /// A leaf's bounds don't contain one of its referenced triangles.
    BoundsDoNotContainTriangle { node: u32, triangle_index: u32 },
    /// A node claims both to be a leaf (`triangle_count > 0`) and to have
    /// a child index pointing elsewhere in the arena.
    LeafHasDescendants { node: u32 },
    /// The traversal from the root didn't visit every reachable node in
    /// the arena — either the tree is disconnected or it cycles. `total`
    /// excludes index 1, the root's own sibling slot from its
    /// `allocate_pair` call: the arena has no single-node allocation, so
    /// that slot is never pointed to by anything and is never reachable.
    TraversalDidNotCoverArena { visited: usize, total: usize },
    /// An interior node's child index doesn't strictly exceed its own,
    /// which would make the arena's allocate-then-descend invariant
    /// (used by refit and GPU traversal alike) unsafe to rely on.
    ChildIndexNotIncreasing { node: u32, child: u32 },
}

/// Run all five checks (spec.md 4.7) and return every failure found.
/// An empty result means the BVH is structurally sound.
pub fn validate(nodes: &[SubBvhNode], root: u32, vertices: &[Vertex], triangles: &[Triangle]) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();
    let mut visited = HashSet::new();

    let mut stack = vec![root];
    while let Some(node_index) = stack.pop() {
        if !visited.insert(node_index) {
            continue;
        }
        let node = nodes[node_index as usize];

        if node.is_leaf() {
            let first = node.first_triangle_index();
            for i in first..first + node.triangle_count {
                let tri = &triangles[i as usize];
                let [p0, p1, p2] = tri.positions(vertices);
                if !node.bounds().contains(p0) || !node.bounds().contains(p1) || !node.bounds().contains(p2) {
                    failures.push(ValidationFailure::BoundsDoNotContainTriangle { node: node_index, triangle_index: i });
                }
            }
        } else {
            let left = node.left_child_index();
            let right = left + 1;

            if left <= node_index {
                failures.push(ValidationFailure::ChildIndexNotIncreasing { node: node_index, child: left });
            }

            for &child in &[left, right] {
                if (child as usize) >= nodes.len() {
                    failures.push(ValidationFailure::LeafHasDescendants { node: node_index });
                    continue;
                }
                if !node.bounds().contains_box(&nodes[child as usize].bounds()) {
                    failures.push(ValidationFailure::BoundsDoNotContainChild { node: node_index, child });
                }
                stack.push(child);
            }
        }
    }

    // Index 1 is always the root's discarded pair sibling (the builders
    // call `allocate_pair` for the root too) and is never reachable.
    let expected = nodes.len().saturating_sub(1);
    if visited.len() != expected {
        failures.push(ValidationFailure::TraversalDidNotCoverArena { visited: visited.len(), total: expected });
    }

    failures
}
