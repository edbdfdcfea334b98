//! Minimal scene graph the top-level builder (component C10) consumes:
//! a tree of transforms, some of which place a mesh instance.
//!
//! Adapted from the teacher's `scene/node.rs`/`scene/description.rs`
//! (`SceneNode`'s `transform` field and child list), stripped of the
//! material/light/camera bookkeeping that belongs to rendering rather
//! than hierarchy construction.

use crate::aabb::Aabb32;
use crate::transform::Transform3;

/// A mesh placed at a scene node: which sub-BVH to instance, and that
/// sub-BVH's root bounds in its own local (pre-transform) space.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance {
    /// Index of this mesh's root node in the flattened, concatenated
    /// sub-BVH node buffer (i.e. already offset past earlier meshes'
    /// nodes).
    pub sub_bvh_root_index: u32,
    pub local_bounds: Aabb32,
}

/// One node of the scene graph: a local transform, an optional mesh
/// instance, and any number of children (whose transforms compose with
/// this node's).
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub transform: Transform3<f32>,
    pub mesh: Option<MeshInstance>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(transform: Transform3<f32>) -> Self {
        SceneNode { transform, mesh: None, children: Vec::new() }
    }

    pub fn leaf(transform: Transform3<f32>, mesh: MeshInstance) -> Self {
        SceneNode { transform, mesh: Some(mesh), children: Vec::new() }
    }

    pub fn add_child(&mut self, child: SceneNode) -> &mut Self {
        self.children.push(child);
        self
    }
}
