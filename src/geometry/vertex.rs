use bytemuck::{Pod, Zeroable};

/// Mesh vertex payload. Opaque to the builder beyond `position`: `normal`
/// and `tex_coord` ride along for the renderer's benefit only.
///
/// `original_source/src/vertices.h`'s `VertexSceneData` pads its `vec4 +
/// vec4 + vec2` out to an OpenCL-alignment-friendly stride with 8 trailing
/// bytes; `_padding` reproduces that so a `Vec<Vertex>` can be reinterpreted
/// as the exact byte buffer the OpenCL kernel expects.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
    pub tex_coord: [f32; 2],
    pub _padding: [u8; 8],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Vertex {
            position: [position[0], position[1], position[2], 1.0],
            normal: [normal[0], normal[1], normal[2], 0.0],
            tex_coord,
            _padding: [0; 8],
        }
    }

    #[inline]
    pub fn position3(&self) -> cgmath::Point3<f32> {
        cgmath::Point3::new(self.position[0], self.position[1], self.position[2])
    }
}
