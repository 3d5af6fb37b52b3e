//! Card quad geometry.

/// Vertex format shared by every card layer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UiVertex {
    /// Position in target pixels.
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [u8; 4],
    /// Saturation, scale, then the quad-local UV.
    pub sat_scale_local_uv: [f32; 4],
}

impl UiVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        // pos(8) uv(8) color(4) sat_scale_local_uv(16)
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<UiVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Unorm8x4,
                },
                wgpu::VertexAttribute {
                    offset: 20,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Two triangles over the four corners.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 1, 3, 2];

/// Corners of the rectangle at `pos` with `size`, row-major from top-left.
pub fn quad_vertices(pos: [f32; 2], size: [f32; 2]) -> [UiVertex; 4] {
    std::array::from_fn(|i| {
        let col = (i % 2) as f32;
        let row = (i / 2) as f32;
        UiVertex {
            pos: [pos[0] + size[0] * col, pos[1] + size[1] * row],
            uv: [col, row],
            color: [255; 4],
            sat_scale_local_uv: [1.0, 1.0, col, row],
        }
    })
}
