//! wgpu plumbing shared by every card layer.

mod context;
mod offscreen;
mod quad;
mod samplers;
mod textures;
mod uniforms;

pub use context::{texture_layout, RenderContext};
pub use offscreen::{padded_bytes_per_row, OffscreenTarget};
pub use quad::{quad_vertices, UiVertex, QUAD_INDICES};
pub use samplers::{SamplerSet, SamplerSpec, SAMPLER_BINDING_BASE, SAMPLER_SPECS};
pub use textures::{generate_solid, mip_chain, solid_pixels, TextureStore};
pub use uniforms::{
    transpose, ui_matrix, DirtyConstants, LayerUniforms, Mat4, UniformTarget, ViewConstants,
};
