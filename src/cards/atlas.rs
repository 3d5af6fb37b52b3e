//! Atlas-effects family: procedural background fields over a paper texture.

use super::base::LayerBase;
use super::binder::{ResourceBinder, TextureRegistry};
use super::{CardEffect, ShaderVariant, CARD_HEIGHT, CARD_WIDTH};
use crate::render::{Mat4, RenderContext, TextureStore};
use crate::shader::TextureSlotMap;

pub const MAX_MEMORY_LINE_NODE_IMAGES: usize = 5;

/// Pixel constants, laid out to match the WGSL `AtlasConstants` struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AtlasConstants {
    pub time: f32,
    pub image_width: f32,
    pub image_height: f32,
    pub progress: f32,

    pub alpha: f32,
    pub bonus_completed: f32,
    pub num_segments: u32,
    pub radians_per_second: f32,

    pub doubled_memory_line_segments: u32,
    pub num_memory_line_textures: u32,
    pub pad0: [u32; 2],

    /// texture_idx, scale_x, scale_y, texture aspect ratio
    pub memory_line_texture_datas: [[f32; 4]; MAX_MEMORY_LINE_NODE_IMAGES],
    /// centre_u, centre_v, radius_u, radius_v
    pub memory_line_texture_uvs: [[f32; 4]; MAX_MEMORY_LINE_NODE_IMAGES],
}

impl Default for AtlasConstants {
    fn default() -> Self {
        Self {
            time: 36.001,
            image_width: CARD_WIDTH as f32,
            image_height: CARD_HEIGHT as f32,
            ..bytemuck::Zeroable::zeroed()
        }
    }
}

/// Textures shared by every atlas-effects variant.
pub fn register_textures(registry: &mut impl TextureRegistry) {
    registry.add_texture("tex", "Art/2DArt/UIEffects/ConquerorItems/paperBG.dds", false);
    registry.add_texture("noise_map", "Art/2DArt/Lookup/atlas_lookup.dds", false);
}

#[derive(Debug)]
pub struct AtlasEffectsLayer {
    name: String,
    base: LayerBase<AtlasConstants>,
}

impl AtlasEffectsLayer {
    pub fn new(
        ctx: &RenderContext,
        store: &mut TextureStore,
        vertex_module: &wgpu::ShaderModule,
        variant: &ShaderVariant,
    ) -> Self {
        let mut binder = ResourceBinder::new(ctx, store, TextureSlotMap::reflect(&variant.pixel));
        register_textures(&mut binder);
        let textures = binder.finish(&variant.name);

        Self {
            name: variant.name.clone(),
            base: LayerBase::new(ctx, vertex_module, variant, AtlasConstants::default(), textures),
        }
    }

    pub fn constants(&self) -> &AtlasConstants {
        self.base.uniforms().pixel.get()
    }

    pub fn base(&self) -> &LayerBase<AtlasConstants> {
        &self.base
    }
}

impl CardEffect for AtlasEffectsLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_time(&mut self, time: f64) {
        self.base.update_constants(|c| c.time = time as f32);
    }

    fn set_view_transform(&mut self, transform: Mat4) {
        self.base.set_view_transform(transform);
    }

    fn prepare(&mut self, queue: &wgpu::Queue, pos: [f32; 2], size: [f32; 2]) {
        self.base.prepare(queue, pos, size);
    }

    fn record(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.base.record(pass);
    }
}
