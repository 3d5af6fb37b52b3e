//! Draw2D family: layered tentacle / influence-map overlays.

use super::base::LayerBase;
use super::binder::{ResourceBinder, TextureRegistry};
use super::{CardEffect, ShaderVariant};
use crate::render::{Mat4, RenderContext, TextureStore};
use crate::shader::TextureSlotMap;

const TENTACLES: &str = "Art/2DArt/Tentacles";

/// Pixel constants, laid out to match the WGSL `Draw2DConstants` struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Draw2DConstants {
    pub time: f32,
    pub seed: f32,
    pub effect_phase: f32,
    pub to_base_resolution_multiplier: f32,

    pub has_mask: f32,
    pub has_background: f32,
    pub is_div_card: f32,
    pub pad0: u32,

    pub aspect_ratio: [f32; 4],
    pub tex_scale: [f32; 4],
    pub muddle_frequency: f32,
    pub pad1: [u32; 3],

    pub muddle_intensity: [f32; 4],
    pub tex_clamp: [f32; 4],
    pub effect_params: [f32; 4],
    pub shader_type: f32,
    pub layers_count: f32,
    pub pad2: [u32; 2],

    pub item_size: [f32; 4],
    pub flash_glow_color: [f32; 4],
    pub hellscape_params: [f32; 4],

    pub layer_0_speed: [f32; 4],
    pub layer_1_speed: [f32; 4],
    pub layer_2_speed: [f32; 4],
    pub layer_3_speed: [f32; 4],
}

impl Default for Draw2DConstants {
    fn default() -> Self {
        Self {
            time: 23.762,
            has_mask: 1.0,
            has_background: 1.0,
            is_div_card: 1.0,
            aspect_ratio: [1.39286, 1.0, 0.0, 0.0],
            tex_scale: [6.96429, 5.0, 0.0, 0.0],
            muddle_intensity: [0.1, 0.1, 0.0, 0.0],
            layer_0_speed: [0.0075, 0.0025, 0.0, 0.0],
            layer_1_speed: [0.0225, 0.0075, 0.0, 0.0],
            layer_2_speed: [0.03, 0.01, 0.0, 0.0],
            ..bytemuck::Zeroable::zeroed()
        }
    }
}

impl Draw2DConstants {
    /// Family defaults with the variant's muddle frequency and shader type.
    pub fn for_variant(name: &str) -> Self {
        let mut c = Self::default();
        match name {
            "shaper" => {
                c.muddle_frequency = 10.0;
                c.shader_type = 2.0;
            }
            "elder" => {
                c.muddle_frequency = 1.0;
                c.shader_type = 0.0;
            }
            _ => {}
        }
        c
    }
}

/// Register the Draw2D texture set for `variant`.
pub fn register_textures(variant: &str, r: &mut impl TextureRegistry) {
    let tentacle = |file: &str| format!("{TENTACLES}/{file}.dds");

    r.add_texture("tex", "Art/2DArt/UIEffects/ConquerorItems/paperBG.dds", true);
    r.gen_texture("mask_tex", [1, 1], 0x7DFF_FFFF);
    match variant {
        "shaper" => {
            for i in 0..3 {
                let path = tentacle(&format!("ShaperAreaColor{}", i + 1));
                r.add_texture(&format!("color_layer_{i}_tex"), &path, true);
            }
            r.add_texture("color_layer_3_tex", "", true);
            for i in 0..3 {
                let path = tentacle(&format!("ShaperAreaNormal{}", i + 1));
                r.add_texture(&format!("influence_layer_{i}_tex"), &path, false);
            }
            r.add_texture("influence_layer_3_tex", "", false);
            for i in 0..4 {
                r.add_texture(&format!("mask_layer_{i}_tex"), "", false);
            }
        }
        "elder" => {
            r.add_texture("color_layer_0_tex", &tentacle("PeopleBackground"), true);
            for i in 1..4 {
                let path = tentacle(&format!("PeopleTentacleColor{i}"));
                r.add_texture(&format!("color_layer_{i}_tex"), &path, true);
            }
            r.gen_texture("influence_layer_0_tex", [16, 16], 0xFF00_0000);
            let influence = tentacle("PeopleTentacleInfluence");
            for i in 1..4 {
                r.add_texture(&format!("influence_layer_{i}_tex"), &influence, false);
            }
            r.gen_texture("mask_layer_0_tex", [16, 16], 0xFFFF_FFFF);
            for i in 1..4 {
                let path = tentacle(&format!("PeopleTentacleMask{i}"));
                r.add_texture(&format!("mask_layer_{i}_tex"), &path, false);
            }
        }
        _ => {}
    }
    r.add_texture("muddle_tex", "Art/2DArt/Lookup/muddle.dds", false);
    r.add_texture("background_tex", "Art/2DArt/Atlas/AtlasCompletelyBlank.dds", true);
}

#[derive(Debug)]
pub struct Draw2DLayer {
    name: String,
    base: LayerBase<Draw2DConstants>,
}

impl Draw2DLayer {
    pub fn new(
        ctx: &RenderContext,
        store: &mut TextureStore,
        vertex_module: &wgpu::ShaderModule,
        variant: &ShaderVariant,
    ) -> Self {
        let mut binder = ResourceBinder::new(ctx, store, TextureSlotMap::reflect(&variant.pixel));
        register_textures(&variant.name, &mut binder);
        let textures = binder.finish(&variant.name);

        let constants = Draw2DConstants::for_variant(&variant.name);
        Self {
            name: variant.name.clone(),
            base: LayerBase::new(ctx, vertex_module, variant, constants, textures),
        }
    }

    pub fn constants(&self) -> &Draw2DConstants {
        self.base.uniforms().pixel.get()
    }

    pub fn base(&self) -> &LayerBase<Draw2DConstants> {
        &self.base
    }
}

impl CardEffect for Draw2DLayer {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::tests::RecordingRegistry;

    #[test]
    fn constants_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<Draw2DConstants>(), 256);
        assert_eq!(std::mem::offset_of!(Draw2DConstants, aspect_ratio), 32);
        assert_eq!(std::mem::offset_of!(Draw2DConstants, muddle_frequency), 64);
        assert_eq!(std::mem::offset_of!(Draw2DConstants, shader_type), 128);
        assert_eq!(std::mem::offset_of!(Draw2DConstants, item_size), 144);
        assert_eq!(std::mem::offset_of!(Draw2DConstants, layer_3_speed), 240);
    }

    #[test]
    fn variant_defaults() {
        let shaper = Draw2DConstants::for_variant("shaper");
        assert_eq!((shaper.muddle_frequency, shaper.shader_type), (10.0, 2.0));
        assert_eq!(shaper.time, 23.762);
        assert_eq!(shaper.layer_2_speed, [0.03, 0.01, 0.0, 0.0]);

        let elder = Draw2DConstants::for_variant("elder");
        assert_eq!((elder.muddle_frequency, elder.shader_type), (1.0, 0.0));

        let other = Draw2DConstants::for_variant("unknown");
        assert_eq!(other.muddle_frequency, 0.0);
        assert_eq!(other.has_mask, 1.0);
    }

    #[test]
    fn shaper_leaves_fourth_layer_and_masks_empty() {
        let mut r = RecordingRegistry::default();
        register_textures("shaper", &mut r);
        assert_eq!(r.calls.len(), 16);
        assert_eq!(r.calls[0], "add tex Art/2DArt/UIEffects/ConquerorItems/paperBG.dds srgb");
        assert_eq!(r.calls[1], "gen mask_tex 1x1 7dffffff");
        assert_eq!(
            r.calls[2],
            "add color_layer_0_tex Art/2DArt/Tentacles/ShaperAreaColor1.dds srgb"
        );
        assert_eq!(r.calls[5], "add color_layer_3_tex <empty> srgb");
        assert_eq!(
            r.calls[6],
            "add influence_layer_0_tex Art/2DArt/Tentacles/ShaperAreaNormal1.dds linear"
        );
        assert_eq!(r.calls[9], "add influence_layer_3_tex <empty> linear");
        assert_eq!(r.calls[13], "add mask_layer_3_tex <empty> linear");
        assert_eq!(r.calls[14], "add muddle_tex Art/2DArt/Lookup/muddle.dds linear");
        assert_eq!(r.calls[15], "add background_tex Art/2DArt/Atlas/AtlasCompletelyBlank.dds srgb");
    }

    #[test]
    fn elder_generates_influence_and_mask_placeholders() {
        let mut r = RecordingRegistry::default();
        register_textures("elder", &mut r);
        assert_eq!(r.calls.len(), 16);
        assert_eq!(
            r.calls[2],
            "add color_layer_0_tex Art/2DArt/Tentacles/PeopleBackground.dds srgb"
        );
        assert_eq!(
            r.calls[5],
            "add color_layer_3_tex Art/2DArt/Tentacles/PeopleTentacleColor3.dds srgb"
        );
        assert_eq!(r.calls[6], "gen influence_layer_0_tex 16x16 ff000000");
        assert_eq!(
            r.calls[7],
            "add influence_layer_1_tex Art/2DArt/Tentacles/PeopleTentacleInfluence.dds linear"
        );
        assert_eq!(r.calls[10], "gen mask_layer_0_tex 16x16 ffffffff");
        assert_eq!(
            r.calls[13],
            "add mask_layer_3_tex Art/2DArt/Tentacles/PeopleTentacleMask3.dds linear"
        );
    }
}
