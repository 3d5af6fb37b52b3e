//! Compile every effect variant once and build the ordered layer list.

use std::path::Path;

use super::{AtlasEffectsLayer, CardEffect, CardLayer, Draw2DLayer, ShaderVariant};
use crate::assets::slurp_text_file;
use crate::error::{Error, Result};
use crate::render::{RenderContext, TextureStore};
use crate::shader::{CompiledProgram, ShaderCompiler};

pub const DRAW2D_SOURCE: &str = "Shaders/Draw2D.wgsl";
pub const ATLAS_SOURCE: &str = "Shaders/AtlasEffects.wgsl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Draw2D,
    Atlas,
}

impl Family {
    fn source(self) -> &'static str {
        match self {
            Family::Draw2D => DRAW2D_SOURCE,
            Family::Atlas => ATLAS_SOURCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    pub name: &'static str,
    pub family: Family,
    pub entry_point: &'static str,
}

/// Every variant, in layer order. Composite indices refer to this order.
pub const VARIANTS: [VariantSpec; 6] = [
    VariantSpec { name: "shaper", family: Family::Draw2D, entry_point: "fs_tentacles" },
    VariantSpec { name: "elder", family: Family::Draw2D, entry_point: "fs_tentacles" },
    VariantSpec { name: "crusader", family: Family::Atlas, entry_point: "fs_crusader_background" },
    VariantSpec { name: "redeemer", family: Family::Atlas, entry_point: "fs_eyrie_background" },
    VariantSpec { name: "hunter", family: Family::Atlas, entry_point: "fs_basilisk_background" },
    VariantSpec { name: "warlord", family: Family::Atlas, entry_point: "fs_conqueror_background" },
];

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledVariant {
    pub family: Family,
    pub variant: ShaderVariant,
}

/// All successfully compiled variants. Device independent.
#[derive(Debug, Clone)]
pub struct VariantSet {
    vertex: CompiledProgram,
    variants: Vec<CompiledVariant>,
}

impl VariantSet {
    /// Compile [`VARIANTS`]. A variant whose pixel program fails is skipped.
    pub fn compile(compiler: &ShaderCompiler) -> Result<Self> {
        Self::compile_specs(compiler, &VARIANTS)
    }

    pub fn compile_specs(compiler: &ShaderCompiler, specs: &[VariantSpec]) -> Result<Self> {
        let draw2d = read_source(compiler.asset_root(), Family::Draw2D.source())?;
        let atlas = read_source(compiler.asset_root(), Family::Atlas.source())?;

        let mut variants = Vec::with_capacity(specs.len());
        for spec in specs {
            let fragment = match spec.family {
                Family::Draw2D => &draw2d,
                Family::Atlas => &atlas,
            };
            match compiler.compile(fragment, spec.entry_point) {
                Ok(pixel) => variants.push(CompiledVariant {
                    family: spec.family,
                    variant: ShaderVariant {
                        name: spec.name.to_string(),
                        vertex: compiler.vertex_program().clone(),
                        pixel,
                    },
                }),
                Err(e) => tracing::warn!("Skipping variant `{}`: {e}", spec.name),
            }
        }
        tracing::info!("Compiled {}/{} variants", variants.len(), specs.len());

        Ok(Self {
            vertex: compiler.vertex_program().clone(),
            variants,
        })
    }

    pub fn vertex(&self) -> &CompiledProgram {
        &self.vertex
    }

    pub fn variants(&self) -> &[CompiledVariant] {
        &self.variants
    }

    pub fn names(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.variant.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

fn read_source(root: &Path, relative: &str) -> Result<String> {
    slurp_text_file(root.join(relative))
}

/// The ordered layers handed to a runner.
#[derive(Debug)]
pub struct CardLayers {
    layers: Vec<CardLayer>,
}

impl CardLayers {
    /// One layer per compiled variant, sharing one vertex module.
    pub fn build(ctx: &RenderContext, store: &mut TextureStore, set: &VariantSet) -> Self {
        let vertex_module = set.vertex().create_shader_module(&ctx.device);
        let layers = set
            .variants()
            .iter()
            .map(|compiled| {
                let (module, variant) = (&vertex_module, &compiled.variant);
                match compiled.family {
                    Family::Draw2D => {
                        CardLayer::Draw2D(Draw2DLayer::new(ctx, store, module, variant))
                    }
                    Family::Atlas => {
                        CardLayer::Atlas(AtlasEffectsLayer::new(ctx, store, module, variant))
                    }
                }
            })
            .collect();
        tracing::debug!(
            "Texture cache holds {} file(s), {} failed",
            store.cached_count(),
            store.failed_count()
        );
        Self { layers }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(CardEffect::name).collect()
    }

    pub fn get(&self, index: usize) -> Option<&CardLayer> {
        self.layers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut CardLayer> {
        let count = self.layers.len();
        self.layers.get_mut(index).ok_or(Error::UnknownLayer { index, count })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardLayer> {
        self.layers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CardLayer> {
        self.layers.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_order_matches_composite_indices() {
        let names: Vec<_> = VARIANTS.iter().map(|v| v.name).collect();
        assert_eq!(names, ["shaper", "elder", "crusader", "redeemer", "hunter", "warlord"]);
        assert!(VARIANTS[..2].iter().all(|v| v.family == Family::Draw2D));
        assert!(VARIANTS[2..].iter().all(|v| v.family == Family::Atlas));
    }

    #[test]
    fn failing_variant_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let shaders = dir.path().join("Shaders");
        std::fs::create_dir_all(&shaders).unwrap();
        std::fs::write(
            shaders.join("Draw2D.wgsl"),
            "@vertex fn vs_card(@location(0) p: vec2<f32>) -> @builtin(position) vec4<f32> { return vec4<f32>(p, 0.0, 1.0); }\n\
             @fragment fn fs_ok() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }\n",
        )
        .unwrap();
        std::fs::write(
            shaders.join("AtlasEffects.wgsl"),
            "@fragment fn fs_atlas() -> @location(0) vec4<f32> { return vec4<f32>(0.5); }\n",
        )
        .unwrap();

        let compiler = ShaderCompiler::new(dir.path(), "").unwrap();
        let specs = [
            VariantSpec { name: "ok", family: Family::Draw2D, entry_point: "fs_ok" },
            VariantSpec { name: "missing", family: Family::Draw2D, entry_point: "fs_missing" },
            VariantSpec { name: "atlas", family: Family::Atlas, entry_point: "fs_atlas" },
        ];
        let set = VariantSet::compile_specs(&compiler, &specs).unwrap();
        assert_eq!(set.names(), ["ok", "atlas"]);
        assert_eq!(set.variants()[1].family, Family::Atlas);
        assert_eq!(&set.variants()[0].variant.vertex, compiler.vertex_program());
    }
}
