//! Texture slot reflection.
//!
//! A pixel program declares its inputs as `@group(2) @binding(N)` 2D float
//! textures. The slot map answers "which slot does this name occupy" for the
//! textures the entry point actually reads.

use std::collections::BTreeMap;

use naga::{ImageClass, ImageDimension, ScalarKind, TypeInner};

use super::CompiledProgram;

/// Bind group holding per-layer textures.
pub const TEXTURE_GROUP: u32 = 2;

/// Name to slot mapping for the textures a program samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSlotMap {
    slots: BTreeMap<String, u32>,
}

impl TextureSlotMap {
    /// Reflect over the program's module. Textures declared but unused by
    /// the entry point are left out, so binding them is a silent no-op.
    pub fn reflect(program: &CompiledProgram) -> Self {
        let module = program.module();
        let usage = program.entry_info();
        let mut slots = BTreeMap::new();

        for (handle, var) in module.global_variables.iter() {
            let Some(binding) = &var.binding else { continue };
            if binding.group != TEXTURE_GROUP {
                continue;
            }
            let is_float_2d = matches!(
                module.types[var.ty].inner,
                TypeInner::Image {
                    dim: ImageDimension::D2,
                    arrayed: false,
                    class: ImageClass::Sampled { kind: ScalarKind::Float, multi: false },
                }
            );
            if !is_float_2d || usage[handle].is_empty() {
                continue;
            }
            if let Some(name) = &var.name {
                slots.insert(name.clone(), binding.binding);
            }
        }

        tracing::debug!("`{}` samples {} texture(s)", program.entry_point(), slots.len());
        Self { slots }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        Self {
            slots: pairs.into_iter().map(|(n, s)| (n.to_string(), s)).collect(),
        }
    }

    pub fn slot(&self, name: &str) -> Option<u32> {
        self.slots.get(name).copied()
    }

    /// Name bound at `slot`, if any.
    pub fn name(&self, slot: u32) -> Option<&str> {
        self.slots
            .iter()
            .find_map(|(name, &s)| (s == slot).then_some(name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `(name, slot)` pairs ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.slots.iter().map(|(n, &s)| (n.as_str(), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderCompiler;

    const VERTEX: &str = r#"
@vertex
fn vs_card(@location(0) pos: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 0.0, 1.0);
}
"#;

    const PIXEL: &str = r#"
@group(1) @binding(1) var samp: sampler;
@group(2) @binding(0) var first: texture_2d<f32>;
@group(2) @binding(3) var third: texture_2d<f32>;
@group(2) @binding(5) var unused: texture_2d<f32>;

@fragment
fn fs_both() -> @location(0) vec4<f32> {
    return textureSample(first, samp, vec2<f32>(0.5)) + textureSample(third, samp, vec2<f32>(0.5));
}

@fragment
fn fs_third() -> @location(0) vec4<f32> {
    return textureSample(third, samp, vec2<f32>(0.5));
}
"#;

    fn compiler() -> (tempfile::TempDir, ShaderCompiler) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Shaders")).unwrap();
        std::fs::write(dir.path().join(crate::shader::VERTEX_SOURCE), VERTEX).unwrap();
        let compiler = ShaderCompiler::new(dir.path(), "").unwrap();
        (dir, compiler)
    }

    #[test]
    fn reflects_only_textures_used_by_entry_point() {
        let (_dir, compiler) = compiler();

        let both = TextureSlotMap::reflect(&compiler.compile(PIXEL, "fs_both").unwrap());
        assert_eq!(both, TextureSlotMap::from_pairs([("first", 0), ("third", 3)]));
        assert_eq!(both.slot("unused"), None);
        assert_eq!(both.name(3), Some("third"));

        let third = TextureSlotMap::reflect(&compiler.compile(PIXEL, "fs_third").unwrap());
        assert_eq!(third.len(), 1);
        assert_eq!(third.slot("third"), Some(3));
        assert_eq!(third.slot("first"), None);
    }

    #[test]
    fn compiling_twice_is_deterministic() {
        let (_dir, compiler) = compiler();
        let a = compiler.compile(PIXEL, "fs_both").unwrap();
        let b = compiler.compile(PIXEL, "fs_both").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.bytecode(), b.bytecode());
    }
}
