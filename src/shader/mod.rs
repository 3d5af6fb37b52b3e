//! Shader programs: compilation against the shared prelude and texture slot reflection.

mod compiler;
mod reflect;

pub use compiler::{
    preprocess, CompiledProgram, ShaderCompiler, Stage, VERTEX_ENTRY_POINT, VERTEX_SOURCE,
};
pub use reflect::{TextureSlotMap, TEXTURE_GROUP};
